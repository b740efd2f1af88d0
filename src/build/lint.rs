//! C++ style check with depot_tools' cpplint.py

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use walkdir::WalkDir;

use crate::config::Settings;
use crate::error::BuildError;
use crate::exec::{find_program, Invocation};
use crate::utils::terminal;

/// Diagnostics that don't apply to this codebase
pub const IGNORED_PREFIXES: &[&str] = &[
    "No copyright message found.",
    "#ifndef header guard has wrong style, please use: SRC_",
    "#endif line should be \"#endif  // SRC_",
    "Include the directory when naming .h files",
    "Done processing",
    "Total errors found",
];

/// Source extensions checked by lint
pub const SOURCE_EXTENSIONS: &[&str] = &["cc", "h"];

/// Directory left out of lint, relative to the project root
pub const EXCLUDED_DIR: &str = "tests/integration";

/// Prefix of Qt meta-object compiler output
pub const GENERATED_PREFIX: &str = "moc_";

/// Drops cpplint lines matching [`IGNORED_PREFIXES`]
#[derive(Debug)]
pub struct LintFilter {
    location: Regex,
}

impl LintFilter {
    pub fn new() -> Result<Self> {
        // file:line: message
        let location = Regex::new(r"^[^:]*:[^:]*:(.*)$")?;
        Ok(Self { location })
    }

    /// Text compared against the ignore list
    ///
    /// This is the message after the second colon, or the whole line when it
    /// has no `file:line:` prefix.
    pub fn check_text<'a>(&self, line: &'a str) -> &'a str {
        match self.location.captures(line).and_then(|caps| caps.get(1)) {
            Some(message) => message.as_str().trim(),
            None => line,
        }
    }

    pub fn is_ignored(&self, line: &str) -> bool {
        let text = self.check_text(line);
        IGNORED_PREFIXES.iter().any(|prefix| text.starts_with(prefix))
    }

    /// Lines of cpplint output that should be reported
    pub fn reported<'a>(&self, output: &'a str) -> Vec<&'a str> {
        output
            .lines()
            // Blank lines are not diagnostics, unlike any other unmatched line
            .filter(|line| !line.trim().is_empty())
            .filter(|line| !self.is_ignored(line))
            .collect()
    }
}

/// Handwritten `.cc` and `.h` files under `root`, relative to it
pub fn collect_sources(root: &Path) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .map_or(true, |rel| !rel.starts_with(EXCLUDED_DIR))
        });
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with(GENERATED_PREFIX) {
            continue;
        }
        let is_source = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext));
        if !is_source {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(root) {
            sources.push(rel.to_path_buf());
        }
    }
    Ok(sources)
}

/// Run cpplint over the project and print the remaining diagnostics
pub fn run_lint(settings: &Settings) -> Result<()> {
    let depot_tools = settings.require_depot_tools_dir("lint")?;
    let python = settings.platform.python();
    find_program(python, "lint")?;

    let sources = collect_sources(&settings.project_root)?;
    terminal::print_step(&format!("Linting {} files", sources.len()));

    let output = Invocation::new(python)
        .arg(depot_tools.join("cpplint.py"))
        .args(&sources)
        .current_dir(&settings.project_root)
        .output(settings.verbose)
        .context("Unable to run cpplint")?;
    // cpplint exits non-zero whenever it reports anything
    if !output.success && output.combined.is_empty() {
        return Err(BuildError::CommandFailed {
            program: python.to_string(),
            code: output.exit_code,
        })
        .context("Unable to run cpplint");
    }

    let filter = LintFilter::new()?;
    let reported = filter.reported(&output.combined);
    for line in &reported {
        println!("{}", line);
    }
    if !reported.is_empty() {
        return Err(BuildError::LintFailed {
            count: reported.len(),
        })
        .context("Lint check returned one or more errors");
    }

    terminal::print_success("Lint passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_check_text() {
        let filter = LintFilter::new().unwrap();
        assert_eq!(
            filter.check_text("src/browser.cc:12:  Missing space before {  [whitespace/braces] [5]"),
            "Missing space before {  [whitespace/braces] [5]"
        );
        assert_eq!(filter.check_text("Done processing src/browser.cc"), "Done processing src/browser.cc");
        assert_eq!(filter.check_text("Total errors found: 3"), "Total errors found: 3");
    }

    #[test]
    fn test_ignored_lines() {
        let filter = LintFilter::new().unwrap();
        assert!(filter.is_ignored("src/browser.cc:0:  No copyright message found.  [legal/copyright] [5]"));
        assert!(filter.is_ignored(
            "src/page_tree.h:4:  #ifndef header guard has wrong style, please use: SRC_PAGE_TREE_H_  [build/header_guard] [5]"
        ));
        assert!(filter.is_ignored("src/page_tree.h:120:  #endif line should be \"#endif  // SRC_PAGE_TREE_H_\"  [build/header_guard] [5]"));
        assert!(filter.is_ignored("Done processing src/page_tree.h"));
        assert!(filter.is_ignored("Total errors found: 12"));
        assert!(!filter.is_ignored("src/page_tree.cc:88:  Lines should be <= 80 characters long  [whitespace/line_length] [2]"));
    }

    #[test]
    fn test_reported_keeps_order_and_skips_blank() {
        let filter = LintFilter::new().unwrap();
        let output = "src/a.cc:0:  No copyright message found.  [legal/copyright] [5]\n\
                      src/a.cc:3:  Extra space before ( in function call  [whitespace/parens] [4]\n\
                      Done processing src/a.cc\n\
                      \n\
                      src/b.h:9:  Using C-style cast.  [readability/casting] [4]\n\
                      Total errors found: 3\n";
        assert_eq!(
            filter.reported(output),
            vec![
                "src/a.cc:3:  Extra space before ( in function call  [whitespace/parens] [4]",
                "src/b.h:9:  Using C-style cast.  [readability/casting] [4]",
            ]
        );
    }

    #[test]
    fn test_collect_sources() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for rel in [
            "src/browser.cc",
            "src/browser.h",
            "src/moc_browser.cc",
            "src/browser.cpp",
            "src/resources.qrc",
            "tests/browser_test.cc",
            "tests/integration/harness.cc",
            "main.cc",
        ] {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }

        let sources = collect_sources(root).unwrap();
        assert_eq!(
            sources,
            vec![
                PathBuf::from("main.cc"),
                PathBuf::from("src/browser.cc"),
                PathBuf::from("src/browser.h"),
                PathBuf::from("tests/browser_test.cc"),
            ]
        );
    }

    #[test]
    fn test_requires_depot_tools_dir() {
        let settings = Settings::new(PathBuf::from("."), Platform::Linux, false);
        let err = run_lint(&settings).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::MissingEnvVar { var: "DEPOT_TOOLS_DIR", .. })
        ));
    }
}
