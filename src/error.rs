//! Error types and helpers for user-friendly error messages
//!
//! Most of the tool propagates `anyhow::Error` with step context attached.
//! Failures the tool raises itself are classified by [`BuildError`] so the
//! top-level handler can print an actionable hint next to the message.

use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the build orchestration itself
#[derive(Error, Debug)]
pub enum BuildError {
    /// Host OS or CPU architecture is not supported
    #[error("Unsupported OS '{os}' or arch '{arch}'")]
    UnsupportedEnvironment { os: String, arch: String },

    /// Required environment variable is missing or empty
    #[error("Unable to find {var} env var (required for {required_for})")]
    MissingEnvVar {
        var: &'static str,
        required_for: String,
    },

    /// Tool/executable not found on PATH
    #[error("Unable to find {tool} on the PATH (required for {required_for})")]
    MissingTool { tool: String, required_for: String },

    /// Profile token is neither `debug` nor `release`
    #[error("Unknown profile '{0}', expected 'debug' or 'release'")]
    UnknownProfile(String),

    /// External program could not be started
    #[error("Failed to execute {program}")]
    CommandLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// External program exited unsuccessfully
    #[error("{program} exited with {}", exit_description(.code))]
    CommandFailed { program: String, code: Option<i32> },

    /// Filesystem failure tied to a path
    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output directory that an operation works on does not exist
    #[error("Target directory {} does not exist, run 'build' first", .0.display())]
    MissingTarget(PathBuf),

    /// Lint left one or more diagnostics after filtering
    #[error("Lint check returned {count} error(s)")]
    LintFailed { count: usize },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "termination by signal".to_string(),
    }
}

impl BuildError {
    /// Create an I/O error for a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a missing environment variable error
    pub fn missing_env(var: &'static str, required_for: impl Into<String>) -> Self {
        Self::MissingEnvVar {
            var,
            required_for: required_for.into(),
        }
    }

    /// Create a missing tool error
    pub fn missing_tool(tool: impl Into<String>, required_for: impl Into<String>) -> Self {
        Self::MissingTool {
            tool: tool.into(),
            required_for: required_for.into(),
        }
    }

    /// Get the hint shown under the error, if there is one
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            BuildError::UnsupportedEnvironment { .. } => Some(hints::supported_platforms()),
            BuildError::MissingEnvVar { var, .. } => match *var {
                "CEF_DIR" => Some(hints::cef_dir()),
                "DEPOT_TOOLS_DIR" => Some(hints::depot_tools_dir()),
                _ => None,
            },
            BuildError::MissingTool { tool, .. } => hints::tool(tool),
            BuildError::MissingTarget(_) => Some(hints::missing_target()),
            _ => None,
        }
    }
}

/// Print an error chain with its hint, if any
pub fn display_with_hints(err: &anyhow::Error) {
    use console::style;

    eprintln!("{} {:#}", style("Error:").red().bold(), err);

    let hint = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<BuildError>())
        .and_then(BuildError::hint);
    if let Some(h) = hint {
        eprintln!("\n{} {}", style("HINT:").yellow().bold(), h);
    }
}

/// Common error hints
pub mod hints {
    /// Hint for running on an unsupported host
    pub fn supported_platforms() -> &'static str {
        "Only x86_64 Linux and x86_64 Windows hosts are supported."
    }

    /// Hint for missing CEF_DIR
    pub fn cef_dir() -> &'static str {
        "Set CEF_DIR to an extracted CEF binary distribution, e.g.:\n\
         • export CEF_DIR=$HOME/cef_binary_3.3071_linux64\n\
         Or pass --cef-dir <path>."
    }

    /// Hint for missing DEPOT_TOOLS_DIR
    pub fn depot_tools_dir() -> &'static str {
        "Set DEPOT_TOOLS_DIR to a checkout of Chromium depot_tools (it provides cpplint.py).\n\
         Or pass --depot-tools-dir <path>."
    }

    /// Hint for running package before build
    pub fn missing_target() -> &'static str {
        "Run 'doogie-build build [debug|release]' first."
    }

    /// Installation hint for a tool, if one is known
    pub fn tool(tool: &str) -> Option<&'static str> {
        match tool {
            "qmake" | "qmake.exe" => Some(
                "Install Qt 5 and put its bin directory on the PATH, or set QMAKE to the qmake executable.",
            ),
            "chrpath" => Some(
                "Install chrpath with your package manager:\n\
                 • Ubuntu: sudo apt install chrpath\n\
                 • Fedora: sudo dnf install chrpath",
            ),
            "cmake" => Some("Install CMake from https://cmake.org/ or use your package manager."),
            "python" | "python2" => Some("Install Python 2.7; cpplint.py from depot_tools requires it."),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_message() {
        let err = BuildError::CommandFailed {
            program: "make".to_string(),
            code: Some(2),
        };
        assert_eq!(err.to_string(), "make exited with exit code 2");

        let err = BuildError::CommandFailed {
            program: "make".to_string(),
            code: None,
        };
        assert!(err.to_string().contains("signal"));
    }

    #[test]
    fn test_hints() {
        assert!(BuildError::missing_env("CEF_DIR", "build").hint().is_some());
        assert!(BuildError::missing_env("OTHER", "build").hint().is_none());
        assert!(BuildError::missing_tool("chrpath", "build").hint().is_some());
        assert!(BuildError::UnknownProfile("x".into()).hint().is_none());
    }

    #[test]
    fn test_hint_found_through_context() {
        let err = anyhow::Error::new(BuildError::missing_env("CEF_DIR", "build"))
            .context("Resource deployment failed");
        let typed = err.chain().find_map(|c| c.downcast_ref::<BuildError>());
        assert!(matches!(typed, Some(BuildError::MissingEnvVar { var: "CEF_DIR", .. })));
    }
}
