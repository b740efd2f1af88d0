//! Runtime resource deployment
//!
//! After make finishes, the Qt libraries, Qt plugins and CEF runtime files the
//! binary loads at startup are staged next to it. What gets staged is a
//! [`DeployManifest`] built by the platform modules; this module only
//! executes it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::platforms;
use super::stage::StagedFile;
use super::{BuildContext, Profile};
use crate::error::BuildError;
use crate::exec::{find_program, Invocation};
use crate::utils::{paths, terminal};

/// Directories resources are staged from
#[derive(Debug, Clone)]
pub struct ResourceLocations {
    /// Project root (crash_reporter.cfg lives here)
    pub project_root: PathBuf,
    /// Directory containing the qmake executable
    pub qt_bin_dir: PathBuf,
    /// CEF binary distribution
    pub cef_dir: PathBuf,
}

impl ResourceLocations {
    /// Resolve locations from the qmake path and CEF_DIR
    pub fn new(project_root: &Path, qmake: &Path, cef_dir: &Path) -> Self {
        let qt_bin_dir = qmake
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            project_root: project_root.to_path_buf(),
            qt_bin_dir,
            cef_dir: cef_dir.to_path_buf(),
        }
    }

    /// Qt shared libraries (Linux)
    pub fn qt_lib_dir(&self) -> PathBuf {
        self.qt_bin_dir.join("..").join("lib")
    }

    /// Qt plugin directory for one category, e.g. `platforms`
    pub fn qt_plugin_dir(&self, category: &str) -> PathBuf {
        self.qt_bin_dir.join("..").join("plugins").join(category)
    }

    /// CEF binaries for a profile (`CEF_DIR/Debug` or `CEF_DIR/Release`)
    pub fn cef_bin_dir(&self, profile: Profile) -> PathBuf {
        self.cef_dir.join(profile.cef_subdir())
    }

    /// CEF resource paks and ICU data
    pub fn cef_resources_dir(&self) -> PathBuf {
        self.cef_dir.join("Resources")
    }

    /// CEF locale paks
    pub fn cef_locales_dir(&self) -> PathBuf {
        self.cef_resources_dir().join("locales")
    }
}

/// Qt plugins of one category staged into `<target>/<category>/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginGroup {
    /// Category subdirectory, e.g. `imageformats`
    pub category: &'static str,
    /// Qt plugin directory the files come from
    pub source_dir: PathBuf,
    /// Subdirectory of the target receiving them
    pub dest_dir: PathBuf,
}

/// Everything one platform/profile combination stages
#[derive(Debug, Clone, Default)]
pub struct DeployManifest {
    /// Directories to create before staging
    pub dirs: Vec<PathBuf>,
    /// Plugin categories whose source directory must exist
    pub plugin_groups: Vec<PluginGroup>,
    /// Files to stage, in order
    pub files: Vec<StagedFile>,
    /// Plugin whose rpath is rewritten to `$ORIGIN/..` when newly staged
    pub rpath_fixup: Option<PathBuf>,
}

impl DeployManifest {
    /// Add `names` from `src_dir` into `dest_dir`
    pub fn add_files<S: AsRef<str>>(
        &mut self,
        src_dir: &Path,
        dest_dir: &Path,
        names: &[S],
        mode: Option<u32>,
    ) {
        for name in names {
            self.files
                .push(StagedFile::new(src_dir.join(name.as_ref()), dest_dir).with_mode(mode));
        }
    }

    /// Add plugin files of one category
    pub fn add_plugins<S: AsRef<str>>(
        &mut self,
        locations: &ResourceLocations,
        target_dir: &Path,
        category: &'static str,
        file_names: &[S],
        mode: Option<u32>,
    ) {
        let group = PluginGroup {
            category,
            source_dir: locations.qt_plugin_dir(category),
            dest_dir: target_dir.join(category),
        };
        self.add_files(&group.source_dir, &group.dest_dir, file_names, mode);
        self.plugin_groups.push(group);
    }

    /// Destination paths of every staged file
    #[cfg(test)]
    pub fn dest_paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(StagedFile::dest_path).collect()
    }

    /// Stage everything in the manifest
    pub fn apply(&self, verbose: bool) -> Result<()> {
        for dir in &self.dirs {
            paths::ensure_dir(dir)?;
        }
        for group in &self.plugin_groups {
            if !group.source_dir.is_dir() {
                return Err(BuildError::io(
                    &group.source_dir,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "Qt plugins dir not found"),
                ))
                .with_context(|| format!("Unable to find Qt plugins dir {}", group.category));
            }
            paths::ensure_dir(&group.dest_dir)?;
        }

        let had_fixup_target = self.rpath_fixup.as_deref().map_or(true, Path::exists);

        for file in &self.files {
            file.stage(verbose)?;
        }

        // Only a freshly staged plugin still carries Qt's build-time rpath
        if let Some(plugin) = &self.rpath_fixup {
            if !had_fixup_target && plugin.exists() {
                Invocation::new("chrpath")
                    .args(["-r", "$ORIGIN/.."])
                    .arg(plugin)
                    .run(verbose)
                    .context("Unable to run chrpath")?;
            }
        }
        Ok(())
    }
}

/// Resolve what `build` will deploy, before anything is compiled
///
/// Fails when CEF_DIR is unset or when the manifest needs chrpath and it is
/// not on PATH.
pub fn plan_deployment(ctx: &BuildContext, qmake: &Path) -> Result<DeployManifest> {
    let cef_dir = ctx.settings.require_cef_dir("deploying CEF resources")?;
    let locations = ResourceLocations::new(&ctx.settings.project_root, qmake, cef_dir);
    let manifest = platforms::manifest(ctx.platform(), ctx.profile, &locations, &ctx.target_dir());

    if manifest.rpath_fixup.is_some() {
        find_program("chrpath", "fixing the xcb plugin rpath")?;
    }
    Ok(manifest)
}

/// Stage a planned manifest into the output directory
pub fn deploy_resources(ctx: &BuildContext, manifest: &DeployManifest) -> Result<()> {
    terminal::print_step(&format!(
        "Deploying {} runtime files to {}",
        manifest.files.len(),
        ctx.target_dir().display()
    ));
    manifest.apply(ctx.verbose())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_locations() {
        let locations = ResourceLocations::new(
            Path::new("/src/doogie"),
            Path::new("/opt/Qt/5.9/gcc_64/bin/qmake"),
            Path::new("/opt/cef"),
        );
        assert_eq!(locations.qt_bin_dir, PathBuf::from("/opt/Qt/5.9/gcc_64/bin"));
        assert_eq!(
            locations.qt_plugin_dir("platforms"),
            PathBuf::from("/opt/Qt/5.9/gcc_64/bin/../plugins/platforms")
        );
        assert_eq!(
            locations.cef_bin_dir(Profile::Release),
            PathBuf::from("/opt/cef/Release")
        );
        assert_eq!(
            locations.cef_locales_dir(),
            PathBuf::from("/opt/cef/Resources/locales")
        );
    }

    #[test]
    fn test_apply_missing_plugin_dir() {
        let temp_dir = TempDir::new().unwrap();
        let locations = ResourceLocations::new(
            temp_dir.path(),
            &temp_dir.path().join("qt/bin/qmake"),
            &temp_dir.path().join("cef"),
        );
        let mut manifest = DeployManifest::default();
        manifest.add_plugins(&locations, &temp_dir.path().join("debug"), "sqldrivers", &["libqsqlite.so"], None);

        let err = manifest.apply(false).unwrap_err();
        assert!(format!("{:#}", err).contains("Unable to find Qt plugins dir sqldrivers"));
    }

    #[test]
    fn test_apply_stages_files_and_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let locations = ResourceLocations::new(
            temp_dir.path(),
            &temp_dir.path().join("qt/bin/qmake"),
            &temp_dir.path().join("cef"),
        );
        let plugin_dir = locations.qt_plugin_dir("imageformats");
        fs::create_dir_all(&plugin_dir).unwrap();
        fs::write(plugin_dir.join("libqgif.so"), b"gif").unwrap();
        fs::create_dir_all(locations.cef_locales_dir()).unwrap();
        fs::write(locations.cef_locales_dir().join("en-US.pak"), b"pak").unwrap();

        let target = temp_dir.path().join("debug");
        let mut manifest = DeployManifest::default();
        manifest.dirs.push(target.join("locales"));
        manifest.add_plugins(&locations, &target, "imageformats", &["libqgif.so"], None);
        manifest.add_files(&locations.cef_locales_dir(), &target.join("locales"), &["en-US.pak"], None);

        manifest.apply(false).unwrap();
        assert_eq!(fs::read(target.join("imageformats/libqgif.so")).unwrap(), b"gif");
        assert_eq!(fs::read(target.join("locales/en-US.pak")).unwrap(), b"pak");
    }

    #[test]
    fn test_rpath_fixup_runs_on_fresh_plugin() {
        let temp_dir = TempDir::new().unwrap();
        let locations = ResourceLocations::new(
            temp_dir.path(),
            &temp_dir.path().join("qt/bin/qmake"),
            &temp_dir.path().join("cef"),
        );
        let plugin_dir = locations.qt_plugin_dir("platforms");
        fs::create_dir_all(&plugin_dir).unwrap();
        fs::write(plugin_dir.join("libqxcb.so"), b"not an elf").unwrap();

        let target = temp_dir.path().join("debug");
        let mut manifest = DeployManifest::default();
        manifest.add_plugins(&locations, &target, "platforms", &["libqxcb.so"], None);
        manifest.rpath_fixup = Some(target.join("platforms/libqxcb.so"));

        // chrpath is either missing or rejects the fake plugin; both show it ran
        let err = manifest.apply(false).unwrap_err();
        let chrpath_error = err.chain().find_map(|cause| match cause.downcast_ref::<BuildError>() {
            Some(BuildError::CommandLaunch { program, .. })
            | Some(BuildError::CommandFailed { program, .. }) => Some(program.clone()),
            _ => None,
        });
        assert_eq!(chrpath_error.as_deref(), Some("chrpath"));
        assert!(target.join("platforms/libqxcb.so").is_file());
    }

    #[test]
    fn test_plan_requires_cef_dir() {
        let temp_dir = TempDir::new().unwrap();
        let settings = crate::config::Settings::new(
            temp_dir.path().to_path_buf(),
            crate::platform::Platform::Windows,
            false,
        );
        let ctx = BuildContext::new(settings, Profile::Release);
        let err = plan_deployment(&ctx, Path::new("qmake.exe")).unwrap_err();
        assert!(format!("{:#}", err).contains("CEF_DIR"));
    }

    #[test]
    fn test_rpath_fixup_skipped_when_already_present() {
        let temp_dir = TempDir::new().unwrap();
        let plugin = temp_dir.path().join("debug/platforms/libqxcb.so");
        fs::create_dir_all(plugin.parent().unwrap()).unwrap();
        fs::write(&plugin, b"xcb").unwrap();

        // chrpath is never invoked, so this passes without it installed
        let manifest = DeployManifest {
            rpath_fixup: Some(plugin),
            ..Default::default()
        };
        manifest.apply(false).unwrap();
    }
}
