//! Build pipeline operations
//!
//! Each operation is a fixed sequence of steps. The first failing step ends
//! the operation; nothing is retried.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::archive::package_directory;
use super::deploy::{deploy_resources, plan_deployment};
use super::qmake::{self, QMakeConfig};
use super::stage::{stage, stage_dir};
use super::{BuildContext, BuildVariant, Profile, APP_NAME};
use crate::error::BuildError;
use crate::exec::Invocation;
use crate::utils::{paths, terminal};

/// Extensions of build intermediates left out of packages
pub const PACKAGE_EXCLUDED_EXTENSIONS: &[&str] = &["cpp", "h", "obj", "res", "manifest", "log", "o"];

/// Output subdirectories copied into packages when present
pub const PACKAGE_SUBDIRS: &[&str] = &["imageformats", "locales", "platforms", "sqldrivers", "styles"];

/// Runs pipeline operations for one build context
#[derive(Debug)]
pub struct Pipeline {
    ctx: BuildContext,
}

impl Pipeline {
    pub fn new(ctx: BuildContext) -> Self {
        Self { ctx }
    }

    /// Remove the debug and release output directories
    pub fn clean(&self) -> Result<()> {
        for profile in Profile::ALL {
            let dir = self.ctx.settings.project_root.join(profile.dir_name());
            if paths::remove_dir_if_exists(&dir)? {
                terminal::debug(self.ctx.verbose(), &format!("Removed {}", dir.display()));
            }
        }
        Ok(())
    }

    /// Generate Makefiles, compile, fix permissions and deploy resources
    ///
    /// Returns the path of the produced binary.
    pub fn build(&self, variant: BuildVariant) -> Result<PathBuf> {
        let ctx = &self.ctx;
        let verbose = ctx.verbose();
        let qmake = ctx.settings.qmake_path()?;
        let manifest = plan_deployment(ctx, &qmake)?;
        let target_dir = ctx.target_dir();
        paths::ensure_dir(&target_dir)?;

        terminal::print_step(&format!("Configuring {} build", ctx.profile));
        QMakeConfig::new(qmake.clone(), ctx.settings.project_root.clone())
            .for_build(variant, ctx.profile)
            .verbose(verbose)
            .configure()?;

        terminal::print_step("Compiling");
        qmake::make(ctx.platform(), ctx.profile, &ctx.settings.project_root, verbose)?;

        let binary = ctx.binary_path(variant);
        set_executable(&binary)?;

        deploy_resources(ctx, &manifest).context("Resource deployment failed")?;

        terminal::print_success(&format!("Built {}", binary.display()));
        Ok(binary)
    }

    /// Remove output directories, then build
    pub fn rebuild(&self) -> Result<PathBuf> {
        self.clean()?;
        self.build(BuildVariant::App)
    }

    /// Build, then launch the browser with `args`
    pub fn run(&self, args: &[String]) -> Result<()> {
        let binary = self.build(BuildVariant::App)?;
        self.launch(&binary, args)
    }

    /// Remove output directories, then run
    pub fn rerun(&self, args: &[String]) -> Result<()> {
        self.clean()?;
        self.run(args)
    }

    /// Build and run the unit tests
    pub fn unit_test(&self) -> Result<()> {
        let binary = self.build(BuildVariant::UnitTest)?;
        self.launch(&binary, &[])
    }

    /// Build and run the benchmarks
    pub fn benchmark(&self) -> Result<()> {
        let binary = self.build(BuildVariant::Benchmark)?;
        self.launch(&binary, &[])
    }

    fn launch(&self, binary: &Path, args: &[String]) -> Result<()> {
        terminal::print_step(&format!("Running {}", binary.display()));
        Invocation::new(binary)
            .args(args)
            .run(self.ctx.verbose())
            .with_context(|| format!("{} failed", paths::base_name(binary)))?;
        Ok(())
    }

    /// Archive the deployable contents of the output directory
    ///
    /// Returns the path of the created archive.
    pub fn package(&self) -> Result<PathBuf> {
        let ctx = &self.ctx;
        let verbose = ctx.verbose();
        let target_dir = ctx.target_dir();
        if !target_dir.is_dir() {
            return Err(BuildError::MissingTarget(target_dir).into());
        }

        let package_dir = target_dir.join("package");
        let deploy_dir = package_dir.join(APP_NAME);
        paths::ensure_dir(&deploy_dir)?;

        terminal::print_step(&format!("Collecting files into {}", deploy_dir.display()));
        for file in packaged_files(&target_dir)? {
            stage(&file, &deploy_dir, None, verbose)?;
        }
        for subdir in PACKAGE_SUBDIRS {
            let src_dir = target_dir.join(subdir);
            if src_dir.is_dir() {
                stage_dir(&src_dir, &deploy_dir.join(subdir), verbose)
                    .with_context(|| format!("Unable to copy {}", subdir))?;
            }
        }

        let format = ctx.platform().archive_format();
        let archive_path = package_dir.join(format!("{}{}", APP_NAME, format.extension()));
        terminal::print_step(&format!("Creating {}", archive_path.display()));
        package_directory(&deploy_dir, &archive_path, format)?;

        paths::remove_dir_if_exists(&deploy_dir)?;
        terminal::print_success(&format!("Packaged {}", archive_path.display()));
        Ok(archive_path)
    }
}

/// Top-level files of the output directory that belong in a package
pub fn packaged_files(target_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let entries = fs::read_dir(target_dir).map_err(|e| BuildError::io(target_dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| BuildError::io(target_dir, e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| BuildError::io(entry.path(), e))?;
        if file_type.is_dir() {
            continue;
        }
        let path = entry.path();
        let excluded = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| PACKAGE_EXCLUDED_EXTENSIONS.contains(&ext));
        if !excluded {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(unix)]
fn set_executable(binary: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(binary, fs::Permissions::from_mode(0o755))
        .map_err(|e| BuildError::io(binary, e))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_executable(_binary: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::platform::Platform;
    use tempfile::TempDir;

    fn pipeline(root: &Path, profile: Profile) -> Pipeline {
        let settings = Settings::new(root.to_path_buf(), Platform::Linux, false);
        Pipeline::new(BuildContext::new(settings, profile))
    }

    fn write(path: &Path, content: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_clean_without_outputs() {
        let temp_dir = TempDir::new().unwrap();
        pipeline(temp_dir.path(), Profile::Debug).clean().unwrap();
    }

    #[test]
    fn test_clean_removes_both_profiles() {
        let temp_dir = TempDir::new().unwrap();
        write(&temp_dir.path().join("debug/doogie"), b"d");
        write(&temp_dir.path().join("release/locales/en-US.pak"), b"r");
        write(&temp_dir.path().join("doogie.pro"), b"TEMPLATE = app");

        pipeline(temp_dir.path(), Profile::Release).clean().unwrap();
        assert!(!temp_dir.path().join("debug").exists());
        assert!(!temp_dir.path().join("release").exists());
        assert!(temp_dir.path().join("doogie.pro").exists());
    }

    #[test]
    fn test_build_without_cef_dir_does_no_work() {
        let temp_dir = TempDir::new().unwrap();
        let mut settings = Settings::new(temp_dir.path().to_path_buf(), Platform::Linux, false);
        // Launching this would fail with CommandLaunch, not MissingEnvVar
        settings.qmake = Some(temp_dir.path().join("qt/bin/qmake"));
        let pipeline = Pipeline::new(BuildContext::new(settings, Profile::Debug));

        let err = pipeline.build(BuildVariant::App).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::MissingEnvVar { var: "CEF_DIR", .. })
        ));
        assert!(!temp_dir.path().join("debug").exists());
    }

    #[test]
    fn test_package_requires_build() {
        let temp_dir = TempDir::new().unwrap();
        let err = pipeline(temp_dir.path(), Profile::Debug).package().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::MissingTarget(_))
        ));
        assert!(!temp_dir.path().join("debug").exists());
    }

    #[test]
    fn test_packaged_files_excludes_intermediates() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("release");
        for name in ["doogie", "libcef.so", "main.o", "moc_main_window.cpp", "build.log", "cef.pak"] {
            write(&target.join(name), b"x");
        }
        write(&target.join("locales/en-US.pak"), b"x");

        let names: Vec<String> = packaged_files(&target)
            .unwrap()
            .iter()
            .map(|p| paths::base_name(p))
            .collect();
        assert_eq!(names, vec!["cef.pak", "doogie", "libcef.so"]);
    }

    #[test]
    fn test_package_creates_tar_gz() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("release");
        write(&target.join("doogie"), b"binary");
        write(&target.join("main.o"), b"object");
        write(&target.join("locales/en-US.pak"), b"locale");
        write(&target.join("platforms/libqxcb.so"), b"plugin");

        let archive = pipeline(temp_dir.path(), Profile::Release).package().unwrap();
        assert_eq!(archive, target.join("package/doogie.tar.gz"));
        assert!(archive.is_file());
        assert!(!target.join("package/doogie").exists());

        let file = fs::File::open(&archive).unwrap();
        let mut tar = tar::Archive::new(flate2::read::GzDecoder::new(file));
        let mut names: Vec<String> = tar
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "doogie/doogie",
                "doogie/locales/en-US.pak",
                "doogie/platforms/libqxcb.so"
            ]
        );
    }
}
