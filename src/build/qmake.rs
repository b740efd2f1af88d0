//! qmake configuration and the native make step
//!
//! qmake turns `doogie.pro` into Makefiles at the project root; make (Linux)
//! or nmake (Windows) then compiles and links into the profile's output
//! directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::{BuildVariant, Profile, PROJECT_FILE};
use crate::exec::Invocation;
use crate::platform::Platform;

/// qmake invocation builder
#[derive(Debug, Clone)]
pub struct QMakeConfig {
    /// qmake executable
    qmake: PathBuf,
    /// Directory qmake runs in (the project root)
    project_root: PathBuf,
    /// Project file passed as the last argument
    project_file: String,
    /// CONFIG arguments, in order
    config: Vec<String>,
    /// Verbose output
    verbose: bool,
}

impl QMakeConfig {
    /// Create a configuration for `doogie.pro` in `project_root`
    pub fn new(qmake: PathBuf, project_root: PathBuf) -> Self {
        Self {
            qmake,
            project_root,
            project_file: PROJECT_FILE.to_string(),
            config: Vec::new(),
            verbose: false,
        }
    }

    /// Add the variant flag (if any) followed by the profile flags
    pub fn for_build(mut self, variant: BuildVariant, profile: Profile) -> Self {
        if let Some(flag) = variant.qmake_config() {
            self.config.push(flag.to_string());
        }
        self.config
            .extend(profile.qmake_config().iter().map(|s| s.to_string()));
        self
    }

    /// Enable verbose output
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// The qmake command line
    pub fn invocation(&self) -> Invocation {
        Invocation::new(&self.qmake)
            .args(&self.config)
            .arg(&self.project_file)
            .current_dir(&self.project_root)
    }

    /// Run qmake
    pub fn configure(&self) -> Result<()> {
        self.invocation()
            .run(self.verbose)
            .context("qmake failed")?;
        Ok(())
    }
}

/// The make command line for a platform
///
/// nmake builds the profile's target explicitly; GNU make uses the default
/// target qmake generated for the selected CONFIG.
pub fn make_invocation(platform: Platform, profile: Profile, project_root: &Path) -> Invocation {
    let invocation = match platform {
        Platform::Linux => Invocation::new("make"),
        Platform::Windows => Invocation::new("nmake.exe").args([profile.dir_name(), "/NOLOGO"]),
    };
    invocation.current_dir(project_root)
}

/// Run make for the active platform
pub fn make(platform: Platform, profile: Profile, project_root: &Path, verbose: bool) -> Result<()> {
    make_invocation(platform, profile, project_root)
        .run(verbose)
        .context("make failed")?;
    Ok(())
}
