//! Build orchestration
//!
//! ## Architecture
//!
//! ```text
//! commands/ → build/pipeline.rs → qmake.rs / deploy.rs → stage.rs, exec/
//!                               → archive.rs (package)
//! ```
//!
//! ## Modules
//!
//! - `pipeline` - clean, build, run, package, unit-test and benchmark steps
//! - `qmake` - Makefile generation and the native make driver
//! - `deploy` - runtime resource manifests and their staging
//! - `platforms` - per-platform manifest contents
//! - `stage` - copy-if-absent file staging
//! - `archive` - tar.gz and zip packaging
//! - `cef` - CEF wrapper library build
//! - `lint` - cpplint invocation and diagnostic filtering

pub mod archive;
pub mod cef;
pub mod deploy;
pub mod lint;
pub mod pipeline;
pub mod platforms;
pub mod qmake;
pub mod stage;

use std::path::PathBuf;
use std::str::FromStr;

use crate::config::Settings;
use crate::error::BuildError;
use crate::platform::Platform;

/// Base name of the application binary
pub const APP_NAME: &str = "doogie";

/// qmake project file at the project root
pub const PROJECT_FILE: &str = "doogie.pro";

/// Build profile selecting output directory and compiler configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Debug,
    Release,
}

impl Profile {
    /// Every profile, in the order `clean` removes them
    pub const ALL: [Profile; 2] = [Profile::Debug, Profile::Release];

    /// Output directory name under the project root
    pub fn dir_name(&self) -> &'static str {
        match self {
            Profile::Debug => "debug",
            Profile::Release => "release",
        }
    }

    /// Subdirectory of CEF_DIR holding binaries for this profile
    pub fn cef_subdir(&self) -> &'static str {
        match self {
            Profile::Debug => "Debug",
            Profile::Release => "Release",
        }
    }

    /// qmake CONFIG arguments for this profile
    pub fn qmake_config(&self) -> &'static [&'static str] {
        match self {
            Profile::Debug => &["CONFIG+=debug"],
            Profile::Release => &["CONFIG+=release", "CONFIG-=debug"],
        }
    }

    pub fn is_debug(&self) -> bool {
        matches!(self, Profile::Debug)
    }
}

impl FromStr for Profile {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Profile::Debug),
            "release" => Ok(Profile::Release),
            other => Err(BuildError::UnknownProfile(other.to_string())),
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// What the qmake project is configured to produce
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildVariant {
    /// The browser itself
    #[default]
    App,
    /// Qt Test unit tests
    UnitTest,
    /// Benchmarks
    Benchmark,
}

impl BuildVariant {
    /// Extra qmake arguments placed before the profile flags
    pub fn qmake_config(&self) -> Option<&'static str> {
        match self {
            BuildVariant::App => None,
            BuildVariant::UnitTest => Some("CONFIG+=test"),
            BuildVariant::Benchmark => Some("CONFIG+=benchmark"),
        }
    }

    /// Base name of the produced binary
    pub fn binary_base_name(&self) -> &'static str {
        match self {
            BuildVariant::App => APP_NAME,
            BuildVariant::UnitTest => "doogie-test",
            BuildVariant::Benchmark => "doogie-benchmark",
        }
    }
}

/// Settings plus the profile selected for this invocation
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub settings: Settings,
    pub profile: Profile,
}

impl BuildContext {
    pub fn new(settings: Settings, profile: Profile) -> Self {
        Self { settings, profile }
    }

    /// Output directory for the active profile (`debug/` or `release/`)
    pub fn target_dir(&self) -> PathBuf {
        self.settings.project_root.join(self.profile.dir_name())
    }

    /// Path of the binary a variant produces
    pub fn binary_path(&self, variant: BuildVariant) -> PathBuf {
        self.target_dir()
            .join(self.platform().exe_name(variant.binary_base_name()))
    }

    pub fn platform(&self) -> Platform {
        self.settings.platform
    }

    pub fn verbose(&self) -> bool {
        self.settings.verbose
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_from_str() {
        assert_eq!("debug".parse::<Profile>().unwrap(), Profile::Debug);
        assert_eq!("release".parse::<Profile>().unwrap(), Profile::Release);
        assert!(matches!(
            "Release".parse::<Profile>(),
            Err(BuildError::UnknownProfile(_))
        ));
    }

    #[test]
    fn test_profile_qmake_config() {
        assert_eq!(Profile::Debug.qmake_config(), &["CONFIG+=debug"]);
        assert_eq!(
            Profile::Release.qmake_config(),
            &["CONFIG+=release", "CONFIG-=debug"]
        );
    }

    #[test]
    fn test_binary_path() {
        let settings = Settings::new(PathBuf::from("/src/doogie"), Platform::Windows, false);
        let ctx = BuildContext::new(settings, Profile::Release);
        assert_eq!(
            ctx.binary_path(BuildVariant::UnitTest),
            PathBuf::from("/src/doogie/release/doogie-test.exe")
        );
    }
}
