//! Settings threaded through every pipeline step

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::error::BuildError;
use crate::platform::Platform;

/// Environment variable naming the extracted CEF binary distribution
pub const CEF_DIR_VAR: &str = "CEF_DIR";

/// Environment variable naming the Chromium depot_tools checkout
pub const DEPOT_TOOLS_DIR_VAR: &str = "DEPOT_TOOLS_DIR";

/// Environment variable overriding the qmake executable
pub const QMAKE_VAR: &str = "QMAKE";

/// Resolved configuration for one invocation
#[derive(Debug, Clone)]
pub struct Settings {
    /// Print debug output (copied files, command lines)
    pub verbose: bool,
    /// Directory holding doogie.pro; output directories are created here
    pub project_root: PathBuf,
    /// Host platform, validated at startup
    pub platform: Platform,
    /// CEF binary distribution directory
    pub cef_dir: Option<PathBuf>,
    /// depot_tools directory containing cpplint.py
    pub depot_tools_dir: Option<PathBuf>,
    /// Explicit qmake executable, otherwise looked up on PATH
    pub qmake: Option<PathBuf>,
}

impl Settings {
    /// Create settings with no optional locations configured
    pub fn new(project_root: PathBuf, platform: Platform, verbose: bool) -> Self {
        Self {
            verbose,
            project_root,
            platform,
            cef_dir: None,
            depot_tools_dir: None,
            qmake: None,
        }
    }

    /// Get CEF_DIR or fail naming the operation that needs it
    pub fn require_cef_dir(&self, required_for: &str) -> Result<&Path, BuildError> {
        non_empty(self.cef_dir.as_deref())
            .ok_or_else(|| BuildError::missing_env(CEF_DIR_VAR, required_for))
    }

    /// Get DEPOT_TOOLS_DIR or fail naming the operation that needs it
    pub fn require_depot_tools_dir(&self, required_for: &str) -> Result<&Path, BuildError> {
        non_empty(self.depot_tools_dir.as_deref())
            .ok_or_else(|| BuildError::missing_env(DEPOT_TOOLS_DIR_VAR, required_for))
    }

    /// Locate qmake, honouring the explicit override first
    pub fn qmake_path(&self) -> Result<PathBuf, BuildError> {
        if let Some(qmake) = non_empty(self.qmake.as_deref()) {
            return Ok(qmake.to_path_buf());
        }
        let name = self.platform.exe_name("qmake");
        which::which(&name).map_err(|_| BuildError::missing_tool(name, "generating Makefiles"))
    }
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}
