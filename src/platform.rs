//! Host platform detection
//!
//! The tool only supports two host families, both on x86_64. The platform is
//! detected once at startup and passed down to every step that needs to
//! branch on it (manifests, make driver, archive format, executable names).

use anyhow::Result;

use crate::build::archive::ArchiveFormat;
use crate::error::BuildError;

/// Supported host platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Windows,
}

impl Platform {
    /// Detect the platform this binary was compiled for
    pub fn current() -> Result<Self> {
        Ok(Self::from_host(std::env::consts::OS, std::env::consts::ARCH)?)
    }

    /// Validate an (OS, architecture) pair
    pub fn from_host(os: &str, arch: &str) -> Result<Self, BuildError> {
        let platform = match os {
            "linux" => Platform::Linux,
            "windows" => Platform::Windows,
            _ => return Err(unsupported(os, arch)),
        };
        if arch != "x86_64" {
            return Err(unsupported(os, arch));
        }
        Ok(platform)
    }

    /// Executable file name for a base name
    pub fn exe_name(&self, base: &str) -> String {
        match self {
            Platform::Linux => base.to_string(),
            Platform::Windows => format!("{}.exe", base),
        }
    }

    /// Archive format used by `package`
    pub fn archive_format(&self) -> ArchiveFormat {
        match self {
            Platform::Linux => ArchiveFormat::TarGz,
            Platform::Windows => ArchiveFormat::Zip,
        }
    }

    /// Python interpreter able to run cpplint.py
    ///
    /// `python` may be either major version on Linux distros, so python2 is
    /// named explicitly there.
    pub fn python(&self) -> &'static str {
        match self {
            Platform::Linux => "python2",
            Platform::Windows => "python",
        }
    }
}

fn unsupported(os: &str, arch: &str) -> BuildError {
    BuildError::UnsupportedEnvironment {
        os: os.to_string(),
        arch: arch.to_string(),
    }
}
