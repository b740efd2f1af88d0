//! Path utilities

use std::path::Path;

use anyhow::Result;

use crate::error::BuildError;

/// Ensure a directory exists, creating parents as needed
pub fn ensure_dir(path: &Path) -> Result<(), BuildError> {
    if !path.is_dir() {
        std::fs::create_dir_all(path).map_err(|e| BuildError::io(path, e))?;
    }
    Ok(())
}

/// Remove a directory tree; a path that does not exist is not an error
pub fn remove_dir_if_exists(path: &Path) -> Result<bool, BuildError> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(BuildError::io(path, e)),
    }
}

/// Final path component as a string, for messages and archive roots
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
