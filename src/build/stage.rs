//! Copy-if-absent file staging
//!
//! Staging never overwrites: a destination that already exists is left
//! untouched, which keeps repeated builds incremental.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::error::BuildError;
use crate::utils::terminal;

/// Result of a single staging operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// The file was copied to the destination
    Copied,
    /// The destination already existed
    Skipped,
    /// The source was optional and missing
    Missing,
}

/// One file to stage into a destination directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// File to copy
    pub source: PathBuf,
    /// Directory receiving `basename(source)`
    pub dest_dir: PathBuf,
    /// Permission bits for the new file; the source's bits when `None`
    pub mode: Option<u32>,
    /// Skip instead of failing when the source does not exist
    pub optional: bool,
}

impl StagedFile {
    pub fn new(source: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            dest_dir: dest_dir.into(),
            mode: None,
            optional: false,
        }
    }

    pub fn with_mode(mut self, mode: Option<u32>) -> Self {
        self.mode = mode;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Full destination path
    pub fn dest_path(&self) -> PathBuf {
        match self.source.file_name() {
            Some(name) => self.dest_dir.join(name),
            None => self.dest_dir.clone(),
        }
    }

    /// Stage this file
    pub fn stage(&self, verbose: bool) -> Result<StageOutcome, BuildError> {
        if self.optional && !self.source.exists() && !self.dest_path().exists() {
            terminal::debug(
                verbose,
                &format!("Skipping optional {} (not found)", self.source.display()),
            );
            return Ok(StageOutcome::Missing);
        }
        copy_if_absent(&self.source, &self.dest_path(), self.mode, verbose)
    }
}

/// Copy `src` to `dest` unless `dest` already exists
///
/// The new file gets `mode` when given, otherwise the source's permission
/// bits. A destination left incomplete by a failed copy is removed.
pub fn copy_if_absent(
    src: &Path,
    dest: &Path,
    mode: Option<u32>,
    verbose: bool,
) -> Result<StageOutcome, BuildError> {
    if dest.exists() {
        terminal::debug(
            verbose,
            &format!("Skipping {} (already exists)", dest.display()),
        );
        return Ok(StageOutcome::Skipped);
    }
    terminal::debug(
        verbose,
        &format!("Copying {} to {}", src.display(), dest.display()),
    );

    let input = File::open(src).map_err(|e| BuildError::io(src, e))?;
    let permissions = input
        .metadata()
        .map_err(|e| BuildError::io(src, e))?
        .permissions();

    let output = create_with_mode(dest, mode, &permissions).map_err(|e| BuildError::io(dest, e))?;

    // A truncated destination would be skipped by every later run
    if let Err(err) = copy_contents(input, output, src, dest) {
        let _ = fs::remove_file(dest);
        return Err(err);
    }

    // create_with_mode is subject to the umask
    apply_mode(dest, mode, permissions)?;

    Ok(StageOutcome::Copied)
}

fn copy_contents(input: File, output: File, src: &Path, dest: &Path) -> Result<(), BuildError> {
    let mut reader = BufReader::new(input);
    let mut writer = BufWriter::new(output);
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(BuildError::io(src, e)),
        };
        writer
            .write_all(&buf[..n])
            .map_err(|e| BuildError::io(dest, e))?;
    }
    writer.flush().map_err(|e| BuildError::io(dest, e))
}

/// Stage `src` into `dest_dir` under its own file name
pub fn stage(
    src: &Path,
    dest_dir: &Path,
    mode: Option<u32>,
    verbose: bool,
) -> Result<StageOutcome, BuildError> {
    StagedFile::new(src, dest_dir).with_mode(mode).stage(verbose)
}

/// Stage every file directly inside `src_dir` into `dest_dir`
///
/// Not recursive: subdirectories of `src_dir` are skipped. The destination
/// directory and every staged file get the permission bits of their source.
pub fn stage_dir(src_dir: &Path, dest_dir: &Path, verbose: bool) -> Result<(), BuildError> {
    let src_meta = fs::metadata(src_dir).map_err(|e| BuildError::io(src_dir, e))?;
    if !dest_dir.is_dir() {
        fs::create_dir_all(dest_dir).map_err(|e| BuildError::io(dest_dir, e))?;
        fs::set_permissions(dest_dir, src_meta.permissions())
            .map_err(|e| BuildError::io(dest_dir, e))?;
    }

    let entries = fs::read_dir(src_dir).map_err(|e| BuildError::io(src_dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| BuildError::io(src_dir, e))?;
        let meta = entry.metadata().map_err(|e| BuildError::io(entry.path(), e))?;
        if !meta.is_file() {
            continue;
        }
        let dest = dest_dir.join(entry.file_name());
        copy_if_absent(&entry.path(), &dest, None, verbose)?;
        fs::set_permissions(&dest, meta.permissions()).map_err(|e| BuildError::io(&dest, e))?;
    }
    Ok(())
}

#[cfg(unix)]
fn create_with_mode(dest: &Path, mode: Option<u32>, source: &fs::Permissions) -> io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(mode.unwrap_or_else(|| source.mode()))
        .open(dest)
}

#[cfg(not(unix))]
fn create_with_mode(dest: &Path, _mode: Option<u32>, _source: &fs::Permissions) -> io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(dest)
}

#[cfg(unix)]
fn apply_mode(dest: &Path, mode: Option<u32>, source: fs::Permissions) -> Result<(), BuildError> {
    use std::os::unix::fs::PermissionsExt;

    let permissions = match mode {
        Some(mode) => fs::Permissions::from_mode(mode),
        None => source,
    };
    fs::set_permissions(dest, permissions).map_err(|e| BuildError::io(dest, e))
}

#[cfg(not(unix))]
fn apply_mode(dest: &Path, _mode: Option<u32>, source: fs::Permissions) -> Result<(), BuildError> {
    fs::set_permissions(dest, source).map_err(|e| BuildError::io(dest, e))
}
