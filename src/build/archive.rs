//! Archive creation for `package`
//!
//! A directory is written as a single-root archive: every regular file under
//! `dir` becomes an entry at `base(dir)/<relative path>` with `/` separators.
//!
//! ```text
//! doogie.tar.gz
//! └── doogie/
//!     ├── doogie
//!     ├── libcef.so
//!     ├── locales/en-US.pak
//!     └── platforms/libqxcb.so
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::utils::{paths, terminal};

/// Archive container format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// gzip-compressed tar with owner information stripped
    TarGz,
    /// Deflate-compressed zip
    Zip,
}

impl ArchiveFormat {
    /// File extension including the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::TarGz => ".tar.gz",
            ArchiveFormat::Zip => ".zip",
        }
    }
}

/// Write every regular file under `dir` into a new archive at `archive_path`
///
/// If anything fails, the partially written archive is removed before the
/// error is returned.
pub fn package_directory(dir: &Path, archive_path: &Path, format: ArchiveFormat) -> Result<()> {
    let spinner = terminal::create_spinner(&format!("Archiving {}", dir.display()));
    let result = match format {
        ArchiveFormat::TarGz => write_tar_gz(dir, archive_path, &spinner),
        ArchiveFormat::Zip => write_zip(dir, archive_path, &spinner),
    };
    spinner.finish_and_clear();

    if result.is_err() {
        let _ = std::fs::remove_file(archive_path);
    }
    result
}

/// Regular files under `dir` paired with their archive entry names
fn entries(dir: &Path) -> impl Iterator<Item = Result<(walkdir::DirEntry, String)>> + '_ {
    let root = paths::base_name(dir);
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => return Some(Err(anyhow::Error::new(e).context("Failed to read directory entry"))),
            };
            if !entry.file_type().is_file() {
                return None;
            }
            let name = entry
                .path()
                .strip_prefix(dir)
                .context("Failed to get relative path")
                .map(|relative| entry_name(&root, relative));
            Some(name.map(|name| (entry, name)))
        })
}

/// `root/relative` with forward slashes regardless of host
fn entry_name(root: &str, relative: &Path) -> String {
    let mut name = root.to_string();
    for component in relative.components() {
        name.push('/');
        name.push_str(&component.as_os_str().to_string_lossy());
    }
    name
}

fn write_tar_gz(dir: &Path, archive_path: &Path, spinner: &indicatif::ProgressBar) -> Result<()> {
    let file = File::create(archive_path)
        .with_context(|| format!("Failed to create archive: {}", archive_path.display()))?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for entry in entries(dir) {
        let (entry, name) = entry?;
        spinner.set_message(name.clone());

        let path = entry.path();
        let metadata = entry
            .metadata()
            .with_context(|| format!("Failed to read metadata: {}", path.display()))?;

        let mut header = tar::Header::new_gnu();
        header.set_metadata(&metadata);
        header.set_uid(0);
        header.set_gid(0);
        header
            .set_username("")
            .context("Failed to clear tar owner name")?;
        header
            .set_groupname("")
            .context("Failed to clear tar group name")?;

        let mut src = File::open(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?;
        builder
            .append_data(&mut header, &name, &mut src)
            .with_context(|| format!("Failed to write file to archive: {}", name))?;
    }

    // tar → gzip → file, in reverse order of acquisition
    let encoder = builder.into_inner().context("Failed to finish tar archive")?;
    let mut writer = encoder.finish().context("Failed to finish gzip stream")?;
    writer.flush().context("Failed to flush archive")?;
    Ok(())
}

fn write_zip(dir: &Path, archive_path: &Path, spinner: &indicatif::ProgressBar) -> Result<()> {
    let file = File::create(archive_path)
        .with_context(|| format!("Failed to create archive: {}", archive_path.display()))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in entries(dir) {
        let (entry, name) = entry?;
        spinner.set_message(name.clone());

        let path = entry.path();
        zip.start_file(name.as_str(), options)
            .with_context(|| format!("Failed to start file in archive: {}", name))?;
        let mut src = File::open(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?;
        io::copy(&mut src, &mut zip)
            .with_context(|| format!("Failed to write file to archive: {}", name))?;
    }

    let mut writer = zip.finish().context("Failed to finish ZIP archive")?;
    writer.flush().context("Failed to flush archive")?;
    Ok(())
}
