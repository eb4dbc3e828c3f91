//! Zip packaging for backup units
//!
//! Directories are recorded as stored, zero-length entries whose names end in
//! `/`; files are deflated. Entry names always use forward slashes.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{BackupError, BackupResult};

/// Suffix of archived backup units
pub const ARCHIVE_EXTENSION: &str = ".zip";

/// Package `source_dir` into a zip archive at `target`
///
/// The root directory itself is not recorded. On failure any partially
/// written archive is removed and `source_dir` is left untouched.
pub fn zip_directory(source_dir: &Path, target: &Path) -> BackupResult<()> {
    let result = write_archive(source_dir, target);
    if result.is_err() {
        let _ = fs::remove_file(target);
    }
    result
}

fn write_archive(source_dir: &Path, target: &Path) -> BackupResult<()> {
    let file = File::create(target).map_err(|e| {
        BackupError::Archive(format!("Failed to create {}: {}", target.display(), e))
    })?;
    let mut writer = ZipWriter::new(BufWriter::new(file));

    let dir_options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let file_options =
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|e| BackupError::Archive(format!("Failed to relativize path: {}", e)))?;
        let name = entry_name(rel);

        if entry.file_type().is_dir() {
            writer.add_directory(format!("{}/", name), dir_options)?;
            continue;
        }

        let size = entry.metadata()?.len();
        // Model weights routinely exceed 4 GiB
        let options = file_options.large_file(size >= u64::from(u32::MAX));
        writer.start_file(name, options)?;

        let mut input = File::open(entry.path()).map_err(|e| {
            BackupError::Io(format!("Failed to open {}: {}", entry.path().display(), e))
        })?;
        io::copy(&mut input, &mut writer).map_err(|e| {
            BackupError::Archive(format!("Failed to add {}: {}", entry.path().display(), e))
        })?;
    }

    let mut inner = writer.finish()?;
    inner
        .flush()
        .map_err(|e| BackupError::Archive(format!("Failed to flush archive: {}", e)))?;

    tracing::info!(archive = %target.display(), "created zip archive");
    Ok(())
}

/// Forward-slash entry name for a relative path
fn entry_name(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Directory an archive extracts into: its path without the `.zip` suffix
pub fn extraction_dir(archive: &Path) -> PathBuf {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.strip_suffix(ARCHIVE_EXTENSION).unwrap_or(&name);
    archive.with_file_name(stem)
}

/// Extract `archive` next to itself and return the extracted directory
///
/// A directory left over from an earlier extraction is removed first, so the
/// result always mirrors the archive exactly.
pub fn extract_archive(archive: &Path) -> BackupResult<PathBuf> {
    let file = File::open(archive).map_err(|e| {
        BackupError::Archive(format!("Failed to open {}: {}", archive.display(), e))
    })?;
    let mut zip = ZipArchive::new(file)?;

    let dest = extraction_dir(archive);
    if dest.exists() {
        fs::remove_dir_all(&dest).map_err(|e| {
            BackupError::Io(format!(
                "Failed to remove existing directory {}: {}",
                dest.display(),
                e
            ))
        })?;
    }
    fs::create_dir_all(&dest)
        .map_err(|e| BackupError::Io(format!("Failed to create {}: {}", dest.display(), e)))?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let rel = entry.enclosed_name().map(|p| p.to_path_buf()).ok_or_else(|| {
            BackupError::Archive(format!("Unsafe entry name in archive: {}", entry.name()))
        })?;
        let path = dest.join(rel);

        if entry.is_dir() {
            fs::create_dir_all(&path).map_err(|e| {
                BackupError::Io(format!("Failed to create {}: {}", path.display(), e))
            })?;
            continue;
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                BackupError::Io(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let mut out = File::create(&path)
            .map_err(|e| BackupError::Io(format!("Failed to create {}: {}", path.display(), e)))?;
        io::copy(&mut entry, &mut out).map_err(|e| {
            BackupError::Archive(format!("Failed to extract {}: {}", path.display(), e))
        })?;
    }

    tracing::info!(directory = %dest.display(), "extracted backup archive");
    Ok(dest)
}
