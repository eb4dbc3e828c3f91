//! File I/O utilities for manifests and blob trees
//!
//! Provides manifest parsing, atomic writes, and overwrite-aware
//! recursive copies between directory trees.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{BackupError, BackupResult};
use crate::models::Manifest;

/// Read and parse a manifest file
///
/// Fails if the file is unreadable or is not a JSON object.
pub fn read_manifest<P: AsRef<Path>>(path: P) -> BackupResult<Manifest> {
    let path = path.as_ref();

    let file = File::open(path)
        .map_err(|e| BackupError::Io(format!("Failed to open {}: {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map_err(|e| BackupError::Json(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write bytes to a file atomically (write to temp, then rename)
///
/// The file is either completely written or not modified at all.
pub fn write_atomic<P: AsRef<Path>>(path: P, data: &[u8]) -> BackupResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            BackupError::Io(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Manifest names like "3.1" have no real extension, so append instead of
    // using with_extension.
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let file = File::create(&temp_path)
        .map_err(|e| BackupError::Io(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    writer
        .write_all(data)
        .map_err(|e| BackupError::Io(format!("Failed to write data: {}", e)))?;

    writer
        .flush()
        .map_err(|e| BackupError::Io(format!("Failed to flush data: {}", e)))?;

    writer
        .get_ref()
        .sync_all()
        .map_err(|e| BackupError::Io(format!("Failed to sync data: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        BackupError::Io(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

/// Copy a file's exact bytes to `dst` atomically
///
/// Used for manifests, which must survive a backup byte-for-byte.
pub fn copy_file_atomic(src: &Path, dst: &Path) -> BackupResult<()> {
    let data = fs::read(src)
        .map_err(|e| BackupError::Io(format!("Failed to read {}: {}", src.display(), e)))?;
    write_atomic(dst, &data)
}

/// Copy one file, creating the destination's parent directories
///
/// Returns the number of bytes copied.
pub fn copy_file(src: &Path, dst: &Path) -> BackupResult<u64> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            BackupError::Io(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    fs::copy(src, dst).map_err(|e| {
        BackupError::Io(format!(
            "Failed to copy {} to {}: {}",
            src.display(),
            dst.display(),
            e
        ))
    })
}

/// Whether anything exists at `path`; errors other than "not found" propagate
pub fn path_exists(path: &Path) -> BackupResult<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(BackupError::Io(format!(
            "Failed to check {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Relative paths of all regular files below `root`, sorted
pub fn relative_files(root: &Path) -> BackupResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| BackupError::Io(format!("Failed to relativize path: {}", e)))?;
        files.push(rel.to_path_buf());
    }

    Ok(files)
}

/// Destination paths under `dst` that would be overwritten by copying `src`
pub fn find_conflicts(src: &Path, dst: &Path) -> BackupResult<Vec<PathBuf>> {
    let mut conflicts = Vec::new();

    for rel in relative_files(src)? {
        let target = dst.join(&rel);
        if path_exists(&target)? {
            conflicts.push(target);
        }
    }

    Ok(conflicts)
}

/// Recursively copy the files of `src` into `dst`
///
/// Without `overwrite`, an existing destination file stops the copy with
/// [`BackupError::Conflict`]. Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path, overwrite: bool) -> BackupResult<usize> {
    let files = relative_files(src)?;

    for rel in &files {
        let target = dst.join(rel);

        // The store may have changed since the pre-flight check.
        if !overwrite && path_exists(&target)? {
            return Err(BackupError::Conflict {
                paths: vec![target],
            });
        }

        copy_file(&src.join(rel), &target)?;
        tracing::debug!(file = %target.display(), "copied");
    }

    Ok(files.len())
}
