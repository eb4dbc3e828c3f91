//! Backup writer for ollama-backup
//!
//! Materializes one model version as a self-contained backup unit named
//! `{model}--{version}--backup-{token}`:
//!
//! ```text
//! {unit}/blobs/{file_name}
//! {unit}/library/manifests/{registry}/library/{model}/{version}
//! ```
//!
//! The unit can optionally be packaged as `{unit}.zip`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use walkdir::WalkDir;

use crate::config::paths::StorePaths;
use crate::error::{BackupError, BackupResult};
use crate::models::{manifest_layers, ModelSpec};
use crate::services::InventoryService;
use crate::storage::archive::{zip_directory, ARCHIVE_EXTENSION};
use crate::storage::file_io::{copy_file, copy_file_atomic};

const BACKUP_MARKER: &str = "--backup-";

/// Metadata about a backup unit found in a backup directory
#[derive(Debug, Clone, Serialize)]
pub struct BackupInfo {
    /// Directory or archive name
    pub filename: String,
    /// Full path to the unit
    pub path: PathBuf,
    pub model: String,
    pub version: String,
    /// Distinguishing token (UNIX seconds at creation)
    pub token: i64,
    /// Creation time derived from the token
    pub created_at: Option<DateTime<Utc>>,
    /// Size on disk in bytes
    pub size_bytes: u64,
    /// Whether this unit is a zip archive
    pub archived: bool,
}

impl BackupInfo {
    /// Display form of the backed-up model, `model:version`
    pub fn model_spec(&self) -> String {
        format!("{}:{}", self.model, self.version)
    }
}

/// Outcome of a successful backup
#[derive(Debug, Clone)]
pub struct BackupSummary {
    /// Backup unit directory, or the archive if one was created
    pub path: PathBuf,
    pub registry: String,
    pub model: String,
    pub version: String,
    /// Blob files copied into the unit
    pub blobs_copied: usize,
    /// Layers without `from` or `digest`
    pub layers_skipped: usize,
    pub archived: bool,
}

/// Creates backup units from a model store
pub struct BackupManager {
    paths: StorePaths,
    backup_dir: PathBuf,
}

impl BackupManager {
    /// Create a new BackupManager
    pub fn new(paths: StorePaths, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            paths,
            backup_dir: backup_dir.into(),
        }
    }

    /// Back up one model version
    ///
    /// The model and version are resolved before anything is written, so a
    /// failed lookup leaves the backup directory untouched. A failure midway
    /// leaves the partial unit in place for inspection.
    pub fn create_backup(&self, spec: &ModelSpec, compress: bool) -> BackupResult<BackupSummary> {
        let inventory = InventoryService::new(&self.paths).enumerate()?;
        let model = inventory
            .find_model(&spec.model)
            .ok_or_else(|| BackupError::model_not_found(&spec.model))?;
        let version = model.select_version(spec.version())?;

        if spec.version().is_none() {
            tracing::info!(model = %model.name, version = %version.name, "using only available version");
        }

        let unit = self.allocate_unit(&model.name, &version.name)?;
        tracing::info!(
            model = %model.name,
            version = %version.name,
            registry = %model.registry,
            manifest = %version.path.display(),
            unit = %unit.display(),
            "starting backup"
        );

        let blobs_dir = unit.join("blobs");
        fs::create_dir_all(&blobs_dir).map_err(|e| {
            BackupError::Io(format!("Failed to create blobs directory: {}", e))
        })?;

        let store_blobs = self.paths.blobs_dir();
        let mut blobs_copied = 0;
        let mut layers_skipped = 0;
        for layer in manifest_layers(&version.details) {
            let Some(blob) = layer.resolve(self.paths.base_dir(), &store_blobs) else {
                tracing::warn!(model = %model.name, "skipping layer: no 'from' or 'digest' field");
                layers_skipped += 1;
                continue;
            };

            copy_file(&blob.source, &blobs_dir.join(&blob.file_name))?;
            tracing::info!(blob = %blob.file_name, "copied blob");
            blobs_copied += 1;
        }

        let manifest_path = unit
            .join("library")
            .join("manifests")
            .join(&model.registry)
            .join("library")
            .join(&model.name)
            .join(&version.name);
        copy_file_atomic(&version.path, &manifest_path)?;
        tracing::info!(manifest = %manifest_path.display(), "saved manifest");

        let path = if compress {
            archive_unit(&unit)?
        } else {
            unit
        };

        Ok(BackupSummary {
            path,
            registry: model.registry.clone(),
            model: model.name.clone(),
            version: version.name.clone(),
            blobs_copied,
            layers_skipped,
            archived: compress,
        })
    }

    /// Pick a fresh unit directory and create it
    ///
    /// The token starts at the current time in seconds and is bumped while a
    /// unit directory or archive of that name already exists.
    fn allocate_unit(&self, model: &str, version: &str) -> BackupResult<PathBuf> {
        let mut token = Utc::now().timestamp();
        loop {
            let unit = self.backup_dir.join(unit_name(model, version, token));
            let archive = with_archive_suffix(&unit);
            if !unit.exists() && !archive.exists() {
                fs::create_dir_all(&unit).map_err(|e| {
                    BackupError::Io(format!(
                        "Failed to create backup directory {}: {}",
                        unit.display(),
                        e
                    ))
                })?;
                return Ok(unit);
            }
            token += 1;
        }
    }

    /// List all backup units, newest first
    pub fn list_backups(&self) -> BackupResult<Vec<BackupInfo>> {
        list_backups(&self.backup_dir)
    }
}

/// Zip a finished unit and remove the directory
///
/// The directory is only deleted once the archive is complete.
fn archive_unit(unit: &Path) -> BackupResult<PathBuf> {
    let archive = with_archive_suffix(unit);
    zip_directory(unit, &archive)?;

    fs::remove_dir_all(unit).map_err(|e| {
        BackupError::Io(format!(
            "Failed to delete backup directory {} after archiving: {}",
            unit.display(),
            e
        ))
    })?;
    tracing::info!(archive = %archive.display(), "removed backup directory after archiving");

    Ok(archive)
}

fn with_archive_suffix(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(ARCHIVE_EXTENSION);
    PathBuf::from(name)
}

/// Directory name of a backup unit
pub fn unit_name(model: &str, version: &str, token: i64) -> String {
    format!("{}--{}{}{}", model, version, BACKUP_MARKER, token)
}

/// Split a unit name into `(model, version, token, archived)`
pub fn parse_unit_name(name: &str) -> Option<(String, String, i64, bool)> {
    let (stem, archived) = match name.strip_suffix(ARCHIVE_EXTENSION) {
        Some(stem) => (stem, true),
        None => (name, false),
    };

    let (prefix, token) = stem.rsplit_once(BACKUP_MARKER)?;
    let token: i64 = token.parse().ok()?;
    let (model, version) = prefix.rsplit_once("--")?;
    if model.is_empty() || version.is_empty() {
        return None;
    }

    Some((model.to_string(), version.to_string(), token, archived))
}

/// List the backup units in `backup_dir`, newest first
///
/// A missing directory has no backups. Entries not following the naming
/// convention are ignored.
pub fn list_backups(backup_dir: &Path) -> BackupResult<Vec<BackupInfo>> {
    if !backup_dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(backup_dir)
        .map_err(|e| BackupError::Io(format!("Failed to read backup directory: {}", e)))?;

    let mut backups = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| BackupError::Io(format!("Failed to read directory entry: {}", e)))?;
        if let Some(info) = parse_backup_info(&entry.path()) {
            backups.push(info);
        }
    }

    // An archive supersedes the directory left behind by extracting it
    let archives: HashSet<String> = backups
        .iter()
        .filter(|b| b.archived)
        .map(|b| b.filename.clone())
        .collect();
    backups.retain(|b| {
        b.archived || !archives.contains(&format!("{}{}", b.filename, ARCHIVE_EXTENSION))
    });

    backups.sort_by(|a, b| {
        b.token
            .cmp(&a.token)
            .then_with(|| a.filename.cmp(&b.filename))
    });

    Ok(backups)
}

fn parse_backup_info(path: &Path) -> Option<BackupInfo> {
    let filename = path.file_name()?.to_string_lossy().into_owned();
    let (model, version, token, archived) = parse_unit_name(&filename)?;

    let metadata = fs::metadata(path).ok()?;
    // An archive must be a file and a plain unit a directory
    if archived != metadata.is_file() {
        return None;
    }

    let size_bytes = if archived {
        metadata.len()
    } else {
        directory_size(path)
    };

    Some(BackupInfo {
        filename,
        path: path.to_path_buf(),
        model,
        version,
        token,
        created_at: DateTime::from_timestamp(token, 0),
        size_bytes,
        archived,
    })
}

fn directory_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}
