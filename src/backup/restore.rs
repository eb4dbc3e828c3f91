//! Backup restoration for ollama-backup
//!
//! Replays a backup unit into the model store. Blobs are copied before
//! manifests so a manifest never appears in the store while the blobs it
//! references are still missing.

use std::path::{Path, PathBuf};

use crate::config::paths::StorePaths;
use crate::error::{BackupError, BackupResult};
use crate::models::ModelSpec;
use crate::storage::archive::{extract_archive, ARCHIVE_EXTENSION};
use crate::storage::file_io::{copy_tree, find_conflicts};

use super::manager::{list_backups, BackupInfo};

/// Handles restoring backup units into a store
pub struct RestoreManager {
    paths: StorePaths,
    backup_dir: PathBuf,
}

impl RestoreManager {
    /// Create a new RestoreManager
    pub fn new(paths: StorePaths, backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            paths,
            backup_dir: backup_dir.into(),
        }
    }

    /// Restore a backup unit into the store
    ///
    /// `target` is one of:
    /// - an archive name ending in `.zip`, extracted next to itself first
    /// - the name of a unit directory inside the backup directory
    /// - `model` or `model:version`, matched against unit names; the newest
    ///   matching unit wins
    ///
    /// Without `overwrite`, the restore fails with [`BackupError::Conflict`]
    /// before copying anything if any destination file already exists.
    pub fn restore(&self, target: &str, overwrite: bool) -> BackupResult<RestoreResult> {
        let source = self.locate_source(target)?;
        validate_backup(&source)?;

        let source_blobs = source.join("blobs");
        let source_manifests = source.join("library").join("manifests");
        let store_blobs = self.paths.blobs_dir();
        let store_manifests = self.paths.manifests_dir();

        if !overwrite {
            let mut conflicts = find_conflicts(&source_blobs, &store_blobs)?;
            conflicts.extend(find_conflicts(&source_manifests, &store_manifests)?);

            if !conflicts.is_empty() {
                for path in &conflicts {
                    tracing::warn!(file = %path.display(), "file already exists");
                }
                return Err(BackupError::Conflict { paths: conflicts });
            }
        }

        self.paths.ensure_directories()?;

        let blobs_restored = copy_tree(&source_blobs, &store_blobs, overwrite)?;
        tracing::info!(count = blobs_restored, "copied blob files");

        let manifests_restored = copy_tree(&source_manifests, &store_manifests, overwrite)?;
        tracing::info!(count = manifests_restored, "copied manifest files");

        Ok(RestoreResult {
            source,
            blobs_restored,
            manifests_restored,
        })
    }

    /// Resolve `target` to an extracted unit directory
    pub fn locate_source(&self, target: &str) -> BackupResult<PathBuf> {
        if target.ends_with(ARCHIVE_EXTENSION) {
            let archive = self.backup_dir.join(target);
            if !archive.is_file() {
                return Err(BackupError::backup_not_found(archive.display().to_string()));
            }
            return extract_archive(&archive);
        }

        let direct = self.backup_dir.join(target);
        if direct.is_dir() {
            return Ok(direct);
        }

        let unit = self.find_unit(&ModelSpec::parse(target))?;
        if unit.archived {
            extract_archive(&unit.path)
        } else {
            Ok(unit.path)
        }
    }

    /// Newest backup unit of a model (and version, if given)
    fn find_unit(&self, spec: &ModelSpec) -> BackupResult<BackupInfo> {
        let matches: Vec<BackupInfo> = list_backups(&self.backup_dir)?
            .into_iter()
            .filter(|b| b.model == spec.model)
            .filter(|b| spec.version().map_or(true, |v| b.version == v))
            .collect();

        let Some(newest) = matches.first() else {
            return Err(BackupError::backup_not_found(spec.to_string()));
        };

        if spec.version().is_none() {
            let mut versions: Vec<String> = matches.iter().map(|b| b.version.clone()).collect();
            versions.sort();
            versions.dedup();
            if versions.len() > 1 {
                return Err(BackupError::Ambiguous {
                    model: spec.model.clone(),
                    versions,
                });
            }
        }

        tracing::info!(unit = %newest.filename, "selected backup unit");
        Ok(newest.clone())
    }
}

/// Check that `source` is a unit directory with `blobs/` and `library/manifests/`
pub fn validate_backup(source: &Path) -> BackupResult<()> {
    if !source.is_dir() {
        return Err(BackupError::InvalidBackup(format!(
            "backup source is not a directory: {}",
            source.display()
        )));
    }

    for required in ["blobs", "library"] {
        let dir = source.join(required);
        if !dir.is_dir() {
            return Err(BackupError::InvalidBackup(format!(
                "{} directory missing in backup: {}",
                required,
                dir.display()
            )));
        }
    }

    let manifests = source.join("library").join("manifests");
    if !manifests.is_dir() {
        return Err(BackupError::InvalidBackup(format!(
            "manifests directory missing in backup: {}",
            manifests.display()
        )));
    }

    Ok(())
}

/// Result of a restore operation
#[derive(Debug)]
pub struct RestoreResult {
    /// Unit directory the files were copied from
    pub source: PathBuf,
    /// Number of blob files copied
    pub blobs_restored: usize,
    /// Number of manifest files copied
    pub manifests_restored: usize,
}

impl RestoreResult {
    /// Get a summary of what was restored
    pub fn summary(&self) -> String {
        format!(
            "Restored {} blob(s) and {} manifest(s) from {}",
            self.blobs_restored,
            self.manifests_restored,
            self.source.display()
        )
    }
}
