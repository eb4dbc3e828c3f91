//! Custom error types for ollama-backup
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for ollama-backup operations
#[derive(Error, Debug)]
pub enum BackupError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Zip archive errors
    #[error("Archive error: {0}")]
    Archive(String),

    /// A required directory of the model store does not exist
    #[error("Directory does not exist: {}", .0.display())]
    DirectoryMissing(PathBuf),

    /// Entity not found errors (model, version, backup)
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// A version must be chosen explicitly
    #[error(
        "Multiple versions found for model '{model}'; specify one of: {}",
        .versions.join(", ")
    )]
    Ambiguous { model: String, versions: Vec<String> },

    /// Backup source lacks a required subdirectory
    #[error("Invalid backup structure: {0}")]
    InvalidBackup(String),

    /// Destination files already exist and overwrite was not requested
    #[error(
        "{} file(s) already exist in the destination (first: {}); use --overwrite to replace them",
        .paths.len(),
        .paths.first().map(|p| p.display().to_string()).unwrap_or_default()
    )]
    Conflict { paths: Vec<PathBuf> },
}

impl BackupError {
    /// Create a "not found" error for models
    pub fn model_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Model",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for model versions
    pub fn version_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Version",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for backups
    pub fn backup_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::DirectoryMissing(_))
    }

    /// Check if this is a destination conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Check if the caller has to pick a version explicitly
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Ambiguous { .. })
    }
}

impl From<std::io::Error> for BackupError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BackupError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<zip::result::ZipError> for BackupError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

impl From<walkdir::Error> for BackupError {
    fn from(err: walkdir::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type alias for ollama-backup operations
pub type BackupResult<T> = Result<T, BackupError>;
