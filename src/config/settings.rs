//! User settings for ollama-backup
//!
//! Persists defaults for the backup directory, archive compression and
//! overwrite behavior. Command-line flags take precedence over these values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::BackupError;
use crate::storage::file_io::write_atomic;

/// Settings file name inside the config directory
pub const SETTINGS_FILE: &str = "settings.json";

/// User settings for ollama-backup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Where backup units are written and looked up
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,

    /// Package new backups as zip archives
    #[serde(default)]
    pub compress: bool,

    /// Replace existing store files on restore
    #[serde(default)]
    pub overwrite: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("./backup")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            backup_dir: default_backup_dir(),
            compress: false,
            overwrite: false,
        }
    }
}

impl Settings {
    /// Load settings from `config_dir`, or return defaults if no file exists
    pub fn load_or_create(config_dir: &Path) -> Result<Self, BackupError> {
        let settings_path = config_dir.join(SETTINGS_FILE);

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| BackupError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| BackupError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to `config_dir`
    pub fn save(&self, config_dir: &Path) -> Result<(), BackupError> {
        std::fs::create_dir_all(config_dir)
            .map_err(|e| BackupError::Io(format!("Failed to create config directory: {}", e)))?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| BackupError::Config(format!("Failed to serialize settings: {}", e)))?;

        write_atomic(config_dir.join(SETTINGS_FILE), contents.as_bytes())
    }
}
