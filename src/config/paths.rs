//! Path management for ollama-backup
//!
//! Resolves the location of the Ollama model store and of this tool's own
//! configuration directory.
//!
//! ## Store Resolution Order
//!
//! 1. `OLLAMA_BACKUP_STORE_DIR` environment variable (if set)
//! 2. `OLLAMA_HOME` environment variable (if set)
//! 3. `~/.ollama` in the current user's home directory
//!
//! ## Config Resolution Order
//!
//! 1. `OLLAMA_BACKUP_CONFIG_DIR` environment variable (if set)
//! 2. The platform config directory (`~/.config/ollama-backup` on Linux)

use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};

use crate::error::BackupError;

/// Environment variable overriding the store root
pub const STORE_DIR_ENV: &str = "OLLAMA_BACKUP_STORE_DIR";

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "OLLAMA_BACKUP_CONFIG_DIR";

/// Locations inside an Ollama model store
#[derive(Debug, Clone)]
pub struct StorePaths {
    /// Store root (`~/.ollama` or equivalent)
    base_dir: PathBuf,
}

impl StorePaths {
    /// Resolve the store root from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if no override is set and the home directory cannot
    /// be determined.
    pub fn new() -> Result<Self, BackupError> {
        let custom = std::env::var_os(STORE_DIR_ENV).or_else(|| std::env::var_os("OLLAMA_HOME"));

        let base_dir = match custom {
            Some(custom) => PathBuf::from(custom),
            None => BaseDirs::new()
                .map(|dirs| dirs.home_dir().join(".ollama"))
                .ok_or_else(|| BackupError::Config("Could not determine home directory".into()))?,
        };

        Ok(Self { base_dir })
    }

    /// Create StorePaths rooted at an explicit directory
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Get the store root
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// `{root}/models`
    pub fn models_dir(&self) -> PathBuf {
        self.base_dir.join("models")
    }

    /// `{root}/models/manifests`
    pub fn manifests_dir(&self) -> PathBuf {
        self.models_dir().join("manifests")
    }

    /// `{root}/models/blobs`
    pub fn blobs_dir(&self) -> PathBuf {
        self.models_dir().join("blobs")
    }

    /// Manifest file of one model version
    pub fn manifest_file(&self, registry: &str, model: &str, version: &str) -> PathBuf {
        self.manifests_dir()
            .join(registry)
            .join("library")
            .join(model)
            .join(version)
    }

    /// Create the blobs and manifests directories if missing
    pub fn ensure_directories(&self) -> Result<(), BackupError> {
        std::fs::create_dir_all(self.blobs_dir())
            .map_err(|e| BackupError::Io(format!("Failed to create blobs directory: {}", e)))?;

        std::fs::create_dir_all(self.manifests_dir()).map_err(|e| {
            BackupError::Io(format!("Failed to create manifests directory: {}", e))
        })?;

        Ok(())
    }
}

/// Resolve the directory holding `settings.json`
pub fn config_dir() -> Result<PathBuf, BackupError> {
    if let Some(custom) = std::env::var_os(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(custom));
    }

    ProjectDirs::from("", "", "ollama-backup")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| BackupError::Config("Could not determine config directory".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = StorePaths::with_base_dir(temp_dir.path());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.manifests_dir(), temp_dir.path().join("models/manifests"));
        assert_eq!(paths.blobs_dir(), temp_dir.path().join("models/blobs"));
    }

    #[test]
    fn test_manifest_file() {
        let paths = StorePaths::with_base_dir("/store");
        assert_eq!(
            paths.manifest_file("registry.ollama.ai", "llama3", "8b"),
            PathBuf::from("/store/models/manifests/registry.ollama.ai/library/llama3/8b")
        );
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = StorePaths::with_base_dir(temp_dir.path());

        paths.ensure_directories().unwrap();

        assert!(paths.blobs_dir().is_dir());
        assert!(paths.manifests_dir().is_dir());
    }
}
