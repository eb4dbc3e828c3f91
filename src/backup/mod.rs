//! Backup system for ollama-backup
//!
//! Copies one model version out of the store into a portable backup unit and
//! replays such units back into a store.
//!
//! # Architecture
//!
//! The backup system consists of two main components:
//!
//! - `BackupManager`: resolves `model[:version]`, writes backup units and
//!   lists the units of a backup directory
//! - `RestoreManager`: locates a unit (directory, archive, or by model name),
//!   checks for conflicts and copies it into the store
//!
//! # Backup Format
//!
//! ```text
//! {model}--{version}--backup-{token}/
//!     blobs/sha256-...
//!     library/manifests/{registry}/library/{model}/{version}
//! ```
//!
//! With compression the same tree is stored as `{unit}.zip`.
//!
//! # Example
//!
//! ```rust,ignore
//! use ollama_backup::backup::{BackupManager, RestoreManager};
//! use ollama_backup::config::StorePaths;
//! use ollama_backup::models::ModelSpec;
//!
//! let paths = StorePaths::new()?;
//! let manager = BackupManager::new(paths.clone(), "./backup");
//! let summary = manager.create_backup(&ModelSpec::parse("llama3:8b"), true)?;
//!
//! // Later, restore from backup
//! let restore_manager = RestoreManager::new(paths, "./backup");
//! let result = restore_manager.restore("llama3:8b", false)?;
//! println!("{}", result.summary());
//! ```

mod manager;
mod restore;

pub use manager::{
    list_backups, parse_unit_name, unit_name, BackupInfo, BackupManager, BackupSummary,
};
pub use restore::{validate_backup, RestoreManager, RestoreResult};
