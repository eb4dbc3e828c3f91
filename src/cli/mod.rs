//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the backup and inventory layers.

pub mod backup;
pub mod list;

pub use backup::{
    handle_backup_command, handle_backups_command, handle_restore_command, BackupArgs,
    BackupsArgs, RestoreArgs,
};
pub use list::{handle_list_command, ListArgs, OutputFormat};
