//! Backup CLI commands
//!
//! Implements `backup`, `restore` and `backups`.

use std::path::PathBuf;

use clap::Args;

use crate::backup::{BackupManager, RestoreManager};
use crate::config::paths::StorePaths;
use crate::config::settings::Settings;
use crate::display::format_backup_list;
use crate::error::BackupResult;
use crate::models::ModelSpec;

/// Arguments of `backup`
#[derive(Debug, Args)]
pub struct BackupArgs {
    /// Model to back up, as `model` or `model:version`
    pub model: String,

    /// Directory to save the backup in
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Create a zip file of the backup and delete the original directory
    #[arg(short, long)]
    pub zip: bool,
}

/// Arguments of `restore`
#[derive(Debug, Args)]
pub struct RestoreArgs {
    /// Backup to restore: `model[:version]`, a unit directory name, or a `.zip` file name
    pub backup: String,

    /// Directory to restore from
    #[arg(short = 'd', long)]
    pub backup_dir: Option<PathBuf>,

    /// Overwrite existing files during restore
    #[arg(short, long)]
    pub overwrite: bool,
}

/// Arguments of `backups`
#[derive(Debug, Args)]
pub struct BackupsArgs {
    /// Backup directory to inspect
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Also print the full path of each backup
    #[arg(short, long)]
    pub paths: bool,
}

/// Handle the backup command
pub fn handle_backup_command(
    paths: &StorePaths,
    settings: &Settings,
    args: BackupArgs,
) -> BackupResult<()> {
    let backup_dir = args.dir.unwrap_or_else(|| settings.backup_dir.clone());
    let compress = args.zip || settings.compress;

    let manager = BackupManager::new(paths.clone(), &backup_dir);
    let summary = manager.create_backup(&ModelSpec::parse(&args.model), compress)?;

    println!(
        "Found model: {}, version: {}, registry: {}",
        summary.model, summary.version, summary.registry
    );
    println!("Copied {} blob(s)", summary.blobs_copied);
    if summary.layers_skipped > 0 {
        println!(
            "Skipped {} layer(s) without 'from' or 'digest'",
            summary.layers_skipped
        );
    }
    if summary.archived {
        println!("Backup zipped to '{}'", summary.path.display());
    }
    println!(
        "Model '{}:{}' backed up successfully to '{}'",
        summary.model,
        summary.version,
        summary.path.display()
    );

    Ok(())
}

/// Handle the restore command
pub fn handle_restore_command(
    paths: &StorePaths,
    settings: &Settings,
    args: RestoreArgs,
) -> BackupResult<()> {
    let backup_dir = args.backup_dir.unwrap_or_else(|| settings.backup_dir.clone());
    let overwrite = args.overwrite || settings.overwrite;

    let manager = RestoreManager::new(paths.clone(), &backup_dir);
    let result = manager.restore(&args.backup, overwrite)?;

    println!("{}", result.summary());
    println!(
        "Model '{}' restored successfully into '{}'",
        args.backup,
        paths.base_dir().display()
    );

    Ok(())
}

/// Handle the backups command
pub fn handle_backups_command(settings: &Settings, args: BackupsArgs) -> BackupResult<()> {
    let backup_dir = args.dir.unwrap_or_else(|| settings.backup_dir.clone());
    let backups = crate::backup::list_backups(&backup_dir)?;

    println!("Backups in {}", backup_dir.display());
    println!();
    print!("{}", format_backup_list(&backups, args.paths));

    Ok(())
}
