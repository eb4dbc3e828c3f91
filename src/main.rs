use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ollama_backup::cli::{
    handle_backup_command, handle_backups_command, handle_list_command, handle_restore_command,
    BackupArgs, BackupsArgs, ListArgs, RestoreArgs,
};
use ollama_backup::config::paths::{self, StorePaths, STORE_DIR_ENV};
use ollama_backup::config::settings::{Settings, SETTINGS_FILE};

/// Environment variable holding the log filter
const LOG_ENV: &str = "OLLAMA_BACKUP_LOG";

#[derive(Parser)]
#[command(
    name = "ollama-backup",
    version,
    about = "Back up and restore locally stored Ollama models",
    long_about = "ollama-backup lists the models in an Ollama store \
                  (~/.ollama/models/manifests/{registry}/library/{model}/{version}), \
                  copies a model version with all of its blobs into a portable backup \
                  directory or zip archive, and restores such backups into a store."
)]
struct Cli {
    /// Ollama directory to read models from and restore into
    #[arg(long, global = true, env = STORE_DIR_ENV, alias = "ollama-dir")]
    store_dir: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all available models
    #[command(alias = "ls")]
    List(ListArgs),

    /// Back up a model version
    Backup(BackupArgs),

    /// Restore a model from a backup
    Restore(RestoreArgs),

    /// List the backups in a backup directory
    Backups(BackupsArgs),

    /// Show current configuration and paths
    Config {
        /// Write the current settings to the settings file
        #[arg(long)]
        save: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Initialize paths and settings
    let store = match cli.store_dir {
        Some(dir) => StorePaths::with_base_dir(dir),
        None => StorePaths::new()?,
    };
    let config_dir = paths::config_dir()?;
    let settings = Settings::load_or_create(&config_dir)?;

    match cli.command {
        Some(Commands::List(args)) => handle_list_command(&store, args)?,
        Some(Commands::Backup(args)) => handle_backup_command(&store, &settings, args)?,
        Some(Commands::Restore(args)) => handle_restore_command(&store, &settings, args)?,
        Some(Commands::Backups(args)) => handle_backups_command(&settings, args)?,
        Some(Commands::Config { save }) => {
            println!("ollama-backup Configuration");
            println!("===========================");
            println!("Store directory:     {}", store.base_dir().display());
            println!("Manifests directory: {}", store.manifests_dir().display());
            println!("Blobs directory:     {}", store.blobs_dir().display());
            println!("Settings file:       {}", config_dir.join(SETTINGS_FILE).display());
            println!();
            println!("Settings:");
            println!("  Backup directory: {}", settings.backup_dir.display());
            println!("  Compress backups: {}", settings.compress);
            println!("  Overwrite on restore: {}", settings.overwrite);

            if save {
                settings.save(&config_dir)?;
                println!();
                println!("Settings saved.");
            }
        }
        None => {
            println!("ollama-backup - back up and restore Ollama models");
            println!();
            println!("Run 'ollama-backup --help' for usage information.");
        }
    }

    Ok(())
}
