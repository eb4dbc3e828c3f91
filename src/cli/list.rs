//! List CLI command
//!
//! Prints the models found in the store.

use clap::{Args, ValueEnum};

use crate::config::paths::StorePaths;
use crate::display::{format_model_list, format_model_list_json};
use crate::error::BackupResult;
use crate::services::InventoryService;

/// Output formats for the model listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Arguments of `list`
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Show detailed information from the manifests
    #[arg(short, long)]
    pub details: bool,
}

/// Handle the list command
pub fn handle_list_command(paths: &StorePaths, args: ListArgs) -> BackupResult<()> {
    let list = InventoryService::new(paths).enumerate()?;

    match args.output {
        OutputFormat::Json => println!("{}", format_model_list_json(&list)?),
        OutputFormat::Text => print!("{}", format_model_list(&list, args.details)),
    }

    Ok(())
}
