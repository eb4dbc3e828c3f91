//! ollama-backup - back up and restore locally stored Ollama models
//!
//! This library enumerates the models of an Ollama store, copies a model
//! version with every blob its manifest references into a portable backup
//! unit, and restores such units into a store without clobbering existing
//! files unless asked to.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Store paths and user settings
//! - `error`: Custom error types
//! - `models`: Inventory records, manifest layers, model selectors
//! - `storage`: Manifest I/O, tree copies, zip archives
//! - `services`: Store inventory
//! - `backup`: Backup writer and restore engine
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use ollama_backup::config::StorePaths;
//! use ollama_backup::services::InventoryService;
//!
//! let paths = StorePaths::new()?;
//! let models = InventoryService::new(&paths).enumerate()?;
//! println!("{} models", models.model_count());
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::BackupError;
