//! Service layer for ollama-backup
//!
//! The service layer reads the model store and turns its directory tree into
//! inventory records for the backup and listing commands.

pub mod inventory;

pub use inventory::{enumerate_models, InventoryService};
