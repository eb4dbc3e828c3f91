//! Configuration module for ollama-backup
//!
//! This module provides configuration management including:
//! - Model store path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::StorePaths;
pub use settings::Settings;
