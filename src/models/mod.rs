//! Core data models for ollama-backup
//!
//! This module contains the data structures describing a model store:
//! registries, models, versions, manifest layers, and model selectors.

pub mod inventory;
pub mod layer;
pub mod spec;

pub use inventory::{extract_digest, BlobStats, Model, ModelList, ModelVersion, Registry};
pub use layer::{digest_file_name, manifest_layers, LayerRef, ResolvedBlob};
pub use spec::ModelSpec;

/// A parsed manifest document
pub type Manifest = serde_json::Map<String, serde_json::Value>;
