//! Inventory records for the model store
//!
//! Registries own models, models own versions. A version carries its parsed
//! manifest together with size statistics folded over the manifest's layers.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use super::layer::manifest_layers;
use super::Manifest;
use crate::error::{BackupError, BackupResult};

/// Aggregate statistics over the blobs a manifest references
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BlobStats {
    /// Number of layers whose blob file exists
    pub count: usize,
    /// Combined size of those blob files in bytes
    pub size: u64,
}

impl BlobStats {
    /// Resolve every layer and sum the sizes of the blobs that exist
    ///
    /// Missing blobs and unresolvable layers are left out of the totals.
    pub fn collect(manifest: &Manifest, store_root: &Path, blobs_root: &Path) -> Self {
        manifest_layers(manifest)
            .iter()
            .filter_map(|layer| layer.resolve(store_root, blobs_root))
            .filter_map(|blob| std::fs::metadata(&blob.source).ok())
            .filter(|meta| meta.is_file())
            .fold(Self::default(), |stats, meta| Self {
                count: stats.count + 1,
                size: stats.size + meta.len(),
            })
    }
}

/// One version (tag) of a model, backed by a manifest file
#[derive(Debug, Clone, Serialize)]
pub struct ModelVersion {
    /// Manifest file name, e.g. "latest" or "8b"
    pub name: String,
    /// Full path to the manifest file
    pub path: PathBuf,
    /// Best-effort content digest; empty when the manifest has none
    pub digest: String,
    /// Size of the manifest file only
    pub size: u64,
    /// Manifest plus all resolved blobs
    pub total_size: u64,
    /// Size of resolved blob files only
    pub blobs_size: u64,
    /// Number of resolved blob files
    pub blobs_count: usize,
    /// Parsed manifest document
    pub details: Manifest,
}

impl ModelVersion {
    /// Build a version record from an already parsed manifest
    pub fn new(
        name: impl Into<String>,
        path: PathBuf,
        size: u64,
        details: Manifest,
        blobs: BlobStats,
    ) -> Self {
        Self {
            name: name.into(),
            path,
            digest: extract_digest(&details).unwrap_or_default(),
            size,
            total_size: size + blobs.size,
            blobs_size: blobs.size,
            blobs_count: blobs.count,
            details,
        }
    }

    /// A string field of the manifest, e.g. "family" or "license"
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(Value::as_str)
    }
}

/// A model directory with at least one parseable version
#[derive(Debug, Clone, Serialize)]
pub struct Model {
    pub name: String,
    /// Name of the owning registry
    pub registry: String,
    pub path: PathBuf,
    pub versions: Vec<ModelVersion>,
}

impl Model {
    /// Names of all versions, in inventory order
    pub fn version_names(&self) -> Vec<String> {
        self.versions.iter().map(|v| v.name.clone()).collect()
    }

    /// Pick the version to operate on
    ///
    /// With an explicit version the name must match exactly. Without one, a
    /// single version is chosen automatically; several versions are ambiguous.
    pub fn select_version(&self, version: Option<&str>) -> BackupResult<&ModelVersion> {
        match version {
            Some(wanted) => self
                .versions
                .iter()
                .find(|v| v.name == wanted)
                .ok_or_else(|| BackupError::version_not_found(format!("{}:{}", self.name, wanted))),
            None => match self.versions.as_slice() {
                [] => Err(BackupError::version_not_found(&self.name)),
                [only] => Ok(only),
                _ => Err(BackupError::Ambiguous {
                    model: self.name.clone(),
                    versions: self.version_names(),
                }),
            },
        }
    }
}

/// A registry directory (e.g. "registry.ollama.ai") holding models
#[derive(Debug, Clone, Serialize)]
pub struct Registry {
    pub name: String,
    pub path: PathBuf,
    pub models: Vec<Model>,
}

/// Everything found in a model store
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModelList {
    pub registries: Vec<Registry>,
}

impl ModelList {
    /// Find a model by name; the first registry holding it wins
    pub fn find_model(&self, name: &str) -> Option<&Model> {
        self.registries
            .iter()
            .flat_map(|r| r.models.iter())
            .find(|m| m.name == name)
    }

    pub fn registry_count(&self) -> usize {
        self.registries.len()
    }

    pub fn model_count(&self) -> usize {
        self.registries.iter().map(|r| r.models.len()).sum()
    }

    pub fn version_count(&self) -> usize {
        self.registries
            .iter()
            .flat_map(|r| r.models.iter())
            .map(|m| m.versions.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.registries.is_empty()
    }
}

/// Extract a manifest's digest
///
/// Precedence: top-level `digest`, then `config.digest`, then the first
/// layer's `digest`.
pub fn extract_digest(manifest: &Manifest) -> Option<String> {
    let top_level = manifest.get("digest").and_then(Value::as_str);
    let config = || {
        manifest
            .get("config")
            .and_then(|c| c.get("digest"))
            .and_then(Value::as_str)
    };
    let first_layer = || {
        manifest
            .get("layers")
            .and_then(Value::as_array)
            .and_then(|layers| layers.first())
            .and_then(|l| l.get("digest"))
            .and_then(Value::as_str)
    };

    top_level
        .or_else(config)
        .or_else(first_layer)
        .map(str::to_string)
}
