//! Manifest layer addressing
//!
//! A manifest layer points at its content in one of two ways: an explicit
//! store-relative path (`from`) or a content digest (`digest`) naming a file
//! in the flat blobs directory. `from` wins when both are present.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::Manifest;

/// How a manifest layer addresses its content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerRef {
    /// Store-relative path from the layer's `from` field
    Path(String),
    /// `<algorithm>:<hex>` content identifier
    Digest(String),
    /// Neither field present; metadata-only layer
    Unresolvable,
}

/// Physical location of a layer's blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBlob {
    /// Where the blob lives in the store
    pub source: PathBuf,
    /// File name used inside a backup's `blobs/` directory
    pub file_name: String,
}

impl LayerRef {
    /// Classify one entry of a manifest's `layers` list
    pub fn from_value(layer: &Value) -> Self {
        if let Some(from) = layer.get("from").and_then(Value::as_str) {
            return Self::Path(from.to_string());
        }
        if let Some(digest) = layer.get("digest").and_then(Value::as_str) {
            return Self::Digest(digest.to_string());
        }
        Self::Unresolvable
    }

    /// Compute the blob's source path and backup file name
    ///
    /// Returns `None` when there is no physical file to resolve. Existence
    /// of the returned path is not checked.
    pub fn resolve(&self, store_root: &Path, blobs_root: &Path) -> Option<ResolvedBlob> {
        match self {
            Self::Path(from) => {
                // Always relative to the store, even when written as "/models/..."
                let source = store_root.join(from.trim_start_matches('/'));
                let file_name = source.file_name()?.to_string_lossy().into_owned();
                Some(ResolvedBlob { source, file_name })
            }
            Self::Digest(digest) => {
                let file_name = digest_file_name(digest);
                Some(ResolvedBlob {
                    source: blobs_root.join(&file_name),
                    file_name,
                })
            }
            Self::Unresolvable => None,
        }
    }
}

/// Blob file name for a digest: `sha256:abc` becomes `sha256-abc`
pub fn digest_file_name(digest: &str) -> String {
    digest.replacen(':', "-", 1)
}

/// All layer references of a manifest, in manifest order
///
/// Entries of `layers` that are not JSON objects are ignored.
pub fn manifest_layers(manifest: &Manifest) -> Vec<LayerRef> {
    manifest
        .get("layers")
        .and_then(Value::as_array)
        .map(|layers| {
            layers
                .iter()
                .filter(|layer| layer.is_object())
                .map(LayerRef::from_value)
                .collect()
        })
        .unwrap_or_default()
}
