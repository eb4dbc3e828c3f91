//! Model store inventory
//!
//! Walks `models/manifests/{registry}/library/{model}/{version}`, parses each
//! manifest and folds blob statistics over its layers. The scan is
//! best-effort: unreadable or corrupt manifests are skipped, while failures
//! to read the registry and model directories abort the whole call.

use std::fs::{self, DirEntry};
use std::path::{Path, PathBuf};

use crate::config::paths::StorePaths;
use crate::error::{BackupError, BackupResult};
use crate::models::{BlobStats, Model, ModelList, ModelVersion, Registry};
use crate::storage::file_io::read_manifest;

/// Service enumerating the models of a store
pub struct InventoryService<'a> {
    paths: &'a StorePaths,
}

impl<'a> InventoryService<'a> {
    /// Create a new inventory service
    pub fn new(paths: &'a StorePaths) -> Self {
        Self { paths }
    }

    /// Enumerate all registries, models and versions
    ///
    /// Models without a parseable version and registries without models are
    /// left out of the result.
    pub fn enumerate(&self) -> BackupResult<ModelList> {
        let manifests_dir = self.paths.manifests_dir();
        if !manifests_dir.is_dir() {
            return Err(BackupError::DirectoryMissing(manifests_dir));
        }

        let mut registries = Vec::new();
        for entry in sorted_entries(&manifests_dir)? {
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(registry) = self.scan_registry(&entry)? {
                registries.push(registry);
            }
        }

        Ok(ModelList { registries })
    }

    fn scan_registry(&self, entry: &DirEntry) -> BackupResult<Option<Registry>> {
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();

        let library = path.join("library");
        if !library.is_dir() {
            tracing::debug!(registry = %name, "no library directory, skipping");
            return Ok(None);
        }

        let mut models = Vec::new();
        for model_entry in sorted_entries(&library)? {
            if !model_entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(model) = self.scan_model(&name, &model_entry)? {
                models.push(model);
            }
        }

        if models.is_empty() {
            return Ok(None);
        }
        Ok(Some(Registry { name, path, models }))
    }

    fn scan_model(&self, registry: &str, entry: &DirEntry) -> BackupResult<Option<Model>> {
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();

        let mut versions = Vec::new();
        for version_entry in sorted_entries(&path)? {
            if version_entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(version) = self.load_version(&version_entry.path()) {
                versions.push(version);
            }
        }

        if versions.is_empty() {
            return Ok(None);
        }
        Ok(Some(Model {
            name,
            registry: registry.to_string(),
            path,
            versions,
        }))
    }

    /// Parse one manifest file; `None` if it cannot be read or parsed
    fn load_version(&self, path: &Path) -> Option<ModelVersion> {
        let name = path.file_name()?.to_string_lossy().into_owned();

        let manifest = match read_manifest(path) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!(manifest = %path.display(), error = %e, "skipping unparseable manifest");
                return None;
            }
        };
        let size = fs::metadata(path).ok()?.len();

        let blobs = BlobStats::collect(&manifest, self.paths.base_dir(), &self.paths.blobs_dir());
        tracing::debug!(
            manifest = %path.display(),
            blobs = blobs.count,
            bytes = blobs.size,
            "loaded version"
        );

        Some(ModelVersion::new(name, path.to_path_buf(), size, manifest, blobs))
    }
}

/// Directory entries sorted by file name
fn sorted_entries(dir: &Path) -> BackupResult<Vec<DirEntry>> {
    let read_error =
        |e: std::io::Error| BackupError::Io(format!("Failed to read directory {}: {}", dir.display(), e));

    let mut entries = fs::read_dir(dir)
        .map_err(read_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_error)?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

/// Enumerate the store at `root`
pub fn enumerate_models(root: impl Into<PathBuf>) -> BackupResult<ModelList> {
    let paths = StorePaths::with_base_dir(root);
    InventoryService::new(&paths).enumerate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const REGISTRY: &str = "registry.ollama.ai";

    fn write_manifest(root: &Path, registry: &str, model: &str, version: &str, body: &str) {
        let dir = root
            .join("models/manifests")
            .join(registry)
            .join("library")
            .join(model);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(version), body).unwrap();
    }

    fn write_blob(root: &Path, name: &str, len: usize) {
        let dir = root.join("models/blobs");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), vec![1u8; len]).unwrap();
    }

    #[test]
    fn test_missing_manifests_dir() {
        let temp = TempDir::new().unwrap();
        let err = enumerate_models(temp.path()).unwrap_err();
        assert!(matches!(err, BackupError::DirectoryMissing(_)));
    }

    #[test]
    fn test_enumerate_with_blob_stats() {
        let temp = TempDir::new().unwrap();
        let manifest = r#"{"layers":[{"digest":"sha256:abc123"},{"digest":"sha256:gone"}]}"#;
        write_manifest(temp.path(), REGISTRY, "llama3", "8b", manifest);
        write_blob(temp.path(), "sha256-abc123", 100);

        let list = enumerate_models(temp.path()).unwrap();
        assert_eq!(list.registry_count(), 1);

        let model = list.find_model("llama3").unwrap();
        assert_eq!(model.registry, REGISTRY);

        let version = &model.versions[0];
        assert_eq!(version.name, "8b");
        assert_eq!(version.size, manifest.len() as u64);
        assert_eq!(version.blobs_count, 1);
        assert_eq!(version.blobs_size, 100);
        assert_eq!(version.total_size, version.size + version.blobs_size);
        assert_eq!(version.digest, "sha256:abc123");
    }

    #[test]
    fn test_corrupt_manifests_are_skipped_and_empty_nodes_pruned() {
        let temp = TempDir::new().unwrap();
        write_manifest(temp.path(), REGISTRY, "llama3", "latest", r#"{"layers":[]}"#);
        write_manifest(temp.path(), REGISTRY, "llama3", "broken", "{ nope");
        write_manifest(temp.path(), REGISTRY, "only-broken", "latest", "not json");
        write_manifest(temp.path(), "other.registry", "junk", "v1", "[]");

        // Registry without a library directory
        fs::create_dir_all(temp.path().join("models/manifests/no-library/stuff")).unwrap();
        // Stray file at registry level
        fs::write(temp.path().join("models/manifests/README"), "hi").unwrap();

        let list = enumerate_models(temp.path()).unwrap();
        assert_eq!(list.registry_count(), 1);
        assert_eq!(list.model_count(), 1);

        let model = list.find_model("llama3").unwrap();
        assert_eq!(model.version_names(), vec!["latest"]);
        assert!(list.find_model("only-broken").is_none());

        for registry in &list.registries {
            assert!(!registry.models.is_empty());
            for model in &registry.models {
                assert!(!model.versions.is_empty());
            }
        }
    }

    #[test]
    fn test_entries_are_sorted() {
        let temp = TempDir::new().unwrap();
        for version in ["b", "c", "a"] {
            write_manifest(temp.path(), REGISTRY, "phi3", version, "{}");
        }
        write_manifest(temp.path(), REGISTRY, "alpha", "latest", "{}");

        let list = enumerate_models(temp.path()).unwrap();
        let names: Vec<&str> = list.registries[0].models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "phi3"]);
        assert_eq!(list.find_model("phi3").unwrap().version_names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_from_layers_resolve_against_store_root() {
        let temp = TempDir::new().unwrap();
        write_manifest(
            temp.path(),
            REGISTRY,
            "custom",
            "latest",
            r#"{"layers":[{"from":"models/blobs/extra.bin","digest":"sha256:zzz"}]}"#,
        );
        write_blob(temp.path(), "extra.bin", 33);

        let list = enumerate_models(temp.path()).unwrap();
        let version = &list.find_model("custom").unwrap().versions[0];
        assert_eq!(version.blobs_count, 1);
        assert_eq!(version.blobs_size, 33);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_model_directory_aborts() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        write_manifest(temp.path(), REGISTRY, "llama3", "8b", r#"{"layers":[]}"#);
        write_manifest(temp.path(), REGISTRY, "phi3", "mini", r#"{"layers":[]}"#);

        let model_dir = temp
            .path()
            .join("models/manifests")
            .join(REGISTRY)
            .join("library/phi3");
        fs::set_permissions(&model_dir, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not stop root
        if fs::read_dir(&model_dir).is_ok() {
            fs::set_permissions(&model_dir, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = enumerate_models(temp.path());
        fs::set_permissions(&model_dir, fs::Permissions::from_mode(0o755)).unwrap();

        match result {
            Err(BackupError::Io(message)) => assert!(message.contains("phi3")),
            other => panic!("expected an I/O error, got {other:?}"),
        }
    }
}
