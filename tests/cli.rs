use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const REGISTRY: &str = "registry.ollama.ai";
const MANIFEST: &str = r#"{"config":{"digest":"sha256:cfg"},"layers":[{"digest":"sha256:abc123"}]}"#;

struct Workspace {
    temp: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let ws = Self {
            temp: TempDir::new().unwrap(),
        };
        ws.add_model("llama3", "8b", MANIFEST);
        fs::create_dir_all(ws.store().join("models/blobs")).unwrap();
        fs::write(ws.store().join("models/blobs/sha256-abc123"), vec![3u8; 100]).unwrap();
        ws
    }

    fn store(&self) -> PathBuf {
        self.temp.path().join("store")
    }

    fn backups(&self) -> PathBuf {
        self.temp.path().join("backups")
    }

    fn add_model(&self, model: &str, version: &str, body: &str) {
        let dir = self
            .store()
            .join("models/manifests")
            .join(REGISTRY)
            .join("library")
            .join(model);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(version), body).unwrap();
    }

    fn cmd(&self, store: &Path) -> Command {
        let mut cmd = Command::cargo_bin("ollama-backup").unwrap();
        cmd.env("OLLAMA_BACKUP_STORE_DIR", store)
            .env("OLLAMA_BACKUP_CONFIG_DIR", self.temp.path().join("config"))
            .env_remove("OLLAMA_BACKUP_LOG");
        cmd
    }
}

#[test]
fn list_text_shows_models() {
    let ws = Workspace::new();

    ws.cmd(&ws.store())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 registries, 1 models, 1 versions"))
        .stdout(predicate::str::contains("llama3"))
        .stdout(predicate::str::contains("sha256:cfg"));
}

#[test]
fn list_json_is_machine_readable() {
    let ws = Workspace::new();

    let output = ws
        .cmd(&ws.store())
        .args(["list", "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let version = &value["registries"][0]["models"][0]["versions"][0];
    assert_eq!(version["name"], "8b");
    assert_eq!(version["blobs_size"], 100);
    assert_eq!(version["blobs_count"], 1);
}

#[test]
fn list_fails_without_store() {
    let ws = Workspace::new();

    ws.cmd(&ws.temp.path().join("nowhere"))
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Directory does not exist"));
}

#[test]
fn backup_and_restore_round_trip() {
    let ws = Workspace::new();
    let target = ws.temp.path().join("target");

    ws.cmd(&ws.store())
        .args(["backup", "llama3:8b", "--dir"])
        .arg(ws.backups())
        .assert()
        .success()
        .stdout(predicate::str::contains("backed up successfully"));

    ws.cmd(&target)
        .args(["restore", "llama3:8b", "--backup-dir"])
        .arg(ws.backups())
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored 1 blob(s) and 1 manifest(s)"));

    assert_eq!(
        fs::read(target.join("models/blobs/sha256-abc123")).unwrap(),
        vec![3u8; 100]
    );
    let manifest = target
        .join("models/manifests")
        .join(REGISTRY)
        .join("library/llama3/8b");
    assert_eq!(fs::read_to_string(manifest).unwrap(), MANIFEST);

    // Second restore without --overwrite must refuse
    ws.cmd(&target)
        .args(["restore", "llama3:8b", "--backup-dir"])
        .arg(ws.backups())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--overwrite"));

    ws.cmd(&target)
        .args(["restore", "llama3:8b", "--overwrite", "--backup-dir"])
        .arg(ws.backups())
        .assert()
        .success();
}

#[test]
fn zipped_backup_is_listed_and_restorable() {
    let ws = Workspace::new();
    let target = ws.temp.path().join("target");

    ws.cmd(&ws.store())
        .args(["backup", "llama3", "--zip", "--dir"])
        .arg(ws.backups())
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup zipped"));

    let archive = fs::read_dir(ws.backups())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .find(|name| name.ends_with(".zip"))
        .unwrap();

    ws.cmd(&ws.store())
        .args(["backups", "--dir"])
        .arg(ws.backups())
        .assert()
        .success()
        .stdout(predicate::str::contains("llama3:8b"))
        .stdout(predicate::str::contains("zip"));

    ws.cmd(&target)
        .args(["restore", &archive, "--backup-dir"])
        .arg(ws.backups())
        .assert()
        .success();
    assert!(target.join("models/blobs/sha256-abc123").exists());

    // The extracted directory is not listed as a second unit
    ws.cmd(&ws.store())
        .args(["backups", "--dir"])
        .arg(ws.backups())
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 1 backup(s)"));
}

#[test]
fn backup_without_version_is_ambiguous_with_several_versions() {
    let ws = Workspace::new();
    ws.add_model("llama3", "70b", "{}");

    ws.cmd(&ws.store())
        .args(["backup", "llama3", "--dir"])
        .arg(ws.backups())
        .assert()
        .failure()
        .stderr(predicate::str::contains("70b, 8b"));

    assert!(!ws.backups().exists());
}

#[test]
fn config_save_writes_settings() {
    let ws = Workspace::new();

    ws.cmd(&ws.store())
        .args(["config", "--save"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Settings saved."));

    assert!(ws.temp.path().join("config/settings.json").exists());
}
