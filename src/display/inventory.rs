//! Model inventory display formatting
//!
//! Formats the model list for terminal output as tables, with an optional
//! per-version detail view, or as pretty-printed JSON.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::error::BackupResult;
use crate::models::{ModelList, ModelVersion};

use super::{format_size, truncate};

/// Width of the digest column
const DIGEST_WIDTH: usize = 40;

#[derive(Tabled)]
struct VersionRow {
    #[tabled(rename = "MODEL")]
    model: String,
    #[tabled(rename = "VERSION")]
    version: String,
    #[tabled(rename = "SIZE")]
    size: String,
    #[tabled(rename = "BLOBS")]
    blobs: usize,
    #[tabled(rename = "DIGEST")]
    digest: String,
}

/// Format the inventory as one table per registry
pub fn format_model_list(list: &ModelList, details: bool) -> String {
    let mut output = format!(
        "Found {} registries, {} models, {} versions\n\n",
        list.registry_count(),
        list.model_count(),
        list.version_count()
    );

    if list.is_empty() {
        output.push_str("No models found.\n");
        return output;
    }

    for registry in &list.registries {
        output.push_str(&format!("Registry: {}\n", registry.name));

        let rows = registry.models.iter().flat_map(|model| {
            model.versions.iter().enumerate().map(move |(i, version)| VersionRow {
                // Model name only on its first row
                model: if i == 0 { model.name.clone() } else { String::new() },
                version: version.name.clone(),
                size: format_size(version.total_size),
                blobs: version.blobs_count,
                digest: truncate(&version.digest, DIGEST_WIDTH),
            })
        });

        let mut table = Table::new(rows);
        table.with(Style::blank());
        output.push_str(&table.to_string());
        output.push('\n');

        if details {
            for model in &registry.models {
                for version in &model.versions {
                    output.push('\n');
                    output.push_str(&format_version_details(&model.name, version));
                }
            }
        }

        output.push('\n');
    }

    output
}

/// Detailed view of one version
pub fn format_version_details(model: &str, version: &ModelVersion) -> String {
    let mut output = String::new();

    output.push_str(&format!("  {}:{}\n", model, version.name));
    output.push_str(&format!("    Path:       {}\n", version.path.display()));
    output.push_str(&format!("    Manifest:   {} bytes\n", version.size));
    output.push_str(&format!(
        "    Blobs:      {} ({})\n",
        version.blobs_count,
        format_size(version.blobs_size)
    ));
    output.push_str(&format!(
        "    Total:      {} ({} bytes)\n",
        format_size(version.total_size),
        version.total_size
    ));
    output.push_str(&format!("    Digest:     {}\n", version.digest));

    if let Some(family) = version.detail_str("family") {
        output.push_str(&format!("    Family:     {}\n", family));
    }
    if let Some(license) = version.detail_str("license") {
        output.push_str(&format!("    License:    {}\n", license));
    }

    output
}

/// Format the inventory as pretty-printed JSON
pub fn format_model_list_json(list: &ModelList) -> BackupResult<String> {
    Ok(serde_json::to_string_pretty(list)?)
}
