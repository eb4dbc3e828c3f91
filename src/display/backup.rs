//! Backup unit display formatting

use chrono::Utc;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::backup::BackupInfo;

use super::format_size;

#[derive(Tabled)]
struct BackupRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "MODEL")]
    model: String,
    #[tabled(rename = "CREATED")]
    created: String,
    #[tabled(rename = "AGE")]
    age: String,
    #[tabled(rename = "SIZE")]
    size: String,
    #[tabled(rename = "KIND")]
    kind: &'static str,
}

/// Format the units of a backup directory, newest first
pub fn format_backup_list(backups: &[BackupInfo], verbose: bool) -> String {
    if backups.is_empty() {
        return "No backups found.\n".to_string();
    }

    let now = Utc::now();
    let rows = backups.iter().enumerate().map(|(i, backup)| BackupRow {
        index: i + 1,
        model: backup.model_spec(),
        created: backup
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".to_string()),
        age: backup
            .created_at
            .map(|t| format_duration(now.signed_duration_since(t)))
            .unwrap_or_else(|| "-".to_string()),
        size: format_size(backup.size_bytes),
        kind: if backup.archived { "zip" } else { "dir" },
    });

    let mut table = Table::new(rows);
    table.with(Style::blank());

    let mut output = table.to_string();
    output.push('\n');

    if verbose {
        output.push('\n');
        for (i, backup) in backups.iter().enumerate() {
            output.push_str(&format!("{}. {}\n", i + 1, backup.path.display()));
        }
    }

    output.push_str(&format!("\nTotal: {} backup(s)\n", backups.len()));
    output
}

/// Format a duration in human-readable form
pub fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }

    format!("{}mo", days / 30)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration};
    use std::path::PathBuf;

    fn info(token: i64, archived: bool) -> BackupInfo {
        BackupInfo {
            filename: format!("llama3--8b--backup-{}", token),
            path: PathBuf::from(format!("/b/llama3--8b--backup-{}", token)),
            model: "llama3".into(),
            version: "8b".into(),
            token,
            created_at: DateTime::from_timestamp(token, 0),
            size_bytes: 3 * 1024 * 1024,
            archived,
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::seconds(5)), "5s");
        assert_eq!(format_duration(Duration::minutes(5)), "5m");
        assert_eq!(format_duration(Duration::hours(5)), "5h");
        assert_eq!(format_duration(Duration::days(5)), "5d");
        assert_eq!(format_duration(Duration::days(65)), "2mo");
        assert_eq!(format_duration(Duration::seconds(-3)), "0s");
    }

    #[test]
    fn test_backup_list() {
        let output = format_backup_list(&[info(1_700_000_000, true), info(10, false)], true);
        assert!(output.contains("llama3:8b"));
        assert!(output.contains("2023-11-14 22:13:20 UTC"));
        assert!(output.contains("3.0 MB"));
        assert!(output.contains("zip"));
        assert!(output.contains("/b/llama3--8b--backup-10"));
        assert!(output.contains("Total: 2 backup(s)"));
    }

    #[test]
    fn test_empty_backup_list() {
        assert_eq!(format_backup_list(&[], false), "No backups found.\n");
    }
}
