//! Local JSON backups of month documents, written before destructive operations.

use crate::model::Month;
use crate::{migrate, utils, Config, Result};
use anyhow::Context;
use chrono::Local;
use std::path::PathBuf;

/// Prefix for the backup written before a month is closed.
pub const CLOSE: &str = "close";

/// Prefix for the backup written before an import replaces a day.
pub const IMPORT: &str = "import";

/// Manages backup file creation and rotation.
///
/// The `Backup` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    /// Creates a new `Backup` instance from a `Config`.
    pub fn new(config: &Config) -> Self {
        Self::with_dir(config.backups(), config.backup_copies())
    }

    pub fn with_dir(backups_dir: impl Into<PathBuf>, backup_copies: u32) -> Self {
        Self {
            backups_dir: backups_dir.into(),
            backup_copies,
        }
    }

    /// Saves `month` as a pretty-printed JSON backup file.
    ///
    /// The filename format is `{prefix}.YYYY-MM-DD-NNN.json` where NNN is a sequence number.
    /// Automatically rotates old backups, keeping only `backup_copies` files per prefix.
    ///
    /// Returns the path to the created backup file.
    pub async fn save_json(&self, prefix: &str, month: &Month) -> Result<PathBuf> {
        let date = today();
        let seq = self.next_sequence_number(prefix, &date).await?;
        let filename = format!("{prefix}.{date}-{seq:03}.json");
        let path = self.backups_dir.join(&filename);

        let json = serde_json::to_string_pretty(&migrate::serialize(month)?)
            .context("Failed to serialize the month to JSON")?;
        utils::write(&path, json).await?;

        self.rotate(prefix).await?;

        Ok(path)
    }

    /// Scans the backups directory for existing files with the given prefix and date,
    /// and returns the next sequence number.
    async fn next_sequence_number(&self, prefix: &str, date: &str) -> Result<u32> {
        let mut max_seq: u32 = 0;

        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let file_name = entry.file_name();
            if let Some(seq) = parse_sequence_number(&file_name.to_string_lossy(), prefix, date) {
                max_seq = max_seq.max(seq);
            }
        }

        Ok(max_seq + 1)
    }

    /// Rotates old backup files, keeping only `backup_copies` files with the given prefix.
    async fn rotate(&self, prefix: &str) -> Result<()> {
        let mut files: Vec<(PathBuf, String)> = Vec::new();

        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if is_backup_file(&name, prefix) {
                files.push((entry.path(), name));
            }
        }

        // Sorting by name sorts by date, then sequence number
        files.sort_by(|a, b| a.1.cmp(&b.1));

        let to_delete = files.len().saturating_sub(self.backup_copies as usize);
        for (path, _) in files.into_iter().take(to_delete) {
            utils::remove(&path).await?;
        }

        Ok(())
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parses the sequence number from a backup filename of the form `{prefix}.{date}-{NNN}.json`.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str) -> Option<u32> {
    filename
        .strip_prefix(&format!("{prefix}.{date}-"))?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

fn is_backup_file(filename: &str, prefix: &str) -> bool {
    filename.starts_with(&format!("{prefix}.")) && filename.ends_with(".json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_sequence_number() {
        assert_eq!(
            parse_sequence_number("close.2026-10-16-001.json", "close", "2026-10-16"),
            Some(1)
        );
        assert_eq!(
            parse_sequence_number("close.2026-10-16-042.json", "close", "2026-10-16"),
            Some(42)
        );
        // Wrong prefix
        assert_eq!(
            parse_sequence_number("import.2026-10-16-001.json", "close", "2026-10-16"),
            None
        );
        // Wrong date
        assert_eq!(
            parse_sequence_number("close.2026-10-15-001.json", "close", "2026-10-16"),
            None
        );
    }

    #[test]
    fn test_is_backup_file() {
        assert!(is_backup_file("close.2026-10-16-001.json", "close"));
        assert!(!is_backup_file("close.2026-10-16-001.json", "import"));
        assert!(!is_backup_file("close.2026-10-16-001.txt", "close"));
    }

    #[tokio::test]
    async fn test_save_json_rotates() {
        let dir = TempDir::new().unwrap();
        let backup = Backup::with_dir(dir.path(), 2);
        let month = Month::for_period(9, 2026);

        let first = backup.save_json(CLOSE, &month).await.unwrap();
        let second = backup.save_json(CLOSE, &month).await.unwrap();
        let third = backup.save_json(CLOSE, &month).await.unwrap();
        backup.save_json(IMPORT, &month).await.unwrap();

        assert!(!first.exists());
        assert!(second.exists());
        assert!(third.exists());
        assert!(third.to_string_lossy().ends_with("-003.json"));

        let restored = migrate::migrate_str(
            &utils::read(&third).await.unwrap(),
            chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        );
        assert_eq!(restored, month);
    }
}
