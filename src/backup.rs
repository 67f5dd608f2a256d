//! Rotating snapshots of the dataset file, taken before every save.

use crate::{utils, Config, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix for dataset snapshots.
pub const DATABASE: &str = "database";

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
        Self::with_settings(config.backups(), config.backup_copies())
    }

    pub(crate) fn with_settings(backups_dir: impl Into<PathBuf>, backup_copies: u32) -> Self {
        Self {
            backups_dir: backups_dir.into(),
            backup_copies,
        }
    }

    /// Copies `source` into the backups directory as `{prefix}.YYYY-MM-DD-NNN.json`, where NNN
    /// is a sequence number, then deletes the oldest snapshots beyond `backup_copies`.
    ///
    /// Returns the path of the new snapshot, or `None` when `source` does not exist yet.
    pub fn snapshot(&self, prefix: &str, source: &Path) -> Result<Option<PathBuf>> {
        if !source.is_file() {
            return Ok(None);
        }
        let date = today();
        let seq = self.next_sequence_number(prefix, &date, "json")?;
        let path = self
            .backups_dir
            .join(format!("{prefix}.{date}-{seq:03}.json"));

        utils::copy(source, &path)?;
        debug!("Backed up {} to {}", source.display(), path.display());

        self.rotate(prefix, "json")?;

        Ok(Some(path))
    }

    /// Scans the backups directory for existing files with the given prefix and date,
    /// and returns the next sequence number.
    fn next_sequence_number(&self, prefix: &str, date: &str, extension: &str) -> Result<u32> {
        let max_seq = self
            .names()?
            .iter()
            .filter_map(|name| parse_sequence_number(name, prefix, date, extension))
            .max()
            .unwrap_or(0);
        Ok(max_seq + 1)
    }

    /// Rotates old backup files, keeping only `backup_copies` files with the given prefix.
    fn rotate(&self, prefix: &str, extension: &str) -> Result<()> {
        let mut files: Vec<String> = self
            .names()?
            .into_iter()
            .filter(|name| is_backup_file(name, prefix, extension))
            .collect();

        // Sorting by name sorts by date and sequence number
        files.sort();

        let to_delete = files.len().saturating_sub(self.backup_copies as usize);
        for name in files.into_iter().take(to_delete) {
            utils::remove(self.backups_dir.join(&name))?;
            debug!("Rotated out backup {name}");
        }

        Ok(())
    }

    fn names(&self) -> Result<Vec<String>> {
        Ok(utils::list_files(&self.backups_dir)?
            .into_iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .collect())
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parses the sequence number from a backup filename.
/// Returns None if the filename doesn't match the expected pattern.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str, extension: &str) -> Option<u32> {
    // Pattern: {prefix}.{date}-{NNN}.{ext}
    let remainder = filename.strip_prefix(&format!("{prefix}.{date}-"))?;
    let seq_str = remainder.strip_suffix(&format!(".{extension}"))?;
    seq_str.parse().ok()
}

/// Checks if a filename is a backup file with the given prefix and extension.
fn is_backup_file(filename: &str, prefix: &str, extension: &str) -> bool {
    filename.starts_with(&format!("{prefix}.")) && filename.ends_with(&format!(".{extension}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_sequence_number() {
        assert_eq!(
            parse_sequence_number("database.2025-12-14-001.json", "database", "2025-12-14", "json"),
            Some(1)
        );
        assert_eq!(
            parse_sequence_number("database.2025-12-14-042.json", "database", "2025-12-14", "json"),
            Some(42)
        );
        // Wrong prefix
        assert_eq!(
            parse_sequence_number("categories.2025-12-14-001.json", "database", "2025-12-14", "json"),
            None
        );
        // Wrong date
        assert_eq!(
            parse_sequence_number("database.2025-12-13-001.json", "database", "2025-12-14", "json"),
            None
        );
        assert_eq!(
            parse_sequence_number("database.2025-12-14-abc.json", "database", "2025-12-14", "json"),
            None
        );
    }

    #[test]
    fn test_is_backup_file() {
        assert!(is_backup_file("database.2025-12-14-001.json", "database", "json"));
        assert!(!is_backup_file("database.2025-12-14-001.json.tmp", "database", "json"));
        assert!(!is_backup_file("categories.2025-12-14-001.json", "database", "json"));
    }

    #[test]
    fn test_snapshot_missing_source() {
        let dir = TempDir::new().unwrap();
        let backup = Backup::with_settings(dir.path(), 3);
        let snap = backup
            .snapshot(DATABASE, &dir.path().join("database.json"))
            .unwrap();
        assert!(snap.is_none());
    }

    #[test]
    fn test_snapshot_sequence_and_rotation() {
        let dir = TempDir::new().unwrap();
        let backups = dir.path().join("backups");
        utils::make_dir(&backups).unwrap();
        let source = dir.path().join("database.json");
        let backup = Backup::with_settings(&backups, 2);

        let mut made = Vec::new();
        for i in 0..4 {
            utils::write(&source, format!("[{i}]")).unwrap();
            made.push(backup.snapshot(DATABASE, &source).unwrap().unwrap());
        }
        let date = today();
        assert!(made[0].ends_with(format!("database.{date}-001.json")));
        assert!(made[3].ends_with(format!("database.{date}-004.json")));

        let remaining = utils::list_files(&backups).unwrap();
        assert_eq!(remaining, vec![made[2].clone(), made[3].clone()]);
        assert_eq!(utils::read(&made[3]).unwrap(), "[3]");
    }
}
