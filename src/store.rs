//! Reading and writing the dataset, and keeping the archive of uploaded statements.

use crate::backup::{self, Backup};
use crate::model::AllData;
use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::{Datelike, Local};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Owns the locations of the dataset file and the uploads archive. Create one with
/// `Config::store()`.
#[derive(Debug, Clone)]
pub struct Store {
    database: PathBuf,
    uploads: PathBuf,
    backup: Backup,
}

impl Store {
    pub fn new(config: &Config) -> Self {
        Self {
            database: config.database_path(),
            uploads: config.uploads_dir(),
            backup: config.backup(),
        }
    }

    pub fn database_path(&self) -> &Path {
        &self.database
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads
    }

    /// Loads the dataset. A missing, empty or unparsable file gives a dataset seeded with the
    /// current year; the unparsable case is logged as a warning and the bad file is kept until
    /// the next save moves it into the backups.
    ///
    /// # Errors
    /// - Returns an error if the file exists but cannot be read.
    pub fn load(&self) -> Result<AllData> {
        let content = match utils::read_optional(&self.database)? {
            Some(s) if !s.trim().is_empty() => s,
            _ => {
                debug!("No dataset at {}, starting fresh", self.database.display());
                return Ok(AllData::seeded(current_year()));
            }
        };
        match serde_json::from_str::<AllData>(&content) {
            Ok(data) => Ok(data),
            Err(e) => {
                warn!(
                    "The dataset at {} could not be parsed, starting fresh: {e}",
                    self.database.display()
                );
                Ok(AllData::seeded(current_year()))
            }
        }
    }

    /// Snapshots the current dataset file into the backups, then replaces it with `data`.
    pub fn save(&self, data: &AllData) -> Result<()> {
        if let Some(parent) = self.database.parent() {
            utils::make_dir(parent)?;
        }
        self.backup.snapshot(backup::DATABASE, &self.database)?;
        let json = serde_json::to_string_pretty(data).context("Unable to serialize the dataset")?;
        utils::replace(&self.database, json)?;
        debug!("Saved {} years to {}", data.years().len(), self.database.display());
        Ok(())
    }

    /// True if a file with exactly these bytes is already in the uploads archive.
    pub fn is_duplicate(&self, bytes: &[u8]) -> Result<bool> {
        let wanted = digest(bytes);
        for path in utils::list_files(&self.uploads)? {
            if digest(&utils::read_bytes(&path)?) == wanted {
                debug!("Upload matches archived file {}", path.display());
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Copies an accepted upload into the archive under its own file name. If a different file
    /// already has that name, a numeric suffix is added: `March.pdf` becomes `March-1.pdf`.
    ///
    /// Returns the path of the archived copy.
    pub fn archive(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let file_name = Path::new(name)
            .file_name()
            .with_context(|| format!("'{name}' is not a usable file name"))?;
        let original = Path::new(file_name);
        let stem = original
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = original
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let wanted = digest(bytes);
        let mut path = self.uploads.join(original);
        let mut n = 0;
        while path.exists() {
            if digest(&utils::read_bytes(&path)?) == wanted {
                return Ok(path);
            }
            n += 1;
            path = self.uploads.join(format!("{stem}-{n}{extension}"));
        }
        utils::write(&path, bytes)?;
        info!("Archived upload as {}", path.display());
        Ok(path)
    }
}

/// The hex encoded SHA-256 of `bytes`.
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn current_year() -> i32 {
    Local::now().year()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Deposit, Purchase, StatementDate};
    use crate::test::{FixedCategory, TestEnv};
    use std::str::FromStr;

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn sample() -> AllData {
        let mut all = AllData::seeded(2024);
        let mut purchases = vec![
            Purchase::new(StatementDate::new(3, 14), "STARBUCKS STORE", amt("5.75")),
            Purchase::new(StatementDate::new(4, 1), "SHELL OIL", amt("40.25")),
        ];
        let deposits = [Deposit::new(StatementDate::new(5, 2), amt("1200.00"))];
        all.add_statement(2024, &mut purchases, &deposits, &mut FixedCategory::new("Food"))
            .unwrap();
        all
    }

    #[test]
    fn test_digest() {
        assert_eq!(
            digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_load_missing_gives_seeded_year() {
        let env = TestEnv::new();
        let data = env.config().store().load().unwrap();
        assert_eq!(data.years().len(), 1);
        assert_eq!(data.years()[0].year(), current_year());
    }

    #[test]
    fn test_load_corrupt_gives_seeded_year() {
        let env = TestEnv::new();
        let store = env.config().store();
        utils::write(store.database_path(), "[{\"year\": ").unwrap();
        let data = store.load().unwrap();
        assert_eq!(data, AllData::seeded(current_year()));

        // The bad file ends up in the backups on the next save
        store.save(&data).unwrap();
        let backups = utils::list_files(env.config().backups()).unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(utils::read(&backups[0]).unwrap(), "[{\"year\": ");
    }

    #[test]
    fn test_save_load_round_trip() {
        let env = TestEnv::new();
        let store = env.config().store();
        let data = sample();

        store.save(&data).unwrap();
        let first = utils::read(store.database_path()).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, data);

        store.save(&loaded).unwrap();
        let second = utils::read(store.database_path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_detection() {
        let env = TestEnv::new();
        let store = env.config().store();
        let bytes = b"03/14 Purchase authorized on 03/14 STARBUCKS 5.75".to_vec();
        assert!(!store.is_duplicate(&bytes).unwrap());

        store.archive("March.txt", &bytes).unwrap();
        assert!(store.is_duplicate(&bytes).unwrap());

        let mut changed = bytes.clone();
        changed[0] = b'4';
        assert!(!store.is_duplicate(&changed).unwrap());
    }

    #[test]
    fn test_archive_name_collision() {
        let env = TestEnv::new();
        let store = env.config().store();
        let a = store.archive("March.pdf", b"first").unwrap();
        let b = store.archive("March.pdf", b"second").unwrap();
        let c = store.archive("March.pdf", b"second").unwrap();
        assert!(a.ends_with("March.pdf"));
        assert!(b.ends_with("March-1.pdf"));
        assert_eq!(b, c);
        assert_eq!(utils::read_bytes(&b).unwrap(), b"second");
    }

    #[test]
    fn test_archive_strips_directories() {
        let env = TestEnv::new();
        let store = env.config().store();
        let path = store.archive("../../statements/April.txt", b"x").unwrap();
        assert_eq!(path, store.uploads_dir().join("April.txt"));
    }
}
