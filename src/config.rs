//! Configuration file handling for fintrack.
//!
//! The configuration file is stored at `$FINTRACK_HOME/config.json` and contains settings for
//! the application including backup settings and the locations of the dataset, the merchant
//! dictionary and the uploaded statement archive.

use crate::backup::Backup;
use crate::resolve::MerchantDictionary;
use crate::store::Store;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "fintrack";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const DATABASE_JSON: &str = "database.json";
const CATEGORIES_JSON: &str = "categories.json";
const UPLOADED_FILES: &str = "uploaded_files";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$FINTRACK_HOME` and from there it loads `$FINTRACK_HOME/config.json`. It provides
/// paths to other items that are either configurable or are expected in a certain location within
/// the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory, its subdirectories and an initial `config.json` file with
    /// default settings. An existing `config.json` is left as it is and loaded instead.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/fintrack`
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative).context("Unable to create the fintrack home directory")?;
        let root = utils::canonicalize(&maybe_relative)?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            ConfigFile::default().save(&config_path)?;
        }
        Self::load(root)
    }

    /// This will
    /// - validate that the home directory exists and that the config file exists
    /// - load the config file
    /// - create the backups and uploads directories if they are missing
    /// - return the loaded configuration object
    pub fn load(fintrack_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = fintrack_home.into();
        if !maybe_relative.is_dir() {
            bail!(
                "The fintrack home directory '{}' is missing, run 'fintrack init' first",
                maybe_relative.display()
            )
        }
        let root = utils::canonicalize(&maybe_relative)?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'fintrack init' first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path)?;

        let config = Self {
            backups: root.join(BACKUPS),
            root,
            config_path,
            config_file,
        };
        utils::make_dir(config.backups())?;
        utils::make_dir(config.uploads_dir())?;
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// The dataset file, `database.json` unless configured otherwise.
    pub fn database_path(&self) -> PathBuf {
        self.resolve(self.config_file.database_path(), DATABASE_JSON)
    }

    /// The merchant dictionary file, `categories.json` unless configured otherwise.
    pub fn categories_path(&self) -> PathBuf {
        self.resolve(self.config_file.categories_path(), CATEGORIES_JSON)
    }

    /// The directory holding copies of every accepted upload.
    pub fn uploads_dir(&self) -> PathBuf {
        self.resolve(self.config_file.uploads_dir(), UPLOADED_FILES)
    }

    /// Creates a new `Backup` instance for managing dataset snapshots.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }

    /// Creates a new `Store` for reading and writing the dataset and uploads.
    pub fn store(&self) -> Store {
        Store::new(self)
    }

    /// Loads the merchant dictionary.
    pub fn dictionary(&self) -> Result<MerchantDictionary> {
        MerchantDictionary::load(self.categories_path())
    }

    /// Returns `p` if it is absolute, otherwise resolves it against the home directory. `None`
    /// falls back to `default` inside the home directory.
    fn resolve(&self, p: Option<&Path>, default: &str) -> PathBuf {
        match p {
            Some(p) if p.is_absolute() => p.to_path_buf(),
            Some(p) => self.root.join(p),
            None => self.root.join(default),
        }
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "fintrack",
///   "config_version": 1,
///   "backup_copies": 5,
///   "database_path": "database.json",
///   "categories_path": "categories.json",
///   "uploads_dir": "uploaded_files"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "fintrack"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Number of dataset snapshots to keep in the backups directory
    backup_copies: u32,

    /// Path to the dataset file (optional, relative to the home directory or absolute)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    database_path: Option<PathBuf>,

    /// Path to the merchant dictionary file (optional, relative or absolute)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    categories_path: Option<PathBuf>,

    /// Path to the uploaded statements directory (optional, relative or absolute)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uploads_dir: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backup_copies: BACKUP_COPIES,
            database_path: None,
            categories_path: None,
            uploads_dir: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or is for another application.
    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .with_context(|| format!("Failed to load config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data).context("Unable to write config file")
    }

    fn database_path(&self) -> Option<&Path> {
        self.database_path.as_deref()
    }

    fn categories_path(&self) -> Option<&Path> {
        self.categories_path.as_deref()
    }

    fn uploads_dir(&self) -> Option<&Path> {
        self.uploads_dir.as_deref()
    }
}
