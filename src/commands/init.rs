use crate::commands::Out;
use crate::{utils, Config, Result};
use anyhow::Context;
use std::path::Path;
use tracing::debug;

/// Creates the data directory, its subdirectories and:
/// - an initial `config.json` file with default settings
/// - a merchant dictionary with the default categories
/// - a dataset seeded with the current year
///
/// Files that already exist are left untouched, so running `init` twice is harmless.
///
/// # Arguments
/// - `fintrack_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/fintrack`
///
/// # Errors
/// - Returns an error if any file operations fail.
pub fn init(fintrack_home: &Path) -> Result<Out<()>> {
    let config = Config::create(fintrack_home)
        .context("Unable to create the data directory and configs")?;

    if utils::read_optional(&config.categories_path())?.is_none() {
        config.dictionary()?.save()?;
        debug!("Created {}", config.categories_path().display());
    }

    let store = config.store();
    if utils::read_optional(store.database_path())?.is_none() {
        store.save(&store.load()?)?;
        debug!("Created {}", store.database_path().display());
    }

    Ok(format!(
        "Successfully created the fintrack directory at {}",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AllData;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_files() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("fintrack");
        init(&home).unwrap();

        let config = Config::load(&home).unwrap();
        assert!(config.categories_path().is_file());
        assert!(config.database_path().is_file());
        assert!(config.uploads_dir().is_dir());
        let data: AllData = utils::deserialize(&config.database_path()).unwrap();
        assert_eq!(data.years().len(), 1);
    }

    #[test]
    fn test_init_twice_keeps_data() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("fintrack");
        init(&home).unwrap();
        let config = Config::load(&home).unwrap();
        let dict = r#"{"categories": ["Food"], "merchants": {"shell oil": "Food"}}"#;
        utils::write(config.categories_path(), dict).unwrap();

        init(&home).unwrap();
        assert_eq!(utils::read(&config.categories_path()).unwrap(), dict);
        // Nothing was overwritten, so nothing was backed up
        assert!(utils::list_files(config.backups()).unwrap().is_empty());
    }
}
