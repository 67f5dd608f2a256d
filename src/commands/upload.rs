use crate::classify;
use crate::commands::Out;
use crate::error::LedgerError;
use crate::extract;
use crate::model::Amount;
use crate::resolve::{Decide, Resolver};
use crate::{utils, Config, Result};
use anyhow::{bail, Context};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What an upload did.
#[derive(Debug, Clone, Serialize, Eq, PartialEq)]
pub struct UploadSummary {
    pub file: PathBuf,
    /// True when the file had been uploaded before and nothing was changed.
    pub duplicate: bool,
    pub year: Option<i32>,
    pub purchases: usize,
    pub deposits: usize,
    pub spent: Amount,
    pub earned: Amount,
    /// Where the accepted file was archived.
    pub archived: Option<PathBuf>,
}

impl UploadSummary {
    fn duplicate(file: &Path) -> Self {
        Self {
            file: file.to_path_buf(),
            duplicate: true,
            year: None,
            purchases: 0,
            deposits: 0,
            spent: Amount::ZERO,
            earned: Amount::ZERO,
            archived: None,
        }
    }
}

/// Adds the transactions of one statement file to the dataset.
///
/// The file is skipped if the exact same bytes were uploaded before. Otherwise its text is
/// extracted, the dated lines are classified, each unrecognized merchant is put to `decider`,
/// and the totals for the statement's year are updated. Nothing is written until all of that has
/// succeeded. The file is then archived and the dataset saved; if the save fails the archived copy
/// is removed again so that the file can be uploaded once more.
///
/// `year` replaces the year read from the statement's `Fee period` line.
///
/// # Errors
/// - The file cannot be read or its text cannot be extracted.
/// - The file has no dated lines or no transactions.
/// - `LedgerError::MissingYear` when no year was found and none was given.
/// - `LedgerError::InvalidMonth` when a transaction has no usable date.
/// - Any error from `decider`.
pub fn upload<D>(
    config: &Config,
    file: &Path,
    year: Option<i32>,
    decider: D,
) -> Result<Out<UploadSummary>>
where
    D: Decide,
{
    let bytes = utils::read_bytes(file)?;
    let store = config.store();
    if store.is_duplicate(&bytes)? {
        return Ok(Out::new(
            format!("{} was already uploaded, nothing to do", file.display()),
            UploadSummary::duplicate(file),
        ));
    }

    let lines = extract::statement_lines(&*extract::for_path(file), &bytes)
        .with_context(|| format!("Unable to read the statement {}", file.display()))?;
    if lines.is_empty() {
        bail!("{} has no dated lines, is it a bank statement?", file.display());
    }

    let statement = classify::parse_statement(&lines);
    if statement.is_empty() {
        bail!("{} has no transactions", file.display());
    }
    let (mut purchases, deposits, found_year) = statement.into_parts();
    let year = match (year, found_year) {
        (Some(given), Some(found)) if given != found => {
            info!("Using year {given} instead of {found} from the statement");
            given
        }
        (Some(given), _) => given,
        (None, Some(found)) => found,
        (None, None) => return Err(LedgerError::MissingYear.into()),
    };
    debug!(
        "{}: {} purchases, {} deposits for {year}",
        file.display(),
        purchases.len(),
        deposits.len()
    );

    let mut resolver = Resolver::new(config.dictionary()?, decider);
    let mut data = store.load()?;
    data.add_statement(year, &mut purchases, &deposits, &mut resolver)?;

    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .with_context(|| format!("{} has no file name", file.display()))?;
    // Not a duplicate, so this is always a new file.
    let archived = store.archive(&name, &bytes)?;
    if let Err(e) = store.save(&data) {
        if let Err(cleanup) = utils::remove(&archived) {
            warn!("Unable to remove {}: {cleanup:#}", archived.display());
        }
        return Err(e);
    }

    let summary = UploadSummary {
        file: file.to_path_buf(),
        duplicate: false,
        year: Some(year),
        purchases: purchases.len(),
        deposits: deposits.len(),
        spent: purchases.iter().map(|p| p.amount()).sum(),
        earned: deposits.iter().map(|d| d.amount()).sum(),
        archived: Some(archived),
    };
    Ok(Out::new(
        format!(
            "Added {} purchases ({}) and {} deposits ({}) to {year}",
            summary.purchases, summary.spent, summary.deposits, summary.earned
        ),
        summary,
    ))
}
