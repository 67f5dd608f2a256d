//! Resolves merchant labels to spending categories.
//!
//! A [`Resolver`] owns the [`MerchantDictionary`] and a [`Decide`] implementation. Labels that
//! closely match a known merchant get that merchant's category. Anything else is handed to the
//! decider (a terminal prompt in the CLI), and the answer is written back to the dictionary file
//! so the same merchant is recognized next time.

use crate::error::LedgerError;
use crate::{utils, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A best match scoring at least this much is trusted without asking.
pub const MATCH_THRESHOLD: f64 = 75.0;

/// The categories a new dictionary starts with.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Food",
    "Transportation",
    "Entertainment",
    "Shopping",
    "Bills",
    "Other",
];

/// Something that can put a purchase label into a category. The aggregation engine only needs
/// this; [`Resolver`] is the real implementation.
pub trait Categorize {
    fn categorize(&mut self, label: &str) -> Result<String>;
}

/// The decision port: given a label that could not be matched, pick one of `options`.
///
/// Implementations may block for as long as they need, e.g. while a person decides.
pub trait Decide {
    fn decide(&mut self, label: &str, options: &[String]) -> Result<String>;
}

impl<F> Decide for F
where
    F: FnMut(&str, &[String]) -> Result<String>,
{
    fn decide(&mut self, label: &str, options: &[String]) -> Result<String> {
        self(label, options)
    }
}

/// The on-disk format of the merchant dictionary.
///
/// ```json
/// {
///   "categories": ["Food", "Transportation", "Entertainment", "Shopping", "Bills", "Other"],
///   "merchants": { "starbucks store": "Food" }
/// }
/// ```
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
struct DictionaryFile {
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    merchants: BTreeMap<String, String>,
}

/// The learned mapping from lower-cased merchant text to category, together with the list of
/// category names. Entries are only ever added.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MerchantDictionary {
    path: PathBuf,
    categories: Vec<String>,
    merchants: BTreeMap<String, String>,
}

/// The closest dictionary entry for a label.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub merchant: String,
    pub category: String,
    /// Similarity in `[0, 100]`.
    pub score: f64,
}

impl MerchantDictionary {
    /// An empty dictionary with the default categories that will be saved to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            categories: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            merchants: BTreeMap::new(),
        }
    }

    /// Loads the dictionary at `path`. A missing or empty file gives a new dictionary with the
    /// default categories.
    ///
    /// # Errors
    /// - Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = match utils::read_optional(&path)? {
            Some(s) if !s.trim().is_empty() => s,
            _ => {
                debug!("No merchant dictionary at {}, using defaults", path.display());
                return Ok(Self::new(path));
            }
        };
        let file: DictionaryFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse merchant dictionary at {}", path.display()))?;
        let mut dictionary = Self {
            path,
            categories: file.categories,
            merchants: file.merchants,
        };
        if dictionary.categories.is_empty() {
            warn!(
                "The merchant dictionary at {} lists no categories, using the defaults",
                dictionary.path.display()
            );
            dictionary.categories = DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect();
        }
        Ok(dictionary)
    }

    /// Writes the dictionary to its file.
    pub fn save(&self) -> Result<()> {
        let file = DictionaryFile {
            categories: self.categories.clone(),
            merchants: self.merchants.clone(),
        };
        let data = serde_json::to_string_pretty(&file)
            .context("Unable to serialize the merchant dictionary")?;
        utils::replace(&self.path, data).context("Unable to write the merchant dictionary")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn merchants(&self) -> &BTreeMap<String, String> {
        &self.merchants
    }

    pub fn is_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c == name)
    }

    /// The category stored for exactly this label, ignoring case.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.merchants.get(&label.to_lowercase()).map(String::as_str)
    }

    /// Finds the merchant most similar to `label`, ignoring case. Ties go to the merchant that
    /// sorts first.
    pub fn best_match(&self, label: &str) -> Option<Match> {
        let needle = label.to_lowercase();
        let mut best: Option<Match> = None;
        for (merchant, category) in &self.merchants {
            let score = similarity(&needle, merchant);
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(Match {
                    merchant: merchant.clone(),
                    category: category.clone(),
                    score,
                });
            }
        }
        best
    }

    /// Records `label -> category` in memory and then saves the file. The in-memory entry is kept
    /// even when saving fails.
    pub fn learn(&mut self, label: &str, category: &str) -> Result<()> {
        self.merchants
            .entry(label.to_lowercase())
            .or_insert_with(|| category.to_string());
        self.save()
    }
}

/// How a [`Resolution`] was reached.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// A known merchant matched well enough.
    Matched { merchant: String, score: f64 },
    /// The decider chose; `persisted` tells whether the dictionary file was updated.
    Decided { persisted: bool },
}

/// The category for a label and how it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub category: String,
    pub source: Source,
}

/// Maps labels to categories using a dictionary first and a decider second.
pub struct Resolver<D> {
    dictionary: MerchantDictionary,
    decider: D,
}

impl<D> Resolver<D>
where
    D: Decide,
{
    pub fn new(dictionary: MerchantDictionary, decider: D) -> Self {
        Self {
            dictionary,
            decider,
        }
    }

    pub fn dictionary(&self) -> &MerchantDictionary {
        &self.dictionary
    }

    /// Resolves `label` to a category.
    ///
    /// If the best dictionary match scores at least [`MATCH_THRESHOLD`] its category is returned.
    /// Otherwise the decider is asked with the label as given and the list of categories, and the
    /// answer is learned and saved. Failing to save is logged and reported in the `Source`, but is
    /// not an error.
    ///
    /// # Errors
    /// - Any error from the decider.
    /// - `LedgerError::UnknownCategory` if the decider answers with a name not in the list.
    pub fn resolve(&mut self, label: &str) -> Result<Resolution> {
        if let Some(found) = self.dictionary.best_match(label) {
            if found.score >= MATCH_THRESHOLD {
                debug!(
                    "'{label}' matched '{}' ({:.1}) -> {}",
                    found.merchant, found.score, found.category
                );
                return Ok(Resolution {
                    category: found.category,
                    source: Source::Matched {
                        merchant: found.merchant,
                        score: found.score,
                    },
                });
            }
        }

        let choice = self
            .decider
            .decide(label, self.dictionary.categories())
            .with_context(|| format!("Unable to get a category for '{label}'"))?;
        if !self.dictionary.is_category(&choice) {
            return Err(LedgerError::UnknownCategory { choice }.into());
        }

        let persisted = match self.dictionary.learn(label, &choice) {
            Ok(()) => {
                info!("Learned '{}' -> {choice}", label.to_lowercase());
                true
            }
            Err(e) => {
                warn!("Keeping '{label}' -> {choice} for this run only: {e:#}");
                false
            }
        };
        Ok(Resolution {
            category: choice,
            source: Source::Decided { persisted },
        })
    }
}

impl<D> Categorize for Resolver<D>
where
    D: Decide,
{
    fn categorize(&mut self, label: &str) -> Result<String> {
        self.resolve(label).map(|r| r.category)
    }
}

/// Similarity of two strings in `[0, 100]`, 100 meaning identical. Computed as
/// `200 * lcs / (len(a) + len(b))` where `lcs` is the length of the longest common subsequence of
/// characters, i.e. one minus the normalized insert/delete edit distance.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    200.0 * lcs_len(&a, &b) as f64 / total as f64
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
