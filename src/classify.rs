//! Turns the text lines of a bank statement into purchases, deposits and the statement year.
//!
//! Every extraction tolerates missing pieces: a line without a date gets the `00/00` placeholder,
//! a line without an amount gets zero, and a purchase without an `authorized on` label is taken
//! to be a Zelle payment.

use crate::model::{Amount, Deposit, Purchase, Statement, StatementDate};
use regex::Regex;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::{debug, trace, warn};

/// Any of these in a line makes it a purchase.
const PURCHASE_MARKERS: &[&str] = &["Purchase", "Zelle to", "Money Transfer", "Withdraw"];

/// A line containing this carries the statement year.
const YEAR_MARKER: &str = "Fee period";

/// The label used for purchases that have no `authorized on` description.
pub const DEFAULT_LABEL: &str = "Zelle";

/// What a statement line represents.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LineKind {
    Purchase,
    YearMarker,
    Deposit,
}

fn leading_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})/(\d{1,2})").expect("leading date regex"))
}

fn full_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{2}/\d{2}/\d{4}").expect("full date regex"))
}

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+\.\d{2}").expect("amount regex"))
}

fn label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"authorized on \d{1,2}/\d{1,2} (.*?) \d+\.\d{2}").expect("label regex")
    })
}

fn year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Fee period \d{2}/\d{2}/(\d{4})").expect("year regex"))
}

fn non_alphanumeric_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9\s]").expect("non-alphanumeric regex"))
}

fn address_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\b\d{1,5}\b.*").expect("address regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"))
}

/// True for the lines worth classifying: those starting with a short `m/d` date or containing a
/// full `mm/dd/yyyy` date anywhere.
pub fn is_dated_line(line: &str) -> bool {
    leading_date_re().is_match(line) || full_date_re().is_match(line)
}

/// Keeps only the lines for which [`is_dated_line`] holds, in order.
pub fn dated_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    lines
        .into_iter()
        .filter(|line| is_dated_line(line))
        .map(str::to_string)
        .collect()
}

/// Decides what kind of record a line is. Purchase markers take precedence over the year marker.
pub fn classify_line(line: &str) -> LineKind {
    if PURCHASE_MARKERS.iter().any(|m| line.contains(m)) {
        LineKind::Purchase
    } else if line.contains(YEAR_MARKER) {
        LineKind::YearMarker
    } else {
        LineKind::Deposit
    }
}

/// Classifies every line and collects the results.
///
/// The year comes from the last `Fee period` line; if that line has no readable year the
/// statement year is left unresolved.
pub fn parse_statement<S: AsRef<str>>(lines: &[S]) -> Statement {
    let mut statement = Statement::default();
    for line in lines {
        let line = line.as_ref();
        match classify_line(line) {
            LineKind::Purchase => statement.purchases.push(extract_purchase(line)),
            LineKind::YearMarker => {
                statement.year = extract_year(line);
                if statement.year.is_none() {
                    warn!("Found a '{YEAR_MARKER}' line without a year: {line}");
                }
            }
            LineKind::Deposit => statement.deposits.push(extract_deposit(line)),
        }
    }
    debug!(
        "Parsed {} purchases and {} deposits, year {:?}",
        statement.purchases.len(),
        statement.deposits.len(),
        statement.year
    );
    statement
}

/// Builds a purchase from a line.
pub fn extract_purchase(line: &str) -> Purchase {
    let label = label_re()
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(DEFAULT_LABEL);
    let purchase = Purchase::new(extract_date(line), clean_label(label), extract_amount(line));
    trace!("{purchase:?} <- {line}");
    purchase
}

/// Builds a deposit from a line.
pub fn extract_deposit(line: &str) -> Deposit {
    let deposit = Deposit::new(extract_date(line), extract_amount(line));
    trace!("{deposit:?} <- {line}");
    deposit
}

/// Reads the year out of a `Fee period mm/dd/yyyy` line.
pub fn extract_year(line: &str) -> Option<i32> {
    year_re()
        .captures(line)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// The leading `m/d` of the line, or `00/00`.
pub fn extract_date(line: &str) -> StatementDate {
    leading_date_re()
        .captures(line)
        .and_then(|c| {
            let month = c.get(1)?.as_str().parse().ok()?;
            let day = c.get(2)?.as_str().parse().ok()?;
            Some(StatementDate::new(month, day))
        })
        .unwrap_or(StatementDate::UNKNOWN)
}

/// The first `123.45` looking number in the line, or zero.
pub fn extract_amount(line: &str) -> Amount {
    amount_re()
        .find(line)
        .and_then(|m| Amount::from_str(m.as_str()).ok())
        .unwrap_or_default()
}

/// Reduces a raw purchase description to the merchant name: punctuation is dropped, a street
/// number and everything after it is cut off, and whitespace is collapsed.
///
/// `STARBUCKS STORE #123 SEATTLE WA` becomes `STARBUCKS STORE`.
pub fn clean_label(label: &str) -> String {
    let cleaned = non_alphanumeric_re().replace_all(label, "");
    let cleaned = address_re().replace(&cleaned, "");
    whitespace_re().replace_all(&cleaned, " ").trim().to_string()
}
