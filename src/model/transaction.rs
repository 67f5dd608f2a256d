use crate::model::{Amount, StatementDate};
use serde::Serialize;

/// The category reported for a purchase that has not been resolved yet.
pub const UNRESOLVED_CATEGORY: &str = "Other";

/// A purchase extracted from a statement line.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Purchase {
    #[serde(serialize_with = "serialize_display")]
    date: StatementDate,
    label: String,
    amount: Amount,
    category: Option<String>,
}

impl Purchase {
    pub fn new(date: StatementDate, label: impl Into<String>, amount: Amount) -> Self {
        Self {
            date,
            label: label.into(),
            amount,
            category: None,
        }
    }

    pub fn date(&self) -> StatementDate {
        self.date
    }

    /// The cleaned merchant text, e.g. `STARBUCKS STORE`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// The assigned category, or [`UNRESOLVED_CATEGORY`] before one has been assigned.
    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or(UNRESOLVED_CATEGORY)
    }

    pub fn is_resolved(&self) -> bool {
        self.category.is_some()
    }

    /// Assigns the category. The first assignment sticks; later calls are ignored.
    pub fn assign_category(&mut self, category: impl Into<String>) {
        if self.category.is_none() {
            self.category = Some(category.into());
        }
    }
}

/// A deposit extracted from a statement line.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Deposit {
    #[serde(serialize_with = "serialize_display")]
    date: StatementDate,
    amount: Amount,
}

impl Deposit {
    pub fn new(date: StatementDate, amount: Amount) -> Self {
        Self { date, amount }
    }

    pub fn date(&self) -> StatementDate {
        self.date
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }
}

/// Everything the line classifier found in one statement file.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct Statement {
    pub(crate) purchases: Vec<Purchase>,
    pub(crate) deposits: Vec<Deposit>,
    /// The year from the last `Fee period` line, `None` when no such line had a usable year.
    pub(crate) year: Option<i32>,
}

impl Statement {
    pub fn purchases(&self) -> &[Purchase] {
        &self.purchases
    }

    pub fn deposits(&self) -> &[Deposit] {
        &self.deposits
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn is_empty(&self) -> bool {
        self.purchases.is_empty() && self.deposits.is_empty()
    }

    /// Splits the statement into its parts, for handing to the aggregation engine.
    pub fn into_parts(self) -> (Vec<Purchase>, Vec<Deposit>, Option<i32>) {
        (self.purchases, self.deposits, self.year)
    }
}

fn serialize_display<S>(date: &StatementDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(date)
}
