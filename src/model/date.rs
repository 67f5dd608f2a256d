use crate::error::LedgerError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A calendar month. Stored in the dataset by its English name, e.g. `"March"`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

serde_plain::derive_display_from_serialize!(Month);
serde_plain::derive_fromstr_from_deserialize!(Month);

impl Month {
    /// All twelve months in calendar order.
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Returns the month for a 1-based month number, or `None` outside 1-12.
    pub fn from_number(number: u32) -> Option<Month> {
        let ix = usize::try_from(number).ok()?.checked_sub(1)?;
        Self::ALL.get(ix).copied()
    }

    /// The 1-based month number, January is 1.
    pub fn number(self) -> u32 {
        self.index() as u32 + 1
    }

    /// The 0-based position of the month in a year, January is 0.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The `month/day` found at the start of a statement line, e.g. `03/14`.
///
/// The numbers are kept as they were read. Lines without a date get [`StatementDate::UNKNOWN`]
/// (`00/00`) so the transaction is still recorded, and [`StatementDate::month`] is where an
/// impossible month is rejected.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct StatementDate {
    month: u32,
    day: u32,
}

impl StatementDate {
    /// The `00/00` placeholder for lines that had no date.
    pub const UNKNOWN: StatementDate = StatementDate { month: 0, day: 0 };

    pub fn new(month: u32, day: u32) -> Self {
        Self { month, day }
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Validates and returns the calendar month.
    ///
    /// # Errors
    /// - [`LedgerError::InvalidMonth`] when the month is not 1 through 12.
    pub fn month(&self) -> Result<Month> {
        Month::from_number(self.month).ok_or_else(|| {
            LedgerError::InvalidMonth {
                date: self.to_string(),
                month: self.month,
            }
            .into()
        })
    }
}

impl Display for StatementDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{:02}", self.month, self.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_month_numbers() {
        assert_eq!(Month::from_number(1), Some(Month::January));
        assert_eq!(Month::from_number(12), Some(Month::December));
        assert_eq!(Month::from_number(0), None);
        assert_eq!(Month::from_number(13), None);
        assert_eq!(Month::March.index(), 2);
        assert_eq!(Month::March.number(), 3);
    }

    #[test]
    fn test_month_names() {
        assert_eq!(Month::May.to_string(), "May");
        assert_eq!(Month::from_str("September").unwrap(), Month::September);
        assert!(Month::from_str("Sept").is_err());
    }

    #[test]
    fn test_statement_date_display() {
        let date = StatementDate::new(3, 14);
        assert_eq!(date.to_string(), "03/14");
        assert_eq!(date.month().unwrap(), Month::March);
        assert_eq!(date.day(), 14);
    }

    #[test]
    fn test_unknown_date_is_invalid_month() {
        let err = StatementDate::UNKNOWN.month().unwrap_err();
        let ledger_err = err.downcast_ref::<LedgerError>().unwrap();
        assert_eq!(
            *ledger_err,
            LedgerError::InvalidMonth {
                date: "00/00".to_string(),
                month: 0
            }
        );
    }

    #[test]
    fn test_month_thirteen_is_invalid() {
        assert!(StatementDate::new(13, 1).month().is_err());
    }
}
