pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Failures in the ledger domain that callers may need to tell apart from I/O problems. These
/// travel inside an `anyhow::Error` and can be recovered with `downcast_ref::<LedgerError>()`.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum LedgerError {
    /// A transaction date whose month is not 1 through 12, including the `00/00` placeholder used
    /// for lines that had no leading date.
    #[error("The transaction date '{date}' has month {month}, which is not between 1 and 12")]
    InvalidMonth { date: String, month: u32 },

    /// The statement had no usable `Fee period` line and no year was given explicitly.
    #[error("Unable to determine the statement year, no 'Fee period' line with a year was found")]
    MissingYear,

    /// The category decision returned a name that is not in the category list.
    #[error("'{choice}' is not one of the known categories")]
    UnknownCategory { choice: String },
}
