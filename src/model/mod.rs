//! Types that represent the core data model, such as `Purchase`, `MonthData` and `AllData`.
mod all_data;
mod amount;
mod date;
mod month;
mod transaction;
mod year;

pub use all_data::AllData;
pub use amount::{Amount, AmountError};
pub use date::{Month, StatementDate};
pub use month::{CategoryTotals, MonthData};
pub use transaction::{Deposit, Purchase, Statement, UNRESOLVED_CATEGORY};
pub use year::YearData;
