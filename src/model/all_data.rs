use crate::model::{Deposit, Purchase, YearData};
use crate::resolve::Categorize;
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The whole dataset: one `YearData` per year, unique and sorted by year. Stored as a JSON array
/// of year records.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<YearData>", into = "Vec<YearData>")]
pub struct AllData {
    years: Vec<YearData>,
}

impl AllData {
    /// A dataset containing a single empty year.
    pub fn seeded(year: i32) -> Self {
        Self {
            years: vec![YearData::new(year)],
        }
    }

    pub fn years(&self) -> &[YearData] {
        &self.years
    }

    pub fn year(&self, year: i32) -> Option<&YearData> {
        self.years.iter().find(|y| y.year() == year)
    }

    /// The most recent year in the dataset.
    pub fn latest(&self) -> Option<&YearData> {
        self.years.last()
    }

    /// Applies one statement's purchases and deposits to `year`, creating the year if needed.
    ///
    /// Every date in the statement is checked before `categorizer` is asked anything. The work
    /// then happens on a copy of the year which replaces the stored one only when both batches
    /// succeed, so a failure leaves the dataset exactly as it was.
    pub fn add_statement(
        &mut self,
        year: i32,
        purchases: &mut [Purchase],
        deposits: &[Deposit],
        categorizer: &mut dyn Categorize,
    ) -> Result<()> {
        let dates = purchases.iter().map(Purchase::date);
        for date in dates.chain(deposits.iter().map(Deposit::date)) {
            date.month()?;
        }

        let mut staged = self
            .year(year)
            .cloned()
            .unwrap_or_else(|| YearData::new(year));
        staged.add_purchases(purchases, categorizer)?;
        staged.add_deposits(deposits)?;
        self.put(staged);
        debug!("Committed statement to {year}");
        Ok(())
    }

    /// Inserts or replaces the record for `data.year()`, keeping years sorted.
    fn put(&mut self, data: YearData) {
        match self.years.binary_search_by_key(&data.year(), YearData::year) {
            Ok(ix) => self.years[ix] = data,
            Err(ix) => self.years.insert(ix, data),
        }
    }
}

impl From<Vec<YearData>> for AllData {
    fn from(years: Vec<YearData>) -> Self {
        let mut all = AllData::default();
        for year in years {
            if all.year(year.year()).is_some() {
                warn!("Ignoring a duplicate record for year {}", year.year());
                continue;
            }
            all.put(year);
        }
        all
    }
}

impl From<AllData> for Vec<YearData> {
    fn from(value: AllData) -> Self {
        value.years
    }
}
