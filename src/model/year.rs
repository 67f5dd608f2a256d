use crate::model::{Amount, CategoryTotals, Deposit, Month, MonthData, Purchase};
use crate::resolve::Categorize;
use crate::Result;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, trace};

/// The totals for one calendar year, broken down into twelve `MonthData`.
///
/// After every batch the year totals are recomputed from the months, so
/// `total_spent == months.total_spent.sum()` and likewise for `total_earned`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct YearData {
    year: i32,
    total_spent: Amount,
    total_earned: Amount,
    average_spending: Amount,
    average_earning: Amount,
    #[serde(default)]
    categories: CategoryTotals,
    #[serde(deserialize_with = "deserialize_months")]
    months: Vec<MonthData>,
}

impl YearData {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            total_spent: Amount::ZERO,
            total_earned: Amount::ZERO,
            average_spending: Amount::ZERO,
            average_earning: Amount::ZERO,
            categories: CategoryTotals::new(),
            months: empty_months(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn total_spent(&self) -> Amount {
        self.total_spent
    }

    pub fn total_earned(&self) -> Amount {
        self.total_earned
    }

    pub fn average_spending(&self) -> Amount {
        self.average_spending
    }

    pub fn average_earning(&self) -> Amount {
        self.average_earning
    }

    pub fn categories(&self) -> &CategoryTotals {
        &self.categories
    }

    /// The twelve months, January first.
    pub fn months(&self) -> &[MonthData] {
        &self.months
    }

    pub fn month(&self, month: Month) -> &MonthData {
        &self.months[month.index()]
    }

    /// Adds a batch of purchases, resolving the category of each unresolved purchase through
    /// `categorizer`, then recomputes the year totals and averages.
    ///
    /// The batch is all or nothing. Every date is validated before anything else happens, and the
    /// categories are all resolved before any total changes.
    ///
    /// # Errors
    /// - `LedgerError::InvalidMonth` if any purchase has a month outside 1-12 (e.g. `00/00`).
    /// - Any error returned by `categorizer`.
    pub fn add_purchases(
        &mut self,
        purchases: &mut [Purchase],
        categorizer: &mut dyn Categorize,
    ) -> Result<()> {
        let months = purchases
            .iter()
            .map(|p| p.date().month())
            .collect::<Result<Vec<Month>>>()?;

        for purchase in purchases.iter_mut().filter(|p| !p.is_resolved()) {
            let category = categorizer.categorize(purchase.label())?;
            trace!("'{}' categorized as '{category}'", purchase.label());
            purchase.assign_category(category);
        }

        for (purchase, month) in purchases.iter().zip(months) {
            self.months[month.index()].add_purchase(purchase.category(), purchase.amount());
            let bucket = self
                .categories
                .entry(purchase.category().to_string())
                .or_insert(Amount::ZERO);
            *bucket = (*bucket + purchase.amount()).truncate();
        }

        self.recompute();
        debug!("Added {} purchases to {}", purchases.len(), self.year);
        Ok(())
    }

    /// Adds a batch of deposits, then recomputes the year totals and averages.
    ///
    /// # Errors
    /// - `LedgerError::InvalidMonth` if any deposit has a month outside 1-12, in which case
    ///   nothing is added.
    pub fn add_deposits(&mut self, deposits: &[Deposit]) -> Result<()> {
        let months = deposits
            .iter()
            .map(|d| d.date().month())
            .collect::<Result<Vec<Month>>>()?;

        for (deposit, month) in deposits.iter().zip(months) {
            self.months[month.index()].add_deposit(deposit);
        }

        self.recompute();
        debug!("Added {} deposits to {}", deposits.len(), self.year);
        Ok(())
    }

    /// Recomputes the year totals from the months. Each average divides by the number of months
    /// that have that kind of activity, so a month with only deposits does not dilute the
    /// spending average. With no such months the average is zero.
    fn recompute(&mut self) {
        self.total_spent = self.months.iter().map(MonthData::total_spent).sum();
        self.total_earned = self.months.iter().map(MonthData::total_earned).sum();

        let spending_months = self.months.iter().filter(|m| m.has_spending()).count();
        let earning_months = self.months.iter().filter(|m| m.has_earnings()).count();
        self.average_spending = self.total_spent.average_over(spending_months);
        self.average_earning = self.total_earned.average_over(earning_months);

        self.truncate();
    }

    fn truncate(&mut self) {
        self.total_spent = self.total_spent.truncate();
        self.total_earned = self.total_earned.truncate();
        self.average_spending = self.average_spending.truncate();
        self.average_earning = self.average_earning.truncate();
        for amount in self.categories.values_mut() {
            *amount = amount.truncate();
        }
    }
}

fn empty_months() -> Vec<MonthData> {
    Month::ALL.iter().map(|&m| MonthData::new(m)).collect()
}

/// Places the stored months into a full January..December sequence, whatever order or subset
/// the file had them in. The first record for a month wins.
fn deserialize_months<'de, D>(deserializer: D) -> std::result::Result<Vec<MonthData>, D::Error>
where
    D: Deserializer<'de>,
{
    let stored = Vec::<MonthData>::deserialize(deserializer)?;
    let mut seen = [false; 12];
    let mut months = empty_months();
    for month in stored {
        let ix = month.month().index();
        if !seen[ix] {
            seen[ix] = true;
            months[ix] = month;
        }
    }
    Ok(months)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::model::StatementDate;
    use crate::test::FixedCategory;
    use std::str::FromStr;

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn purchase(month: u32, label: &str, amount: &str) -> Purchase {
        Purchase::new(StatementDate::new(month, 1), label, amt(amount))
    }

    fn deposit(month: u32, amount: &str) -> Deposit {
        Deposit::new(StatementDate::new(month, 1), amt(amount))
    }

    fn month_sum(year: &YearData) -> Amount {
        year.months().iter().map(MonthData::total_spent).sum()
    }

    #[test]
    fn test_new_year_has_twelve_ordered_months() {
        let y = YearData::new(2025);
        assert_eq!(y.months().len(), 12);
        for (ix, m) in y.months().iter().enumerate() {
            assert_eq!(m.month().index(), ix);
        }
    }

    #[test]
    fn test_total_spent_is_sum_of_months() {
        let mut y = YearData::new(2025);
        let mut purchases = vec![
            purchase(1, "a", "10.10"),
            purchase(3, "b", "5.75"),
            purchase(3, "c", "0.01"),
            purchase(12, "d", "99.99"),
        ];
        y.add_purchases(&mut purchases, &mut FixedCategory::new("Food"))
            .unwrap();
        assert_eq!(y.total_spent(), month_sum(&y));
        assert_eq!(y.total_spent(), amt("115.85"));

        let mut more = vec![purchase(3, "e", "1.00")];
        y.add_purchases(&mut more, &mut FixedCategory::new("Food"))
            .unwrap();
        assert_eq!(y.total_spent(), month_sum(&y));
        assert_eq!(y.month(Month::March).total_spent(), amt("6.76"));
    }

    #[test]
    fn test_purchase_goes_to_month_and_categories() {
        let mut y = YearData::new(2025);
        let mut purchases = vec![purchase(3, "STARBUCKS STORE", "5.75")];
        y.add_purchases(&mut purchases, &mut FixedCategory::new("Food"))
            .unwrap();
        assert_eq!(purchases[0].category(), "Food");
        let march = y.month(Month::March);
        assert_eq!(march.total_spent(), amt("5.75"));
        assert_eq!(march.categories()["Food"], amt("5.75"));
        assert_eq!(y.categories()["Food"], amt("5.75"));
    }

    #[test]
    fn test_resolved_purchase_is_not_recategorized() {
        let mut y = YearData::new(2025);
        let mut p = purchase(2, "rent", "1000.00");
        p.assign_category("Bills");
        let mut categorizer = FixedCategory::new("Food");
        y.add_purchases(&mut [p], &mut categorizer).unwrap();
        assert_eq!(categorizer.calls(), 0);
        assert_eq!(y.categories()["Bills"], amt("1000.00"));
    }

    #[test]
    fn test_averages_use_their_own_active_months() {
        let mut y = YearData::new(2025);
        let mut purchases = vec![purchase(1, "a", "100.00"), purchase(2, "b", "50.00")];
        y.add_purchases(&mut purchases, &mut FixedCategory::new("Food"))
            .unwrap();
        y.add_deposits(&[deposit(3, "900.00")]).unwrap();

        assert_eq!(y.average_spending(), amt("75.00"));
        assert_eq!(y.average_earning(), amt("900.00"));
    }

    #[test]
    fn test_average_truncates() {
        let mut y = YearData::new(2025);
        let mut purchases = vec![
            purchase(1, "a", "10.00"),
            purchase(2, "b", "10.00"),
            purchase(3, "c", "0.01"),
        ];
        y.add_purchases(&mut purchases, &mut FixedCategory::new("Food"))
            .unwrap();
        // 20.01 / 3 = 6.67
        assert_eq!(y.average_spending(), amt("6.67"));

        let mut y = YearData::new(2025);
        y.add_deposits(&[deposit(1, "10.00"), deposit(2, "10.00"), deposit(3, "9.99")])
            .unwrap();
        // 29.99 / 3 = 9.99666..
        assert_eq!(y.average_earning(), amt("9.99"));
    }

    #[test]
    fn test_year_categories_match_month_categories() {
        let mut y = YearData::new(2025);
        let mut purchases = vec![purchase(4, "a", "1.005"), purchase(4, "b", "2.005")];
        y.add_purchases(&mut purchases, &mut FixedCategory::new("Food"))
            .unwrap();
        // 1.00, then 1.00 + 2.005 = 3.00
        assert_eq!(y.month(Month::April).categories()["Food"], amt("3.00"));
        assert_eq!(y.categories()["Food"], amt("3.00"));
        assert_eq!(y.total_spent(), month_sum(&y));
    }

    #[test]
    fn test_no_active_months_average_is_zero() {
        let mut y = YearData::new(2025);
        y.add_purchases(&mut [], &mut FixedCategory::new("Food"))
            .unwrap();
        y.add_deposits(&[]).unwrap();
        assert_eq!(y.average_spending(), Amount::ZERO);
        assert_eq!(y.average_earning(), Amount::ZERO);

        // Zero-amount lines do not make a month active.
        y.add_deposits(&[deposit(4, "0.00")]).unwrap();
        assert_eq!(y.average_earning(), Amount::ZERO);
    }

    #[test]
    fn test_deposit_credited_to_may() {
        let mut y = YearData::new(2025);
        y.add_deposits(&[Deposit::new(StatementDate::new(5, 2), amt("1200.00"))])
            .unwrap();
        assert_eq!(y.months()[4].total_earned(), amt("1200.00"));
        assert_eq!(y.total_earned(), amt("1200.00"));
    }

    #[test]
    fn test_unknown_date_rejected_without_mutation() {
        let mut y = YearData::new(2025);
        let mut purchases = vec![
            purchase(3, "ok", "5.00"),
            Purchase::new(StatementDate::UNKNOWN, "Zelle", amt("20.00")),
        ];
        let mut categorizer = FixedCategory::new("Food");
        let err = y.add_purchases(&mut purchases, &mut categorizer).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LedgerError>(),
            Some(LedgerError::InvalidMonth { month: 0, .. })
        ));
        assert_eq!(categorizer.calls(), 0);
        assert_eq!(y, YearData::new(2025));

        let err = y
            .add_deposits(&[deposit(5, "1.00"), Deposit::new(StatementDate::UNKNOWN, amt("2"))])
            .unwrap_err();
        assert!(err.downcast_ref::<LedgerError>().is_some());
        assert_eq!(y, YearData::new(2025));
    }

    #[test]
    fn test_failed_categorization_leaves_year_unchanged() {
        let mut y = YearData::new(2025);
        let mut purchases = vec![purchase(3, "a", "5.00"), purchase(4, "b", "6.00")];
        let mut categorizer = FixedCategory::failing_after(1);
        assert!(y.add_purchases(&mut purchases, &mut categorizer).is_err());
        assert_eq!(y, YearData::new(2025));
    }

    #[test]
    fn test_months_deserialize_into_calendar_order() {
        let json = r#"{
            "year": 2024,
            "total_spent": 3.0,
            "total_earned": 0.0,
            "average_spending": 1.5,
            "average_earning": 0.0,
            "months": [
                {"month": "March", "total_spent": 1.0, "total_earned": 0.0},
                {"month": "January", "total_spent": 2.0, "total_earned": 0.0}
            ]
        }"#;
        let y: YearData = serde_json::from_str(json).unwrap();
        assert_eq!(y.months().len(), 12);
        assert_eq!(y.month(Month::January).total_spent(), amt("2"));
        assert_eq!(y.month(Month::March).total_spent(), amt("1"));
        assert_eq!(y.month(Month::December).total_spent(), Amount::ZERO);
        assert!(y.categories().is_empty());
    }
}
