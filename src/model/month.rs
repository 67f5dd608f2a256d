use crate::model::{Amount, Deposit, Month};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Spending by category name.
pub type CategoryTotals = BTreeMap<String, Amount>;

/// The running totals for one calendar month.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MonthData {
    month: Month,
    total_spent: Amount,
    total_earned: Amount,
    #[serde(default)]
    categories: CategoryTotals,
}

impl MonthData {
    pub fn new(month: Month) -> Self {
        Self {
            month,
            total_spent: Amount::ZERO,
            total_earned: Amount::ZERO,
            categories: CategoryTotals::new(),
        }
    }

    pub fn month(&self) -> Month {
        self.month
    }

    pub fn total_spent(&self) -> Amount {
        self.total_spent
    }

    pub fn total_earned(&self) -> Amount {
        self.total_earned
    }

    pub fn categories(&self) -> &CategoryTotals {
        &self.categories
    }

    /// Adds a purchase of `amount` in `category` to this month.
    pub(crate) fn add_purchase(&mut self, category: &str, amount: Amount) {
        self.total_spent += amount;
        *self
            .categories
            .entry(category.to_string())
            .or_insert(Amount::ZERO) += amount;
        self.truncate();
    }

    pub(crate) fn add_deposit(&mut self, deposit: &Deposit) {
        self.total_earned += deposit.amount();
        self.truncate();
    }

    /// A month has spending activity when anything was spent in it.
    pub fn has_spending(&self) -> bool {
        !self.total_spent.is_zero()
    }

    /// A month has earning activity when anything was earned in it.
    pub fn has_earnings(&self) -> bool {
        !self.total_earned.is_zero()
    }

    /// True when the month has either spending or earnings.
    pub fn is_active(&self) -> bool {
        self.has_spending() || self.has_earnings()
    }

    fn truncate(&mut self) {
        self.total_spent = self.total_spent.truncate();
        self.total_earned = self.total_earned.truncate();
        for amount in self.categories.values_mut() {
            *amount = amount.truncate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StatementDate;
    use std::str::FromStr;

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[test]
    fn test_add_purchase_buckets_by_category() {
        let mut m = MonthData::new(Month::March);
        m.add_purchase("Food", amt("5.75"));
        m.add_purchase("Food", amt("4.25"));
        m.add_purchase("Bills", amt("100.00"));
        assert_eq!(m.total_spent(), amt("110.00"));
        assert_eq!(m.categories().get("Food"), Some(&amt("10.00")));
        assert_eq!(m.categories().get("Bills"), Some(&amt("100.00")));
        assert!(m.has_spending());
        assert!(!m.has_earnings());
    }

    #[test]
    fn test_add_truncates() {
        let mut m = MonthData::new(Month::May);
        m.add_deposit(&Deposit::new(StatementDate::new(5, 2), amt("12.3456")));
        assert_eq!(m.total_earned(), amt("12.34"));
        m.add_purchase("Food", amt("12.999"));
        assert_eq!(m.total_spent(), amt("12.99"));
        assert_eq!(m.categories()["Food"], amt("12.99"));
    }

    #[test]
    fn test_serialized_field_names() {
        let m = MonthData::new(Month::January);
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["month"], "January");
        assert_eq!(json["total_spent"], 0.0);
        assert_eq!(json["total_earned"], 0.0);
        assert!(json["categories"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_deserialize_without_categories() {
        let json = r#"{"month": "June", "total_spent": 10.5, "total_earned": 0}"#;
        let m: MonthData = serde_json::from_str(json).unwrap();
        assert_eq!(m.month(), Month::June);
        assert_eq!(m.total_spent(), amt("10.50"));
        assert!(m.categories().is_empty());
    }
}
