use crate::commands::Out;
use crate::model::{Amount, CategoryTotals, Month, MonthData, YearData};
use crate::{Config, Result};
use anyhow::Context;
use rust_decimal::Decimal;
use std::fmt::Write;

/// Category shares below this percentage are listed without their share.
const MIN_SHARE: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Renders the totals of a year, or of one month of it, as text.
///
/// Without `year` the most recent year in the dataset is used.
///
/// # Errors
/// - The dataset cannot be read, or has no record for `year`.
pub fn report(config: &Config, year: Option<i32>, month: Option<Month>) -> Result<Out<YearData>> {
    let data = config.store().load()?;
    let year_data = match year {
        Some(y) => data
            .year(y)
            .with_context(|| format!("There is no data for {y}"))?,
        None => data.latest().context("The dataset is empty")?,
    };

    let (message, text) = match month {
        Some(m) => (
            format!("Report for {m} {}", year_data.year()),
            render_month(year_data.year(), year_data.month(m))?,
        ),
        None => (
            format!("Report for {}", year_data.year()),
            render_year(year_data)?,
        ),
    };
    Ok(Out::new(message, year_data.clone()).with_output(text))
}

fn render_year(year: &YearData) -> Result<String> {
    let mut s = String::new();
    writeln!(s, "{}", year.year())?;
    writeln!(s, "  {:<18}{:>14}", "Total spent", year.total_spent().to_string())?;
    writeln!(s, "  {:<18}{:>14}", "Total earned", year.total_earned().to_string())?;
    writeln!(s, "  {:<18}{:>14}", "Average spending", year.average_spending().to_string())?;
    writeln!(s, "  {:<18}{:>14}", "Average earning", year.average_earning().to_string())?;

    let active: Vec<&MonthData> = year.months().iter().filter(|m| m.is_active()).collect();
    if !active.is_empty() {
        writeln!(s)?;
        writeln!(s, "  {:<12}{:>14}{:>14}", "Month", "Spent", "Earned")?;
        for m in active {
            writeln!(
                s,
                "  {:<12}{:>14}{:>14}",
                m.month().to_string(),
                m.total_spent().to_string(),
                m.total_earned().to_string()
            )?;
        }
    }

    render_categories(&mut s, year.categories(), year.total_spent())?;
    Ok(s)
}

fn render_month(year: i32, month: &MonthData) -> Result<String> {
    let mut s = String::new();
    writeln!(s, "{} {year}", month.month())?;
    writeln!(s, "  {:<18}{:>14}", "Total spent", month.total_spent().to_string())?;
    writeln!(s, "  {:<18}{:>14}", "Total earned", month.total_earned().to_string())?;
    render_categories(&mut s, month.categories(), month.total_spent())?;
    Ok(s)
}

/// Lists categories from largest to smallest with their share of `total`.
fn render_categories(s: &mut String, categories: &CategoryTotals, total: Amount) -> Result<()> {
    if categories.is_empty() {
        return Ok(());
    }
    let mut sorted: Vec<(&String, &Amount)> = categories.iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    writeln!(s)?;
    writeln!(s, "  {:<18}{:>14}{:>8}", "Category", "Spent", "Share")?;
    for (name, amount) in sorted {
        let share = amount.percent_of(total);
        let share = if share >= MIN_SHARE {
            format!("{share:.1}%")
        } else {
            String::new()
        };
        writeln!(s, "  {:<18}{:>14}{:>8}", name, amount.to_string(), share)?;
    }
    Ok(())
}
