use crate::commands::Out;
use crate::model::{Amount, YearData};
use crate::{utils, Config, Result};
use anyhow::Context;
use csv::WriterBuilder;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Writes the twelve months of `year` as CSV: one row per month with the spent and earned totals
/// followed by one column per category seen in the year. The CSV goes to `out` when given,
/// otherwise it becomes the command's output.
pub fn export(config: &Config, year: i32, out: Option<&Path>) -> Result<Out<()>> {
    let data = config.store().load()?;
    let year_data = data
        .year(year)
        .with_context(|| format!("There is no data for {year}"))?;
    let csv = to_csv(year_data)?;

    match out {
        Some(path) => {
            utils::write(path, &csv)?;
            debug!("Wrote {} bytes of CSV", csv.len());
            Ok(format!("Exported {year} to {}", path.display()).into())
        }
        None => Ok(Out::new_message(format!("Exported {year}")).with_output(csv)),
    }
}

fn to_csv(year: &YearData) -> Result<String> {
    let categories: BTreeSet<&str> = year
        .months()
        .iter()
        .flat_map(|m| m.categories().keys().map(String::as_str))
        .chain(year.categories().keys().map(String::as_str))
        .collect();

    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    let mut header = vec!["month", "total_spent", "total_earned"];
    header.extend(categories.iter().copied());
    writer
        .write_record(&header)
        .context("Unable to write the CSV header")?;

    for month in year.months() {
        let mut record = vec![
            month.month().to_string(),
            plain(month.total_spent()),
            plain(month.total_earned()),
        ];
        for category in &categories {
            let amount = month
                .categories()
                .get(*category)
                .copied()
                .unwrap_or(Amount::ZERO);
            record.push(plain(amount));
        }
        writer
            .write_record(&record)
            .with_context(|| format!("Unable to write the CSV row for {}", month.month()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to finish the CSV: {e}"))?;
    String::from_utf8(bytes).context("The CSV is not valid UTF-8")
}

/// `1234.5` as `1234.50`, without currency sign or grouping.
fn plain(amount: Amount) -> String {
    format!("{:.2}", amount.value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AllData, Purchase, StatementDate};
    use crate::test::{FixedCategory, TestEnv};
    use std::str::FromStr;

    fn setup() -> TestEnv {
        let env = TestEnv::new();
        let mut all = AllData::seeded(2024);
        let mut purchases = vec![Purchase::new(
            StatementDate::new(2, 3),
            "NETFLIX",
            Amount::from_str("15.5").unwrap(),
        )];
        all.add_statement(2024, &mut purchases, &[], &mut FixedCategory::new("Entertainment"))
            .unwrap();
        env.config().store().save(&all).unwrap();
        env
    }

    #[test]
    fn test_export_to_output() {
        let env = setup();
        let out = export(&env.config(), 2024, None).unwrap();
        let csv = out.output().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "month,total_spent,total_earned,Entertainment");
        assert_eq!(lines[1], "January,0.00,0.00,0.00");
        assert_eq!(lines[2], "February,15.50,0.00,15.50");
        assert_eq!(lines[12], "December,0.00,0.00,0.00");
    }

    #[test]
    fn test_export_to_file() {
        let env = setup();
        let path = env.config().root().join("2024.csv");
        let out = export(&env.config(), 2024, Some(&path)).unwrap();
        assert!(out.output().is_none());
        assert!(utils::read(&path).unwrap().starts_with("month,"));
    }

    #[test]
    fn test_export_missing_year() {
        let env = setup();
        assert!(export(&env.config(), 2020, None).is_err());
    }
}
