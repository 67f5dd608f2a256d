use crate::commands::Out;
use crate::{Config, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// The contents of the merchant dictionary.
#[derive(Debug, Clone, Serialize, Eq, PartialEq)]
pub struct MerchantList {
    pub categories: Vec<String>,
    pub merchants: BTreeMap<String, String>,
}

/// Lists the categories and every merchant the dictionary has learned, grouped by category.
pub fn merchants(config: &Config) -> Result<Out<MerchantList>> {
    let dictionary = config.dictionary()?;

    let mut s = String::new();
    for category in dictionary.categories() {
        writeln!(s, "{category}")?;
        for (merchant, _) in dictionary
            .merchants()
            .iter()
            .filter(|(_, c)| *c == category)
        {
            writeln!(s, "  {merchant}")?;
        }
    }
    // Mappings whose category was since removed from the list
    for (merchant, category) in dictionary
        .merchants()
        .iter()
        .filter(|(_, c)| !dictionary.is_category(c))
    {
        writeln!(s, "{merchant} -> {category} (not a listed category)")?;
    }

    let list = MerchantList {
        categories: dictionary.categories().to_vec(),
        merchants: dictionary.merchants().clone(),
    };
    Ok(Out::new(
        format!(
            "{} categories, {} known merchants",
            list.categories.len(),
            list.merchants.len()
        ),
        list,
    )
    .with_output(s))
}
