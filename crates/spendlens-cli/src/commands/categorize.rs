//! Categorize command implementation

use anyhow::Result;
use spendlens_core::{AnalyticsConfig, KeywordCategorizer};

use super::{print_json, truncate};

pub fn cmd_categorize(config: &AnalyticsConfig, descriptions: &[String], json: bool) -> Result<()> {
    let categorizer = KeywordCategorizer::new(&config.categories)?;
    let results = categorizer.categorize_batch(descriptions);

    if json {
        return print_json(&results);
    }

    println!(
        "{:<40} {:<20} {:>10}  {}",
        "DESCRIPTION", "CATEGORY", "CONFIDENCE", "MATCHED"
    );
    println!("{}", "-".repeat(90));
    for r in &results {
        println!(
            "{:<40} {:<20} {:>9.0}%  {}",
            truncate(&r.description, 40),
            r.category,
            r.confidence * 100.0,
            r.matched_keywords.join(", ")
        );
    }

    Ok(())
}
