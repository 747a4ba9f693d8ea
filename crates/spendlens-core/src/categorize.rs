//! Keyword categorizer
//!
//! Suggests a category for a free-text description using the keyword table
//! from [`AnalyticsConfig`](crate::config::AnalyticsConfig). Keywords match
//! case-insensitively anywhere in the description, so "amazon" matches
//! "AMAZONPRIME*2K4" (and "gas" matches "Vegas"). The category with the most
//! matching keywords wins; ties go to the earlier table entry.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::CategoryKeywords;
use crate::error::{Error, Result};
use crate::models::UNCATEGORIZED;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Categorization {
    pub description: String,
    pub category: String,
    /// 0.0 (no match), 0.7, 0.85 or 0.95 (three or more matches)
    pub confidence: f64,
    pub matched_keywords: Vec<String>,
}

struct CompiledCategory {
    name: String,
    keywords: Vec<(String, Regex)>,
}

pub struct KeywordCategorizer {
    categories: Vec<CompiledCategory>,
}

impl KeywordCategorizer {
    /// Compile the keyword table
    pub fn new(table: &[CategoryKeywords]) -> Result<Self> {
        let categories = table
            .iter()
            .map(|entry| -> Result<CompiledCategory> {
                let keywords = entry
                    .keywords
                    .iter()
                    .map(|keyword| -> Result<(String, Regex)> {
                        let pattern = format!("(?i){}", regex::escape(keyword.trim()));
                        Ok((keyword.clone(), Regex::new(&pattern)?))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(CompiledCategory {
                    name: entry.name.clone(),
                    keywords,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { categories })
    }

    /// Categorize one description; blank input is rejected
    pub fn categorize(&self, description: &str) -> Result<Categorization> {
        if description.trim().is_empty() {
            return Err(Error::InvalidData(
                "Description cannot be empty".to_string(),
            ));
        }
        Ok(self.classify(description))
    }

    /// Categorize many descriptions; blank entries come back uncategorized
    pub fn categorize_batch<S: AsRef<str>>(&self, descriptions: &[S]) -> Vec<Categorization> {
        descriptions
            .iter()
            .map(|d| self.classify(d.as_ref()))
            .collect()
    }

    fn classify(&self, description: &str) -> Categorization {
        let mut best: Option<(&str, Vec<String>)> = None;

        for category in &self.categories {
            let matches: Vec<String> = category
                .keywords
                .iter()
                .filter(|(_, re)| re.is_match(description))
                .map(|(keyword, _)| keyword.clone())
                .collect();

            let best_count = best.as_ref().map_or(0, |(_, m)| m.len());
            if matches.len() > best_count {
                best = Some((&category.name, matches));
            }
        }

        let (category, matched_keywords) = match best {
            Some((name, matches)) => (name.to_string(), matches),
            None => (UNCATEGORIZED.to_string(), Vec::new()),
        };

        Categorization {
            description: description.to_string(),
            category,
            confidence: confidence_for(matched_keywords.len()),
            matched_keywords,
        }
    }
}

fn confidence_for(matches: usize) -> f64 {
    match matches {
        0 => 0.0,
        1 => 0.7,
        2 => 0.85,
        _ => 0.95,
    }
}
