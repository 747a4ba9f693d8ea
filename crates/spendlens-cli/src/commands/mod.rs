//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - Analysis commands (analyze, category, patterns)
//! - `forecast` - Spending forecast
//! - `advice` - Advice from an LLM backend or the built-in rules
//! - `categorize` - Keyword category suggestions
//! - `config` - Analytics configuration inspection
//! - `prompts` - Prompt library management commands

pub mod advice;
pub mod analyze;
pub mod categorize;
pub mod config;
pub mod forecast;
pub mod prompts;

// Re-export command functions for main.rs
pub use advice::*;
pub use analyze::*;
pub use categorize::*;
pub use config::*;
pub use forecast::*;
pub use prompts::*;

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use spendlens_core::{import, AnalyticsConfig, ImportedTransactions};

/// Explicit config file, or the default override / built-in values
pub fn load_config(path: Option<&Path>) -> Result<AnalyticsConfig> {
    match path {
        Some(path) => AnalyticsConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => AnalyticsConfig::load().context("Failed to load analytics config"),
    }
}

pub fn load_transactions(file: &Path) -> Result<ImportedTransactions> {
    import::load_file(file).with_context(|| format!("Failed to load {}", file.display()))
}

/// CLI flag wins over the file's user id
pub fn resolve_user_id(flag: Option<i64>, imported: &ImportedTransactions) -> i64 {
    flag.or(imported.user_id).unwrap_or(0)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Dollar amount rounded to cents with thousands separators
pub fn money(value: f64) -> String {
    let formatted = spendlens_core::summary::format_amount(value, 2);
    match formatted.strip_prefix('-') {
        Some(abs) => format!("-${}", abs),
        None => format!("${}", formatted),
    }
}

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
