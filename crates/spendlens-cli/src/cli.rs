//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Spendlens - Understand where your money goes
#[derive(Parser)]
#[command(name = "spendlens")]
#[command(about = "Personal finance analytics: breakdowns, outliers, insights and forecasts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Analytics config file (defaults to the data directory override, then built-in values)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Totals, category and monthly breakdowns, unusual transactions and insights
    Analyze {
        /// Transaction file (.json or .csv)
        #[arg(short, long)]
        file: PathBuf,

        /// User ID to report (defaults to the file's user_id, or 0)
        #[arg(short, long)]
        user: Option<i64>,
    },

    /// Project spending, income and savings for the coming months
    Forecast {
        /// Transaction file (.json or .csv)
        #[arg(short, long)]
        file: PathBuf,

        /// Number of months to project (defaults to the configured horizon)
        #[arg(short, long)]
        months: Option<u32>,

        /// User ID to report (defaults to the file's user_id, or 0)
        #[arg(short, long)]
        user: Option<i64>,
    },

    /// Totals and recent transactions for one category
    Category {
        /// Transaction file (.json or .csv)
        #[arg(short, long)]
        file: PathBuf,

        /// Category name (exact match)
        #[arg(short, long)]
        name: String,
    },

    /// Spending habits, risk score and personality
    Patterns {
        /// Transaction file (.json or .csv)
        #[arg(short, long)]
        file: PathBuf,

        /// User ID to report (defaults to the file's user_id, or 0)
        #[arg(short, long)]
        user: Option<i64>,
    },

    /// Personalized advice for the current month
    ///
    /// Uses the backend selected by AI_BACKEND (ollama, openai_compatible,
    /// mock, none) and falls back to built-in rules if it is unavailable.
    Advice {
        /// Transaction file (.json or .csv)
        #[arg(short, long)]
        file: PathBuf,

        /// Seconds to wait for the advice backend (defaults to config)
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Suggest categories for transaction descriptions
    Categorize {
        /// One or more descriptions
        #[arg(required = true)]
        descriptions: Vec<String>,
    },

    /// Inspect the analytics configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Manage advice prompts
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Show the path where a config override should be placed
    Path,
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all available prompts and their override status
    List,

    /// Show the content of a specific prompt
    Show {
        /// Prompt ID (e.g., financial_advice)
        prompt_id: String,
    },

    /// Show the path where prompt overrides should be placed
    Path,
}
