//! Spendlens CLI - Personal finance analytics
//!
//! Usage:
//!   spendlens analyze --file tx.csv          Breakdown, outliers and insights
//!   spendlens forecast --file tx.json -m 3   Three-month forecast
//!   spendlens advice --file tx.csv           Advice (LLM backend or built-in rules)
//!   spendlens categorize "STARBUCKS #123"    Suggest a category

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use spendlens_core::Pipeline;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;
    let pipeline = Pipeline::now(&config);
    let json = cli.json;

    match cli.command {
        Commands::Analyze { file, user } => commands::cmd_analyze(&pipeline, &file, user, json),
        Commands::Forecast { file, months, user } => {
            commands::cmd_forecast(&pipeline, &file, months, user, json)
        }
        Commands::Category { file, name } => {
            commands::cmd_category(&pipeline, &file, &name, json)
        }
        Commands::Patterns { file, user } => commands::cmd_patterns(&pipeline, &file, user, json),
        Commands::Advice { file, timeout_secs } => {
            commands::cmd_advice(&pipeline, &file, timeout_secs, json).await
        }
        Commands::Categorize { descriptions } => {
            commands::cmd_categorize(&config, &descriptions, json)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::cmd_config_show(&config),
            ConfigAction::Path => commands::cmd_config_path(&config),
        },
        Commands::Prompts { action } => match action {
            None | Some(PromptsAction::List) => commands::cmd_prompts_list(),
            Some(PromptsAction::Show { prompt_id }) => commands::cmd_prompts_show(&prompt_id),
            Some(PromptsAction::Path) => commands::cmd_prompts_path(),
        },
    }
}
