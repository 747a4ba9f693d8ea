//! Advice command implementation

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use spendlens_core::advice::{Advice, AdviceBackend, AdviceClient, Advisor};
use spendlens_core::{FinancialSummary, Pipeline};

use super::{load_transactions, money, print_json};

#[derive(Serialize)]
struct AdviceOutput<'a> {
    summary: &'a FinancialSummary,
    advice: &'a Advice,
}

pub async fn cmd_advice(
    pipeline: &Pipeline<'_>,
    file: &Path,
    timeout_secs: Option<u64>,
    json: bool,
) -> Result<()> {
    let timeout = timeout_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| pipeline.config().advice.timeout());
    let advisor = Advisor::new(AdviceClient::from_env(), timeout);
    run_advice(pipeline, file, &advisor, json).await
}

/// Advice with a caller-supplied advisor
pub async fn run_advice(
    pipeline: &Pipeline<'_>,
    file: &Path,
    advisor: &Advisor,
    json: bool,
) -> Result<()> {
    let imported = load_transactions(file)?;
    let summary = pipeline.financial_summary(&imported.transactions);
    let advice = advisor.advise(&summary).await;

    if json {
        return print_json(&AdviceOutput {
            summary: &summary,
            advice: &advice,
        });
    }

    println!();
    println!("💰 Financial Summary ({})", summary.month);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Balance:         {}", money(summary.total_balance));
    println!("   Income:          {}", money(summary.monthly_income));
    println!("   Expenses:        {}", money(summary.monthly_expenses));
    println!("   Savings:         {}", money(summary.monthly_savings));
    println!("   Savings rate:    {:.1}%", summary.savings_rate);
    println!();

    match advisor.backend() {
        Some(backend) if advice.ai_generated => {
            println!("🤖 Advice ({} / {})", backend.name(), backend.model())
        }
        Some(backend) => println!(
            "📋 Advice (built-in rules, {} unavailable)",
            backend.name()
        ),
        None => println!("📋 Advice (built-in rules)"),
    }
    println!();
    for line in advice.text.lines() {
        println!("   {}", line);
    }
    println!();

    Ok(())
}
