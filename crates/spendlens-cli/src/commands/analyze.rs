//! Analysis command implementations (analyze, category, patterns)

use std::path::Path;

use anyhow::Result;
use spendlens_core::models::AnalyzeRequest;
use spendlens_core::patterns::PatternImpact;
use spendlens_core::{Error, Pipeline};

use super::{load_transactions, money, print_json, resolve_user_id, truncate};

pub fn cmd_analyze(pipeline: &Pipeline, file: &Path, user: Option<i64>, json: bool) -> Result<()> {
    let imported = load_transactions(file)?;
    let request = AnalyzeRequest {
        user_id: resolve_user_id(user, &imported),
        transactions: imported.transactions,
    };
    let report = pipeline.analyze(&request);

    if json {
        return print_json(&report);
    }

    println!();
    println!("📊 Spending Analysis");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Transactions:  {}", report.total_transactions);
    println!("   Income:        {}", money(report.total_income));
    println!("   Expenses:      {}", money(report.total_expenses));
    println!("   Net:           {}", money(report.net_balance));

    if !report.category_breakdown.is_empty() {
        println!();
        println!("🏷️  By Category");
        println!(
            "   {:<25} {:>12} {:>6} {:>12} {:>7}",
            "CATEGORY", "TOTAL", "COUNT", "AVERAGE", "SHARE"
        );
        println!("   {}", "-".repeat(66));
        for c in &report.category_breakdown {
            println!(
                "   {:<25} {:>12} {:>6} {:>12} {:>6.1}%",
                truncate(&c.category, 25),
                money(c.total_spent),
                c.transaction_count,
                money(c.average_transaction),
                c.percentage_of_total
            );
        }
    }

    if !report.monthly_breakdown.is_empty() {
        println!();
        println!("📅 By Month");
        println!(
            "   {:<8} {:>12} {:>12} {:>12}  {}",
            "MONTH", "INCOME", "SPENDING", "NET", "TOP CATEGORY"
        );
        println!("   {}", "-".repeat(66));
        for m in &report.monthly_breakdown {
            println!(
                "   {:<8} {:>12} {:>12} {:>12}  {}",
                m.month.to_string(),
                money(m.total_income),
                money(m.total_spending),
                money(m.net_savings),
                m.top_category
            );
        }
    }

    if !report.unusual_transactions.is_empty() {
        println!();
        println!("🔍 Unusual Transactions");
        for u in &report.unusual_transactions {
            println!(
                "   #{:<6} {:<30} {:>12}  {}",
                u.id,
                truncate(&u.description, 30),
                money(u.amount),
                u.reason
            );
        }
    }

    println!();
    println!("💡 Insights");
    for insight in &report.insights {
        println!("   • {}", insight);
    }
    println!();

    Ok(())
}

pub fn cmd_category(pipeline: &Pipeline, file: &Path, name: &str, json: bool) -> Result<()> {
    let imported = load_transactions(file)?;

    let detail = match pipeline.category_detail(&imported.transactions, name) {
        Ok(detail) => detail,
        Err(Error::NotFound(msg)) => anyhow::bail!(msg),
        Err(e) => return Err(e.into()),
    };

    if json {
        return print_json(&detail);
    }

    println!();
    println!("🏷️  {}", detail.category);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Total:         {}", money(detail.total_spent));
    println!("   Transactions:  {}", detail.transaction_count);
    println!("   Average:       {}", money(detail.average_transaction));
    println!("   Smallest:      {}", money(detail.min_transaction));
    println!("   Largest:       {}", money(detail.max_transaction));
    println!();
    println!("   Recent:");
    for tx in &detail.recent_transactions {
        println!(
            "   {}  {:<35} {:>12}",
            tx.date.format("%Y-%m-%d"),
            truncate(&tx.description, 35),
            money(tx.amount)
        );
    }
    println!();

    Ok(())
}

pub fn cmd_patterns(pipeline: &Pipeline, file: &Path, user: Option<i64>, json: bool) -> Result<()> {
    let imported = load_transactions(file)?;
    let user_id = resolve_user_id(user, &imported);
    let response = pipeline.patterns(user_id, &imported.transactions);

    if json {
        return print_json(&response);
    }

    let report = &response.report;
    println!();
    println!("🧭 Spending Patterns");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Personality:  {}", report.spending_personality);
    println!("   Risk score:   {}/10", report.risk_score);

    if !report.patterns.is_empty() {
        println!();
        for p in &report.patterns {
            let icon = match p.impact {
                PatternImpact::Positive => "✅",
                PatternImpact::Negative => "⚠️ ",
                PatternImpact::Neutral => "•",
            };
            println!("   {} {}", icon, p.description);
            if let Some(ref rec) = p.recommendation {
                println!("      → {}", rec);
            }
        }
    }

    println!();
    println!("   Strengths:");
    for s in &report.strengths {
        println!("   + {}", s);
    }
    println!("   Areas for improvement:");
    for a in &report.areas_for_improvement {
        println!("   - {}", a);
    }
    println!();

    Ok(())
}
