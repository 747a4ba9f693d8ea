//! Forecast command implementation

use std::path::Path;

use anyhow::Result;
use spendlens_core::models::ForecastRequest;
use spendlens_core::{ForecastMode, Pipeline};

use super::{load_transactions, money, print_json, resolve_user_id};

pub fn cmd_forecast(
    pipeline: &Pipeline,
    file: &Path,
    months: Option<u32>,
    user: Option<i64>,
    json: bool,
) -> Result<()> {
    let imported = load_transactions(file)?;
    let request = ForecastRequest {
        user_id: resolve_user_id(user, &imported),
        transactions: imported.transactions,
        forecast_months: months.unwrap_or(pipeline.config().forecast.default_horizon),
    };
    let response = pipeline.forecast(&request);

    if json {
        return print_json(&response);
    }

    let forecast = &response.forecast;
    println!();
    println!("🔮 Spending Forecast");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Average spending:  {}/mo",
        money(forecast.average_monthly_spending)
    );
    println!(
        "   Average income:    {}/mo",
        money(forecast.average_monthly_income)
    );
    println!("   Savings rate:      {:.1}%", forecast.savings_rate);
    print!("   Trend:             {}", forecast.spending_trend);
    match (forecast.mode, forecast.slope) {
        (ForecastMode::TrendFit, Some(slope)) => println!(" ({}/mo)", money(slope)),
        (ForecastMode::InsufficientHistory, _) => println!(" (not enough history)"),
        _ => println!(),
    }

    if !forecast.forecasts.is_empty() {
        println!();
        println!(
            "   {:<8} {:>12} {:>12} {:>12}   {}",
            "MONTH", "SPENDING", "INCOME", "SAVINGS", "95% RANGE"
        );
        println!("   {}", "-".repeat(72));
        for p in &forecast.forecasts {
            println!(
                "   {:<8} {:>12} {:>12} {:>12}   {} - {}",
                p.month.to_string(),
                money(p.predicted_spending),
                money(p.predicted_income),
                money(p.predicted_savings),
                money(p.confidence_lower),
                money(p.confidence_upper)
            );
        }
    }

    println!();
    println!("💡 {}", forecast.advice);
    println!();

    Ok(())
}
