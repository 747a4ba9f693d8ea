//! Integration tests for spendlens-core
//!
//! These tests exercise the full load → analyze → forecast → advice workflow.

use std::io::Write;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use spendlens_core::{
    advice::{AdviceClient, Advisor, MockBackend},
    import::{load_file, parse_csv},
    models::{AnalyzeRequest, ForecastRequest, SpendingTrend},
    AnalyticsConfig, Error, ForecastMode, KeywordCategorizer, Pipeline,
};

/// Three months of a household budget with one obviously unusual purchase
fn household_csv() -> &'static str {
    "id,description,amount,type,category,date
1,Salary,4000,INCOME,Income,2024-03-01
2,Rent,1500,EXPENSE,Housing,2024-03-02
3,Whole Foods,220,EXPENSE,Groceries,2024-03-08
4,Restaurant dinner,80,EXPENSE,Food & Dining,2024-03-16T19:30:00
5,Salary,4000,INCOME,Income,2024-04-01
6,Rent,1500,EXPENSE,Housing,2024-04-02
7,Whole Foods,240,EXPENSE,Groceries,2024-04-09
8,Netflix subscription,15.99,EXPENSE,Entertainment,2024-04-12
9,Salary,4000,INCOME,Income,2024-05-01
10,Rent,1500,EXPENSE,Housing,2024-05-02
11,Whole Foods,210,EXPENSE,Groceries,2024-05-07
12,New laptop,4000,EXPENSE,Shopping,2024-05-20"
}

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 25)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

#[test]
fn test_load_and_analyze_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("household.csv");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(household_csv().as_bytes())
        .unwrap();

    let imported = load_file(&path).expect("Failed to load CSV");
    assert_eq!(imported.transactions.len(), 12);

    let config = AnalyticsConfig::default();
    let pipeline = Pipeline::new(&config, now());
    let response = pipeline.analyze(&AnalyzeRequest {
        user_id: 42,
        transactions: imported.transactions,
    });

    assert_eq!(response.user_id, 42);
    assert_eq!(response.total_transactions, 12);
    assert_eq!(response.total_income, 12000.0);
    assert!((response.net_balance - (12000.0 - 9265.99)).abs() < 1e-9);

    // Categories sorted by total, percentages sum to 100
    assert_eq!(response.category_breakdown[0].category, "Housing");
    let pct: f64 = response
        .category_breakdown
        .iter()
        .map(|c| c.percentage_of_total)
        .sum();
    assert!((pct - 100.0).abs() < 1e-9);
    assert_eq!(response.top_spending_categories.len(), 5);

    // Months ascending, net = income - spending
    let months: Vec<String> = response
        .monthly_breakdown
        .iter()
        .map(|m| m.month.to_string())
        .collect();
    assert_eq!(months, vec!["2024-03", "2024-04", "2024-05"]);
    for m in &response.monthly_breakdown {
        assert_eq!(m.net_savings, m.total_income - m.total_spending);
    }
    assert_eq!(response.monthly_breakdown[2].top_category, "Shopping");

    // The laptop stands out against eight ordinary expenses
    assert_eq!(response.unusual_transactions.len(), 1);
    assert_eq!(response.unusual_transactions[0].id, 12);

    assert!(response.insights[0].contains("Housing"));
    assert!(response.insights.iter().any(|i| i.contains("increased")));
    assert!(response.insights.iter().any(|i| i.contains("1 unusually large")));
}

#[test]
fn test_forecast_workflow() {
    let transactions = parse_csv(household_csv().as_bytes()).unwrap();
    let config = AnalyticsConfig::default();
    let response = Pipeline::new(&config, now()).forecast(&ForecastRequest {
        user_id: 42,
        transactions,
        forecast_months: 6,
    });

    let forecast = &response.forecast;
    assert_eq!(forecast.mode, ForecastMode::TrendFit);
    assert_eq!(forecast.forecasts.len(), 6);
    assert_eq!(forecast.spending_trend, SpendingTrend::Increasing);
    assert_eq!(forecast.average_monthly_income, 4000.0);

    for point in &forecast.forecasts {
        assert!(point.predicted_spending >= 0.0);
        assert!(point.confidence_lower >= 0.0);
        assert!(point.confidence_upper >= point.predicted_spending);
        assert_eq!(
            point.predicted_savings,
            point.predicted_income - point.predicted_spending
        );
    }
    for pair in forecast.forecasts.windows(2) {
        assert!(pair[0].month < pair[1].month);
    }
    assert_eq!(forecast.forecasts[0].month.to_string(), "2024-06");
}

#[test]
fn test_category_detail_workflow() {
    let transactions = parse_csv(household_csv().as_bytes()).unwrap();
    let config = AnalyticsConfig::default();
    let pipeline = Pipeline::new(&config, now());

    let detail = pipeline.category_detail(&transactions, "Groceries").unwrap();
    assert_eq!(detail.transaction_count, 3);
    assert_eq!(detail.total_spent, 670.0);
    assert_eq!(detail.min_transaction, 210.0);
    assert_eq!(detail.max_transaction, 240.0);
    assert_eq!(detail.recent_transactions[0].amount, 210.0);

    let err = pipeline.category_detail(&transactions, "Travel").unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_patterns_and_categorizer() {
    let transactions = parse_csv(household_csv().as_bytes()).unwrap();
    let config = AnalyticsConfig::default();
    let response = Pipeline::new(&config, now()).patterns(42, &transactions);
    assert!((1..=10).contains(&response.report.risk_score));
    assert!(response
        .report
        .patterns
        .iter()
        .any(|p| p.pattern_type.as_str() == "subscriptions"));

    let categorizer = KeywordCategorizer::new(&config.categories).unwrap();
    let results = categorizer.categorize_batch(&["Whole Foods", "Uber to airport"]);
    assert_eq!(results[0].category, "Groceries");
    assert_eq!(results[1].category, "Transportation");
}

#[tokio::test]
async fn test_advice_from_backend() {
    let transactions = parse_csv(household_csv().as_bytes()).unwrap();
    let config = AnalyticsConfig::default();
    let pipeline = Pipeline::new(&config, now());

    let advisor = Advisor::new(
        Some(AdviceClient::Mock(MockBackend::with_reply("Cut back on gadgets."))),
        config.advice.timeout(),
    );

    let advice = pipeline.advise(&transactions, &advisor).await;
    assert!(advice.ai_generated);
    assert_eq!(advice.backend, "mock");
    assert_eq!(advice.text, "Cut back on gadgets.");
}

#[tokio::test]
async fn test_advice_falls_back_when_backend_unreachable() {
    let transactions = parse_csv(household_csv().as_bytes()).unwrap();
    let config = AnalyticsConfig::default();
    let pipeline = Pipeline::new(&config, now());

    // Nothing listens on port 1
    let advisor = Advisor::new(
        Some(AdviceClient::ollama("http://127.0.0.1:1", "llama3.2")),
        Duration::from_secs(5),
    );

    let advice = pipeline.advise(&transactions, &advisor).await;
    assert!(!advice.ai_generated);
    assert_eq!(advice.backend, "rule_based");
    // May: 4000 income, 5710 expenses
    assert!(advice.text.starts_with("⚠️ **Alert**"));
    assert!(advice.text.contains("**Shopping** represents"));
}
