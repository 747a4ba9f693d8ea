//! Spending pattern analysis
//!
//! Behavioral heuristics over a transaction list: weekend spending, category
//! concentration, small frequent purchases, irregular large expenses, income
//! stability and subscriptions. Each detected pattern carries an impact that
//! moves a 1-10 risk score (higher = more financial risk), which in turn picks
//! a spending personality label.

use serde::{Deserialize, Serialize};

use crate::models::NormalizedTransaction;

/// Risk score before any adjustment
const BASE_RISK_SCORE: i32 = 5;

/// Descriptions containing any of these are counted as subscriptions
pub const SUBSCRIPTION_KEYWORDS: &[&str] = &[
    "netflix",
    "spotify",
    "hulu",
    "subscription",
    "monthly",
    "membership",
];

const SMALL_PURCHASE_LIMIT: f64 = 20.0;
const SMALL_PURCHASE_SHARE: f64 = 0.6;
const CATEGORY_HEAVY_PERCENT: f64 = 40.0;
const LARGE_EXPENSE_FACTOR: f64 = 3.0;
const WEEKEND_SHARE: f64 = 0.5;
const WEEKEND_MIN_EXPENSES: usize = 5;
const INCOME_SPREAD_FACTOR: f64 = 0.1;
const FRUGAL_SPENDING_SHARE: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    WeekendSpender,
    CategoryHeavy,
    SmallPurchases,
    IrregularLarge,
    StableIncome,
    Subscriptions,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WeekendSpender => "weekend_spender",
            Self::CategoryHeavy => "category_heavy",
            Self::SmallPurchases => "small_purchases",
            Self::IrregularLarge => "irregular_large",
            Self::StableIncome => "stable_income",
            Self::Subscriptions => "subscriptions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternImpact {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingPattern {
    pub pattern_type: PatternType,
    pub description: String,
    pub impact: PatternImpact,
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternReport {
    pub patterns: Vec<SpendingPattern>,
    pub spending_personality: String,
    /// 1-10
    pub risk_score: u8,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
}

impl PatternReport {
    fn empty() -> Self {
        Self {
            patterns: vec![],
            spending_personality: "Unknown".to_string(),
            risk_score: BASE_RISK_SCORE as u8,
            strengths: vec![],
            areas_for_improvement: vec![
                "Add transactions to analyze your spending patterns".to_string()
            ],
        }
    }
}

fn pattern(
    pattern_type: PatternType,
    description: String,
    impact: PatternImpact,
    recommendation: Option<&str>,
) -> SpendingPattern {
    SpendingPattern {
        pattern_type,
        description,
        impact,
        recommendation: recommendation.map(str::to_string),
    }
}

pub fn analyze_patterns(transactions: &[NormalizedTransaction]) -> PatternReport {
    if transactions.is_empty() {
        return PatternReport::empty();
    }

    let expenses: Vec<&NormalizedTransaction> =
        transactions.iter().filter(|t| t.is_expense()).collect();
    let incomes: Vec<&NormalizedTransaction> =
        transactions.iter().filter(|t| t.is_income()).collect();

    let mut patterns = Vec::new();
    let mut strengths = Vec::new();
    let mut improvements = Vec::new();

    // Weekend spending
    let weekend: f64 = expenses.iter().filter(|t| t.is_weekend()).map(|t| t.amount).sum();
    let weekday: f64 = expenses.iter().filter(|t| !t.is_weekend()).map(|t| t.amount).sum();
    if weekend > weekday * WEEKEND_SHARE && expenses.len() >= WEEKEND_MIN_EXPENSES {
        patterns.push(pattern(
            PatternType::WeekendSpender,
            "You tend to spend significantly more on weekends".to_string(),
            PatternImpact::Negative,
            Some("Plan weekend activities in advance to avoid impulse spending"),
        ));
        improvements.push("Reduce weekend impulse spending".to_string());
    }

    // Category concentration, first-seen order
    let mut by_category: Vec<(&str, f64)> = Vec::new();
    for tx in &expenses {
        match by_category.iter_mut().find(|(c, _)| *c == tx.category) {
            Some((_, sum)) => *sum += tx.amount,
            None => by_category.push((tx.category.as_str(), tx.amount)),
        }
    }
    let total_spending: f64 = by_category.iter().map(|(_, sum)| sum).sum();
    if total_spending > 0.0 {
        for (category, amount) in &by_category {
            let share = amount / total_spending * 100.0;
            if share > CATEGORY_HEAVY_PERCENT {
                patterns.push(pattern(
                    PatternType::CategoryHeavy,
                    format!("{} accounts for {:.0}% of your spending", category, share),
                    PatternImpact::Neutral,
                    Some(
                        format!("Review if {} spending aligns with your priorities", category)
                            .as_str(),
                    ),
                ));
            }
        }
    }

    // Small frequent purchases
    let small: Vec<f64> = expenses
        .iter()
        .map(|t| t.amount)
        .filter(|&a| a < SMALL_PURCHASE_LIMIT)
        .collect();
    if small.len() as f64 > expenses.len() as f64 * SMALL_PURCHASE_SHARE {
        patterns.push(pattern(
            PatternType::SmallPurchases,
            format!(
                "Many small purchases adding up to ${:.2}",
                small.iter().sum::<f64>()
            ),
            PatternImpact::Negative,
            Some("Small purchases can add up quickly. Consider tracking these more carefully."),
        ));
        improvements.push("Monitor small, frequent purchases".to_string());
    }

    // Large irregular expenses
    if !expenses.is_empty() {
        let avg = total_spending / expenses.len() as f64;
        let large = expenses
            .iter()
            .filter(|t| t.amount > avg * LARGE_EXPENSE_FACTOR)
            .count();
        if large > 0 {
            patterns.push(pattern(
                PatternType::IrregularLarge,
                format!("Found {} unusually large expense(s)", large),
                PatternImpact::Neutral,
                Some("Plan for large expenses by setting aside money in advance"),
            ));
        }
    }

    // Consistent income
    if incomes.len() >= 2 {
        let amounts: Vec<f64> = incomes.iter().map(|t| t.amount).collect();
        let max = amounts.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = amounts.iter().copied().fold(f64::INFINITY, f64::min);
        let avg = amounts.iter().sum::<f64>() / amounts.len() as f64;
        if max - min < avg * INCOME_SPREAD_FACTOR {
            patterns.push(pattern(
                PatternType::StableIncome,
                "Your income is consistent and predictable".to_string(),
                PatternImpact::Positive,
                None,
            ));
            strengths.push("Stable, predictable income".to_string());
        }
    }

    // Subscriptions
    let subscriptions: Vec<f64> = expenses
        .iter()
        .filter(|t| {
            let description = t.description.to_lowercase();
            SUBSCRIPTION_KEYWORDS.iter().any(|k| description.contains(k))
        })
        .map(|t| t.amount)
        .collect();
    if !subscriptions.is_empty() {
        patterns.push(pattern(
            PatternType::Subscriptions,
            format!(
                "Detected {} subscription payment(s) totaling ${:.2}",
                subscriptions.len(),
                subscriptions.iter().sum::<f64>()
            ),
            PatternImpact::Neutral,
            Some("Review subscriptions regularly and cancel any you don't use"),
        ));
    }

    // Risk score
    let mut risk = BASE_RISK_SCORE;
    if total_spending > 0.0 && !incomes.is_empty() {
        let total_income: f64 = incomes.iter().map(|t| t.amount).sum();
        if total_spending > total_income {
            risk += 2;
            improvements.push("Spending exceeds income".to_string());
        } else if total_spending < total_income * FRUGAL_SPENDING_SHARE {
            risk -= 2;
            strengths.push("Good savings rate".to_string());
        }
    }
    for p in &patterns {
        match p.impact {
            PatternImpact::Negative => risk += 1,
            PatternImpact::Positive => risk -= 1,
            PatternImpact::Neutral => {}
        }
    }
    let risk_score = risk.clamp(1, 10) as u8;

    if strengths.is_empty() {
        strengths.push("You're tracking your finances - that's a great start!".to_string());
    }
    if improvements.is_empty() {
        improvements.push("Keep up the good work!".to_string());
    }

    tracing::debug!(
        patterns = patterns.len(),
        risk_score,
        "Pattern analysis complete"
    );

    PatternReport {
        spending_personality: personality(&patterns, risk_score).to_string(),
        patterns,
        risk_score,
        strengths,
        areas_for_improvement: improvements,
    }
}

fn personality(patterns: &[SpendingPattern], risk_score: u8) -> &'static str {
    if patterns.is_empty() {
        return "Balanced Spender";
    }
    match risk_score {
        0..=3 => "Savvy Saver",
        4..=5 => "Balanced Spender",
        6..=7 => "Casual Spender",
        _ => "Spontaneous Spender",
    }
}
