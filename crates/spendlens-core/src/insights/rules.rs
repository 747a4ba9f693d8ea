//! Built-in insight rules

use crate::stats::{percentage, TARGET_SAVINGS_RATE};

use super::engine::{InsightContext, InsightRule};
use super::types::InsightKind;

/// Names the highest-spend category
pub struct TopCategoryInsight;

impl InsightRule for TopCategoryInsight {
    fn id(&self) -> InsightKind {
        InsightKind::TopCategory
    }

    fn name(&self) -> &'static str {
        "Top Category"
    }

    fn evaluate(&self, ctx: &InsightContext<'_>) -> Option<String> {
        let top = ctx.categories.first()?;
        Some(format!(
            "Your highest spending category is {}, accounting for {:.1}% of expenses.",
            top.category, top.percentage_of_total
        ))
    }
}

/// Net balance as a share of income
pub struct SavingsRateInsight {
    target_rate: f64,
}

impl SavingsRateInsight {
    pub fn new() -> Self {
        Self {
            target_rate: TARGET_SAVINGS_RATE,
        }
    }

    pub fn with_target(target_rate: f64) -> Self {
        Self { target_rate }
    }
}

impl Default for SavingsRateInsight {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightRule for SavingsRateInsight {
    fn id(&self) -> InsightKind {
        InsightKind::SavingsRate
    }

    fn name(&self) -> &'static str {
        "Savings Rate"
    }

    fn evaluate(&self, ctx: &InsightContext<'_>) -> Option<String> {
        let income = ctx.totals.total_income;
        if income <= 0.0 {
            return None;
        }

        let rate = percentage(ctx.totals.net_balance, income);
        let message = if rate < 0.0 {
            "⚠️ You're spending more than you earn. Review your expenses to find areas to cut."
                .to_string()
        } else if rate < self.target_rate {
            format!(
                "Your savings rate is {:.1}%. Try to aim for {}% or more.",
                rate, self.target_rate
            )
        } else {
            format!("Great job! You're saving {:.1}% of your income.", rate)
        };

        Some(message)
    }
}

/// Compares the two most recent months' spending
pub struct MonthOverMonthInsight {
    increase_factor: f64,
    decrease_factor: f64,
}

impl MonthOverMonthInsight {
    pub fn new() -> Self {
        Self {
            increase_factor: 1.2,
            decrease_factor: 0.8,
        }
    }

    pub fn with_thresholds(increase_factor: f64, decrease_factor: f64) -> Self {
        Self {
            increase_factor,
            decrease_factor,
        }
    }
}

impl Default for MonthOverMonthInsight {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightRule for MonthOverMonthInsight {
    fn id(&self) -> InsightKind {
        InsightKind::MonthOverMonth
    }

    fn name(&self) -> &'static str {
        "Month over Month"
    }

    fn evaluate(&self, ctx: &InsightContext<'_>) -> Option<String> {
        let [.., previous, latest] = ctx.months else {
            return None;
        };

        let recent = latest.total_spending;
        let prev = previous.total_spending;

        if recent > prev * self.increase_factor {
            Some(format!(
                "📈 Your spending increased by more than {:.0}% compared to last month.",
                (self.increase_factor - 1.0) * 100.0
            ))
        } else if recent < prev * self.decrease_factor {
            Some(format!(
                "📉 Great! Your spending decreased by more than {:.0}% compared to last month.",
                (1.0 - self.decrease_factor) * 100.0
            ))
        } else {
            None
        }
    }
}

/// Counts the flagged outliers
pub struct UnusualTransactionsInsight;

impl InsightRule for UnusualTransactionsInsight {
    fn id(&self) -> InsightKind {
        InsightKind::UnusualTransactions
    }

    fn name(&self) -> &'static str {
        "Unusual Transactions"
    }

    fn evaluate(&self, ctx: &InsightContext<'_>) -> Option<String> {
        if ctx.unusual.is_empty() {
            return None;
        }
        Some(format!(
            "🔍 We detected {} unusually large transaction(s).",
            ctx.unusual.len()
        ))
    }
}
