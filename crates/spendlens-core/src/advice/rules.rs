//! Deterministic advice over a [`FinancialSummary`]
//!
//! Always available and never fails, so it doubles as the fallback for the
//! network backends.

use async_trait::async_trait;

use crate::error::Result;
use crate::stats::{LOW_SAVINGS_RATE, TARGET_SAVINGS_RATE};
use crate::summary::{format_amount, FinancialSummary};

use super::AdviceBackend;

/// Months of expenses an emergency fund should cover
pub const EMERGENCY_FUND_MONTHS: f64 = 6.0;

pub const NO_DATA_ADVICE: &str =
    "Start tracking your income and expenses to receive personalized financial advice.";

/// Tip shown when a category exceeds its share (percent) of categorized spending
struct CategoryTip {
    category: &'static str,
    max_share: f64,
    lead: &'static str,
    hint: &'static str,
}

const CATEGORY_TIPS: &[CategoryTip] = &[
    CategoryTip {
        category: "Food & Dining",
        max_share: 25.0,
        lead: "🍽️ **Food & Dining** accounts for",
        hint: "of your spending. Consider meal prepping or cooking at home more often to reduce this.",
    },
    CategoryTip {
        category: "Entertainment",
        max_share: 15.0,
        lead: "🎬 **Entertainment** spending is",
        hint: "of expenses. Look for free or low-cost alternatives for entertainment.",
    },
    CategoryTip {
        category: "Shopping",
        max_share: 20.0,
        lead: "🛍️ **Shopping** represents",
        hint: "of your spending. Try implementing a 24-hour rule before non-essential purchases.",
    },
];

#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedAdvisor;

impl RuleBasedAdvisor {
    pub fn new() -> Self {
        Self
    }

    /// Ordered advice paragraphs separated by blank lines
    pub fn advise(&self, summary: &FinancialSummary) -> String {
        let mut paragraphs = Vec::new();

        if summary.monthly_income > 0.0 {
            paragraphs.push(savings_paragraph(summary.savings_rate));
        }

        let categorized = summary.categorized_spending();
        if categorized > 0.0 {
            for spend in &summary.spending_by_category {
                let Some(tip) = CATEGORY_TIPS.iter().find(|t| t.category == spend.category) else {
                    continue;
                };
                let share = spend.amount / categorized * 100.0;
                if share > tip.max_share {
                    paragraphs.push(format!("{} {:.1}% {}", tip.lead, share, tip.hint));
                }
            }
        }

        if summary.monthly_expenses > 0.0 {
            paragraphs.push(format!(
                "💰 **Emergency Fund Goal**: Aim to save ${} ({} months of expenses) \
                 for financial security.",
                format_amount(summary.monthly_expenses * EMERGENCY_FUND_MONTHS, 0),
                EMERGENCY_FUND_MONTHS
            ));
        }

        if paragraphs.is_empty() {
            return NO_DATA_ADVICE.to_string();
        }
        paragraphs.join("\n\n")
    }
}

fn savings_paragraph(savings_rate: f64) -> String {
    if savings_rate < 0.0 {
        "⚠️ **Alert**: You're spending more than you earn this month. \
         Review your expenses immediately and identify non-essential spending to cut."
            .to_string()
    } else if savings_rate < LOW_SAVINGS_RATE {
        "📊 **Savings Rate**: Your current savings rate is below 10%. \
         Financial experts recommend saving at least 20% of your income. \
         Consider the 50/30/20 rule: 50% needs, 30% wants, 20% savings."
            .to_string()
    } else if savings_rate < TARGET_SAVINGS_RATE {
        format!(
            "📊 **Good Progress**: You're saving {:.1}% of your income. \
             Try to increase this to 20% by cutting discretionary spending.",
            savings_rate
        )
    } else {
        format!(
            "🌟 **Excellent**: You're saving {:.1}% of your income! \
             Consider investing your extra savings in a diversified portfolio.",
            savings_rate
        )
    }
}

#[async_trait]
impl AdviceBackend for RuleBasedAdvisor {
    async fn generate(&self, summary: &FinancialSummary) -> Result<String> {
        Ok(self.advise(summary))
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "rule_based"
    }

    fn model(&self) -> &str {
        "rules"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MonthBucket;
    use crate::summary::CategorySpend;

    fn summary(income: f64, expenses: f64, categories: &[(&str, f64)]) -> FinancialSummary {
        let savings = income - expenses;
        FinancialSummary {
            month: MonthBucket::new(2024, 6),
            total_balance: savings,
            monthly_income: income,
            monthly_expenses: expenses,
            monthly_savings: savings,
            savings_rate: if income > 0.0 { savings / income * 100.0 } else { 0.0 },
            spending_by_category: categories
                .iter()
                .map(|(c, a)| CategorySpend {
                    category: c.to_string(),
                    amount: *a,
                })
                .collect(),
        }
    }

    #[test]
    fn test_no_data() {
        let advice = RuleBasedAdvisor::new().advise(&summary(0.0, 0.0, &[]));
        assert_eq!(advice, NO_DATA_ADVICE);
    }

    #[test]
    fn test_overspending_alert() {
        let advice = RuleBasedAdvisor::new().advise(&summary(1000.0, 1500.0, &[("Housing", 1500.0)]));
        assert!(advice.starts_with("⚠️ **Alert**"));
        assert!(advice.contains("Aim to save $9,000 (6 months of expenses)"));
    }

    #[test]
    fn test_savings_tiers() {
        let advisor = RuleBasedAdvisor::new();

        let low = advisor.advise(&summary(1000.0, 950.0, &[]));
        assert!(low.contains("below 10%"));

        let good = advisor.advise(&summary(1000.0, 850.0, &[]));
        assert!(good.contains("You're saving 15.0% of your income."));

        let excellent = advisor.advise(&summary(1000.0, 500.0, &[]));
        assert!(excellent.contains("🌟 **Excellent**: You're saving 50.0%"));
    }

    #[test]
    fn test_category_tips() {
        let advice = RuleBasedAdvisor::new().advise(&summary(
            5000.0,
            1000.0,
            &[
                ("Food & Dining", 300.0),
                ("Entertainment", 200.0),
                ("Shopping", 150.0),
                ("Housing", 350.0),
            ],
        ));

        assert!(advice.contains("**Food & Dining** accounts for 30.0%"));
        assert!(advice.contains("**Entertainment** spending is 20.0%"));
        assert!(!advice.contains("**Shopping**"));

        let paragraphs: Vec<&str> = advice.split("\n\n").collect();
        assert_eq!(paragraphs.len(), 4);
        assert!(paragraphs[3].starts_with("💰 **Emergency Fund Goal**"));
    }

    #[test]
    fn test_category_tips_follow_spending_order() {
        let advice = RuleBasedAdvisor::new().advise(&summary(
            0.0,
            0.0,
            &[("Shopping", 500.0), ("Food & Dining", 300.0), ("Housing", 200.0)],
        ));

        let paragraphs: Vec<&str> = advice.split("\n\n").collect();
        assert_eq!(paragraphs.len(), 2);
        assert!(paragraphs[0].starts_with("🛍️ **Shopping** represents 50.0%"));
        assert!(paragraphs[1].starts_with("🍽️ **Food & Dining** accounts for 30.0%"));
    }

    #[test]
    fn test_savings_tier_boundaries() {
        assert!(savings_paragraph(LOW_SAVINGS_RATE).starts_with("📊 **Good Progress**"));
        assert!(savings_paragraph(LOW_SAVINGS_RATE - 0.1).contains("below 10%"));
        assert!(savings_paragraph(TARGET_SAVINGS_RATE).starts_with("🌟 **Excellent**"));
        assert!(savings_paragraph(TARGET_SAVINGS_RATE - 0.1).starts_with("📊 **Good Progress**"));
    }

    #[tokio::test]
    async fn test_backend_contract() {
        let advisor = RuleBasedAdvisor::new();
        let text = advisor.generate(&summary(0.0, 0.0, &[])).await.unwrap();
        assert_eq!(text, NO_DATA_ADVICE);
        assert!(advisor.health_check().await);
        assert_eq!(advisor.name(), "rule_based");
    }
}
