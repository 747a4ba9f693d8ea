//! Financial summary for the advice backends
//!
//! A dashboard-style snapshot: balance over all settled transactions plus
//! the current month's cash flow and category split. Future-dated
//! transactions count toward the month they fall in but not the balance.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::aggregate::category_breakdown;
use crate::models::{MonthBucket, NormalizedTransaction};
use crate::stats::percentage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpend {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    /// Month the monthly figures cover
    pub month: MonthBucket,
    /// All income minus all expenses up to "now"
    pub total_balance: f64,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub monthly_savings: f64,
    /// Savings as a share of income, 0 when there is no income
    pub savings_rate: f64,
    /// Current-month expenses per category, largest first
    pub spending_by_category: Vec<CategorySpend>,
}

impl FinancialSummary {
    pub fn from_transactions(transactions: &[NormalizedTransaction], now: NaiveDateTime) -> Self {
        let month = MonthBucket::from_date(now.date());

        let total_balance: f64 = transactions
            .iter()
            .filter(|t| t.timestamp <= now)
            .map(|t| if t.is_income() { t.amount } else { -t.amount })
            .sum();

        let current: Vec<NormalizedTransaction> = transactions
            .iter()
            .filter(|t| t.month == month)
            .cloned()
            .collect();

        let monthly_income: f64 = current
            .iter()
            .filter(|t| t.is_income())
            .map(|t| t.amount)
            .sum();
        let monthly_expenses: f64 = current
            .iter()
            .filter(|t| t.is_expense())
            .map(|t| t.amount)
            .sum();
        let monthly_savings = monthly_income - monthly_expenses;

        let spending_by_category = category_breakdown(&current)
            .into_iter()
            .map(|c| CategorySpend {
                category: c.category,
                amount: c.total_spent,
            })
            .collect();

        Self {
            month,
            total_balance,
            monthly_income,
            monthly_expenses,
            monthly_savings,
            savings_rate: percentage(monthly_savings, monthly_income),
            spending_by_category,
        }
    }

    /// Sum of the per-category spending
    pub fn categorized_spending(&self) -> f64 {
        self.spending_by_category.iter().map(|c| c.amount).sum()
    }

    /// One "- Category: $amount" line per category
    pub fn category_breakdown_text(&self) -> String {
        if self.spending_by_category.is_empty() {
            return "No category data available".to_string();
        }
        self.spending_by_category
            .iter()
            .map(|c| format!("- {}: ${}", c.category, format_amount(c.amount, 2)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Format with thousands separators, e.g. `1234.5` -> `"1,234.50"`
pub fn format_amount(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Transaction;
    use crate::normalize::normalize;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_summary_current_month_and_balance() {
        let txs = normalize(
            &[
                Transaction::income(1, "May salary", 3000.0, None, "2024-05-31"),
                Transaction::expense(2, "May rent", 1200.0, Some("Housing"), "2024-05-01"),
                Transaction::income(3, "June salary", 3000.0, None, "2024-06-01"),
                Transaction::expense(4, "Groceries", 200.0, Some("Groceries"), "2024-06-03"),
                Transaction::expense(5, "Dinner", 300.0, Some("Food & Dining"), "2024-06-05"),
                // future-dated: in June figures, not in the balance
                Transaction::expense(6, "Concert", 100.0, Some("Entertainment"), "2024-06-28"),
            ],
            now(),
        );

        let summary = FinancialSummary::from_transactions(&txs, now());

        assert_eq!(summary.month, MonthBucket::new(2024, 6));
        assert_eq!(summary.total_balance, 3000.0 - 1200.0 + 3000.0 - 200.0 - 300.0);
        assert_eq!(summary.monthly_income, 3000.0);
        assert_eq!(summary.monthly_expenses, 600.0);
        assert_eq!(summary.monthly_savings, 2400.0);
        assert!((summary.savings_rate - 80.0).abs() < 1e-9);

        let categories: Vec<&str> = summary
            .spending_by_category
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(categories, vec!["Food & Dining", "Groceries", "Entertainment"]);
        assert_eq!(summary.categorized_spending(), 600.0);
    }

    #[test]
    fn test_summary_without_income() {
        let txs = normalize(
            &[Transaction::expense(1, "Coffee", 5.0, None, "2024-06-01")],
            now(),
        );
        let summary = FinancialSummary::from_transactions(&txs, now());
        assert_eq!(summary.savings_rate, 0.0);
        assert_eq!(summary.monthly_savings, -5.0);
    }

    #[test]
    fn test_category_breakdown_text() {
        let txs = normalize(
            &[Transaction::expense(1, "Rent", 1500.0, Some("Housing"), "2024-06-01")],
            now(),
        );
        let summary = FinancialSummary::from_transactions(&txs, now());
        assert_eq!(summary.category_breakdown_text(), "- Housing: $1,500.00");

        let empty = FinancialSummary::from_transactions(&[], now());
        assert_eq!(empty.category_breakdown_text(), "No category data available");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0, 2), "0.00");
        assert_eq!(format_amount(999.5, 2), "999.50");
        assert_eq!(format_amount(1234.5, 2), "1,234.50");
        assert_eq!(format_amount(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_amount(-2500.0, 0), "-2,500");
        assert_eq!(format_amount(-0.001, 2), "0.00");
        assert_eq!(format_amount(18000.0, 0), "18,000");
    }
}
