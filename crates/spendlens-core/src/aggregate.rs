//! Categorical and temporal aggregation
//!
//! Groups are kept in first-seen order so that ties (equal totals) resolve to
//! whichever group appeared first in the input.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};
use crate::models::{
    CategoryAggregate, CategoryDetail, MonthBucket, MonthlyAggregate, NormalizedTransaction,
    RecentTransaction, SpendingTrend, NO_DOMINANT_CATEGORY,
};
use crate::stats::{mean, percentage};

/// Number of entries in the top-categories list
pub const TOP_CATEGORY_COUNT: usize = 5;

/// Number of transactions listed in a category detail
pub const RECENT_TRANSACTION_COUNT: usize = 5;

/// Request-wide income/expense totals
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub transaction_count: usize,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_balance: f64,
}

pub fn totals(transactions: &[NormalizedTransaction]) -> Totals {
    let total_income: f64 = transactions
        .iter()
        .filter(|t| t.is_income())
        .map(|t| t.amount)
        .sum();
    let total_expenses: f64 = transactions
        .iter()
        .filter(|t| t.is_expense())
        .map(|t| t.amount)
        .sum();

    Totals {
        transaction_count: transactions.len(),
        total_income,
        total_expenses,
        net_balance: total_income - total_expenses,
    }
}

/// Running sum for one group, insertion-ordered
#[derive(Debug, Default)]
struct OrderedGroups {
    index: HashMap<String, usize>,
    groups: Vec<(String, f64, usize)>,
}

impl OrderedGroups {
    fn add(&mut self, key: &str, amount: f64) {
        match self.index.get(key) {
            Some(&i) => {
                self.groups[i].1 += amount;
                self.groups[i].2 += 1;
            }
            None => {
                self.index.insert(key.to_string(), self.groups.len());
                self.groups.push((key.to_string(), amount, 1));
            }
        }
    }

    /// Key with the highest total; the first-seen key wins ties
    fn max_key(&self) -> Option<&str> {
        let mut best: Option<&(String, f64, usize)> = None;
        for group in &self.groups {
            match best {
                Some(b) if group.1 <= b.1 => {}
                _ => best = Some(group),
            }
        }
        best.map(|(key, _, _)| key.as_str())
    }
}

/// Expense totals per category, sorted by total (descending, stable)
pub fn category_breakdown(transactions: &[NormalizedTransaction]) -> Vec<CategoryAggregate> {
    let mut groups = OrderedGroups::default();
    for tx in transactions.iter().filter(|t| t.is_expense()) {
        groups.add(&tx.category, tx.amount);
    }

    let total_spent: f64 = groups.groups.iter().map(|(_, sum, _)| sum).sum();

    let mut breakdown: Vec<CategoryAggregate> = groups
        .groups
        .into_iter()
        .map(|(category, sum, count)| CategoryAggregate {
            category,
            total_spent: sum,
            transaction_count: count,
            average_transaction: sum / count as f64,
            percentage_of_total: percentage(sum, total_spent),
            trend: SpendingTrend::Stable,
        })
        .collect();

    breakdown.sort_by(|a, b| {
        b.total_spent
            .partial_cmp(&a.total_spent)
            .unwrap_or(Ordering::Equal)
    });

    breakdown
}

#[derive(Debug, Default)]
struct MonthAccumulator {
    income: f64,
    spending: f64,
    categories: OrderedGroups,
}

/// Income/expense totals per month, ascending by month
pub fn monthly_breakdown(transactions: &[NormalizedTransaction]) -> Vec<MonthlyAggregate> {
    let mut months: BTreeMap<MonthBucket, MonthAccumulator> = BTreeMap::new();

    for tx in transactions {
        let acc = months.entry(tx.month).or_default();
        if tx.is_income() {
            acc.income += tx.amount;
        } else {
            acc.spending += tx.amount;
            acc.categories.add(&tx.category, tx.amount);
        }
    }

    months
        .into_iter()
        .map(|(month, acc)| MonthlyAggregate {
            month,
            total_spending: acc.spending,
            total_income: acc.income,
            net_savings: acc.income - acc.spending,
            top_category: acc
                .categories
                .max_key()
                .unwrap_or(NO_DOMINANT_CATEGORY)
                .to_string(),
        })
        .collect()
}

/// Monthly expense totals for months that have at least one expense
pub fn monthly_expense_series(transactions: &[NormalizedTransaction]) -> Vec<(MonthBucket, f64)> {
    monthly_series(transactions.iter().filter(|t| t.is_expense()))
}

/// Monthly income totals for months that have at least one income
pub fn monthly_income_series(transactions: &[NormalizedTransaction]) -> Vec<(MonthBucket, f64)> {
    monthly_series(transactions.iter().filter(|t| t.is_income()))
}

fn monthly_series<'a>(
    transactions: impl Iterator<Item = &'a NormalizedTransaction>,
) -> Vec<(MonthBucket, f64)> {
    let mut series: BTreeMap<MonthBucket, f64> = BTreeMap::new();
    for tx in transactions {
        *series.entry(tx.month).or_insert(0.0) += tx.amount;
    }
    series.into_iter().collect()
}

/// Labels of the highest-spend categories
pub fn top_categories(breakdown: &[CategoryAggregate], limit: usize) -> Vec<String> {
    breakdown
        .iter()
        .take(limit)
        .map(|c| c.category.clone())
        .collect()
}

/// Totals and recent activity for every transaction in one category.
///
/// Both kinds are included. Fails with [`Error::NotFound`] when nothing
/// matches.
pub fn category_detail(
    transactions: &[NormalizedTransaction],
    category: &str,
) -> Result<CategoryDetail> {
    let matching: Vec<&NormalizedTransaction> = transactions
        .iter()
        .filter(|t| t.category == category)
        .collect();

    if matching.is_empty() {
        return Err(Error::NotFound(format!(
            "No transactions found for category: {}",
            category
        )));
    }

    let amounts: Vec<f64> = matching.iter().map(|t| t.amount).collect();
    let min = amounts.iter().copied().fold(f64::INFINITY, f64::min);
    let max = amounts.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut recent = matching.clone();
    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    Ok(CategoryDetail {
        category: category.to_string(),
        total_spent: amounts.iter().sum(),
        transaction_count: matching.len(),
        average_transaction: mean(&amounts),
        min_transaction: min,
        max_transaction: max,
        recent_transactions: recent
            .into_iter()
            .take(RECENT_TRANSACTION_COUNT)
            .map(|t| RecentTransaction {
                description: t.description.clone(),
                amount: t.amount,
                date: t.timestamp,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Transaction;
    use crate::normalize::normalize;
    use chrono::{NaiveDate, NaiveDateTime};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn sample() -> Vec<NormalizedTransaction> {
        normalize(
            &[
                Transaction::expense(1, "Groceries", 60.0, Some("Food"), "2024-01-05"),
                Transaction::expense(2, "Bus pass", 40.0, Some("Transport"), "2024-01-10"),
                Transaction::income(3, "Salary", 1000.0, Some("Salary"), "2024-01-31"),
                Transaction::expense(4, "Dinner", 30.0, Some("Food"), "2024-02-02"),
                Transaction::expense(5, "Movie", 20.0, None, "2024-02-03"),
                Transaction::income(6, "Salary", 1000.0, Some("Salary"), "2024-02-28"),
            ],
            now(),
        )
    }

    #[test]
    fn test_totals() {
        let t = totals(&sample());
        assert_eq!(t.transaction_count, 6);
        assert_eq!(t.total_income, 2000.0);
        assert_eq!(t.total_expenses, 150.0);
        assert_eq!(t.net_balance, 1850.0);
    }

    #[test]
    fn test_category_breakdown_sorted_and_expense_only() {
        let breakdown = category_breakdown(&sample());
        let names: Vec<&str> = breakdown.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Food", "Transport", "Uncategorized"]);

        let food = &breakdown[0];
        assert_eq!(food.total_spent, 90.0);
        assert_eq!(food.transaction_count, 2);
        assert_eq!(food.average_transaction, 45.0);
        assert!((food.percentage_of_total - 60.0).abs() < 1e-9);
        assert_eq!(food.trend, SpendingTrend::Stable);
    }

    #[test]
    fn test_category_percentages_sum_to_100() {
        let breakdown = category_breakdown(&sample());
        let sum: f64 = breakdown.iter().map(|c| c.percentage_of_total).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_category_breakdown_ties_keep_first_seen_order() {
        let txs = normalize(
            &[
                Transaction::expense(1, "b", 10.0, Some("Zeta"), "2024-01-01"),
                Transaction::expense(2, "a", 10.0, Some("Alpha"), "2024-01-02"),
            ],
            now(),
        );
        let names: Vec<String> = category_breakdown(&txs)
            .into_iter()
            .map(|c| c.category)
            .collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_category_breakdown_zero_total_is_not_an_error() {
        let txs = normalize(
            &[Transaction::expense(1, "free", 0.0, Some("Gifts"), "2024-01-01")],
            now(),
        );
        let breakdown = category_breakdown(&txs);
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].percentage_of_total, 0.0);
    }

    #[test]
    fn test_monthly_breakdown() {
        let months = monthly_breakdown(&sample());
        assert_eq!(months.len(), 2);

        assert_eq!(months[0].month, MonthBucket::new(2024, 1));
        assert_eq!(months[0].total_spending, 100.0);
        assert_eq!(months[0].total_income, 1000.0);
        assert_eq!(months[0].top_category, "Food");

        assert_eq!(months[1].month, MonthBucket::new(2024, 2));
        assert_eq!(months[1].top_category, "Food");

        for m in &months {
            assert_eq!(m.net_savings, m.total_income - m.total_spending);
        }
    }

    #[test]
    fn test_monthly_breakdown_income_only_month() {
        let txs = normalize(
            &[Transaction::income(1, "Salary", 500.0, None, "2024-04-01")],
            now(),
        );
        let months = monthly_breakdown(&txs);
        assert_eq!(months.len(), 1);
        assert_eq!(months[0].top_category, "N/A");
        assert_eq!(months[0].total_spending, 0.0);
    }

    #[test]
    fn test_dominant_category_tie_first_encountered() {
        let txs = normalize(
            &[
                Transaction::expense(1, "x", 25.0, Some("Travel"), "2024-05-01"),
                Transaction::expense(2, "y", 25.0, Some("Books"), "2024-05-02"),
            ],
            now(),
        );
        assert_eq!(monthly_breakdown(&txs)[0].top_category, "Travel");
    }

    #[test]
    fn test_empty_input_yields_empty_aggregates() {
        assert!(category_breakdown(&[]).is_empty());
        assert!(monthly_breakdown(&[]).is_empty());
        assert_eq!(totals(&[]), Totals::default());
    }

    #[test]
    fn test_monthly_series() {
        let expenses = monthly_expense_series(&sample());
        assert_eq!(
            expenses,
            vec![
                (MonthBucket::new(2024, 1), 100.0),
                (MonthBucket::new(2024, 2), 50.0)
            ]
        );
        assert_eq!(monthly_income_series(&sample()).len(), 2);
    }

    #[test]
    fn test_top_categories_limit() {
        let breakdown = category_breakdown(&sample());
        assert_eq!(top_categories(&breakdown, 2), vec!["Food", "Transport"]);
        assert_eq!(top_categories(&breakdown, TOP_CATEGORY_COUNT).len(), 3);
    }

    #[test]
    fn test_category_detail() {
        let detail = category_detail(&sample(), "Food").unwrap();
        assert_eq!(detail.transaction_count, 2);
        assert_eq!(detail.total_spent, 90.0);
        assert_eq!(detail.average_transaction, 45.0);
        assert_eq!(detail.min_transaction, 30.0);
        assert_eq!(detail.max_transaction, 60.0);
        assert_eq!(detail.recent_transactions[0].description, "Dinner");
    }

    #[test]
    fn test_category_detail_caps_recent_list() {
        let raw: Vec<Transaction> = (1..=8)
            .map(|d| {
                Transaction::expense(d, format!("tx{}", d), 5.0, Some("Coffee"), format!("2024-03-0{}", d))
            })
            .collect();
        let detail = category_detail(&normalize(&raw, now()), "Coffee").unwrap();
        assert_eq!(detail.recent_transactions.len(), 5);
        assert_eq!(detail.recent_transactions[0].description, "tx8");
        assert_eq!(detail.recent_transactions[4].description, "tx4");
    }

    #[test]
    fn test_category_detail_not_found() {
        let err = category_detail(&sample(), "Pets").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
