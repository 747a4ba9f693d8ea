//! Domain models for Spendlens
//!
//! Raw transactions come from the caller; everything else is derived by the
//! pipeline for the duration of one request and discarded afterwards.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Category label used when a transaction has no (or a blank) category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Dominant-category label for months without any expense
pub const NO_DOMINANT_CATEGORY: &str = "N/A";

/// Direction of funds for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    /// Inflow (salary, refunds, dividends)
    #[serde(alias = "income")]
    Income,
    /// Outflow (purchases, bills)
    #[serde(alias = "expense")]
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INCOME" => Ok(Self::Income),
            "EXPENSE" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A transaction as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub description: String,
    /// Currency units; JSON numbers and numeric strings are both accepted
    #[serde(deserialize_with = "amount_from_number_or_string")]
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub category: Option<String>,
    /// ISO-8601 date or date-time, with or without an offset
    #[serde(rename = "date", alias = "timestamp")]
    pub timestamp: String,
}

impl Transaction {
    pub fn new(
        id: i64,
        description: impl Into<String>,
        amount: f64,
        kind: TransactionKind,
        category: Option<&str>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            amount,
            kind,
            category: category.map(str::to_string),
            timestamp: timestamp.into(),
        }
    }

    /// Shorthand for an expense
    pub fn expense(
        id: i64,
        description: impl Into<String>,
        amount: f64,
        category: Option<&str>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            description,
            amount,
            TransactionKind::Expense,
            category,
            timestamp,
        )
    }

    /// Shorthand for an income
    pub fn income(
        id: i64,
        description: impl Into<String>,
        amount: f64,
        category: Option<&str>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            description,
            amount,
            TransactionKind::Income,
            category,
            timestamp,
        )
    }
}

fn amount_from_number_or_string<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(f64),
        Text(String),
    }

    let value = match RawAmount::deserialize(deserializer)? {
        RawAmount::Number(n) => n,
        RawAmount::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid amount {:?}: {}", s, e)))?,
    };
    checked_amount(value).map_err(serde::de::Error::custom)
}

/// Accept only finite, non-negative amounts; direction comes from the kind
pub fn checked_amount(value: f64) -> std::result::Result<f64, String> {
    if !value.is_finite() {
        return Err(format!("amount must be a finite number, got {}", value));
    }
    if value < 0.0 {
        return Err(format!("amount cannot be negative, got {}", value));
    }
    Ok(value)
}

/// Calendar year+month aggregation key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
}

impl MonthBucket {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The bucket `count` calendar months after this one
    pub fn add_months(&self, count: u32) -> Self {
        let zero_based = self.year as i64 * 12 + (self.month as i64 - 1) + count as i64;
        Self {
            year: zero_based.div_euclid(12) as i32,
            month: (zero_based.rem_euclid(12) + 1) as u32,
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for MonthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthBucket {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("Invalid month bucket: {}", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("Invalid month bucket year: {}", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("Invalid month bucket month: {}", s))?;
        if !(1..=12).contains(&month) {
            return Err(format!("Month out of range: {}", s));
        }
        Ok(Self { year, month })
    }
}

impl Serialize for MonthBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthBucket {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A transaction in canonical form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTransaction {
    pub id: i64,
    pub description: String,
    pub amount: f64,
    pub kind: TransactionKind,
    /// Resolved category (never blank)
    pub category: String,
    pub timestamp: NaiveDateTime,
    pub month: MonthBucket,
    /// 0 = Monday .. 6 = Sunday
    pub weekday: u32,
    pub hour: u32,
    /// True when the raw timestamp could not be parsed and "now" was substituted
    pub timestamp_recovered: bool,
}

impl NormalizedTransaction {
    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_weekend(&self) -> bool {
        self.weekday >= 5
    }
}

/// Spending direction label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendingTrend {
    Increasing,
    Decreasing,
    #[default]
    Stable,
}

impl SpendingTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        }
    }
}

impl fmt::Display for SpendingTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Expense totals for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAggregate {
    pub category: String,
    pub total_spent: f64,
    pub transaction_count: usize,
    pub average_transaction: f64,
    /// Share of all expenses, 0-100
    pub percentage_of_total: f64,
    /// Always `Stable`: no per-category trend is modeled
    pub trend: SpendingTrend,
}

/// Income and expense totals for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub month: MonthBucket,
    pub total_spending: f64,
    pub total_income: f64,
    pub net_savings: f64,
    /// Highest-spend category of the month, or "N/A"
    pub top_category: String,
}

/// An expense flagged as a statistical outlier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnusualTransaction {
    pub id: i64,
    pub description: String,
    pub amount: f64,
    pub reason: String,
}

/// A projected month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub month: MonthBucket,
    pub predicted_spending: f64,
    pub predicted_income: f64,
    /// Not floored at zero
    pub predicted_savings: f64,
    pub confidence_lower: f64,
    pub confidence_upper: f64,
}

fn default_forecast_months() -> u32 {
    crate::forecast::DEFAULT_FORECAST_MONTHS
}

/// Input for the analyze operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub user_id: i64,
    pub transactions: Vec<Transaction>,
}

/// Output of the analyze operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub user_id: i64,
    pub total_transactions: usize,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_balance: f64,
    pub category_breakdown: Vec<CategoryAggregate>,
    pub monthly_breakdown: Vec<MonthlyAggregate>,
    pub top_spending_categories: Vec<String>,
    pub unusual_transactions: Vec<UnusualTransaction>,
    pub insights: Vec<String>,
}

/// Input for the forecast operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub user_id: i64,
    pub transactions: Vec<Transaction>,
    #[serde(default = "default_forecast_months")]
    pub forecast_months: u32,
}

/// Output of the forecast operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub user_id: i64,
    #[serde(flatten)]
    pub forecast: crate::forecast::Forecast,
}

/// Output of the spending patterns operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternsResponse {
    pub user_id: i64,
    #[serde(flatten)]
    pub report: crate::patterns::PatternReport,
}

/// A transaction shown in a category detail listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentTransaction {
    pub description: String,
    pub amount: f64,
    pub date: NaiveDateTime,
}

/// Detail view for a single category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDetail {
    pub category: String,
    pub total_spent: f64,
    pub transaction_count: usize,
    pub average_transaction: f64,
    pub min_transaction: f64,
    pub max_transaction: f64,
    /// Up to five most recent, newest first
    pub recent_transactions: Vec<RecentTransaction>,
}
