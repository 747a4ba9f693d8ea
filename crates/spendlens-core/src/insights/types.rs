//! Core types for the Insight Synthesizer

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The only insight emitted for a request without transactions
pub const EMPTY_INPUT_INSIGHT: &str = "Add transactions to get spending insights.";

/// Built-in insight rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    TopCategory,
    SavingsRate,
    MonthOverMonth,
    UnusualTransactions,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::TopCategory => "top_category",
            InsightKind::SavingsRate => "savings_rate",
            InsightKind::MonthOverMonth => "month_over_month",
            InsightKind::UnusualTransactions => "unusual_transactions",
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top_category" => Ok(InsightKind::TopCategory),
            "savings_rate" => Ok(InsightKind::SavingsRate),
            "month_over_month" => Ok(InsightKind::MonthOverMonth),
            "unusual_transactions" => Ok(InsightKind::UnusualTransactions),
            _ => Err(format!("Unknown insight kind: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        for kind in [
            InsightKind::TopCategory,
            InsightKind::SavingsRate,
            InsightKind::MonthOverMonth,
            InsightKind::UnusualTransactions,
        ] {
            assert_eq!(kind.as_str().parse::<InsightKind>(), Ok(kind));
        }
        assert!("weekend_spender".parse::<InsightKind>().is_err());
    }
}
