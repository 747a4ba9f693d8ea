//! Statistical outlier detection over expense amounts
//!
//! An expense is unusual when it lies strictly above `mean + sigma * stddev`
//! of all expense amounts in the request. Detection stays off for small sets
//! where the dispersion estimate is unreliable.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{NormalizedTransaction, UnusualTransaction};
use crate::stats::{mean, sample_std_dev};

/// Detection needs strictly more expenses than this
pub const DEFAULT_MIN_EXPENSES: usize = 5;

/// Standard deviations above the mean that mark an outlier
pub const DEFAULT_SIGMA: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierSettings {
    pub min_transactions: usize,
    pub sigma: f64,
}

impl Default for OutlierSettings {
    fn default() -> Self {
        Self {
            min_transactions: DEFAULT_MIN_EXPENSES,
            sigma: DEFAULT_SIGMA,
        }
    }
}

/// Mean/stddev cut-off computed for one expense set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierThreshold {
    pub mean: f64,
    pub std_dev: f64,
    pub threshold: f64,
}

pub struct OutlierDetector {
    settings: OutlierSettings,
}

impl OutlierDetector {
    pub fn new() -> Self {
        Self {
            settings: OutlierSettings::default(),
        }
    }

    pub fn with_settings(settings: OutlierSettings) -> Self {
        Self { settings }
    }

    /// Threshold for the given expenses, or `None` while detection is inactive
    pub fn threshold(&self, expenses: &[&NormalizedTransaction]) -> Option<OutlierThreshold> {
        if expenses.len() <= self.settings.min_transactions {
            return None;
        }

        let amounts: Vec<f64> = expenses.iter().map(|t| t.amount).collect();
        let mean = mean(&amounts);
        let std_dev = sample_std_dev(&amounts);

        Some(OutlierThreshold {
            mean,
            std_dev,
            threshold: self.settings.sigma.mul_add(std_dev, mean),
        })
    }

    /// Flag unusually large expenses; income records are ignored
    pub fn detect(&self, transactions: &[NormalizedTransaction]) -> Vec<UnusualTransaction> {
        let expenses: Vec<&NormalizedTransaction> =
            transactions.iter().filter(|t| t.is_expense()).collect();

        let Some(cutoff) = self.threshold(&expenses) else {
            return Vec::new();
        };

        let flagged: Vec<UnusualTransaction> = expenses
            .into_iter()
            .filter(|t| t.amount > cutoff.threshold)
            .map(|t| UnusualTransaction {
                id: t.id,
                description: t.description.clone(),
                amount: t.amount,
                reason: describe_ratio(t.amount, cutoff.mean),
            })
            .collect();

        debug!(
            threshold = cutoff.threshold,
            flagged = flagged.len(),
            "Outlier detection complete"
        );

        flagged
    }
}

impl Default for OutlierDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn describe_ratio(amount: f64, mean: f64) -> String {
    let ratio = if mean > 0.0 { amount / mean } else { 0.0 };
    format!("Amount is {:.1}x your average expense", ratio)
}
