//! Spending Forecaster
//!
//! Projects monthly spending, income and savings for the coming months.
//!
//! - With two or more months of expense history an ordinary least-squares
//!   line is fitted to monthly expense totals (x = zero-based month index)
//!   and extrapolated; bounds are `prediction ± z * stddev` of the history.
//! - With less history every month is projected at the historical average,
//!   bounded by a fixed band around it.
//! - Income is never modeled: it is held at its historical monthly average.
//!
//! Trend thresholds are absolute currency amounts per month, so they do not
//! scale with the size of a budget.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::aggregate::{monthly_expense_series, monthly_income_series};
use crate::models::{ForecastPoint, MonthBucket, NormalizedTransaction, SpendingTrend};
use crate::stats::{
    mean, percentage, sample_std_dev, LinearFit, LOW_SAVINGS_RATE, TARGET_SAVINGS_RATE,
};

/// Months projected when the caller does not say
pub const DEFAULT_FORECAST_MONTHS: u32 = 6;

/// Longest horizon a single forecast projects; larger requests are capped
pub const DEFAULT_MAX_HORIZON: u32 = 120;

/// Slope (currency units per month) beyond which spending is trending
pub const DEFAULT_TREND_SLOPE_THRESHOLD: f64 = 50.0;

/// Length of one projected month in fixed-days mode
pub const DEFAULT_MONTH_STEP_DAYS: i64 = 30;

/// Two-sided 95% normal quantile
pub const CONFIDENCE_Z_95: f64 = 1.96;

/// Bounds around the average when there is too little history for a fit
pub const FALLBACK_LOWER_FACTOR: f64 = 0.8;
pub const FALLBACK_UPPER_FACTOR: f64 = 1.2;

const EMPTY_ADVICE: &str = "Add some transactions to get personalized forecasts.";
const INSUFFICIENT_HISTORY_ADVICE: &str =
    "Keep tracking your expenses to get more accurate forecasts.";

/// How projected month labels advance from "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthStep {
    /// `now + step_days * i`; can skip or repeat a calendar month over long horizons
    #[default]
    FixedDays,
    /// Consecutive calendar months after the month of "now"
    Calendar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    pub trend_slope_threshold: f64,
    pub month_step: MonthStep,
    pub month_step_days: i64,
    pub confidence_z: f64,
    pub fallback_lower_factor: f64,
    pub fallback_upper_factor: f64,
    pub default_horizon: u32,
    pub max_horizon: u32,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            trend_slope_threshold: DEFAULT_TREND_SLOPE_THRESHOLD,
            month_step: MonthStep::FixedDays,
            month_step_days: DEFAULT_MONTH_STEP_DAYS,
            confidence_z: CONFIDENCE_Z_95,
            fallback_lower_factor: FALLBACK_LOWER_FACTOR,
            fallback_upper_factor: FALLBACK_UPPER_FACTOR,
            default_horizon: DEFAULT_FORECAST_MONTHS,
            max_horizon: DEFAULT_MAX_HORIZON,
        }
    }
}

/// Which projection path produced a forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMode {
    /// No transactions at all
    #[default]
    Empty,
    /// Fewer than two months of expenses; flat average projection
    InsufficientHistory,
    /// Linear trend over monthly expense totals
    TrendFit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub forecasts: Vec<ForecastPoint>,
    pub average_monthly_spending: f64,
    pub average_monthly_income: f64,
    pub spending_trend: SpendingTrend,
    pub savings_rate: f64,
    pub advice: String,
    #[serde(default)]
    pub mode: ForecastMode,
    /// Fitted slope, present only for trend fits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slope: Option<f64>,
}

impl Forecast {
    pub fn empty() -> Self {
        Self {
            forecasts: vec![],
            average_monthly_spending: 0.0,
            average_monthly_income: 0.0,
            spending_trend: SpendingTrend::Stable,
            savings_rate: 0.0,
            advice: EMPTY_ADVICE.to_string(),
            mode: ForecastMode::Empty,
            slope: None,
        }
    }
}

pub struct Forecaster {
    settings: ForecastSettings,
}

impl Forecaster {
    pub fn new() -> Self {
        Self {
            settings: ForecastSettings::default(),
        }
    }

    pub fn with_settings(settings: ForecastSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ForecastSettings {
        &self.settings
    }

    /// Project `months` months after `now`, capped at `max_horizon`
    pub fn forecast(
        &self,
        transactions: &[NormalizedTransaction],
        months: u32,
        now: NaiveDateTime,
    ) -> Forecast {
        let months = self.capped_horizon(months);

        if transactions.is_empty() {
            return Forecast::empty();
        }

        let spending: Vec<f64> = monthly_expense_series(transactions)
            .into_iter()
            .map(|(_, total)| total)
            .collect();
        let income: Vec<f64> = monthly_income_series(transactions)
            .into_iter()
            .map(|(_, total)| total)
            .collect();

        let forecast = match LinearFit::fit_indexed(&spending) {
            Some(fit) => self.trend_fit(&spending, &income, fit, months, now),
            None => self.flat_average(&spending, &income, months, now),
        };

        debug!(
            mode = ?forecast.mode,
            history_months = spending.len(),
            horizon = months,
            trend = forecast.spending_trend.as_str(),
            "Projected forecast"
        );

        forecast
    }

    fn flat_average(
        &self,
        spending: &[f64],
        income: &[f64],
        months: u32,
        now: NaiveDateTime,
    ) -> Forecast {
        let avg_spending = mean(spending);
        let avg_income = mean(income);

        let forecasts = (0..months)
            .map_while(|i| self.month_label(now, i))
            .map(|month| ForecastPoint {
                month,
                predicted_spending: avg_spending,
                predicted_income: avg_income,
                predicted_savings: avg_income - avg_spending,
                confidence_lower: avg_spending * self.settings.fallback_lower_factor,
                confidence_upper: avg_spending * self.settings.fallback_upper_factor,
            })
            .collect();

        Forecast {
            forecasts,
            average_monthly_spending: avg_spending,
            average_monthly_income: avg_income,
            spending_trend: SpendingTrend::Stable,
            savings_rate: percentage(avg_income - avg_spending, avg_income),
            advice: INSUFFICIENT_HISTORY_ADVICE.to_string(),
            mode: ForecastMode::InsufficientHistory,
            slope: None,
        }
    }

    fn trend_fit(
        &self,
        spending: &[f64],
        income: &[f64],
        fit: LinearFit,
        months: u32,
        now: NaiveDateTime,
    ) -> Forecast {
        let avg_spending = mean(spending);
        let avg_income = mean(income);
        let margin = self.settings.confidence_z * sample_std_dev(spending);
        let trend = self.classify_trend(fit.slope);

        let forecasts = (0..months)
            .map_while(|i| self.month_label(now, i).map(|month| (i, month)))
            .map(|(i, month)| {
                let x = (spending.len() + i as usize) as f64;
                let predicted = fit.predict(x).max(0.0);
                ForecastPoint {
                    month,
                    predicted_spending: predicted,
                    predicted_income: avg_income,
                    predicted_savings: avg_income - predicted,
                    confidence_lower: (predicted - margin).max(0.0),
                    confidence_upper: predicted + margin,
                }
            })
            .collect();

        let savings_rate = percentage(avg_income - avg_spending, avg_income);

        Forecast {
            forecasts,
            average_monthly_spending: avg_spending,
            average_monthly_income: avg_income,
            spending_trend: trend,
            savings_rate,
            advice: advice(savings_rate, trend).to_string(),
            mode: ForecastMode::TrendFit,
            slope: Some(fit.slope),
        }
    }

    pub fn classify_trend(&self, slope: f64) -> SpendingTrend {
        let threshold = self.settings.trend_slope_threshold;
        if slope > threshold {
            SpendingTrend::Increasing
        } else if slope < -threshold {
            SpendingTrend::Decreasing
        } else {
            SpendingTrend::Stable
        }
    }

    fn capped_horizon(&self, months: u32) -> u32 {
        let max = self.settings.max_horizon;
        if months > max {
            warn!(requested = months, max_horizon = max, "Forecast horizon capped");
            return max;
        }
        months
    }

    /// Label of the projected month at zero-based offset `index`, or `None`
    /// once the date leaves the representable range
    pub fn month_label(&self, now: NaiveDateTime, index: u32) -> Option<MonthBucket> {
        let step = index.checked_add(1)?;
        match self.settings.month_step {
            MonthStep::FixedDays => {
                let days = self.settings.month_step_days.checked_mul(i64::from(step))?;
                let date = now.checked_add_signed(Duration::try_days(days)?)?;
                Some(MonthBucket::from_date(date.date()))
            }
            MonthStep::Calendar => {
                let start = MonthBucket::from_date(now.date());
                let label = start.add_months(step);
                label.first_day().map(|_| label)
            }
        }
    }
}

impl Default for Forecaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Forecast advice; the first matching rule wins
pub fn advice(savings_rate: f64, trend: SpendingTrend) -> &'static str {
    if savings_rate < LOW_SAVINGS_RATE {
        "Your savings rate is low. Consider cutting back on discretionary spending to build your emergency fund."
    } else if savings_rate < TARGET_SAVINGS_RATE {
        "You're saving a decent amount. Try to increase it to 20% for better financial security."
    } else {
        match trend {
            SpendingTrend::Increasing => {
                "Your spending is trending upward. Review your recent expenses to identify areas to cut back."
            }
            SpendingTrend::Decreasing => {
                "Great job! Your spending is decreasing. Keep up the good financial habits."
            }
            SpendingTrend::Stable => {
                "Your finances look stable. Consider investing your extra savings for long-term growth."
            }
        }
    }
}
