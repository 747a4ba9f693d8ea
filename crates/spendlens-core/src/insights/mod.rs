//! Insight Synthesizer - rule-based spending observations
//!
//! A fixed, ordered set of threshold rules runs over the aggregates and the
//! outlier report. Every matching rule contributes one message, in
//! registration order; rules never short-circuit each other.
//!
//! ## Built-in rules
//!
//! - **Top Category** - names the highest-spend category and its share
//! - **Savings Rate** - warns, nudges or congratulates based on net/income
//! - **Month over Month** - flags a >20% swing between the last two months
//! - **Unusual Transactions** - counts the flagged outliers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spendlens_core::insights::{InsightContext, InsightEngine};
//!
//! let engine = InsightEngine::new();
//! let ctx = InsightContext::new(&totals, &categories, &months, &unusual);
//! let messages = engine.synthesize(&ctx);
//! ```

pub mod engine;
pub mod rules;
pub mod types;

pub use engine::{InsightContext, InsightEngine, InsightRule};
pub use rules::{
    MonthOverMonthInsight, SavingsRateInsight, TopCategoryInsight, UnusualTransactionsInsight,
};
pub use types::{InsightKind, EMPTY_INPUT_INSIGHT};
