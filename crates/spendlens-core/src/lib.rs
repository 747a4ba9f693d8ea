//! Spendlens Core Library
//!
//! Analytics pipeline for the Spendlens personal finance tool:
//! - Transaction normalization and file loading (JSON, CSV)
//! - Category and monthly aggregation
//! - Statistical outlier detection
//! - Rule-based insight synthesis
//! - Trend-based spending forecasts with confidence bounds
//! - Spending pattern analysis and keyword categorization
//! - Advice generation with optional local LLM backends (Ollama, OpenAI-compatible)
//! - Prompt library for customizable advice prompts

pub mod advice;
pub mod aggregate;
pub mod categorize;
pub mod config;
pub mod error;
pub mod forecast;
pub mod import;
pub mod insights;
pub mod models;
pub mod normalize;
pub mod outliers;
pub mod patterns;
pub mod pipeline;
pub mod prompts;
pub mod stats;
pub mod summary;

/// Test utilities including a mock LLM server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use advice::{
    Advice, AdviceBackend, AdviceClient, Advisor, MockBackend, OllamaBackend,
    OpenAICompatibleBackend, RuleBasedAdvisor,
};
pub use categorize::{Categorization, KeywordCategorizer};
pub use config::{AdviceSettings, AnalyticsConfig, CategoryKeywords};
pub use error::{Error, Result};
pub use forecast::{Forecast, ForecastMode, ForecastSettings, Forecaster, MonthStep};
pub use import::{load_file, ImportedTransactions, TransactionFormat};
pub use insights::{InsightContext, InsightEngine, InsightKind, InsightRule};
pub use models::{
    AnalyzeRequest, AnalyzeResponse, CategoryAggregate, CategoryDetail, ForecastPoint,
    ForecastRequest, ForecastResponse, MonthBucket, MonthlyAggregate, NormalizedTransaction,
    PatternsResponse, SpendingTrend, Transaction, TransactionKind, UnusualTransaction,
};
pub use outliers::{OutlierDetector, OutlierSettings};
pub use patterns::{analyze_patterns, PatternReport, SpendingPattern};
pub use pipeline::Pipeline;
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
pub use summary::FinancialSummary;
