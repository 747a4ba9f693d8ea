//! Request-level entry points
//!
//! A [`Pipeline`] borrows the loaded [`AnalyticsConfig`] and fixes "now" for
//! the whole request, so repeated calls over the same input give identical
//! output. Every operation normalizes its own copy of the input; nothing is
//! kept between calls.

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::advice::{Advice, Advisor};
use crate::aggregate::{self, TOP_CATEGORY_COUNT};
use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::forecast::Forecaster;
use crate::insights::{InsightContext, InsightEngine, EMPTY_INPUT_INSIGHT};
use crate::models::{
    AnalyzeRequest, AnalyzeResponse, CategoryDetail, ForecastRequest, ForecastResponse,
    NormalizedTransaction, PatternsResponse, Transaction,
};
use crate::normalize::normalize;
use crate::outliers::OutlierDetector;
use crate::patterns::analyze_patterns;
use crate::summary::FinancialSummary;

pub struct Pipeline<'a> {
    config: &'a AnalyticsConfig,
    now: NaiveDateTime,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a AnalyticsConfig, now: NaiveDateTime) -> Self {
        Self { config, now }
    }

    /// Pipeline anchored at the local wall-clock time
    pub fn now(config: &'a AnalyticsConfig) -> Self {
        Self::new(config, chrono::Local::now().naive_local())
    }

    pub fn config(&self) -> &AnalyticsConfig {
        self.config
    }

    pub fn anchor(&self) -> NaiveDateTime {
        self.now
    }

    pub fn normalize(&self, transactions: &[Transaction]) -> Vec<NormalizedTransaction> {
        normalize(transactions, self.now)
    }

    /// Totals, breakdowns, outliers and insights for one transaction list
    pub fn analyze(&self, request: &AnalyzeRequest) -> AnalyzeResponse {
        let transactions = self.normalize(&request.transactions);

        if transactions.is_empty() {
            debug!(user_id = request.user_id, "Analyze called with no transactions");
            return AnalyzeResponse {
                user_id: request.user_id,
                total_transactions: 0,
                total_income: 0.0,
                total_expenses: 0.0,
                net_balance: 0.0,
                category_breakdown: vec![],
                monthly_breakdown: vec![],
                top_spending_categories: vec![],
                unusual_transactions: vec![],
                insights: vec![EMPTY_INPUT_INSIGHT.to_string()],
            };
        }

        let totals = aggregate::totals(&transactions);
        let categories = aggregate::category_breakdown(&transactions);
        let months = aggregate::monthly_breakdown(&transactions);
        let unusual =
            OutlierDetector::with_settings(self.config.outliers.clone()).detect(&transactions);
        debug!(
            categories = categories.len(),
            months = months.len(),
            unusual = unusual.len(),
            "Aggregated transactions"
        );

        let ctx = InsightContext::new(&totals, &categories, &months, &unusual);
        let insights = InsightEngine::new().synthesize(&ctx);

        info!(
            user_id = request.user_id,
            transactions = totals.transaction_count,
            insights = insights.len(),
            "Analysis complete"
        );

        AnalyzeResponse {
            user_id: request.user_id,
            total_transactions: totals.transaction_count,
            total_income: totals.total_income,
            total_expenses: totals.total_expenses,
            net_balance: totals.net_balance,
            top_spending_categories: aggregate::top_categories(&categories, TOP_CATEGORY_COUNT),
            category_breakdown: categories,
            monthly_breakdown: months,
            unusual_transactions: unusual,
            insights,
        }
    }

    pub fn forecast(&self, request: &ForecastRequest) -> ForecastResponse {
        let transactions = self.normalize(&request.transactions);
        let forecast = Forecaster::with_settings(self.config.forecast.clone()).forecast(
            &transactions,
            request.forecast_months,
            self.now,
        );

        info!(
            user_id = request.user_id,
            months = request.forecast_months,
            mode = ?forecast.mode,
            trend = forecast.spending_trend.as_str(),
            "Forecast complete"
        );

        ForecastResponse {
            user_id: request.user_id,
            forecast,
        }
    }

    /// Fails with `Error::NotFound` when nothing is in `category`
    pub fn category_detail(
        &self,
        transactions: &[Transaction],
        category: &str,
    ) -> Result<CategoryDetail> {
        aggregate::category_detail(&self.normalize(transactions), category)
    }

    pub fn patterns(&self, user_id: i64, transactions: &[Transaction]) -> PatternsResponse {
        let report = analyze_patterns(&self.normalize(transactions));
        debug!(
            user_id,
            patterns = report.patterns.len(),
            risk_score = report.risk_score,
            "Pattern analysis complete"
        );
        PatternsResponse { user_id, report }
    }

    pub fn financial_summary(&self, transactions: &[Transaction]) -> FinancialSummary {
        FinancialSummary::from_transactions(&self.normalize(transactions), self.now)
    }

    /// Summary plus advice from `advisor`, which never fails
    pub async fn advise(&self, transactions: &[Transaction], advisor: &Advisor) -> Advice {
        let summary = self.financial_summary(transactions);
        advisor.advise(&summary).await
    }
}
