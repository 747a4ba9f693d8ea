//! Insight Engine - evaluates the registered rules in order

use crate::aggregate::Totals;
use crate::models::{CategoryAggregate, MonthlyAggregate, UnusualTransaction};

use super::types::InsightKind;
use super::{
    MonthOverMonthInsight, SavingsRateInsight, TopCategoryInsight, UnusualTransactionsInsight,
};

/// Read-only view of one request's analysis results
pub struct InsightContext<'a> {
    pub totals: &'a Totals,
    /// Sorted descending by total
    pub categories: &'a [CategoryAggregate],
    /// Sorted ascending by month
    pub months: &'a [MonthlyAggregate],
    pub unusual: &'a [UnusualTransaction],
}

impl<'a> InsightContext<'a> {
    pub fn new(
        totals: &'a Totals,
        categories: &'a [CategoryAggregate],
        months: &'a [MonthlyAggregate],
        unusual: &'a [UnusualTransaction],
    ) -> Self {
        Self {
            totals,
            categories,
            months,
            unusual,
        }
    }
}

/// A single threshold rule
pub trait InsightRule: Send + Sync {
    fn id(&self) -> InsightKind;

    fn name(&self) -> &'static str;

    /// Message for this request, or `None` when the rule does not apply
    fn evaluate(&self, ctx: &InsightContext<'_>) -> Option<String>;
}

pub struct InsightEngine {
    rules: Vec<Box<dyn InsightRule>>,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    /// Create an engine with the built-in rules in evaluation order
    pub fn new() -> Self {
        let mut engine = Self { rules: vec![] };

        engine.register(Box::new(TopCategoryInsight));
        engine.register(Box::new(SavingsRateInsight::new()));
        engine.register(Box::new(MonthOverMonthInsight::new()));
        engine.register(Box::new(UnusualTransactionsInsight));

        engine
    }

    /// Append a rule; it runs after every rule registered before it
    pub fn register(&mut self, rule: Box<dyn InsightRule>) {
        self.rules.push(rule);
    }

    /// Run every rule and collect the messages of those that fire
    pub fn synthesize(&self, ctx: &InsightContext<'_>) -> Vec<String> {
        let mut messages = Vec::new();

        for rule in &self.rules {
            if let Some(message) = rule.evaluate(ctx) {
                tracing::debug!(rule = rule.id().as_str(), "Insight rule fired");
                messages.push(message);
            }
        }

        messages
    }

    pub fn insight_kinds(&self) -> Vec<InsightKind> {
        self.rules.iter().map(|r| r.id()).collect()
    }
}
