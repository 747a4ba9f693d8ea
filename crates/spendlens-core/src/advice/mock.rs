//! Mock backend for testing
//!
//! Returns a canned reply without any network access. Can be configured to
//! fail or to respond slowly so the advisor fallback paths can be exercised.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::summary::FinancialSummary;

use super::AdviceBackend;

pub const MOCK_ADVICE: &str = "Mock advice: keep tracking your spending.";

#[derive(Debug, Clone)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    reply: Option<String>,
    delay: Option<Duration>,
}

impl MockBackend {
    /// Healthy backend answering with [`MOCK_ADVICE`]
    pub fn new() -> Self {
        Self {
            healthy: true,
            reply: Some(MOCK_ADVICE.to_string()),
            delay: None,
        }
    }

    pub fn with_reply(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            ..Self::new()
        }
    }

    /// Backend whose generate calls always fail
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            reply: None,
            delay: None,
        }
    }

    /// Wait before answering
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdviceBackend for MockBackend {
    async fn generate(&self, _summary: &FinancialSummary) -> Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply
            .clone()
            .ok_or_else(|| Error::BackendUnavailable("mock backend is unhealthy".into()))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock"
    }
}
