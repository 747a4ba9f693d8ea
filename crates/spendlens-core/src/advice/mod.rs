//! Advice generation
//!
//! The [`Advisor`] always owns a [`RuleBasedAdvisor`] and may also hold an
//! optional network backend. The backend is tried first under a timeout;
//! any failure (unreachable, non-2xx, timeout, empty or unparseable body)
//! is logged and answered with the rule-based text instead.
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: `openai_compatible`, `ollama`, `mock` or `none`. Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Model name (default: llama3.2)
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required for openai_compatible backend)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-3.5-turbo)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

mod mock;
mod ollama;
mod openai_compatible;
mod rules;

pub use mock::{MockBackend, MOCK_ADVICE};
pub use ollama::{OllamaBackend, DEFAULT_OLLAMA_MODEL};
pub use openai_compatible::{OpenAICompatibleBackend, DEFAULT_OPENAI_MODEL};
pub use rules::{RuleBasedAdvisor, NO_DATA_ADVICE};

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::AdviceSettings;
use crate::error::{Error, Result};
use crate::prompts::{PromptId, PromptLibrary};
use crate::summary::{format_amount, FinancialSummary};

/// Anything that can turn a financial summary into advice text
#[async_trait]
pub trait AdviceBackend: Send + Sync {
    async fn generate(&self, summary: &FinancialSummary) -> Result<String>;

    async fn health_check(&self) -> bool;

    /// Backend identifier, e.g. "ollama"
    fn name(&self) -> &str;

    fn model(&self) -> &str;
}

/// Concrete advice client
///
/// Clone plus static dispatch over the optional backends.
#[derive(Clone)]
pub enum AdviceClient {
    OpenAICompatible(OpenAICompatibleBackend),
    Ollama(OllamaBackend),
    Mock(MockBackend),
}

impl AdviceClient {
    /// Build a client from `AI_BACKEND` and the backend's own variables
    ///
    /// Returns None for `none` or when the chosen backend's host is not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());

        match backend.to_lowercase().as_str() {
            "none" | "off" | "" => None,
            "ollama" => OllamaBackend::from_env().map(AdviceClient::Ollama),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                OpenAICompatibleBackend::from_env().map(AdviceClient::OpenAICompatible)
            }
            "mock" => Some(AdviceClient::Mock(MockBackend::new())),
            _ => {
                warn!(backend = %backend, "Unknown AI_BACKEND, falling back to ollama");
                OllamaBackend::from_env().map(AdviceClient::Ollama)
            }
        }
    }

    pub fn ollama(host: &str, model: &str) -> Self {
        AdviceClient::Ollama(OllamaBackend::new(host, model))
    }

    pub fn openai_compatible(host: &str, model: &str) -> Self {
        AdviceClient::OpenAICompatible(OpenAICompatibleBackend::new(host, model))
    }

    pub fn mock() -> Self {
        AdviceClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl AdviceBackend for AdviceClient {
    async fn generate(&self, summary: &FinancialSummary) -> Result<String> {
        match self {
            AdviceClient::OpenAICompatible(b) => b.generate(summary).await,
            AdviceClient::Ollama(b) => b.generate(summary).await,
            AdviceClient::Mock(b) => b.generate(summary).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AdviceClient::OpenAICompatible(b) => b.health_check().await,
            AdviceClient::Ollama(b) => b.health_check().await,
            AdviceClient::Mock(b) => b.health_check().await,
        }
    }

    fn name(&self) -> &str {
        match self {
            AdviceClient::OpenAICompatible(b) => b.name(),
            AdviceClient::Ollama(b) => b.name(),
            AdviceClient::Mock(b) => b.name(),
        }
    }

    fn model(&self) -> &str {
        match self {
            AdviceClient::OpenAICompatible(b) => b.model(),
            AdviceClient::Ollama(b) => b.model(),
            AdviceClient::Mock(b) => b.model(),
        }
    }
}

/// Advice text plus where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    pub text: String,
    pub ai_generated: bool,
    /// Name of the backend that produced `text`
    pub backend: String,
}

pub struct Advisor {
    rules: RuleBasedAdvisor,
    backend: Option<AdviceClient>,
    timeout: Duration,
}

impl Advisor {
    pub fn new(backend: Option<AdviceClient>, timeout: Duration) -> Self {
        Self {
            rules: RuleBasedAdvisor::new(),
            backend,
            timeout,
        }
    }

    /// Rules only, no network calls
    pub fn rule_based() -> Self {
        Self::new(None, AdviceSettings::default().timeout())
    }

    /// Backend from the environment, timeout from config
    pub fn from_env(settings: &AdviceSettings) -> Self {
        Self::new(AdviceClient::from_env(), settings.timeout())
    }

    pub fn backend(&self) -> Option<&AdviceClient> {
        self.backend.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Produce advice, falling back to the rules on any backend failure
    pub async fn advise(&self, summary: &FinancialSummary) -> Advice {
        if let Some(ref backend) = self.backend {
            match self.try_backend(backend, summary).await {
                Ok(text) => {
                    info!(backend = backend.name(), model = backend.model(), "Generated advice");
                    return Advice {
                        text,
                        ai_generated: true,
                        backend: backend.name().to_string(),
                    };
                }
                Err(e) => {
                    warn!(
                        backend = backend.name(),
                        error = %e,
                        "Advice backend failed, using rule-based advice"
                    );
                }
            }
        }

        Advice {
            text: self.rules.advise(summary),
            ai_generated: false,
            backend: self.rules.name().to_string(),
        }
    }

    async fn try_backend(
        &self,
        backend: &AdviceClient,
        summary: &FinancialSummary,
    ) -> Result<String> {
        tokio::time::timeout(self.timeout, backend.generate(summary))
            .await
            .map_err(|_| Error::Timeout(self.timeout))?
    }
}

/// Prompt text and sampling options for one advice request
pub(crate) struct RenderedPrompt {
    pub system: Option<String>,
    pub user: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Template variables for the financial advice prompt
pub fn prompt_vars(summary: &FinancialSummary) -> HashMap<&'static str, String> {
    let mut vars = HashMap::new();
    vars.insert("total_balance", format_amount(summary.total_balance, 2));
    vars.insert("monthly_income", format_amount(summary.monthly_income, 2));
    vars.insert("monthly_expenses", format_amount(summary.monthly_expenses, 2));
    vars.insert("monthly_savings", format_amount(summary.monthly_savings, 2));
    vars.insert("savings_rate", format!("{:.1}", summary.savings_rate));
    vars.insert("category_breakdown", summary.category_breakdown_text());
    vars
}

pub(crate) fn render_advice_prompt(
    prompts: &RwLock<PromptLibrary>,
    summary: &FinancialSummary,
) -> Result<RenderedPrompt> {
    let mut prompts = prompts
        .write()
        .map_err(|_| Error::InvalidData("Failed to acquire prompt library lock".into()))?;
    let prompt = prompts.get(PromptId::FinancialAdvice)?;
    let vars = prompt_vars(summary);

    Ok(RenderedPrompt {
        system: prompt.system_section().map(|s| s.to_string()),
        user: prompt.render_user(&vars),
        max_tokens: prompt.metadata.max_tokens,
        temperature: prompt.metadata.temperature,
    })
}

/// Blank completions count as malformed responses
pub(crate) fn non_empty(text: String) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidData("Empty advice response".into()));
    }
    Ok(trimmed.to_string())
}
