//! Ollama backend
//!
//! Sends the rendered advice prompt to `/api/generate` without streaming.
//! Ollama has no separate system role on this endpoint, so the system
//! section is prepended to the prompt.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::prompts::PromptLibrary;
use crate::summary::FinancialSummary;

use super::{non_empty, render_advice_prompt, AdviceBackend};

pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl OllamaBackend {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            prompts: Arc::new(RwLock::new(PromptLibrary::new())),
        }
    }

    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = Arc::new(RwLock::new(prompts));
        self
    }

    /// Create from `OLLAMA_HOST` and `OLLAMA_MODEL`
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OLLAMA_HOST").ok()?;
        let model =
            std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_OLLAMA_MODEL.to_string());
        Some(Self::new(&host, &model))
    }

    pub fn host(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl AdviceBackend for OllamaBackend {
    async fn generate(&self, summary: &FinancialSummary) -> Result<String> {
        let rendered = render_advice_prompt(&self.prompts, summary)?;

        let prompt = match rendered.system {
            Some(system) => format!("{}\n\n{}", system, rendered.user),
            None => rendered.user,
        };
        let options = (rendered.temperature.is_some() || rendered.max_tokens.is_some()).then(|| {
            GenerateOptions {
                temperature: rendered.temperature,
                num_predict: rendered.max_tokens,
            }
        });

        let request = GenerateRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
            options,
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::BackendUnavailable(format!(
                "Ollama error {}: {}",
                status, body
            )));
        }

        let generated: GenerateResponse = response.json().await?;
        debug!(model = %self.model, chars = generated.response.len(), "Ollama advice response");

        non_empty(generated.response)
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_new() {
        let backend = OllamaBackend::new("http://localhost:11434/", "gemma3");
        assert_eq!(backend.host(), "http://localhost:11434");
        assert_eq!(backend.model(), "gemma3");
        assert_eq!(backend.name(), "ollama");
    }

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let backend = OllamaBackend::new("http://127.0.0.1:1", "llama3.2");
        assert!(!backend.health_check().await);
    }

    #[test]
    fn test_request_serialization() {
        let request = GenerateRequest {
            model: "llama3.2".to_string(),
            prompt: "hi".to_string(),
            stream: false,
            options: Some(GenerateOptions {
                temperature: None,
                num_predict: Some(500),
            }),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 500);
        assert!(json["options"].get("temperature").is_none());
    }
}
