//! OpenAI-compatible backend
//!
//! Works with any server that implements the OpenAI chat completions API
//! (vLLM, LocalAI, llama-server, Docker Model Runner, hosted OpenAI).
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-3.5-turbo)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::prompts::PromptLibrary;
use crate::summary::FinancialSummary;

use super::{non_empty, render_advice_prompt, AdviceBackend};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl OpenAICompatibleBackend {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
            prompts: Arc::new(RwLock::new(PromptLibrary::new())),
        }
    }

    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            api_key: Some(api_key.to_string()),
            ..Self::new(base_url, model)
        }
    }

    /// Use a specific prompt library (e.g. embedded prompts only in tests)
    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = Arc::new(RwLock::new(prompts));
        self
    }

    /// Create from environment variables
    ///
    /// Required: `OPENAI_COMPATIBLE_HOST`
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OPENAI_COMPATIBLE_HOST").ok()?;
        let model = std::env::var("OPENAI_COMPATIBLE_MODEL")
            .unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string());

        let mut backend = Self::new(&host, &model);
        backend.api_key = std::env::var("OPENAI_COMPATIBLE_API_KEY").ok();
        Some(backend)
    }

    pub fn host(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[async_trait]
impl AdviceBackend for OpenAICompatibleBackend {
    async fn generate(&self, summary: &FinancialSummary) -> Result<String> {
        let prompt = render_advice_prompt(&self.prompts, summary)?;

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = prompt.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.user,
        });

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: prompt.temperature,
            max_tokens: prompt.max_tokens,
            stream: false,
        };

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::BackendUnavailable(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;
        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::InvalidData("No choices in OpenAI API response".into()))?;
        debug!(model = %self.model, chars = content.len(), "OpenAI-compatible advice response");

        non_empty(content)
    }

    async fn health_check(&self) -> bool {
        // /v1/models is standard; some local servers only answer /health
        for path in ["/v1/models", "/health"] {
            if let Ok(resp) = self
                .http_client
                .get(format!("{}{}", self.base_url, path))
                .send()
                .await
            {
                if resp.status().is_success() {
                    return true;
                }
            }
        }
        false
    }

    fn name(&self) -> &str {
        "openai_compatible"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_new_trims_trailing_slash() {
        let backend = OpenAICompatibleBackend::new("http://localhost:12434/", "llama3.2");
        assert_eq!(backend.host(), "http://localhost:12434");
        assert_eq!(backend.model(), "llama3.2");
        assert!(backend.api_key.is_none());
    }

    #[test]
    fn test_backend_with_api_key() {
        let backend =
            OpenAICompatibleBackend::with_api_key("http://localhost:12434", "gpt-4", "sk-test123");
        assert_eq!(backend.model(), "gpt-4");
        assert_eq!(backend.api_key.as_deref(), Some("sk-test123"));
    }

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let backend = OpenAICompatibleBackend::new("http://127.0.0.1:1", "llama3.2");
        assert!(!backend.health_check().await);
    }

    #[test]
    fn test_request_serialization_omits_unset_options() {
        let request = ChatCompletionRequest {
            model: "llama3.2".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "Hello".to_string(),
            }],
            temperature: Some(0.7),
            max_tokens: None,
            stream: false,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3.2");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Hello");
        let temp = json["temperature"].as_f64().unwrap();
        assert!((temp - 0.7).abs() < 0.001);
        assert_eq!(json["stream"], false);
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Save more."},
                "finish_reason": "stop"
            }]
        }"#;

        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices.len(), 1);
        assert_eq!(response.choices[0].message.content, "Save more.");
    }
}
