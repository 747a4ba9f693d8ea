//! Test utilities for spendlens-core
//!
//! A mock LLM server speaking both the OpenAI chat completions API and the
//! Ollama generate API, for exercising the advice backends and the advisor's
//! fallback paths without a real model.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// Advice text returned in [`MockMode::Ok`]
pub const MOCK_LLM_ADVICE: &str =
    "You're in good shape. Keep your savings rate above 20% and review dining out.";

/// How the mock server answers completion requests
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Well-formed response carrying this text
    Ok(String),
    /// 200 with a body that is not the expected JSON shape
    Malformed,
    /// Well-formed response with an empty completion
    Empty,
    /// Well-formed response after the given delay
    Slow(Duration),
    /// HTTP 500
    Error,
}

#[derive(Clone)]
struct ServerState {
    mode: MockMode,
    /// Last request body received, for assertions
    last_request: Arc<Mutex<Option<Value>>>,
}

pub struct MockLlmServer {
    addr: SocketAddr,
    last_request: Arc<Mutex<Option<Value>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockLlmServer {
    /// Start a server answering with [`MOCK_LLM_ADVICE`]
    pub async fn start() -> Self {
        Self::start_with(MockMode::Ok(MOCK_LLM_ADVICE.to_string())).await
    }

    /// Start the mock server on an available port
    pub async fn start_with(mode: MockMode) -> Self {
        let last_request = Arc::new(Mutex::new(None));
        let state = ServerState {
            mode,
            last_request: last_request.clone(),
        };

        let app = Router::new()
            .route("/v1/chat/completions", post(handle_chat_completion))
            .route("/v1/models", get(handle_models))
            .route("/health", get(handle_health))
            .route("/api/generate", post(handle_generate))
            .route("/api/tags", get(handle_tags))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            last_request,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Body of the most recent completion request
    pub fn last_request(&self) -> Option<Value> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockLlmServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Resolve the mode into the completion text, or an early response
async fn completion_text(state: &ServerState, request: Value) -> Result<String, Response> {
    if let Ok(mut last) = state.last_request.lock() {
        *last = Some(request);
    }

    match &state.mode {
        MockMode::Ok(text) => Ok(text.clone()),
        MockMode::Empty => Ok(String::new()),
        MockMode::Slow(delay) => {
            tokio::time::sleep(*delay).await;
            Ok(MOCK_LLM_ADVICE.to_string())
        }
        MockMode::Malformed => Err((StatusCode::OK, "{\"unexpected\": true}").into_response()),
        MockMode::Error => Err((StatusCode::INTERNAL_SERVER_ERROR, "model crashed").into_response()),
    }
}

async fn handle_chat_completion(
    State(state): State<ServerState>,
    Json(request): Json<Value>,
) -> Response {
    let model = request["model"].as_str().unwrap_or("mock").to_string();
    match completion_text(&state, request).await {
        Ok(content) => Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "model": model,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        }))
        .into_response(),
        Err(response) => response,
    }
}

async fn handle_generate(State(state): State<ServerState>, Json(request): Json<Value>) -> Response {
    let model = request["model"].as_str().unwrap_or("mock").to_string();
    match completion_text(&state, request).await {
        Ok(text) => Json(json!({"model": model, "response": text, "done": true})).into_response(),
        Err(response) => response,
    }
}

async fn handle_models() -> Json<Value> {
    Json(json!({"object": "list", "data": [{"id": "mock-model", "object": "model"}]}))
}

async fn handle_health() -> StatusCode {
    StatusCode::OK
}

async fn handle_tags() -> Json<Value> {
    Json(json!({
        "models": [{
            "name": "llama3.2:latest",
            "modified_at": "2024-01-01T00:00:00Z",
            "size": 4_000_000_000u64
        }]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::{
        AdviceBackend, AdviceClient, Advisor, OllamaBackend, OpenAICompatibleBackend,
        RuleBasedAdvisor,
    };
    use crate::models::MonthBucket;
    use crate::prompts::PromptLibrary;
    use crate::summary::FinancialSummary;

    fn summary() -> FinancialSummary {
        FinancialSummary {
            month: MonthBucket::new(2024, 6),
            total_balance: 2000.0,
            monthly_income: 4000.0,
            monthly_expenses: 3000.0,
            monthly_savings: 1000.0,
            savings_rate: 25.0,
            spending_by_category: vec![],
        }
    }

    fn openai(server: &MockLlmServer) -> OpenAICompatibleBackend {
        OpenAICompatibleBackend::with_api_key(&server.url(), "mock-model", "sk-test")
            .with_prompts(PromptLibrary::embedded_only())
    }

    fn ollama(server: &MockLlmServer) -> OllamaBackend {
        OllamaBackend::new(&server.url(), "llama3.2").with_prompts(PromptLibrary::embedded_only())
    }

    #[tokio::test]
    async fn test_openai_compatible_round_trip() {
        let server = MockLlmServer::start().await;
        let backend = openai(&server);

        assert!(backend.health_check().await);
        let text = backend.generate(&summary()).await.unwrap();
        assert_eq!(text, MOCK_LLM_ADVICE);

        let request = server.last_request().unwrap();
        assert_eq!(request["model"], "mock-model");
        assert_eq!(request["messages"][0]["role"], "system");
        assert_eq!(request["messages"][1]["role"], "user");
        let user = request["messages"][1]["content"].as_str().unwrap();
        assert!(user.contains("Monthly Income: $4,000.00"));
        assert_eq!(request["max_tokens"], 500);
    }

    #[tokio::test]
    async fn test_ollama_round_trip() {
        let server = MockLlmServer::start_with(MockMode::Ok("Ollama says hi".into())).await;
        let backend = ollama(&server);

        assert!(backend.health_check().await);
        assert_eq!(backend.generate(&summary()).await.unwrap(), "Ollama says hi");

        let request = server.last_request().unwrap();
        assert_eq!(request["stream"], false);
        assert!(request["prompt"]
            .as_str()
            .unwrap()
            .contains("Savings Rate: 25.0%"));
    }

    #[tokio::test]
    async fn test_backend_errors() {
        for mode in [MockMode::Malformed, MockMode::Empty, MockMode::Error] {
            let server = MockLlmServer::start_with(mode.clone()).await;
            assert!(openai(&server).generate(&summary()).await.is_err(), "{:?}", mode);
            assert!(ollama(&server).generate(&summary()).await.is_err(), "{:?}", mode);
        }
    }

    #[tokio::test]
    async fn test_advisor_falls_back_on_slow_server() {
        let server = MockLlmServer::start_with(MockMode::Slow(Duration::from_millis(500))).await;
        let advisor = Advisor::new(
            Some(AdviceClient::OpenAICompatible(openai(&server))),
            Duration::from_millis(50),
        );

        let advice = advisor.advise(&summary()).await;
        assert!(!advice.ai_generated);
        assert_eq!(advice.text, RuleBasedAdvisor::new().advise(&summary()));
    }

    #[tokio::test]
    async fn test_advisor_uses_backend_when_healthy() {
        let server = MockLlmServer::start().await;
        let advisor = Advisor::new(
            Some(AdviceClient::Ollama(ollama(&server))),
            Duration::from_secs(5),
        );

        let advice = advisor.advise(&summary()).await;
        assert!(advice.ai_generated);
        assert_eq!(advice.backend, "ollama");
        assert_eq!(advice.text, MOCK_LLM_ADVICE);
    }
}
