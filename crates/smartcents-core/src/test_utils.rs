//! Test utilities for smartcents-core
//!
//! A mock language model server speaking just enough of the OpenAI chat
//! completions and Ollama generate APIs for the tip generators.

use axum::{
    extract::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::sync::oneshot;

/// Mock chat server for tests and local development
pub struct MockChatServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockChatServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat_completions))
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate));

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
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockChatServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_models() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "object": "list",
        "data": [{ "id": "gpt-4o-mini", "object": "model" }]
    }))
}

/// Echoes the last user message inside a canned tip
async fn handle_chat_completions(Json(request): Json<ChatRequest>) -> Json<serde_json::Value> {
    let question = request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| m.content.clone())
        .unwrap_or_default();

    Json(serde_json::json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "model": request.model,
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": format!("**Great** question! You asked: {}", question)
            },
            "finish_reason": "stop"
        }]
    }))
}

async fn handle_tags() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "models": [{ "name": "llama3.2:latest", "size": 2_000_000_000u64 }]
    }))
}

/// Answers questions by echoing them; otherwise returns a fixed tip
async fn handle_generate(Json(request): Json<GenerateRequest>) -> Json<GenerateResponse> {
    let response = request
        .prompt
        .lines()
        .find_map(|line| line.strip_prefix("Question: "))
        .map(|q| format!("Good thinking. About \"{}\": wait a day before buying.", q))
        .unwrap_or_else(|| "Try saving *a little* every week.".to_string());

    Json(GenerateResponse {
        model: request.model,
        response,
        done: true,
    })
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}
