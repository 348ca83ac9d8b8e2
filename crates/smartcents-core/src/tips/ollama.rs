//! Ollama backend
//!
//! Uses `/api/generate` with the system prompt and the question folded into
//! a single prompt.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatRequest, TipGenerator, TipRequest};
use crate::config::TipsConfig;
use crate::error::{Error, Result};

pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

#[derive(Clone)]
pub struct OllamaTips {
    http_client: Client,
    base_url: String,
    model: String,
}

impl OllamaTips {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Create from `OLLAMA_HOST`/`OLLAMA_MODEL`, with config values as fallbacks
    pub fn from_env(config: &TipsConfig) -> Option<Self> {
        let host = std::env::var("OLLAMA_HOST")
            .ok()
            .or_else(|| config.host.clone())?;
        let model = std::env::var("OLLAMA_MODEL")
            .ok()
            .or_else(|| config.model.clone())
            .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string());
        Some(Self::new(&host, &model))
    }

    async fn generate(&self, prompt: String) -> Result<String> {
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::Tip(format!("Ollama returned {}", status)));
        }

        let ollama_response: OllamaResponse = response.json().await?;
        debug!(model = %self.model, "Ollama response: {}", ollama_response.response);
        Ok(ollama_response.response.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[async_trait]
impl TipGenerator for OllamaTips {
    async fn generate_tip(&self, request: &TipRequest) -> Result<String> {
        let prompt = format!(
            "{}\n\nGive one short, specific tip to improve these finances.",
            request.system_prompt()
        );
        self.generate(prompt).await
    }

    async fn chat_reply(&self, request: &ChatRequest) -> Result<String> {
        let prompt = format!(
            "{}\n\nQuestion: {}\nAnswer:",
            request.tip.system_prompt(),
            request.message
        );
        self.generate(prompt).await
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

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockChatServer;

    fn request() -> TipRequest {
        TipRequest {
            context: "No financial data available yet.".to_string(),
            score: None,
            rule_tip: "rule".to_string(),
            advice: "advice".to_string(),
        }
    }

    #[test]
    fn test_from_env_uses_config_host() {
        std::env::remove_var("OLLAMA_HOST");
        std::env::remove_var("OLLAMA_MODEL");
        let config = TipsConfig {
            backend: "ollama".to_string(),
            model: None,
            host: Some("http://localhost:11434/".to_string()),
        };
        let backend = OllamaTips::from_env(&config).unwrap();
        assert_eq!(backend.host(), "http://localhost:11434");
        assert_eq!(backend.model(), DEFAULT_OLLAMA_MODEL);

        let no_host = TipsConfig::default();
        assert!(OllamaTips::from_env(&no_host).is_none());
    }

    #[tokio::test]
    async fn test_generate_against_mock_server() {
        let server = MockChatServer::start().await;
        let backend = OllamaTips::new(&server.url(), "llama3.2");
        assert!(backend.health_check().await);

        let tip = backend.generate_tip(&request()).await.unwrap();
        assert!(!tip.is_empty());

        let reply = backend
            .chat_reply(&ChatRequest {
                message: "Should I buy a game?".to_string(),
                tip: request(),
            })
            .await
            .unwrap();
        assert!(reply.contains("Should I buy a game?"));
    }
}
