//! OpenAI-compatible chat completions backend
//!
//! Works with OpenAI itself and with any server exposing
//! `/v1/chat/completions` (vLLM, LocalAI, llama-server, Docker Model Runner).
//!
//! # Configuration
//!
//! - `OPENAI_COMPATIBLE_HOST`: server URL (default: `https://api.openai.com`)
//! - `OPENAI_COMPATIBLE_MODEL`: model name (default: `gpt-4o-mini`)
//! - `OPENAI_COMPATIBLE_API_KEY` or `OPENAI_API_KEY`: bearer token

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatRequest, TipGenerator, TipRequest};
use crate::config::TipsConfig;
use crate::error::{Error, Result};

pub const DEFAULT_OPENAI_HOST: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

const MAX_TOKENS: u32 = 250;
const TEMPERATURE: f32 = 0.7;

const TIP_INSTRUCTION: &str = "Give me one short, specific tip to improve my finances.";

#[derive(Clone)]
pub struct OpenAICompatibleTips {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAICompatibleTips {
    pub fn new(base_url: &str, model: &str, api_key: Option<&str>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.map(str::to_string),
        }
    }

    /// Create from environment variables, with config values as fallbacks
    ///
    /// Returns `None` when talking to the default OpenAI host without an API
    /// key, since every request would be rejected.
    pub fn from_env(config: &TipsConfig) -> Option<Self> {
        let explicit_host = std::env::var("OPENAI_COMPATIBLE_HOST")
            .ok()
            .or_else(|| config.host.clone());
        let model = std::env::var("OPENAI_COMPATIBLE_MODEL")
            .ok()
            .or_else(|| config.model.clone())
            .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());
        let api_key = std::env::var("OPENAI_COMPATIBLE_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|k| !k.is_empty());

        if explicit_host.is_none() && api_key.is_none() {
            tracing::warn!("No OpenAI API key configured");
            return None;
        }

        let host = explicit_host.unwrap_or_else(|| DEFAULT_OPENAI_HOST.to_string());
        Some(Self::new(&host, &model, api_key.as_deref()))
    }

    async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
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
            return Err(Error::Tip(format!("Chat API error {}: {}", status, body)));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| Error::Tip("No choices in chat completion response".into()))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

impl ChatMessage {
    fn system(content: String) -> Self {
        Self {
            role: "system",
            content,
        }
    }

    fn user(content: &str) -> Self {
        Self {
            role: "user",
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl TipGenerator for OpenAICompatibleTips {
    async fn generate_tip(&self, request: &TipRequest) -> Result<String> {
        let messages = vec![
            ChatMessage::system(request.system_prompt()),
            ChatMessage::user(TIP_INSTRUCTION),
        ];
        let tip = self.chat_completion(messages).await?;
        debug!(model = %self.model, chars = tip.len(), "Chat tip received");
        Ok(tip)
    }

    async fn chat_reply(&self, request: &ChatRequest) -> Result<String> {
        let messages = vec![
            ChatMessage::system(request.tip.system_prompt()),
            ChatMessage::user(&request.message),
        ];
        let reply = self.chat_completion(messages).await?;
        debug!(model = %self.model, chars = reply.len(), "Chat reply received");
        Ok(reply)
    }

    async fn health_check(&self) -> bool {
        let mut req_builder = self
            .http_client
            .get(format!("{}/v1/models", self.base_url));
        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }
        match req_builder.send().await {
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
