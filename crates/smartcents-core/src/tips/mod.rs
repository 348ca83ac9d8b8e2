//! Mentor tip generators
//!
//! Tips come from a language model when one is configured and from local
//! rules otherwise. Every caller goes through [`generate_tip_with_fallback`],
//! so a slow or broken model never leaves the user without a tip.
//!
//! # Configuration
//!
//! The backend comes from `TIP_BACKEND` or `[tips] backend` in the config
//! file:
//! - `rules` (default): local rule-based tips, no network
//! - `openai`: any OpenAI-compatible chat completions server
//!   (`OPENAI_COMPATIBLE_HOST`, `OPENAI_COMPATIBLE_MODEL`,
//!   `OPENAI_COMPATIBLE_API_KEY` or `OPENAI_API_KEY`)
//! - `ollama`: a local Ollama server (`OLLAMA_HOST`, `OLLAMA_MODEL`)

mod ollama;
mod openai_compatible;
mod rules;

pub use ollama::OllamaTips;
pub use openai_compatible::OpenAICompatibleTips;
pub use rules::RuleBasedTips;

use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::{mentor_tip, personalized_advice, FinancialSummary};
use crate::config::TipsConfig;
use crate::error::Result;
use crate::models::{Goal, Transaction};

/// Shown when neither the model nor the rules produced anything usable
pub const APOLOGY_TIP: &str = "I apologize, but I'm having trouble analyzing your finances right now. Please try again in a moment.";

/// Everything a generator needs to write a tip
///
/// Built from the user's records up front so no generator ever needs the
/// store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipRequest {
    /// Plain-text financial summary (see [`FinancialSummary::to_prompt_context`])
    pub context: String,
    pub score: Option<u8>,
    /// Rule-based tip for these records
    pub rule_tip: String,
    /// Rule-based advice that names the dominant spending category
    pub advice: String,
}

impl TipRequest {
    pub fn from_records(
        transactions: &[Transaction],
        goals: &[Goal],
        score: Option<u8>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            context: FinancialSummary::from_records(transactions, goals, now).to_prompt_context(),
            score,
            rule_tip: mentor_tip(transactions),
            advice: personalized_advice(transactions),
        }
    }

    /// System prompt for chat-style models
    pub fn system_prompt(&self) -> String {
        let mut prompt = String::from(
            "You are a friendly financial mentor for teenagers using SmartCents. \
             Keep answers under 150 words, positive and practical. \
             Mention the savings rate and top spending category when relevant.\n\n\
             User's financial context:\n",
        );
        prompt.push_str(&self.context);
        if let Some(score) = self.score {
            prompt.push_str(&format!("\nIndependence Score: {}", score));
        }
        prompt
    }
}

/// A free-form question for the mentor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub tip: TipRequest,
}

/// Interface shared by every tip source
#[async_trait]
pub trait TipGenerator: Send + Sync {
    /// A short tip for the user's current finances
    async fn generate_tip(&self, request: &TipRequest) -> Result<String>;

    /// Answer a question with the user's finances as context
    async fn chat_reply(&self, request: &ChatRequest) -> Result<String>;

    /// Whether the backend is reachable
    async fn health_check(&self) -> bool;

    /// Model name (for responses and logs)
    fn model(&self) -> &str;

    /// Host URL (for logs)
    fn host(&self) -> &str;
}

/// Concrete tip client
#[derive(Clone)]
pub enum TipClient {
    OpenAICompatible(OpenAICompatibleTips),
    Ollama(OllamaTips),
    Rules(RuleBasedTips),
}

impl TipClient {
    /// Build from config, letting `TIP_BACKEND` override the configured backend
    ///
    /// Falls back to rule-based tips when the chosen backend is missing its
    /// settings.
    pub fn from_config(config: &TipsConfig) -> Self {
        let backend = std::env::var("TIP_BACKEND")
            .ok()
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| config.backend.clone());

        let client = match backend.to_lowercase().as_str() {
            "rules" | "local" => None,
            "openai" | "openai_compatible" => {
                OpenAICompatibleTips::from_env(config).map(TipClient::OpenAICompatible)
            }
            "ollama" => OllamaTips::from_env(config).map(TipClient::Ollama),
            _ => {
                tracing::warn!(backend = %backend, "Unknown tip backend, using rules");
                None
            }
        };

        match client {
            Some(client) => {
                tracing::info!(
                    backend = client.backend_name(),
                    model = client.model(),
                    host = client.host(),
                    "Tip generator configured"
                );
                client
            }
            None => TipClient::rules(),
        }
    }

    /// Build from environment variables only
    pub fn from_env() -> Self {
        Self::from_config(&TipsConfig::default())
    }

    pub fn rules() -> Self {
        TipClient::Rules(RuleBasedTips::new())
    }

    pub fn openai(host: &str, model: &str, api_key: Option<&str>) -> Self {
        TipClient::OpenAICompatible(OpenAICompatibleTips::new(host, model, api_key))
    }

    pub fn ollama(host: &str, model: &str) -> Self {
        TipClient::Ollama(OllamaTips::new(host, model))
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            TipClient::OpenAICompatible(_) => "openai",
            TipClient::Ollama(_) => "ollama",
            TipClient::Rules(_) => "rules",
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, TipClient::Rules(_))
    }
}

#[async_trait]
impl TipGenerator for TipClient {
    async fn generate_tip(&self, request: &TipRequest) -> Result<String> {
        match self {
            TipClient::OpenAICompatible(b) => b.generate_tip(request).await,
            TipClient::Ollama(b) => b.generate_tip(request).await,
            TipClient::Rules(b) => b.generate_tip(request).await,
        }
    }

    async fn chat_reply(&self, request: &ChatRequest) -> Result<String> {
        match self {
            TipClient::OpenAICompatible(b) => b.chat_reply(request).await,
            TipClient::Ollama(b) => b.chat_reply(request).await,
            TipClient::Rules(b) => b.chat_reply(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            TipClient::OpenAICompatible(b) => b.health_check().await,
            TipClient::Ollama(b) => b.health_check().await,
            TipClient::Rules(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            TipClient::OpenAICompatible(b) => b.model(),
            TipClient::Ollama(b) => b.model(),
            TipClient::Rules(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            TipClient::OpenAICompatible(b) => b.host(),
            TipClient::Ollama(b) => b.host(),
            TipClient::Rules(b) => b.host(),
        }
    }
}

/// A tip and where it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedTip {
    pub tip: String,
    /// Model that wrote the tip (`rules` for the local fallback)
    pub model: String,
    pub fallback: bool,
}

/// Ask the generator for a tip, degrading to the rule-based tip on failure
pub async fn generate_tip_with_fallback<G: TipGenerator + ?Sized>(
    generator: &G,
    request: &TipRequest,
) -> GeneratedTip {
    match generator.generate_tip(request).await {
        Ok(tip) if !tip.trim().is_empty() => GeneratedTip {
            tip: clean_tip_text(&tip),
            model: generator.model().to_string(),
            fallback: false,
        },
        Ok(_) => {
            tracing::warn!(model = generator.model(), "Empty tip from generator, using rules");
            rule_fallback(request)
        }
        Err(e) => {
            tracing::warn!(model = generator.model(), error = %e, "Tip generation failed, using rules");
            rule_fallback(request)
        }
    }
}

fn rule_fallback(request: &TipRequest) -> GeneratedTip {
    let tip = if request.rule_tip.is_empty() {
        APOLOGY_TIP.to_string()
    } else {
        request.rule_tip.clone()
    };
    GeneratedTip {
        tip,
        model: rules::RULES_MODEL.to_string(),
        fallback: true,
    }
}

fn emphasis_patterns() -> Option<&'static (Regex, Regex)> {
    static PATTERNS: OnceLock<Option<(Regex, Regex)>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            let bold = Regex::new(r"\*\*(.*?)\*\*").ok()?;
            let italic = Regex::new(r"\*(.*?)\*").ok()?;
            Some((bold, italic))
        })
        .as_ref()
}

/// Strip markdown emphasis from model output
///
/// `**bold**` and `*italic*` keep their text; stray asterisks are dropped.
pub fn clean_tip_text(text: &str) -> String {
    let text = text.trim();
    let unwrapped = match emphasis_patterns() {
        Some((bold, italic)) => {
            let without_bold = bold.replace_all(text, "$1");
            italic.replace_all(&without_bold, "$1").into_owned()
        }
        None => text.to_string(),
    };
    unwrapped.replace('*', "")
}
