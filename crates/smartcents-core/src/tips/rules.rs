//! Local rule-based tips
//!
//! Always available. Uses the tip and advice already computed into the
//! request, so it never fails.

use async_trait::async_trait;

use super::{ChatRequest, TipGenerator, TipRequest};
use crate::error::Result;

pub(crate) const RULES_MODEL: &str = "rules";
const RULES_HOST: &str = "local://rules";

#[derive(Debug, Clone, Default)]
pub struct RuleBasedTips;

impl RuleBasedTips {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TipGenerator for RuleBasedTips {
    async fn generate_tip(&self, request: &TipRequest) -> Result<String> {
        Ok(request.rule_tip.clone())
    }

    async fn chat_reply(&self, request: &ChatRequest) -> Result<String> {
        let mut reply = request.tip.advice.clone();
        if let Some(score) = request.tip.score {
            reply.push_str(&format!(" Your independence score is {}.", score));
        }
        Ok(reply)
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn model(&self) -> &str {
        RULES_MODEL
    }

    fn host(&self) -> &str {
        RULES_HOST
    }
}
