//! LLM-backed intent router.
//!
//! One completion at a fixed low temperature; the reply is matched against
//! the agent tokens in enumeration order, so "TECHNICAL or BACKGROUND"
//! resolves to Technical. Anything unrecognised goes to Help.

use std::sync::Arc;

use tracing::debug;

use crate::agents::history::{format_context, Turn};
use crate::agents::roles::AgentRole;
use crate::llm_client::{LlmError, LlmProvider};

pub const ROUTER_TEMPERATURE: f32 = 0.3;
const MATCHED_CONFIDENCE: f32 = 0.9;
const FALLBACK_CONFIDENCE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutingDecision {
    pub role: AgentRole,
    pub confidence: f32,
}

pub struct Router {
    llm: Arc<dyn LlmProvider>,
}

impl Router {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Picks the persona for `message`. `history` holds the prior turns only.
    pub async fn route(&self, message: &str, history: &[Turn]) -> Result<RoutingDecision, LlmError> {
        let prompt = routing_prompt(message, history);
        let reply = self.llm.complete(&prompt, ROUTER_TEMPERATURE).await?;
        let decision = parse_decision(&reply);
        debug!(
            "Routed message to {} (confidence {:.2}, raw reply {:?})",
            decision.role, decision.confidence, reply
        );
        Ok(decision)
    }
}

pub fn routing_prompt(message: &str, history: &[Turn]) -> String {
    let agents = AgentRole::ALL
        .iter()
        .map(|role| format!("- {}: {}", role.token(), role.profile().routing_hint))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a routing agent for a resume chatbot. Your job is to determine which specialized \
agent should handle the user's message.\n\n\
Available agents:\n{agents}\n\n\
Respond with ONLY the agent name (INTERVIEW, TECHNICAL, PERSONAL, BACKGROUND, or HELP).\n\n\
Previous conversation context:\n{context}\n\n\
User message: {message}\n\n\
Which agent should handle this message? Respond with only the agent name.",
        context = format_context(history),
    )
}

/// First token (in enumeration order) contained anywhere in the reply wins.
pub fn parse_decision(reply: &str) -> RoutingDecision {
    let upper = reply.trim().to_uppercase();
    AgentRole::ALL
        .into_iter()
        .find(|role| upper.contains(role.token()))
        .map(|role| RoutingDecision {
            role,
            confidence: MATCHED_CONFIDENCE,
        })
        .unwrap_or(RoutingDecision {
            role: AgentRole::Help,
            confidence: FALLBACK_CONFIDENCE,
        })
}
