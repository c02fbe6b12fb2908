use serde::{Deserialize, Serialize};

/// How many prior turns are shown to the router and to the agents.
pub const CONTEXT_WINDOW: usize = 5;

const EMPTY_CONTEXT: &str = "This is the start of the conversation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Assistant,
}

/// One message in a conversation. `agent` is set on assistant turns only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Speaker,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Speaker::User,
            content: content.into(),
            agent: None,
        }
    }

    pub fn assistant(content: impl Into<String>, agent: impl Into<String>) -> Self {
        Self {
            role: Speaker::Assistant,
            content: content.into(),
            agent: Some(agent.into()),
        }
    }
}

/// Renders the tail of `history` as alternating `User:` / `Assistant:` lines.
pub fn format_context(history: &[Turn]) -> String {
    if history.is_empty() {
        return EMPTY_CONTEXT.to_string();
    }

    let start = history.len().saturating_sub(CONTEXT_WINDOW);
    history[start..]
        .iter()
        .map(|turn| match turn.role {
            Speaker::User => format!("User: {}", turn.content),
            Speaker::Assistant => format!("Assistant: {}", turn.content),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
