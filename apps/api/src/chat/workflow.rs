use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::agents::{AgentDispatcher, AgentReply, AgentRole, Router};
use crate::chat::session::SessionStore;
use crate::llm_client::LlmError;
use crate::resume::{ResumeData, ResumeSource};

/// Result of one successful chat turn.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub session_id: String,
    pub role: AgentRole,
    pub routing_confidence: f32,
    pub reply: AgentReply,
}

/// Route, dispatch, then append. Nothing is written to the session unless
/// both LLM calls succeed.
pub struct ChatWorkflow {
    router: Router,
    dispatcher: AgentDispatcher,
    resume: Arc<dyn ResumeSource>,
    sessions: Arc<dyn SessionStore>,
}

impl ChatWorkflow {
    pub fn new(
        router: Router,
        dispatcher: AgentDispatcher,
        resume: Arc<dyn ResumeSource>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            router,
            dispatcher,
            resume,
            sessions,
        }
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    pub async fn handle(&self, message: &str, session_id: &str) -> Result<ChatTurn, LlmError> {
        let data = self.load_resume().await;

        let handle = self.sessions.session(session_id);
        let mut session = handle.lock().await;

        let decision = self.router.route(message, &session.messages).await?;
        let reply = self
            .dispatcher
            .process(decision.role, message, &session.messages, &data)
            .await?;

        session.record_exchange(message, decision.role, &reply);
        info!(
            "Session {} answered by {} agent ({} messages)",
            session_id,
            reply.agent_name,
            session.messages.len()
        );
        debug!("Reply metadata: {}", reply.metadata);

        Ok(ChatTurn {
            session_id: session_id.to_string(),
            role: decision.role,
            routing_confidence: decision.confidence,
            reply,
        })
    }

    async fn load_resume(&self) -> ResumeData {
        match self.resume.load().await {
            Ok(data) => data,
            Err(e) => {
                warn!("Resume data unavailable, answering without it: {e}");
                ResumeData::default()
            }
        }
    }
}
