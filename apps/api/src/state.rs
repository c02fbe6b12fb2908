use std::sync::Arc;

use sqlx::SqlitePool;

use crate::agents::{AgentDispatcher, HeuristicConfidence, Router};
use crate::auth::TokenStore;
use crate::chat::{ChatWorkflow, SessionStore};
use crate::config::Config;
use crate::llm_client::LlmProvider;
use crate::resume::SqliteResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    pub tokens: TokenStore,
    /// Router + agents + sessions. The one LLM provider is shared by both calls of a turn.
    pub workflow: Arc<ChatWorkflow>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        config: Config,
        llm: Arc<dyn LlmProvider>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        let workflow = ChatWorkflow::new(
            Router::new(llm.clone()),
            AgentDispatcher::new(llm, Arc::new(HeuristicConfidence)),
            Arc::new(SqliteResumeStore::new(db.clone())),
            sessions,
        );

        Self {
            tokens: TokenStore::new(db.clone()),
            workflow: Arc::new(workflow),
            db,
            config,
        }
    }
}
