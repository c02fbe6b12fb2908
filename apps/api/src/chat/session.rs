use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::agents::{AgentReply, AgentRole, Turn};

/// One visitor conversation. Lives in process memory only.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    pub session_id: String,
    pub messages: Vec<Turn>,
    pub current_agent: Option<AgentRole>,
    /// Every agent that answered, in order.
    pub agent_history: Vec<AgentRole>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    last_activity: Instant,
}

impl ConversationSession {
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            messages: Vec::new(),
            current_agent: None,
            agent_history: Vec::new(),
            created_at: now,
            last_updated: now,
            last_activity: Instant::now(),
        }
    }

    /// Appends the user turn and the agent's answer as one unit.
    pub fn record_exchange(&mut self, message: &str, role: AgentRole, reply: &AgentReply) {
        self.messages.push(Turn::user(message));
        self.messages
            .push(Turn::assistant(reply.content.clone(), role.label()));
        self.current_agent = Some(role);
        self.agent_history.push(role);
        self.touch();
    }

    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
        self.last_activity = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }
}

pub type SessionHandle = Arc<Mutex<ConversationSession>>;

/// Keyed session state injected into the workflow.
///
/// Handles are shared: whoever holds a handle's lock owns that conversation
/// until the guard drops, which is how same-session turns are serialised.
pub trait SessionStore: Send + Sync {
    /// Returns the session for `id`, creating an empty one on first use.
    fn session(&self, id: &str) -> SessionHandle;

    fn get(&self, id: &str) -> Option<SessionHandle>;

    fn remove(&self, id: &str) -> bool;

    /// Drops sessions idle for longer than `max_idle`. Sessions that are locked
    /// or whose handle is held outside the store are mid-turn and always kept.
    fn evict_idle(&self, max_idle: Duration) -> usize;

    fn count(&self) -> usize;
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, SessionHandle>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn session(&self, id: &str) -> SessionHandle {
        self.sessions
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(ConversationSession::new(id))))
            .value()
            .clone()
    }

    fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    fn remove(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    fn evict_idle(&self, max_idle: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, handle| {
            if Arc::strong_count(handle) > 1 {
                return true;
            }
            match handle.try_lock() {
                Ok(session) => session.idle_for() <= max_idle,
                Err(_) => true,
            }
        });
        before.saturating_sub(self.sessions.len())
    }

    fn count(&self) -> usize {
        self.sessions.len()
    }
}
