// Conversation layer: in-memory sessions, the route-then-dispatch workflow,
// chat/feedback logging and the HTTP surface (JSON + SSE).

pub mod handlers;
pub mod logs;
pub mod session;
pub mod workflow;

pub use session::{InMemorySessionStore, SessionStore};
pub use workflow::ChatWorkflow;
