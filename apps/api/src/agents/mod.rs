// Multi-agent chat core.
// One routing call picks a persona; the persona is one templated completion call.
// Per-role differences are data (roles::RoleProfile), not separate types.

pub mod confidence;
pub mod dispatch;
pub mod history;
pub mod projection;
pub mod prompt;
pub mod roles;
pub mod router;

pub use confidence::HeuristicConfidence;
pub use dispatch::{AgentDispatcher, AgentReply};
pub use history::Turn;
pub use roles::AgentRole;
pub use router::Router;
