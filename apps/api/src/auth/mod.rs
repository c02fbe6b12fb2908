// Visitor access control.
// Tokens are never stored in clear: everything keys on the SHA-256 hex digest.

pub mod domain;
pub mod guard;
pub mod handlers;
pub mod tokens;

pub use guard::AdminGuard;
pub use tokens::{hash_token, TokenStore};
