// Owner-facing endpoints behind `AdminGuard`: visitor analytics and token provisioning.

pub mod analytics;
pub mod handlers;
