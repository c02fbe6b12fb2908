// Pre-registered demonstration queries, executed read-only against the resume tables.

pub mod handlers;
pub mod queries;
