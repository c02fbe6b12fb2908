//! Resume records: read-only personal-history data populated by offline scripts.

pub mod models;
pub mod repository;

pub use models::ResumeData;
pub use repository::{ResumeSource, SqliteResumeStore};
