use serde_json::Value;
use sqlx::SqlitePool;

use crate::auth::hash_token;

const ANONYMOUS: &str = "anonymous";

/// One row of `chat_logs`.
pub struct ChatLogEntry<'a> {
    pub session_id: &'a str,
    /// Raw visitor token; only its hash is stored.
    pub token: Option<&'a str>,
    pub agent: &'a str,
    pub user_message: &'a str,
    pub bot_response: &'a str,
    pub response_time_ms: i64,
}

fn token_hash_or_anonymous(token: Option<&str>) -> String {
    hash_token(token.filter(|t| !t.is_empty()).unwrap_or(ANONYMOUS))
}

pub async fn log_chat(pool: &SqlitePool, entry: ChatLogEntry<'_>) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO chat_logs
            (session_id, token_hash, agent_type, user_message, bot_response, response_time_ms)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(entry.session_id)
    .bind(token_hash_or_anonymous(entry.token))
    .bind(entry.agent)
    .bind(entry.user_message)
    .bind(entry.bot_response)
    .bind(entry.response_time_ms)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn log_feedback(
    pool: &SqlitePool,
    token: Option<&str>,
    session_id: &str,
    feedback_type: &str,
    feedback_value: &str,
    metadata: &Value,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO feedback_logs (token_hash, session_id, feedback_type, feedback_value, metadata)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(token_hash_or_anonymous(token))
    .bind(session_id)
    .bind(feedback_type)
    .bind(feedback_value)
    .bind(metadata.to_string())
    .execute(pool)
    .await?;
    Ok(())
}
