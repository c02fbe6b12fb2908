use anyhow::{Context, Result};

const DEFAULT_DATABASE_URL: &str = "sqlite://resume_dashboard.db?mode=rwc";
const DEFAULT_LLM_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub llm_api_key: String,
    pub llm_api_url: String,
    pub llm_model: String,
    /// Bearer token for `/admin/*`. Empty means admin access is disabled.
    pub admin_token: String,
    pub allowed_origins: Vec<String>,
    pub port: u16,
    pub rust_log: String,
    pub stream_word_delay_ms: u64,
    pub session_idle_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL", DEFAULT_DATABASE_URL),
            llm_api_key: require_env("GROQ_API_KEY")?,
            llm_api_url: optional_env("LLM_API_URL", DEFAULT_LLM_API_URL),
            llm_model: optional_env("LLM_MODEL", DEFAULT_LLM_MODEL),
            admin_token: optional_env("ADMIN_TOKEN", ""),
            allowed_origins: parse_origins(&optional_env(
                "ALLOWED_ORIGINS",
                "http://localhost:3000",
            )),
            port: parse_env("PORT", 8000)?,
            rust_log: optional_env("RUST_LOG", "info"),
            stream_word_delay_ms: parse_env("STREAM_WORD_DELAY_MS", 30)?,
            session_idle_ttl_secs: parse_env("SESSION_IDLE_TTL_SECS", 3600)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Splits a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
