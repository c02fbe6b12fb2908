use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;
use tracing::{info, warn};

use crate::errors::AppError;

const HASH_PREFIX_LEN: usize = 8;

/// SQLite's `CURRENT_TIMESTAMP` layout. Every timestamp column must hold this
/// form for text `ORDER BY` to be chronological.
const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Lowercase hex SHA-256 of the raw token.
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Renders `at` the way SQLite's `CURRENT_TIMESTAMP` does (UTC, whole seconds).
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(SQLITE_TIMESTAMP_FORMAT).to_string()
}

/// Accepts RFC 3339 as well as SQLite's `CURRENT_TIMESTAMP` format (UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, SQLITE_TIMESTAMP_FORMAT)
                .ok()
                .map(|naive| naive.and_utc())
        })
}

#[derive(Debug, Clone, FromRow)]
pub struct TokenRecord {
    pub token_hash: String,
    pub company: Option<String>,
    pub company_name: Option<String>,
    pub custom_data: String,
    pub created_at: String,
    pub last_accessed: Option<String>,
    pub expires_at: Option<String>,
}

impl TokenRecord {
    /// Tokens without an expiry never expire. An unreadable expiry is treated as expired.
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at.as_deref() {
            None => false,
            Some(raw) => match parse_timestamp(raw) {
                Some(expires_at) => expires_at < now,
                None => {
                    warn!("Unreadable expires_at {raw:?} on token {}", self.prefix());
                    true
                }
            },
        }
    }

    fn prefix(&self) -> &str {
        self.token_hash.get(..HASH_PREFIX_LEN).unwrap_or(&self.token_hash)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("No token provided")]
    Missing,
    #[error("Invalid token")]
    Invalid,
    #[error("Token expired")]
    Expired,
}

/// What a successful authentication hands back to the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessGrant {
    pub token_hash: String,
    pub company: Option<String>,
    pub company_name: Option<String>,
    pub custom_data: Value,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    Granted(AccessGrant),
    Denied(AuthFailure),
}

/// Out-of-band provisioning input.
#[derive(Debug, Clone, Deserialize)]
pub struct NewToken {
    pub token: String,
    pub company: String,
    pub company_name: String,
    #[serde(default)]
    pub custom_data: Option<Value>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Listing view: the hash is truncated so the admin listing never exposes it whole.
#[derive(Debug, Clone, Serialize)]
pub struct TokenSummary {
    pub token_prefix: String,
    pub company: Option<String>,
    pub company_name: Option<String>,
    pub created_at: String,
    pub last_accessed: Option<String>,
    pub expires_at: Option<String>,
}

/// SQLite-backed access token store.
#[derive(Clone)]
pub struct TokenStore {
    pool: SqlitePool,
}

impl TokenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, token_hash: &str) -> Result<Option<TokenRecord>, sqlx::Error> {
        sqlx::query_as::<_, TokenRecord>(
            r#"
            SELECT token_hash, company, company_name, custom_data, created_at, last_accessed, expires_at
            FROM token_access
            WHERE token_hash = ?
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
    }

    /// Validates `token` at `now`. A supplied `company_domain` replaces the
    /// stored company and company name.
    pub async fn authenticate(
        &self,
        token: Option<&str>,
        company_domain: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<AuthOutcome, sqlx::Error> {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(AuthOutcome::Denied(AuthFailure::Missing));
        };

        let token_hash = hash_token(token);
        let Some(record) = self.find(&token_hash).await? else {
            return Ok(AuthOutcome::Denied(AuthFailure::Invalid));
        };

        if record.is_expired(now) {
            info!("Rejected expired token {}", record.prefix());
            return Ok(AuthOutcome::Denied(AuthFailure::Expired));
        }

        let (company, company_name) = match company_domain.filter(|d| !d.is_empty()) {
            Some(domain) => {
                sqlx::query(
                    "UPDATE token_access SET company = ?, company_name = ?, last_accessed = ? WHERE token_hash = ?",
                )
                .bind(domain)
                .bind(domain)
                .bind(format_timestamp(now))
                .bind(&token_hash)
                .execute(&self.pool)
                .await?;
                (Some(domain.to_string()), Some(domain.to_string()))
            }
            None => {
                sqlx::query("UPDATE token_access SET last_accessed = ? WHERE token_hash = ?")
                    .bind(format_timestamp(now))
                    .bind(&token_hash)
                    .execute(&self.pool)
                    .await?;
                (record.company.clone(), record.company_name.clone())
            }
        };

        let custom_data = serde_json::from_str(&record.custom_data).unwrap_or_else(|e| {
            warn!("Malformed custom_data on token {}: {e}", record.prefix());
            json!({})
        });

        let session_id = format!("{}_{}", &token_hash[..HASH_PREFIX_LEN], now.timestamp());

        Ok(AuthOutcome::Granted(AccessGrant {
            token_hash,
            company,
            company_name,
            custom_data,
            session_id,
        }))
    }

    pub async fn record_access(
        &self,
        token_hash: &str,
        ip_address: &str,
        user_agent: &str,
        page_accessed: &str,
        company_domain: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO access_logs (token_hash, ip_address, user_agent, page_accessed, company_domain, accessed_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(token_hash)
        .bind(ip_address)
        .bind(user_agent)
        .bind(page_accessed)
        .bind(company_domain)
        .bind(format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Stores a new token and returns its hash. Re-provisioning an existing
    /// token is a validation error.
    pub async fn create(&self, new: &NewToken) -> Result<String, AppError> {
        if new.token.trim().is_empty() {
            return Err(AppError::Validation("Token must not be empty".to_string()));
        }

        let token_hash = hash_token(new.token.trim());
        let custom_data = new.custom_data.clone().unwrap_or_else(|| json!({}));

        let result = sqlx::query(
            r#"
            INSERT INTO token_access (token_hash, company, company_name, custom_data, created_at, expires_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&token_hash)
        .bind(&new.company)
        .bind(&new.company_name)
        .bind(custom_data.to_string())
        .bind(format_timestamp(Utc::now()))
        .bind(new.expires_at.map(format_timestamp))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!("Provisioned token {} for {}", &token_hash[..HASH_PREFIX_LEN], new.company);
                Ok(token_hash)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                AppError::Validation("Token already exists".to_string()),
            ),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn revoke(&self, token_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM token_access WHERE token_hash = ?")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list(&self) -> Result<Vec<TokenSummary>, sqlx::Error> {
        let records = sqlx::query_as::<_, TokenRecord>(
            r#"
            SELECT token_hash, company, company_name, custom_data, created_at, last_accessed, expires_at
            FROM token_access
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records
            .into_iter()
            .map(|r| TokenSummary {
                token_prefix: r.prefix().to_string(),
                company: r.company,
                company_name: r.company_name,
                created_at: r.created_at,
                last_accessed: r.last_accessed,
                expires_at: r.expires_at,
            })
            .collect())
    }
}
