use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::{header::USER_AGENT, HeaderMap},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::auth::domain::{
    normalize_domain, DOMAIN_ACCEPTED, DOMAIN_NOT_PROVIDED, DOMAIN_NOT_REQUIRED,
};
use crate::auth::tokens::AuthOutcome;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub token: Option<String>,
    pub company_domain: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct TokenAuthResponse {
    pub authenticated: bool,
    pub company: Option<String>,
    pub company_name: Option<String>,
    pub custom_data: Option<Value>,
    pub session_id: Option<String>,
    pub error: Option<String>,
    pub domain_valid: bool,
    pub domain_message: String,
}

/// POST /auth/token
///
/// Always 200: a rejected token is reported in-band with `authenticated = false`.
pub async fn handle_token(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenAuthResponse>, AppError> {
    let domain = req
        .company_domain
        .as_deref()
        .map(normalize_domain)
        .filter(|d| !d.is_empty());

    let domain_message = if domain.is_some() {
        DOMAIN_ACCEPTED
    } else {
        DOMAIN_NOT_REQUIRED
    };

    let mut response = TokenAuthResponse {
        domain_valid: true,
        domain_message: domain_message.to_string(),
        ..Default::default()
    };

    match state
        .tokens
        .authenticate(req.token.as_deref(), domain.as_deref(), Utc::now())
        .await?
    {
        AuthOutcome::Granted(grant) => {
            let ip = connect_info
                .map(|ConnectInfo(addr)| addr.ip().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let user_agent = headers
                .get(USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");
            let logged_domain = domain.as_deref().unwrap_or(DOMAIN_NOT_PROVIDED);

            if let Err(e) = state
                .tokens
                .record_access(&grant.token_hash, &ip, user_agent, "/auth/token", logged_domain)
                .await
            {
                warn!("Failed to record access for session {}: {e}", grant.session_id);
            }
            info!("Visitor authenticated (domain: {logged_domain})");

            response.authenticated = true;
            response.company = grant.company;
            response.company_name = grant.company_name;
            response.custom_data = Some(grant.custom_data);
            response.session_id = Some(grant.session_id);
        }
        AuthOutcome::Denied(failure) => {
            info!("Authentication refused: {failure}");
            response.error = Some(failure.to_string());
        }
    }

    Ok(Json(response))
}
