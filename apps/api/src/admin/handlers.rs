use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use crate::admin::analytics::{load_analytics, AnalyticsSummary};
use crate::auth::tokens::{NewToken, TokenSummary};
use crate::auth::AdminGuard;
use crate::errors::AppError;
use crate::state::AppState;

/// GET /admin/analytics
pub async fn handle_analytics(
    _admin: AdminGuard,
    State(state): State<AppState>,
) -> Result<Json<AnalyticsSummary>, AppError> {
    Ok(Json(load_analytics(&state.db, Utc::now()).await?))
}

/// GET /admin/tokens
pub async fn handle_list_tokens(
    _admin: AdminGuard,
    State(state): State<AppState>,
) -> Result<Json<Vec<TokenSummary>>, AppError> {
    Ok(Json(state.tokens.list().await?))
}

/// POST /admin/tokens
pub async fn handle_create_token(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Json(req): Json<NewToken>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let token_hash = state.tokens.create(&req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"success": true, "token_hash": token_hash})),
    ))
}

/// DELETE /admin/tokens/:hash
pub async fn handle_revoke_token(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(token_hash): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !state.tokens.revoke(&token_hash).await? {
        return Err(AppError::NotFound("Token not found".to_string()));
    }
    info!("Revoked token {}", token_hash.get(..8).unwrap_or(&token_hash));
    Ok(Json(json!({"success": true})))
}
