//! Bearer-token gate for the admin endpoints.

use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use sha2::{Digest, Sha256};

use crate::errors::AppError;
use crate::state::AppState;

/// Extracting this proves the caller presented `Authorization: Bearer <ADMIN_TOKEN>`.
///
/// No header is 401; a wrong token is 403. An unset `ADMIN_TOKEN` refuses everyone.
pub struct AdminGuard;

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminGuard {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let presented = bearer_token(parts)?;
        check_admin_token(&state.config.admin_token, presented)?;
        Ok(AdminGuard)
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?
        .to_str()
        .map_err(|_| AppError::Unauthorized)?;
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AppError::Unauthorized)
}

fn check_admin_token(expected: &str, presented: &str) -> Result<(), AppError> {
    if expected.is_empty() {
        return Err(AppError::Forbidden("Admin access is disabled".to_string()));
    }
    if !digests_match(expected, presented) {
        return Err(AppError::Forbidden("Invalid admin token".to_string()));
    }
    Ok(())
}

/// Constant-time over the SHA-256 digests: no early exit on the first mismatch.
fn digests_match(a: &str, b: &str) -> bool {
    let (a, b) = (Sha256::digest(a.as_bytes()), Sha256::digest(b.as_bytes()));
    a.iter().zip(b.iter()).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}
