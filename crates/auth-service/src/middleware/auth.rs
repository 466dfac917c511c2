//! Bearer authentication and role gating for protected routes.
//!
//! `require_auth` strictly validates the access token and stores the
//! resulting [`ClaimSet`] in request extensions. `require_admin` must run
//! after it and checks role membership on those claims.

use crate::claims::{is_in_role, ClaimsExt};
use crate::errors::AuthError;
use crate::routes::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::instrument;

/// Role required by the administrative routes.
pub const ADMIN_ROLE: &str = "admin";

fn extract_bearer_token(req: &Request) -> Result<&str, AuthError> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::debug!(target: "auth.middleware", "Missing Authorization header");
            AuthError::InvalidToken("Missing Authorization header".to_string())
        })?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::debug!(target: "auth.middleware", "Invalid Authorization header format");
        AuthError::InvalidToken("Invalid Authorization header format".to_string())
    })
}

/// Reject requests without a valid, unexpired access token.
#[instrument(skip_all, name = "auth.middleware.require_auth")]
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, AuthError> {
    let token = extract_bearer_token(&req)?;
    let claims = state.auth.authorize(token)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Reject authenticated callers that do not hold the `admin` role.
#[instrument(skip_all, name = "auth.middleware.require_admin")]
pub async fn require_admin(req: Request, next: Next) -> Result<impl IntoResponse, AuthError> {
    if !is_in_role(ADMIN_ROLE, req.claims()) {
        tracing::debug!(target: "auth.middleware", "Caller lacks admin role");
        return Err(AuthError::InsufficientRole {
            required: ADMIN_ROLE.to_string(),
        });
    }

    Ok(next.run(req).await)
}
