use crate::claims::ClaimSet;
use crate::errors::AuthError;
use crate::models::{MeResponse, RegisterResponse, TokenResponse};
use crate::routes::AppState;
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Handle login
///
/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let pair = state
        .auth
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(pair.into()))
}

/// Handle self-registration
///
/// POST /api/v1/auth/register
///
/// Does not log the new user in.
pub async fn handle_register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AuthError> {
    let user_id = state
        .auth
        .register(&payload.username, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id,
            username: payload.username,
        }),
    ))
}

/// Handle token pair rotation
///
/// POST /api/v1/auth/refresh
///
/// The access token may be expired; it must still carry a valid signature.
pub async fn handle_refresh(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let pair = state
        .auth
        .refresh(&payload.access_token, &payload.refresh_token)
        .await?;

    Ok(Json(pair.into()))
}

/// Identity asserted by the caller's access token
///
/// GET /api/v1/auth/me
pub async fn handle_me(Extension(claims): Extension<ClaimSet>) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: claims.user_id(),
        username: claims.user_name().to_string(),
        roles: claims.roles().iter().cloned().collect(),
    })
}

/// Change the caller's password
///
/// POST /api/v1/auth/password
pub async fn handle_change_password(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<ClaimSet>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<StatusCode, AuthError> {
    state
        .auth
        .change_password(
            claims.user_id(),
            &payload.current_password,
            &payload.new_password,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
