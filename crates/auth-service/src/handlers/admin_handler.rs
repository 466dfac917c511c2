use crate::errors::AuthError;
use crate::routes::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct GrantRoleRequest {
    pub role: String,
}

/// Grant a role to an identity
///
/// POST /api/v1/admin/users/:id/roles
pub async fn handle_grant_role(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<GrantRoleRequest>,
) -> Result<StatusCode, AuthError> {
    state.auth.grant_role(user_id, &payload.role).await?;
    Ok(StatusCode::NO_CONTENT)
}
