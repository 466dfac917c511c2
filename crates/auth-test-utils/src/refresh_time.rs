//! Time manipulation for refresh expiry tests
//!
//! Rewrites stored refresh state directly instead of waiting out real
//! lifetimes.

use auth_service::crypto::digest_refresh_token;
use auth_service::errors::AuthError;
use auth_service::models::{RefreshTokenRecord, RefreshWrite};
use auth_service::repositories::IdentityStore;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Keep `refresh_token` as the stored value but move its expiry to `expires_at`.
///
/// # Example
/// ```rust,ignore
/// set_refresh_expiry(server.store(), user_id, &pair.refresh_token, Utc::now() - Duration::seconds(1)).await?;
/// ```
pub async fn set_refresh_expiry(
    store: &dyn IdentityStore,
    user_id: Uuid,
    refresh_token: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), AuthError> {
    let record = RefreshTokenRecord {
        token_hash: digest_refresh_token(refresh_token),
        expires_at,
    };
    store
        .store_refresh_token(user_id, &record, RefreshWrite::Overwrite)
        .await?;
    Ok(())
}

/// Expire `refresh_token` one second ago.
pub async fn expire_refresh_token(
    store: &dyn IdentityStore,
    user_id: Uuid,
    refresh_token: &str,
) -> Result<(), AuthError> {
    set_refresh_expiry(store, user_id, refresh_token, Utc::now() - Duration::seconds(1)).await
}
