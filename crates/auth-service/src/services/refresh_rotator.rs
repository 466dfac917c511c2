//! Refresh token rotation.
//!
//! ```text
//! Start -> Validated -> UserResolved -> RefreshChecked -> Issued
//!   \________\______________\________________\_________> Denied
//! ```
//!
//! Every denial leaves the stored refresh state untouched and reaches the
//! caller as `AuthError::RotationDenied`. The reason is only logged and
//! counted. Store failures are not denials and propagate unchanged.

use crate::crypto;
use crate::errors::AuthError;
use crate::models::{Identity, RefreshWrite, TokenPair};
use crate::observability::metrics::{record_refresh_denial, record_token_issuance};
use crate::repositories::IdentityStore;
use crate::services::token_issuer::TokenIssuer;
use crate::services::token_validator::TokenValidator;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Denial {
    InvalidAccessToken,
    UnknownUser,
    RefreshInvalidOrExpired,
    ConcurrentRotation,
}

impl Denial {
    fn as_str(self) -> &'static str {
        match self {
            Denial::InvalidAccessToken => "invalid_access_token",
            Denial::UnknownUser => "unknown_user",
            Denial::RefreshInvalidOrExpired => "refresh_invalid_or_expired",
            Denial::ConcurrentRotation => "concurrent_rotation",
        }
    }
}

enum Outcome {
    Issued(TokenPair),
    Denied(Denial),
}

pub struct RefreshRotator {
    store: Arc<dyn IdentityStore>,
    validator: Arc<TokenValidator>,
    issuer: Arc<TokenIssuer>,
}

impl RefreshRotator {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        validator: Arc<TokenValidator>,
        issuer: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            store,
            validator,
            issuer,
        }
    }

    /// Exchange an (expired or live) access token plus the current refresh
    /// token for a new pair. The presented refresh token is consumed.
    #[instrument(skip_all)]
    pub async fn rotate(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<TokenPair, AuthError> {
        let start = Instant::now();

        match self.run(access_token, refresh_token).await {
            Ok(Outcome::Issued(pair)) => {
                record_token_issuance("refresh", "success", start.elapsed());
                Ok(pair)
            }
            Ok(Outcome::Denied(denial)) => {
                tracing::debug!(target: "auth.rotation", reason = denial.as_str(), "Refresh denied");
                record_refresh_denial();
                record_token_issuance("refresh", "error", start.elapsed());
                Err(AuthError::RotationDenied)
            }
            Err(e) => {
                tracing::warn!(target: "auth.rotation", error = %e, "Refresh failed");
                record_token_issuance("refresh", "error", start.elapsed());
                Err(e)
            }
        }
    }

    async fn run(&self, access_token: &str, refresh_token: &str) -> Result<Outcome, AuthError> {
        // Validated
        let Ok(claims) = self.validator.validate(access_token, true) else {
            return Ok(Outcome::Denied(Denial::InvalidAccessToken));
        };

        // UserResolved
        let Some(identity) = self.store.get_by_id(claims.user_id()).await? else {
            return Ok(Outcome::Denied(Denial::UnknownUser));
        };

        // RefreshChecked
        if !refresh_matches(&identity, refresh_token) {
            return Ok(Outcome::Denied(Denial::RefreshInvalidOrExpired));
        }

        let roles = self.store.get_roles(identity.user_id).await?;
        match self
            .issuer
            .issue(
                self.store.as_ref(),
                &identity,
                &roles,
                RefreshWrite::IfVersion(identity.refresh_version),
            )
            .await
        {
            Ok(pair) => Ok(Outcome::Issued(pair)),
            Err(AuthError::RefreshConflict) => Ok(Outcome::Denied(Denial::ConcurrentRotation)),
            Err(e) => Err(e),
        }
    }
}

/// Presented value equals the stored one and the stored expiry is in the future.
fn refresh_matches(identity: &Identity, presented: &str) -> bool {
    let (Some(stored_hash), Some(expires_at)) = (
        identity.refresh_token_hash.as_deref(),
        identity.refresh_token_expires_at,
    ) else {
        return false;
    };

    crypto::refresh_token_matches(presented, stored_hash) && expires_at > Utc::now()
}
