//! Access/refresh token pair issuance.

use crate::claims::ClaimSet;
use crate::crypto::{self, JwtSecret};
use crate::errors::AuthError;
use crate::models::{Identity, RefreshTokenRecord, RefreshWrite, TokenPair};
use crate::repositories::IdentityStore;
use chrono::{DateTime, Duration, Utc};
use common::secret::ExposeSecret;
use tracing::instrument;
use uuid::Uuid;

/// Mints signed access tokens and persists the matching refresh token.
pub struct TokenIssuer {
    secret: JwtSecret,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: JwtSecret, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            secret,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Sign an access token for `claims`, valid from `now` for the access TTL.
    pub fn mint(&self, claims: &ClaimSet, now: DateTime<Utc>) -> Result<String, AuthError> {
        let expires_at = now + self.access_ttl;
        let wire = claims.to_access_claims(
            now.timestamp(),
            expires_at.timestamp(),
            Uuid::new_v4().to_string(),
        );
        crypto::sign_access_token(&wire, &self.secret)
    }

    /// Issue a token pair for `identity` and persist the new refresh token.
    ///
    /// The previous refresh token stops working once this returns. With
    /// `RefreshWrite::IfVersion`, a concurrent writer makes this fail with
    /// `AuthError::RefreshConflict` and nothing is persisted.
    #[instrument(skip_all, fields(user_id = %identity.user_id))]
    pub async fn issue(
        &self,
        store: &dyn IdentityStore,
        identity: &Identity,
        roles: &[String],
        write: RefreshWrite,
    ) -> Result<TokenPair, AuthError> {
        let created_at = Utc::now();
        let claims = ClaimSet::new(identity.user_id, identity.username.as_str(), roles.iter().cloned());
        let access_token = self.mint(&claims, created_at)?;

        let refresh_token = crypto::generate_refresh_token()?;
        let record = RefreshTokenRecord {
            token_hash: crypto::digest_refresh_token(refresh_token.expose_secret()),
            expires_at: created_at + self.refresh_ttl,
        };

        if !store
            .store_refresh_token(identity.user_id, &record, write)
            .await?
        {
            tracing::debug!(target: "auth.issuer", "Refresh token write lost to a concurrent writer");
            return Err(AuthError::RefreshConflict);
        }

        Ok(TokenPair {
            access_token,
            refresh_token: refresh_token.expose_secret().to_string(),
            created_at,
            expires_at: created_at + self.access_ttl,
        })
    }
}
