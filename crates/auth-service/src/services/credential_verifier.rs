//! Password verification against stored bcrypt hashes.

use crate::crypto;
use crate::errors::AuthError;
use crate::models::Identity;
use crate::observability::metrics::record_bcrypt_duration;
use std::time::Instant;
use tracing::instrument;

/// Length of the random password behind the dummy hash.
const DUMMY_PASSWORD_BYTES: usize = 32;

/// Checks supplied passwords and produces new password hashes.
///
/// Holds a dummy hash created with the configured cost, so a lookup miss
/// costs one full bcrypt verification just like a wrong password.
pub struct CredentialVerifier {
    cost: u32,
    dummy_hash: String,
}

impl CredentialVerifier {
    pub fn new(cost: u32) -> Result<Self, AuthError> {
        let dummy_password = hex::encode(crypto::generate_random_bytes(DUMMY_PASSWORD_BYTES)?);
        let dummy_hash = crypto::hash_password(&dummy_password, cost)?;
        Ok(Self { cost, dummy_hash })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Verify `password` against the identity's hash.
    ///
    /// Returns `Ok(false)` for an absent identity after verifying against the
    /// dummy hash.
    #[instrument(skip_all, fields(identity_found = identity.is_some()))]
    pub async fn verify(
        &self,
        password: &str,
        identity: Option<&Identity>,
    ) -> Result<bool, AuthError> {
        let hash = match identity {
            Some(identity) => identity.password_hash.clone(),
            None => self.dummy_hash.clone(),
        };
        let password = password.to_string();

        let start = Instant::now();
        let matched = tokio::task::spawn_blocking(move || crypto::verify_password(&password, &hash))
            .await
            .map_err(|e| {
                tracing::error!(target: "auth.credentials", error = %e, "Password verification task failed");
                AuthError::Internal
            })??;
        record_bcrypt_duration("verify", start.elapsed());

        Ok(matched && identity.is_some())
    }

    /// Hash a new password with the configured cost.
    #[instrument(skip_all)]
    pub async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_string();
        let cost = self.cost;

        let start = Instant::now();
        let hash = tokio::task::spawn_blocking(move || crypto::hash_password(&password, cost))
            .await
            .map_err(|e| {
                tracing::error!(target: "auth.credentials", error = %e, "Password hashing task failed");
                AuthError::Internal
            })??;
        record_bcrypt_duration("hash", start.elapsed());

        Ok(hash)
    }
}
