//! Account-level operations exposed to the HTTP layer.
//!
//! Login, registration and refresh are the token lifecycle entry points;
//! `authorize` backs the bearer middleware. Password change and role grants
//! round out account management.

use crate::claims::ClaimSet;
use crate::config::Config;
use crate::errors::AuthError;
use crate::models::{RefreshWrite, TokenPair, DEFAULT_ROLE};
use crate::observability::metrics::{record_error, record_token_issuance};
use crate::observability::{hash_for_correlation, status_code_for, ErrorCategory};
use crate::repositories::IdentityStore;
use crate::services::credential_verifier::CredentialVerifier;
use crate::services::refresh_rotator::RefreshRotator;
use crate::services::token_issuer::TokenIssuer;
use crate::services::token_validator::TokenValidator;
use chrono::Duration;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 64;
const MIN_PASSWORD_LENGTH: usize = 8;
// bcrypt ignores input past 72 bytes
const MAX_PASSWORD_BYTES: usize = 72;

pub struct AuthService {
    store: Arc<dyn IdentityStore>,
    verifier: CredentialVerifier,
    issuer: Arc<TokenIssuer>,
    validator: Arc<TokenValidator>,
    rotator: RefreshRotator,
}

impl AuthService {
    /// Wire the token lifecycle components from configuration.
    ///
    /// Creates the dummy password hash, so this costs one bcrypt hash.
    pub fn new(store: Arc<dyn IdentityStore>, config: &Config) -> Result<Self, AuthError> {
        let verifier = CredentialVerifier::new(config.bcrypt_cost)?;
        let issuer = Arc::new(TokenIssuer::new(
            config.jwt_secret.clone(),
            Duration::minutes(config.access_token_minutes),
            Duration::days(config.refresh_token_days),
        ));
        let validator = Arc::new(TokenValidator::new(config.jwt_secret.clone()));
        let rotator = RefreshRotator::new(store.clone(), validator.clone(), issuer.clone());

        Ok(Self {
            store,
            verifier,
            issuer,
            validator,
            rotator,
        })
    }

    /// Authenticate with username and password and issue a token pair.
    ///
    /// Replaces any refresh token previously issued to the identity.
    #[instrument(skip_all)]
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError> {
        let start = Instant::now();
        let result = self.login_inner(username, password).await;

        match &result {
            Ok(_) => record_token_issuance("login", "success", start.elapsed()),
            Err(e) => {
                record_token_issuance("login", "error", start.elapsed());
                record_error("login", ErrorCategory::from(e).as_str(), status_code_for(e));
            }
        }

        result
    }

    async fn login_inner(&self, username: &str, password: &str) -> Result<TokenPair, AuthError> {
        let identity = self.store.get_by_name(username).await?;

        // Runs bcrypt whether or not the identity exists
        let verified = self.verifier.verify(password, identity.as_ref()).await?;

        let identity = match identity {
            Some(identity) if verified => identity,
            _ => {
                tracing::info!(
                    target: "auth.login",
                    username_hash = %hash_for_correlation(username),
                    "Login rejected"
                );
                return Err(AuthError::InvalidCredentials);
            }
        };

        let roles = self.store.get_roles(identity.user_id).await?;
        let pair = self
            .issuer
            .issue(self.store.as_ref(), &identity, &roles, RefreshWrite::Overwrite)
            .await
            .map_err(|e| match e {
                // Overwrite only misses when the identity was deleted meanwhile
                AuthError::RefreshConflict => AuthError::InvalidCredentials,
                other => other,
            })?;

        tracing::info!(target: "auth.login", user_id = %identity.user_id, "Login succeeded");
        Ok(pair)
    }

    /// Create an identity holding the default role. Returns its id.
    #[instrument(skip_all)]
    pub async fn register(&self, username: &str, password: &str) -> Result<Uuid, AuthError> {
        validate_username(username)?;
        validate_password(password)?;

        let password_hash = self.verifier.hash(password).await?;
        let identity = self
            .store
            .create(username, &password_hash, &[DEFAULT_ROLE])
            .await?;

        tracing::info!(target: "auth.register", user_id = %identity.user_id, "Identity registered");
        Ok(identity.user_id)
    }

    /// Rotate a token pair. See [`RefreshRotator::rotate`].
    pub async fn refresh(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<TokenPair, AuthError> {
        self.rotator.rotate(access_token, refresh_token).await
    }

    /// Strictly validate a bearer token for an authorization decision.
    pub fn authorize(&self, access_token: &str) -> Result<ClaimSet, AuthError> {
        self.validator.validate(access_token, false)
    }

    /// Replace the password after re-checking the current one.
    ///
    /// Clears the stored refresh token, so no existing pair can be rotated.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let identity = self.store.get_by_id(user_id).await?;
        if !self
            .verifier
            .verify(current_password, identity.as_ref())
            .await?
        {
            return Err(AuthError::InvalidCredentials);
        }

        validate_password(new_password)?;
        let password_hash = self.verifier.hash(new_password).await?;
        self.store.update_password(user_id, &password_hash).await?;

        tracing::info!(target: "auth.password", "Password changed");
        Ok(())
    }

    /// Grant `role` to an identity. Takes effect from the next issued token.
    #[instrument(skip_all, fields(user_id = %user_id, role = %role))]
    pub async fn grant_role(&self, user_id: Uuid, role: &str) -> Result<(), AuthError> {
        if self.store.get_by_id(user_id).await?.is_none() {
            return Err(AuthError::BadRequest("Unknown user".to_string()));
        }
        self.store.add_role(user_id, role).await?;

        tracing::info!(target: "auth.admin", "Role granted");
        Ok(())
    }
}

fn validate_username(username: &str) -> Result<(), AuthError> {
    let len = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(AuthError::BadRequest(format!(
            "Username must be {}-{} characters",
            MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH
        )));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(AuthError::BadRequest(
            "Username may only contain letters, digits, '.', '_' and '-'".to_string(),
        ));
    }

    Ok(())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::BadRequest(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }

    Ok(())
}
