//! Access token validation.
//!
//! Strict mode (`allow_expired = false`) gates authorization checks.
//! Lenient mode only serves refresh rotation, where an expired access token
//! is the normal case but signature and algorithm must still hold.

use crate::claims::ClaimSet;
use crate::crypto::{self, JwtSecret};
use crate::errors::AuthError;
use crate::observability::metrics::record_token_validation;
use crate::observability::ErrorCategory;
use chrono::Utc;
use common::jwt;
use tracing::instrument;

const INVALID_TOKEN_MESSAGE: &str = "The access token is invalid or expired";

pub struct TokenValidator {
    secret: JwtSecret,
}

impl TokenValidator {
    pub fn new(secret: JwtSecret) -> Self {
        Self { secret }
    }

    /// Verify `token` and return its claim set.
    ///
    /// Only strict checks are counted. Lenient checks belong to a rotation,
    /// whose outcome is counted as a whole so its failure cause stays hidden.
    #[instrument(skip_all, fields(allow_expired = allow_expired))]
    pub fn validate(&self, token: &str, allow_expired: bool) -> Result<ClaimSet, AuthError> {
        let result = self.check(token, allow_expired);

        if !allow_expired {
            match &result {
                Ok(_) => record_token_validation("success", None),
                Err(e) => record_token_validation("error", Some(ErrorCategory::from(e).as_str())),
            }
        }

        result
    }

    fn check(&self, token: &str, allow_expired: bool) -> Result<ClaimSet, AuthError> {
        let claims = crypto::verify_access_token(token, &self.secret)?;

        if !allow_expired {
            jwt::validate_exp_at(claims.exp, Utc::now().timestamp()).map_err(|e| {
                tracing::debug!(target: "auth.validator", error = ?e, "Token rejected: expired");
                AuthError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string())
            })?;
        }

        ClaimSet::try_from(claims).map_err(|e| {
            tracing::debug!(target: "auth.validator", error = %e, "Token rejected: malformed subject");
            AuthError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string())
        })
    }
}
