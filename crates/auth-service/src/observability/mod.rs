//! Observability for the auth service.
//!
//! # Privacy by Default
//!
//! Instrumentation uses `#[instrument(skip_all)]` and allow-lists fields:
//! - **SAFE**: plaintext (enums, operation names, user ids)
//! - **HASHED**: SHA-256 prefix for correlation (usernames)
//! - **NEVER**: passwords, tokens, signing keys

pub mod metrics;

use crate::errors::AuthError;
use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars).
///
/// Not a secret-grade hash. It only keeps usernames out of plaintext logs.
pub fn hash_for_correlation(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    digest.iter().take(4).map(|b| format!("{:02x}", b)).collect()
}

/// Error categories for metrics labels (bounded cardinality)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad credentials, refused rotation
    Authentication,
    /// Missing role
    Authorization,
    /// Token or signing failures
    Cryptographic,
    /// Store, input and system errors
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Authorization => "authorization",
            ErrorCategory::Cryptographic => "cryptographic",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl From<&AuthError> for ErrorCategory {
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::RotationDenied
            | AuthError::RefreshConflict => ErrorCategory::Authentication,
            AuthError::InsufficientRole { .. } => ErrorCategory::Authorization,
            AuthError::InvalidToken(_) | AuthError::Crypto(_) => ErrorCategory::Cryptographic,
            AuthError::Database(_) | AuthError::BadRequest(_) | AuthError::Internal => {
                ErrorCategory::Internal
            }
        }
    }
}

/// HTTP status an error renders with, for metric labels.
pub fn status_code_for(err: &AuthError) -> u16 {
    match err {
        AuthError::Database(_) => 503,
        AuthError::Crypto(_) | AuthError::Internal => 500,
        AuthError::InvalidCredentials
        | AuthError::InvalidToken(_)
        | AuthError::RotationDenied
        | AuthError::RefreshConflict => 401,
        AuthError::InsufficientRole { .. } => 403,
        AuthError::BadRequest(_) => 400,
    }
}
