//! JWT utilities shared by the token issuer, the validator and the test
//! fixtures.
//!
//! - Size limit applied before any parsing
//! - Unverified header inspection (`alg` pinning happens before signature
//!   verification)
//! - Strict expiry arithmetic (`exp` must be strictly after now)
//!
//! # Security
//!
//! Every error variant renders the same generic message so callers can
//! surface it directly without leaking why a token was rejected. Details are
//! logged at debug level under the `common.jwt` target.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use thiserror::Error;

/// Maximum allowed JWT size in bytes (8KB).
///
/// Tokens larger than this are rejected before base64 decoding or HMAC
/// computation. A typical access token here is 300-400 bytes.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// The only signing algorithm accepted for access tokens.
pub const EXPECTED_ALG: &str = "HS256";

/// Errors that can occur while inspecting a JWT before verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds maximum allowed.
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Token is not three base64url segments with a JSON header.
    #[error("The access token is invalid or expired")]
    MalformedToken,

    /// Header carries no `alg`, or an `alg` other than [`EXPECTED_ALG`].
    #[error("The access token is invalid or expired")]
    DisallowedAlgorithm,

    /// `exp` is at or before the current time.
    #[error("The access token is invalid or expired")]
    Expired,
}

/// Reject tokens above [`MAX_JWT_SIZE_BYTES`].
///
/// # Errors
///
/// Returns `JwtValidationError::TokenTooLarge` for oversized input.
pub fn check_size(token: &str) -> Result<(), JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }
    Ok(())
}

/// Extract the `alg` header value without verifying the signature.
///
/// The returned value must only be compared against a pinned algorithm; it
/// says nothing about whether the token is authentic.
///
/// # Errors
///
/// - `TokenTooLarge` if the token exceeds the size limit
/// - `MalformedToken` for a wrong segment count, bad base64 or bad JSON
/// - `DisallowedAlgorithm` if the header has no string `alg`
pub fn extract_alg(token: &str) -> Result<String, JwtValidationError> {
    check_size(token)?;

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        tracing::debug!(
            target: "common.jwt",
            parts = parts.len(),
            "Token rejected: invalid JWT format"
        );
        return Err(JwtValidationError::MalformedToken);
    }

    let header_part = parts.first().ok_or(JwtValidationError::MalformedToken)?;
    let header_bytes = URL_SAFE_NO_PAD.decode(header_part).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode JWT header base64");
        JwtValidationError::MalformedToken
    })?;

    let header: serde_json::Value = serde_json::from_slice(&header_bytes).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to parse JWT header JSON");
        JwtValidationError::MalformedToken
    })?;

    header
        .get("alg")
        .and_then(|v| v.as_str())
        .map(ToString::to_string)
        .ok_or(JwtValidationError::DisallowedAlgorithm)
}

/// Require the header algorithm to be exactly [`EXPECTED_ALG`].
///
/// The comparison is case-sensitive: `hs256`, `HS384` and `none` are all
/// rejected.
///
/// # Errors
///
/// Propagates [`extract_alg`] errors and returns `DisallowedAlgorithm` on
/// mismatch.
pub fn require_expected_alg(token: &str) -> Result<(), JwtValidationError> {
    let alg = extract_alg(token)?;
    if alg != EXPECTED_ALG {
        tracing::debug!(
            target: "common.jwt",
            alg = %alg,
            expected = EXPECTED_ALG,
            "Token rejected: disallowed algorithm"
        );
        return Err(JwtValidationError::DisallowedAlgorithm);
    }
    Ok(())
}

/// Check that `exp` is strictly after `now` (both Unix epoch seconds).
///
/// # Errors
///
/// Returns `JwtValidationError::Expired` when `exp <= now`.
pub fn validate_exp_at(exp: i64, now: i64) -> Result<(), JwtValidationError> {
    if exp <= now {
        tracing::debug!(
            target: "common.jwt",
            exp = exp,
            now = now,
            "Token rejected: expired"
        );
        return Err(JwtValidationError::Expired);
    }
    Ok(())
}
