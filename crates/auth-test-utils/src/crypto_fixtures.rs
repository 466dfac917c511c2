//! Deterministic signing secrets for testing
//!
//! The same seed always yields the same secret, so tokens forged in a test
//! verify against a server configured with that seed.

use auth_service::crypto::JwtSecret;
use base64::engine::general_purpose;
use base64::Engine;

/// Length of generated test secrets (the configured minimum).
pub const TEST_SECRET_LEN: usize = 32;

/// Raw secret bytes for `seed`.
///
/// # Example
/// ```rust,ignore
/// assert_eq!(test_jwt_secret_bytes(1), test_jwt_secret_bytes(1));
/// assert_ne!(test_jwt_secret_bytes(1), test_jwt_secret_bytes(2));
/// ```
pub fn test_jwt_secret_bytes(seed: u8) -> Vec<u8> {
    (0..TEST_SECRET_LEN)
        .map(|i| {
            let i = i as u8;
            seed.wrapping_mul(31).wrapping_add(i.wrapping_mul(7)) ^ 0x5a
        })
        .collect()
}

/// [`JwtSecret`] for `seed`.
pub fn test_jwt_secret(seed: u8) -> JwtSecret {
    JwtSecret::new(test_jwt_secret_bytes(seed)).expect("test secret is never empty")
}

/// Base64 form for the `AUTH_JWT_SECRET` environment variable.
pub fn test_jwt_secret_base64(seed: u8) -> String {
    general_purpose::STANDARD.encode(test_jwt_secret_bytes(seed))
}
