use crate::config::{ConfigError, MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::errors::AuthError;
use crate::models::AccessClaims;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use common::jwt::{self, EXPECTED_ALG};
use common::secret::{secret_bytes, ExposeSecret, SecretBytes, SecretString};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;
use std::sync::Arc;
use tracing::instrument;

/// Number of random bytes in a refresh token (256 bits).
pub const REFRESH_TOKEN_BYTES: usize = 32;

const INVALID_TOKEN_MESSAGE: &str = "The access token is invalid or expired";

/// Process-wide HMAC-SHA256 signing key.
///
/// Constructed once from configuration and injected into the issuer and the
/// validator. Cloning shares the same underlying key material.
#[derive(Clone)]
pub struct JwtSecret(Arc<SecretBytes>);

impl JwtSecret {
    /// Wrap raw key bytes. An empty key is a configuration error.
    pub fn new(bytes: Vec<u8>) -> Result<Self, ConfigError> {
        if bytes.is_empty() {
            return Err(ConfigError::InvalidSecretKey(
                "Signing secret must not be empty".to_string(),
            ));
        }
        Ok(Self(Arc::new(secret_bytes(bytes))))
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.0.expose_secret())
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.0.expose_secret())
    }
}

impl fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("JwtSecret").field(&"[REDACTED]").finish()
    }
}

/// Sign access token claims with HMAC-SHA256.
#[instrument(skip_all)]
pub fn sign_access_token(claims: &AccessClaims, secret: &JwtSecret) -> Result<String, AuthError> {
    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".to_string());

    encode(&header, claims, &secret.encoding_key())
        .map_err(|e| AuthError::Crypto(format!("JWT signing operation failed: {}", e)))
}

/// Verify an access token's size, algorithm and signature.
///
/// Expiry is NOT checked here; `exp` must be present but may be in the past.
/// Callers decide whether an expired token is acceptable.
///
/// The `alg` header is compared against HS256 before any cryptographic
/// work, and `jsonwebtoken` is additionally restricted to HS256 only.
#[instrument(skip_all)]
pub fn verify_access_token(token: &str, secret: &JwtSecret) -> Result<AccessClaims, AuthError> {
    jwt::require_expected_alg(token).map_err(|e| {
        tracing::debug!(target: "crypto", error = ?e, "Token rejected before verification");
        AuthError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string())
    })?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;

    let token_data = decode::<AccessClaims>(token, &secret.decoding_key(), &validation).map_err(
        |e| {
            tracing::debug!(target: "crypto", error = %e, "Token verification failed");
            AuthError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string())
        },
    )?;

    if !matches!(token_data.header.alg, Algorithm::HS256) {
        tracing::debug!(
            target: "crypto",
            expected = EXPECTED_ALG,
            "Token rejected: verified header algorithm mismatch"
        );
        return Err(AuthError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string()));
    }

    Ok(token_data.claims)
}

/// Hash a password with bcrypt using a configurable cost factor.
///
/// Cost is re-checked here even though configuration already bounds it.
#[instrument(skip_all)]
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(AuthError::Crypto(format!(
            "Invalid bcrypt cost: {} (must be {}-{})",
            cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
        )));
    }

    bcrypt::hash(password, cost)
        .map_err(|e| AuthError::Crypto(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a bcrypt hash
#[instrument(skip_all)]
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash)
        .map_err(|e| AuthError::Crypto(format!("Password verification failed: {}", e)))
}

/// Generate cryptographically secure random bytes
pub fn generate_random_bytes(len: usize) -> Result<Vec<u8>, AuthError> {
    let rng = SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|e| AuthError::Crypto(format!("Random bytes generation failed: {}", e)))?;
    Ok(bytes)
}

/// Generate an opaque refresh token (32 random bytes, base64url without padding).
///
/// The value carries no information about the access token it was issued
/// alongside.
#[instrument(skip_all)]
pub fn generate_refresh_token() -> Result<SecretString, AuthError> {
    let bytes = generate_random_bytes(REFRESH_TOKEN_BYTES)?;
    Ok(SecretString::from(URL_SAFE_NO_PAD.encode(&bytes)))
}

/// SHA-256 hex digest of a refresh token, as persisted on the identity.
pub fn digest_refresh_token(refresh_token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(refresh_token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Whether `presented` hashes to `stored_digest`, compared in constant time.
pub fn refresh_token_matches(presented: &str, stored_digest: &str) -> bool {
    let presented_digest = digest_refresh_token(presented);
    bool::from(presented_digest.as_bytes().ct_eq(stored_digest.as_bytes()))
}
