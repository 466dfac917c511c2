//! Builder for forged and hand-made access tokens
//!
//! Produces tokens the server never issued: expired, signed with another
//! secret or another algorithm, or unsigned (`alg: none`).

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;
use uuid::Uuid;

use crate::crypto_fixtures::test_jwt_secret_bytes;

/// Builder for test access tokens
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_user(TEST_USER_ALICE)
///     .named("alice")
///     .with_role("user")
///     .expired()
///     .sign(TEST_SECRET_SEED);
/// ```
pub struct TestTokenBuilder {
    sub: String,
    name: String,
    roles: Vec<String>,
    exp: i64,
    iat: i64,
    jti: String,
}

impl TestTokenBuilder {
    /// Valid for one hour, random subject, no roles
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            sub: Uuid::new_v4().to_string(),
            name: "test-user".to_string(),
            roles: Vec::new(),
            exp: (now + Duration::seconds(3600)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn for_user(mut self, user_id: Uuid) -> Self {
        self.sub = user_id.to_string();
        self
    }

    /// Raw `sub` claim, including values that are not user ids
    pub fn with_subject(mut self, subject: &str) -> Self {
        self.sub = subject.to_string();
        self
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_role(mut self, role: &str) -> Self {
        self.roles.push(role.to_string());
        self
    }

    /// Set expiration in seconds from now (negative for the past)
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = (Utc::now() + Duration::seconds(seconds)).timestamp();
        self
    }

    /// Issued two hours ago, expired one hour ago
    pub fn expired(mut self) -> Self {
        let now = Utc::now();
        self.iat = (now - Duration::hours(2)).timestamp();
        self.exp = (now - Duration::hours(1)).timestamp();
        self
    }

    /// Build the claims as a JSON value
    pub fn build(&self) -> serde_json::Value {
        json!({
            "sub": self.sub,
            "name": self.name,
            "roles": self.roles,
            "iat": self.iat,
            "exp": self.exp,
            "jti": self.jti,
        })
    }

    /// HS256 with the deterministic secret for `seed`
    pub fn sign(&self, seed: u8) -> String {
        self.sign_with(Algorithm::HS256, &test_jwt_secret_bytes(seed))
    }

    /// Any HMAC algorithm with arbitrary key bytes
    pub fn sign_with(&self, alg: Algorithm, key: &[u8]) -> String {
        let mut header = Header::new(alg);
        header.typ = Some("JWT".to_string());
        encode(&header, &self.build(), &EncodingKey::from_secret(key))
            .expect("HMAC signing cannot fail")
    }

    /// Unsigned token with `alg: none` and an empty signature segment
    pub fn unsigned(&self) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(self.build().to_string());
        format!("{}.{}.", header, payload)
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
