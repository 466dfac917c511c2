//! Custom test assertions for issued tokens

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

#[derive(Debug, Deserialize)]
struct JwtClaims {
    pub sub: String,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
}

fn decode_segment<T: for<'de> Deserialize<'de>>(token: &str, index: usize) -> T {
    let segment = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT is missing segment {}", index));
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT segment {}: {}", index, e));
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("Failed to parse JWT segment {}: {}", index, e))
}

/// Custom assertions on an access token string
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_for_subject(&user_id.to_string())
///     .assert_has_role("user")
///     .assert_expires_in(1800);
/// ```
pub trait TokenAssertions {
    /// Three segments, HS256/JWT header, parseable claims
    fn assert_valid_jwt(&self) -> &Self;

    fn assert_for_subject(&self, subject: &str) -> &Self;

    fn assert_named(&self, name: &str) -> &Self;

    fn assert_has_role(&self, role: &str) -> &Self;

    fn assert_lacks_role(&self, role: &str) -> &Self;

    /// `exp - iat` equals `seconds`
    fn assert_expires_in(&self, seconds: i64) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        assert_eq!(
            self.split('.').count(),
            3,
            "JWT must have 3 parts (header.payload.signature)"
        );

        let header: JwtHeader = decode_segment(self, 0);
        assert_eq!(header.alg, "HS256", "Expected HS256 algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");

        let _: JwtClaims = decode_segment(self, 1);
        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        let claims: JwtClaims = decode_segment(self, 1);
        assert_eq!(claims.sub, subject, "Token subject mismatch");
        self
    }

    fn assert_named(&self, name: &str) -> &Self {
        let claims: JwtClaims = decode_segment(self, 1);
        assert_eq!(claims.name, name, "Token name mismatch");
        self
    }

    fn assert_has_role(&self, role: &str) -> &Self {
        let claims: JwtClaims = decode_segment(self, 1);
        assert!(
            claims.roles.iter().any(|r| r == role),
            "Token does not contain role '{}'. Roles: {:?}",
            role,
            claims.roles
        );
        self
    }

    fn assert_lacks_role(&self, role: &str) -> &Self {
        let claims: JwtClaims = decode_segment(self, 1);
        assert!(
            !claims.roles.iter().any(|r| r == role),
            "Token unexpectedly contains role '{}'",
            role
        );
        self
    }

    fn assert_expires_in(&self, seconds: i64) -> &Self {
        let claims: JwtClaims = decode_segment(self, 1);
        assert_eq!(
            claims.exp - claims.iat,
            seconds,
            "Token lifetime mismatch"
        );
        self
    }
}

/// Token response timestamps: `expires_at - created_at == minutes`.
pub fn assert_lifetime_minutes(created_at: &str, expires_at: &str, minutes: i64) {
    let created: DateTime<Utc> = created_at.parse().expect("created_at is RFC 3339");
    let expires: DateTime<Utc> = expires_at.parse().expect("expires_at is RFC 3339");
    assert_eq!(
        expires - created,
        chrono::Duration::minutes(minutes),
        "Token pair lifetime mismatch"
    );
}
