use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Roles that may be granted to an identity.
pub const KNOWN_ROLES: [&str; 3] = ["user", "admin", "archive_admin"];

/// Role every newly registered identity receives.
pub const DEFAULT_ROLE: &str = "user";

/// User identity record (maps to users table).
///
/// Owned by the identity store; the token lifecycle code reads it and asks
/// the store for updates.
#[derive(Clone, sqlx::FromRow)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
    pub password_hash: String,
    /// SHA-256 hex digest of the single live refresh token.
    pub refresh_token_hash: Option<String>,
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
    /// Bumped on every refresh token write; guards rotation compare-and-swap.
    pub refresh_version: i64,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("user_id", &self.user_id)
            .field("username", &"[REDACTED]")
            .field("password_hash", &"[REDACTED]")
            .field("refresh_token_hash", &"[REDACTED]")
            .field("refresh_token_expires_at", &self.refresh_token_expires_at)
            .field("refresh_version", &self.refresh_version)
            .finish()
    }
}

/// Refresh token state to persist on an identity.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for RefreshTokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshTokenRecord")
            .field("token_hash", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// How a refresh token write interacts with concurrent writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshWrite {
    /// Replace whatever is stored (login).
    Overwrite,
    /// Replace only if the stored version still equals the given one (rotation).
    IfVersion(i64),
}

/// Access token payload on the wire.
///
/// `sub` is the user id, `name` the username, `roles` one entry per role.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl fmt::Debug for AccessClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessClaims")
            .field("sub", &"[REDACTED]")
            .field("name", &"[REDACTED]")
            .field("roles", &self.roles)
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .field("jti", &"[REDACTED]")
            .finish()
    }
}

/// Access and refresh token issued together by login or rotation.
#[derive(Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Token response body for login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        let expires_in = (pair.expires_at - pair.created_at).num_seconds().max(0) as u64;
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
            created_at: pair.created_at,
            expires_at: pair.expires_at,
        }
    }
}

/// Registration response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub username: String,
}

/// Response for `/api/v1/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user_id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
}
