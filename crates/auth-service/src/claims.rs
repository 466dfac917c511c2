//! Validated claim set and the helpers that read it.
//!
//! [`ClaimSet`] is the closed, typed form of an access token's payload. It is
//! produced only by the token validator and never mutated afterwards.
//! Authorization checks go through [`extract_user_id`] and [`is_in_role`],
//! which accept the caller context as `Option<&ClaimSet>` so that an
//! unauthenticated request simply yields `None` / `false`.

use crate::models::AccessClaims;
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Identity and role membership asserted by a verified access token.
#[derive(Clone, PartialEq, Eq)]
pub struct ClaimSet {
    user_id: Uuid,
    user_name: String,
    roles: BTreeSet<String>,
}

impl ClaimSet {
    pub fn new<I, S>(user_id: Uuid, user_name: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            user_id,
            user_name: user_name.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// Wire claims for this set, with the given timestamps and token id.
    pub fn to_access_claims(&self, iat: i64, exp: i64, jti: String) -> AccessClaims {
        AccessClaims {
            sub: self.user_id.to_string(),
            name: self.user_name.clone(),
            roles: self.roles.iter().cloned().collect(),
            iat,
            exp,
            jti,
        }
    }
}

impl TryFrom<AccessClaims> for ClaimSet {
    type Error = uuid::Error;

    fn try_from(claims: AccessClaims) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: Uuid::parse_str(&claims.sub)?,
            user_name: claims.name,
            roles: claims.roles.into_iter().collect(),
        })
    }
}

impl fmt::Debug for ClaimSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimSet")
            .field("user_id", &"[REDACTED]")
            .field("user_name", &"[REDACTED]")
            .field("roles", &self.roles)
            .finish()
    }
}

/// User id of the authenticated caller, if any.
pub fn extract_user_id(claims: Option<&ClaimSet>) -> Option<Uuid> {
    claims.map(ClaimSet::user_id)
}

/// Flat membership test. No role implies another.
pub fn is_in_role(role: &str, claims: Option<&ClaimSet>) -> bool {
    claims.is_some_and(|c| c.roles.contains(role))
}

/// Read the [`ClaimSet`] the auth middleware stored on a request.
pub trait ClaimsExt {
    /// Returns `None` if the auth middleware did not run for this request.
    fn claims(&self) -> Option<&ClaimSet>;
}

impl<B> ClaimsExt for axum::http::Request<B> {
    fn claims(&self) -> Option<&ClaimSet> {
        self.extensions().get::<ClaimSet>()
    }
}
