//! Identity store contract and its implementations.
//!
//! The token lifecycle code only ever talks to [`IdentityStore`]. Every call
//! is a single request/response against the backing store; failures surface
//! as `AuthError::Database` and are never retried here.

pub mod identities;
pub mod memory;

pub use identities::PgIdentityStore;
pub use memory::InMemoryIdentityStore;

use crate::errors::AuthError;
use crate::models::{Identity, RefreshTokenRecord, RefreshWrite};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Look up an identity by username (exact match).
    async fn get_by_name(&self, username: &str) -> Result<Option<Identity>, AuthError>;

    /// Look up an identity by id.
    async fn get_by_id(&self, user_id: Uuid) -> Result<Option<Identity>, AuthError>;

    /// Create an identity holding `roles`, all or nothing.
    ///
    /// A taken username or an unknown role yields `AuthError::BadRequest`.
    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        roles: &[&str],
    ) -> Result<Identity, AuthError>;

    /// Replace the password hash and clear any stored refresh token.
    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<(), AuthError>;

    /// Persist a new refresh token digest and expiry, bumping the version.
    ///
    /// Returns `false` when nothing was written: the identity is gone, or
    /// `RefreshWrite::IfVersion` no longer matches the stored version.
    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        record: &RefreshTokenRecord,
        write: RefreshWrite,
    ) -> Result<bool, AuthError>;

    /// Roles held by an identity, sorted.
    async fn get_roles(&self, user_id: Uuid) -> Result<Vec<String>, AuthError>;

    /// Grant a role. Granting a held role is a no-op.
    async fn add_role(&self, user_id: Uuid, role: &str) -> Result<(), AuthError>;
}
