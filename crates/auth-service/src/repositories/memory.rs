//! In-process identity store.
//!
//! Backs the test harness and local runs without Postgres. Behaves like
//! [`super::PgIdentityStore`]: unique usernames, versioned refresh token
//! writes, sorted roles. [`InMemoryIdentityStore::set_unavailable`] makes
//! every call fail with `AuthError::Database` to exercise outage paths.

use super::IdentityStore;
use crate::errors::AuthError;
use crate::models::{Identity, RefreshTokenRecord, RefreshWrite, KNOWN_ROLES};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct State {
    identities: HashMap<Uuid, Identity>,
    roles: HashMap<Uuid, BTreeSet<String>>,
}

#[derive(Default)]
pub struct InMemoryIdentityStore {
    state: RwLock<State>,
    unavailable: AtomicBool,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a store outage (`true`) or recover from one (`false`).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), AuthError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuthError::Database(
                "Identity store unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn get_by_name(&self, username: &str) -> Result<Option<Identity>, AuthError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state
            .identities
            .values()
            .find(|i| i.username == username)
            .cloned())
    }

    async fn get_by_id(&self, user_id: Uuid) -> Result<Option<Identity>, AuthError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state.identities.get(&user_id).cloned())
    }

    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        roles: &[&str],
    ) -> Result<Identity, AuthError> {
        self.check_available()?;
        validate_roles(roles)?;
        let mut state = self.state.write().await;

        if state.identities.values().any(|i| i.username == username) {
            return Err(AuthError::BadRequest(
                "Username is already taken".to_string(),
            ));
        }

        let identity = Identity {
            user_id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            refresh_token_hash: None,
            refresh_token_expires_at: None,
            refresh_version: 0,
            created_at: Utc::now(),
        };
        state.identities.insert(identity.user_id, identity.clone());
        state.roles.insert(
            identity.user_id,
            roles.iter().map(|r| r.to_string()).collect(),
        );

        Ok(identity)
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<(), AuthError> {
        self.check_available()?;
        let mut state = self.state.write().await;

        if let Some(identity) = state.identities.get_mut(&user_id) {
            identity.password_hash = password_hash.to_string();
            identity.refresh_token_hash = None;
            identity.refresh_token_expires_at = None;
            identity.refresh_version += 1;
        }

        Ok(())
    }

    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        record: &RefreshTokenRecord,
        write: RefreshWrite,
    ) -> Result<bool, AuthError> {
        self.check_available()?;
        // Compare and swap under one write lock
        let mut state = self.state.write().await;

        let Some(identity) = state.identities.get_mut(&user_id) else {
            return Ok(false);
        };

        if let RefreshWrite::IfVersion(expected) = write {
            if identity.refresh_version != expected {
                return Ok(false);
            }
        }

        identity.refresh_token_hash = Some(record.token_hash.clone());
        identity.refresh_token_expires_at = Some(record.expires_at);
        identity.refresh_version += 1;

        Ok(true)
    }

    async fn get_roles(&self, user_id: Uuid) -> Result<Vec<String>, AuthError> {
        self.check_available()?;
        let state = self.state.read().await;
        Ok(state
            .roles
            .get(&user_id)
            .map(|roles| roles.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn add_role(&self, user_id: Uuid, role: &str) -> Result<(), AuthError> {
        self.check_available()?;
        validate_roles(&[role])?;

        let mut state = self.state.write().await;
        if !state.identities.contains_key(&user_id) {
            return Err(AuthError::BadRequest("Unknown user".to_string()));
        }
        state
            .roles
            .entry(user_id)
            .or_default()
            .insert(role.to_string());

        Ok(())
    }
}

fn validate_roles(roles: &[&str]) -> Result<(), AuthError> {
    match roles.iter().find(|r| !KNOWN_ROLES.contains(*r)) {
        Some(role) => Err(AuthError::BadRequest(format!("Invalid role: {}", role))),
        None => Ok(()),
    }
}
