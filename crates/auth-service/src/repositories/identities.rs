//! Postgres-backed identity store.
//!
//! Identities live in `users`, role grants in `user_roles` (see
//! `migrations/`). The refresh token columns are written only through
//! [`IdentityStore::store_refresh_token`], which bumps `refresh_version` so
//! rotation can compare-and-swap against it.

use super::IdentityStore;
use crate::errors::AuthError;
use crate::models::{Identity, RefreshTokenRecord, RefreshWrite, KNOWN_ROLES};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn get_by_name(&self, username: &str) -> Result<Option<Identity>, AuthError> {
        sqlx::query_as::<_, Identity>(
            r#"
            SELECT
                user_id, username, password_hash, refresh_token_hash,
                refresh_token_expires_at, refresh_version, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Database(format!("Failed to fetch user by name: {}", e)))
    }

    async fn get_by_id(&self, user_id: Uuid) -> Result<Option<Identity>, AuthError> {
        sqlx::query_as::<_, Identity>(
            r#"
            SELECT
                user_id, username, password_hash, refresh_token_hash,
                refresh_token_expires_at, refresh_version, created_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Database(format!("Failed to fetch user by id: {}", e)))
    }

    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        roles: &[&str],
    ) -> Result<Identity, AuthError> {
        if let Some(role) = roles.iter().find(|r| !KNOWN_ROLES.contains(*r)) {
            return Err(AuthError::BadRequest(format!("Invalid role: {}", role)));
        }

        // Identity and its initial roles commit together
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AuthError::Database(format!("Failed to start transaction: {}", e)))?;

        let identity = sqlx::query_as::<_, Identity>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING
                user_id, username, password_hash, refresh_token_hash,
                refresh_token_expires_at, refresh_version, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AuthError::BadRequest("Username is already taken".to_string())
            }
            _ => AuthError::Database(format!("Failed to create user: {}", e)),
        })?;

        for role in roles {
            sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role)
                VALUES ($1, $2)
                ON CONFLICT (user_id, role) DO NOTHING
                "#,
            )
            .bind(identity.user_id)
            .bind(*role)
            .execute(&mut *tx)
            .await
            .map_err(|e| AuthError::Database(format!("Failed to add user role: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| AuthError::Database(format!("Failed to commit user creation: {}", e)))?;

        Ok(identity)
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2,
                refresh_token_hash = NULL,
                refresh_token_expires_at = NULL,
                refresh_version = refresh_version + 1
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Database(format!("Failed to update password: {}", e)))?;

        Ok(())
    }

    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        record: &RefreshTokenRecord,
        write: RefreshWrite,
    ) -> Result<bool, AuthError> {
        // A single UPDATE keeps the compare and the swap atomic
        let expected_version = match write {
            RefreshWrite::Overwrite => None,
            RefreshWrite::IfVersion(v) => Some(v),
        };

        let result = sqlx::query(
            r#"
            UPDATE users
            SET refresh_token_hash = $2,
                refresh_token_expires_at = $3,
                refresh_version = refresh_version + 1
            WHERE user_id = $1
              AND ($4::BIGINT IS NULL OR refresh_version = $4)
            "#,
        )
        .bind(user_id)
        .bind(&record.token_hash)
        .bind(record.expires_at)
        .bind(expected_version)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Database(format!("Failed to store refresh token: {}", e)))?;

        Ok(result.rows_affected() == 1)
    }

    async fn get_roles(&self, user_id: Uuid) -> Result<Vec<String>, AuthError> {
        let roles: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT role
            FROM user_roles
            WHERE user_id = $1
            ORDER BY role
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AuthError::Database(format!("Failed to fetch user roles: {}", e)))?;

        Ok(roles.into_iter().map(|(r,)| r).collect())
    }

    async fn add_role(&self, user_id: Uuid, role: &str) -> Result<(), AuthError> {
        if !KNOWN_ROLES.contains(&role) {
            return Err(AuthError::BadRequest(format!("Invalid role: {}", role)));
        }

        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Database(format!("Failed to add user role: {}", e)))?;

        Ok(())
    }
}
