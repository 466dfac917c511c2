//! Test server harness for E2E testing
//!
//! Provides TestAuthServer for spawning real auth service instances backed
//! by an in-memory identity store.

use crate::crypto_fixtures::test_jwt_secret;
use crate::test_ids::TEST_SECRET_SEED;
use auth_service::config::{
    Config, DEFAULT_ACCESS_TOKEN_MINUTES, DEFAULT_REFRESH_TOKEN_DAYS, MIN_BCRYPT_COST,
};
use auth_service::crypto;
use auth_service::repositories::{IdentityStore, InMemoryIdentityStore};
use auth_service::routes::{self, AppState};
use auth_service::services::AuthService;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Test harness for spawning the auth service in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_login_e2e() -> Result<()> {
///     let server = TestAuthServer::spawn().await?;
///     server.create_user("alice", "CorrectPass1!", &["user"]).await?;
///
///     let response = reqwest::Client::new()
///         .post(format!("{}/api/v1/auth/login", server.url()))
///         .json(&json!({"username": "alice", "password": "CorrectPass1!"}))
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestAuthServer {
    addr: SocketAddr,
    store: Arc<InMemoryIdentityStore>,
    config: Config,
    handle: JoinHandle<()>,
}

impl TestAuthServer {
    /// Default lifetimes, minimum bcrypt cost, secret from `TEST_SECRET_SEED`
    pub fn test_config() -> Config {
        Config {
            database_url: String::new(),
            bind_address: "127.0.0.1:0".to_string(),
            jwt_secret: test_jwt_secret(TEST_SECRET_SEED),
            access_token_minutes: DEFAULT_ACCESS_TOKEN_MINUTES,
            refresh_token_days: DEFAULT_REFRESH_TOKEN_DAYS,
            bcrypt_cost: MIN_BCRYPT_COST,
        }
    }

    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_config(Self::test_config()).await
    }

    /// Spawn on 127.0.0.1 with a random port
    pub async fn spawn_with_config(config: Config) -> Result<Self, anyhow::Error> {
        let store = Arc::new(InMemoryIdentityStore::new());
        let auth = AuthService::new(store.clone(), &config)
            .map_err(|e| anyhow::anyhow!("Failed to build auth service: {}", e))?;

        let state = Arc::new(AppState {
            auth: Arc::new(auth),
        });

        // Not installed globally; each server renders its own metrics
        let metrics_handle = PrometheusBuilder::new().build_recorder().handle();

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            store,
            config,
            handle,
        })
    }

    /// Base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Identity store backing the server, for seeding and fault injection
    pub fn store(&self) -> &InMemoryIdentityStore {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create an identity directly in the store with the given roles
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        roles: &[&str],
    ) -> Result<Uuid, anyhow::Error> {
        let hash = crypto::hash_password(password, self.config.bcrypt_cost)?;
        let identity = self.store.create(username, &hash, roles).await?;
        Ok(identity.user_id)
    }
}

impl Drop for TestAuthServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
