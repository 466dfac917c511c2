//! E2E tests for operational endpoints.

use auth_service::config::Config;
use auth_test_utils::crypto_fixtures::test_jwt_secret_base64;
use auth_test_utils::server_harness::TestAuthServer;
use auth_test_utils::test_ids::{ROLE_USER, TEST_PASSWORD, TEST_SECRET_SEED, TEST_USERNAME};
use reqwest::StatusCode;
use std::collections::HashMap;

#[tokio::test]
async fn test_health_returns_ok() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = reqwest::get(format!("{}/health", server.url())).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "OK");
    Ok(())
}

#[tokio::test]
async fn test_metrics_endpoint_is_public() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = reqwest::get(format!("{}/metrics", server.url())).await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_unknown_route_is_not_found() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = reqwest::get(format!("{}/api/v1/auth/unknown", server.url())).await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_server_from_env_style_config() -> Result<(), anyhow::Error> {
    // Arrange
    let vars: HashMap<String, String> = [
        ("DATABASE_URL", "postgres://unused"),
        ("ACCESS_TOKEN_MINUTES", "5"),
        ("BCRYPT_COST", "10"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .chain([(
        "AUTH_JWT_SECRET".to_string(),
        test_jwt_secret_base64(TEST_SECRET_SEED),
    )])
    .collect();
    let config = Config::from_vars(&vars)?;

    // Act
    let server = TestAuthServer::spawn_with_config(config).await?;
    server
        .create_user(TEST_USERNAME, TEST_PASSWORD, &[ROLE_USER])
        .await?;
    let body: serde_json::Value = reqwest::Client::new()
        .post(format!("{}/api/v1/auth/login", server.url()))
        .json(&serde_json::json!({ "username": TEST_USERNAME, "password": TEST_PASSWORD }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    // Assert
    assert_eq!(body["expires_in"], 300);
    Ok(())
}
