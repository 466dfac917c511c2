//! E2E tests for registration and login.
//!
//! ## Test Naming
//!
//! Tests follow the convention: `test_<feature>_<scenario>_<expected_result>`

use auth_test_utils::assertions::{assert_lifetime_minutes, TokenAssertions};
use auth_test_utils::server_harness::TestAuthServer;
use auth_test_utils::test_ids::{
    TEST_PASSWORD, TEST_USERNAME, UNKNOWN_USERNAME, WRONG_PASSWORD,
};
use reqwest::StatusCode;
use serde_json::json;

async fn login(
    server: &TestAuthServer,
    username: &str,
    password: &str,
) -> Result<reqwest::Response, anyhow::Error> {
    Ok(reqwest::Client::new()
        .post(format!("{}/api/v1/auth/login", server.url()))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await?)
}

async fn register(
    server: &TestAuthServer,
    username: &str,
    password: &str,
) -> Result<reqwest::Response, anyhow::Error> {
    Ok(reqwest::Client::new()
        .post(format!("{}/api/v1/auth/register", server.url()))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await?)
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_happy_path() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;

    // Act
    let response = register(&server, TEST_USERNAME, TEST_PASSWORD).await?;

    // Assert
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["username"], TEST_USERNAME);
    assert!(body["user_id"].as_str().is_some());
    assert!(
        body.get("access_token").is_none(),
        "Registration must not log the user in"
    );

    Ok(())
}

#[tokio::test]
async fn test_register_duplicate_username_rejected() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    register(&server, TEST_USERNAME, TEST_PASSWORD).await?;

    let response = register(&server, TEST_USERNAME, "AnotherPass1!").await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(body["error"]["message"], "Username is already taken");

    Ok(())
}

#[tokio::test]
async fn test_register_short_password_rejected() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;

    let response = register(&server, "bob", "short").await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await?;
    assert!(body["error"]["message"]
        .as_str()
        .unwrap_or_default()
        .contains("at least 8"));

    Ok(())
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_after_register_returns_token_pair() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    let registered: serde_json::Value = register(&server, TEST_USERNAME, TEST_PASSWORD)
        .await?
        .json()
        .await?;
    let user_id = registered["user_id"].as_str().unwrap_or_default().to_string();

    // Act
    let response = login(&server, TEST_USERNAME, TEST_PASSWORD).await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 1800);
    assert_lifetime_minutes(
        body["created_at"].as_str().unwrap_or_default(),
        body["expires_at"].as_str().unwrap_or_default(),
        30,
    );

    let access_token = body["access_token"].as_str().unwrap_or_default().to_string();
    access_token
        .assert_valid_jwt()
        .assert_for_subject(&user_id)
        .assert_named(TEST_USERNAME)
        .assert_has_role("user")
        .assert_lacks_role("admin")
        .assert_expires_in(1800);

    let refresh_token = body["refresh_token"].as_str().unwrap_or_default();
    assert!(!refresh_token.is_empty());
    assert!(!access_token.contains(refresh_token));

    Ok(())
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_user_indistinguishable() -> Result<(), anyhow::Error>
{
    // Arrange
    let server = TestAuthServer::spawn().await?;
    server
        .create_user(TEST_USERNAME, TEST_PASSWORD, &["user"])
        .await?;

    // Act
    let wrong_password = login(&server, TEST_USERNAME, WRONG_PASSWORD).await?;
    let unknown_user = login(&server, UNKNOWN_USERNAME, WRONG_PASSWORD).await?;

    // Assert
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.status(), unknown_user.status());
    assert_eq!(
        wrong_password.headers().get("www-authenticate"),
        unknown_user.headers().get("www-authenticate")
    );

    let a: serde_json::Value = wrong_password.json().await?;
    let b: serde_json::Value = unknown_user.json().await?;
    assert_eq!(a, b);
    assert_eq!(a["error"]["code"], "INVALID_CREDENTIALS");

    Ok(())
}

#[tokio::test]
async fn test_login_usernames_are_case_sensitive() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server
        .create_user(TEST_USERNAME, TEST_PASSWORD, &["user"])
        .await?;

    let response = login(&server, "Alice", TEST_PASSWORD).await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_login_carries_every_role() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server
        .create_user("carol", TEST_PASSWORD, &["user", "archive_admin"])
        .await?;

    let body: serde_json::Value = login(&server, "carol", TEST_PASSWORD).await?.json().await?;

    body["access_token"]
        .as_str()
        .unwrap_or_default()
        .to_string()
        .assert_has_role("user")
        .assert_has_role("archive_admin")
        .assert_lacks_role("admin");

    Ok(())
}
