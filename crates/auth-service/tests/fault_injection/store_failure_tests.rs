//! Identity store outages.
//!
//! An unavailable store must surface as 503, never as a credential or
//! refresh denial, and must not consume refresh state.

use auth_test_utils::server_harness::TestAuthServer;
use auth_test_utils::test_ids::{ROLE_USER, TEST_PASSWORD, TEST_USERNAME};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn post(
    server: &TestAuthServer,
    path: &str,
    body: Value,
) -> Result<reqwest::Response, anyhow::Error> {
    Ok(reqwest::Client::new()
        .post(format!("{}{}", server.url(), path))
        .json(&body)
        .send()
        .await?)
}

async fn assert_unavailable(response: reqwest::Response) -> Result<(), anyhow::Error> {
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
    assert_eq!(
        body["error"]["message"], "The service is temporarily unavailable",
        "Store error details must not reach the client"
    );
    Ok(())
}

#[tokio::test]
async fn test_login_during_outage_is_unavailable_not_unauthorized() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    server
        .create_user(TEST_USERNAME, TEST_PASSWORD, &[ROLE_USER])
        .await?;
    server.store().set_unavailable(true);

    // Act
    let response = post(
        &server,
        "/api/v1/auth/login",
        json!({ "username": TEST_USERNAME, "password": TEST_PASSWORD }),
    )
    .await?;

    // Assert
    assert_unavailable(response).await?;
    Ok(())
}

#[tokio::test]
async fn test_register_during_outage_is_unavailable() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server.store().set_unavailable(true);

    let response = post(
        &server,
        "/api/v1/auth/register",
        json!({ "username": "bob", "password": TEST_PASSWORD }),
    )
    .await?;

    assert_unavailable(response).await?;
    Ok(())
}

#[tokio::test]
async fn test_refresh_survives_outage() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    server
        .create_user(TEST_USERNAME, TEST_PASSWORD, &[ROLE_USER])
        .await?;
    let tokens: Value = post(
        &server,
        "/api/v1/auth/login",
        json!({ "username": TEST_USERNAME, "password": TEST_PASSWORD }),
    )
    .await?
    .error_for_status()?
    .json()
    .await?;
    let refresh_body = json!({
        "access_token": tokens["access_token"],
        "refresh_token": tokens["refresh_token"],
    });

    // Act
    server.store().set_unavailable(true);
    let during = post(&server, "/api/v1/auth/refresh", refresh_body.clone()).await?;
    server.store().set_unavailable(false);
    let after = post(&server, "/api/v1/auth/refresh", refresh_body).await?;

    // Assert
    assert_unavailable(during).await?;
    assert_eq!(
        after.status(),
        StatusCode::OK,
        "Refresh token must still be live after the outage"
    );
    Ok(())
}

#[tokio::test]
async fn test_stateless_routes_unaffected_by_outage() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    server
        .create_user(TEST_USERNAME, TEST_PASSWORD, &[ROLE_USER])
        .await?;
    let tokens: Value = post(
        &server,
        "/api/v1/auth/login",
        json!({ "username": TEST_USERNAME, "password": TEST_PASSWORD }),
    )
    .await?
    .error_for_status()?
    .json()
    .await?;

    server.store().set_unavailable(true);

    let health = reqwest::get(format!("{}/health", server.url())).await?;
    assert_eq!(health.status(), StatusCode::OK);

    let me = reqwest::Client::new()
        .get(format!("{}/api/v1/auth/me", server.url()))
        .bearer_auth(tokens["access_token"].as_str().unwrap_or_default())
        .send()
        .await?;
    assert_eq!(me.status(), StatusCode::OK);

    Ok(())
}
