//! E2E tests for refresh token rotation.
//!
//! Every denial must look the same on the wire: same status, same body.

use auth_test_utils::assertions::{assert_lifetime_minutes, TokenAssertions};
use auth_test_utils::refresh_time::expire_refresh_token;
use auth_test_utils::server_harness::TestAuthServer;
use auth_test_utils::test_ids::{
    OTHER_SECRET_SEED, TEST_PASSWORD, TEST_SECRET_SEED, TEST_USERNAME, TEST_USER_BOB,
};
use auth_test_utils::token_builders::TestTokenBuilder;
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

struct Session {
    user_id: Uuid,
    access_token: String,
    refresh_token: String,
}

async fn login_as_alice(server: &TestAuthServer) -> Result<Session, anyhow::Error> {
    let user_id = server
        .create_user(TEST_USERNAME, TEST_PASSWORD, &["user"])
        .await?;

    let body: Value = reqwest::Client::new()
        .post(format!("{}/api/v1/auth/login", server.url()))
        .json(&json!({ "username": TEST_USERNAME, "password": TEST_PASSWORD }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(Session {
        user_id,
        access_token: body["access_token"].as_str().unwrap_or_default().to_string(),
        refresh_token: body["refresh_token"].as_str().unwrap_or_default().to_string(),
    })
}

async fn refresh(
    server: &TestAuthServer,
    access_token: &str,
    refresh_token: &str,
) -> Result<reqwest::Response, anyhow::Error> {
    Ok(reqwest::Client::new()
        .post(format!("{}/api/v1/auth/refresh", server.url()))
        .json(&json!({ "access_token": access_token, "refresh_token": refresh_token }))
        .send()
        .await?)
}

/// Access token signed with the server's own secret, expired an hour ago
fn expired_access_token(user_id: Uuid) -> String {
    TestTokenBuilder::new()
        .for_user(user_id)
        .named(TEST_USERNAME)
        .with_role("user")
        .expired()
        .sign(TEST_SECRET_SEED)
}

async fn assert_denied(response: reqwest::Response) -> Result<Value, anyhow::Error> {
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await?;
    assert_eq!(body["error"]["code"], "REFRESH_DENIED");
    Ok(body)
}

#[tokio::test]
async fn test_refresh_with_expired_access_token_issues_new_pair() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    let session = login_as_alice(&server).await?;

    // Act
    let response = refresh(
        &server,
        &expired_access_token(session.user_id),
        &session.refresh_token,
    )
    .await?;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_lifetime_minutes(
        body["created_at"].as_str().unwrap_or_default(),
        body["expires_at"].as_str().unwrap_or_default(),
        30,
    );
    assert_ne!(body["refresh_token"], session.refresh_token.as_str());

    body["access_token"]
        .as_str()
        .unwrap_or_default()
        .to_string()
        .assert_valid_jwt()
        .assert_for_subject(&session.user_id.to_string())
        .assert_has_role("user")
        .assert_expires_in(1800);

    Ok(())
}

#[tokio::test]
async fn test_refresh_token_is_single_use() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let session = login_as_alice(&server).await?;

    let first = refresh(&server, &session.access_token, &session.refresh_token).await?;
    assert_eq!(first.status(), StatusCode::OK);

    let replay = refresh(&server, &session.access_token, &session.refresh_token).await?;
    assert_denied(replay).await?;

    Ok(())
}

#[tokio::test]
async fn test_rotated_refresh_token_chains() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let session = login_as_alice(&server).await?;

    let mut access = session.access_token;
    let mut refresh_value = session.refresh_token;
    for _ in 0..3 {
        let body: Value = refresh(&server, &access, &refresh_value)
            .await?
            .error_for_status()?
            .json()
            .await?;
        access = body["access_token"].as_str().unwrap_or_default().to_string();
        refresh_value = body["refresh_token"].as_str().unwrap_or_default().to_string();
    }

    Ok(())
}

#[tokio::test]
async fn test_new_login_invalidates_previous_refresh_token() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let first = login_as_alice(&server).await?;

    reqwest::Client::new()
        .post(format!("{}/api/v1/auth/login", server.url()))
        .json(&json!({ "username": TEST_USERNAME, "password": TEST_PASSWORD }))
        .send()
        .await?
        .error_for_status()?;

    let response = refresh(&server, &first.access_token, &first.refresh_token).await?;
    assert_denied(response).await?;

    Ok(())
}

#[tokio::test]
async fn test_expired_refresh_token_is_denied() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    let session = login_as_alice(&server).await?;
    expire_refresh_token(server.store(), session.user_id, &session.refresh_token).await?;

    // Act
    let response = refresh(&server, &session.access_token, &session.refresh_token).await?;

    // Assert
    assert_denied(response).await?;
    Ok(())
}

#[tokio::test]
async fn test_all_denials_are_indistinguishable() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    let session = login_as_alice(&server).await?;

    let forged = TestTokenBuilder::new()
        .for_user(session.user_id)
        .with_role("admin")
        .sign(OTHER_SECRET_SEED);
    let unknown_user = TestTokenBuilder::new()
        .for_user(TEST_USER_BOB)
        .sign(TEST_SECRET_SEED);
    let unsigned = TestTokenBuilder::new()
        .for_user(session.user_id)
        .expired()
        .unsigned();

    // Act
    let wrong_value = refresh(&server, &session.access_token, "not-the-refresh-token").await?;
    let forged = refresh(&server, &forged, &session.refresh_token).await?;
    let unknown = refresh(&server, &unknown_user, &session.refresh_token).await?;
    let alg_none = refresh(&server, &unsigned, &session.refresh_token).await?;
    let garbage = refresh(&server, "garbage", &session.refresh_token).await?;

    // Assert
    let expected = assert_denied(wrong_value).await?;
    for response in [forged, unknown, alg_none, garbage] {
        let headers = response.headers().clone();
        assert_eq!(assert_denied(response).await?, expected);
        assert!(headers.get("www-authenticate").is_some());
    }

    // None of the denied attempts consumed the genuine token
    let genuine = refresh(&server, &session.access_token, &session.refresh_token).await?;
    assert_eq!(genuine.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_refresh_with_another_users_access_token_is_denied() -> Result<(), anyhow::Error> {
    let server = TestAuthServer::spawn().await?;
    let alice = login_as_alice(&server).await?;
    let bob_id = server.create_user("bob", TEST_PASSWORD, &["user"]).await?;

    let bob_token = TestTokenBuilder::new()
        .for_user(bob_id)
        .named("bob")
        .sign(TEST_SECRET_SEED);

    let response = refresh(&server, &bob_token, &alice.refresh_token).await?;
    assert_denied(response).await?;

    Ok(())
}
