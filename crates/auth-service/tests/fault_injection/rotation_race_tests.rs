//! Concurrent refresh requests presenting the same refresh token.

use auth_test_utils::server_harness::TestAuthServer;
use auth_test_utils::test_ids::{ROLE_USER, TEST_PASSWORD, TEST_USERNAME};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;

const RACERS: usize = 16;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_refresh_has_exactly_one_winner() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    server
        .create_user(TEST_USERNAME, TEST_PASSWORD, &[ROLE_USER])
        .await?;
    let client = reqwest::Client::new();
    let tokens: Value = client
        .post(format!("{}/api/v1/auth/login", server.url()))
        .json(&json!({ "username": TEST_USERNAME, "password": TEST_PASSWORD }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let url = format!("{}/api/v1/auth/refresh", server.url());
    let body = Arc::new(json!({
        "access_token": tokens["access_token"],
        "refresh_token": tokens["refresh_token"],
    }));
    let barrier = Arc::new(tokio::sync::Barrier::new(RACERS));

    // Act
    let mut handles = Vec::with_capacity(RACERS);
    for _ in 0..RACERS {
        let client = client.clone();
        let url = url.clone();
        let body = body.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            let response = client.post(&url).json(body.as_ref()).send().await?;
            let status = response.status();
            let payload: Value = response.json().await?;
            Ok::<_, anyhow::Error>((status, payload))
        }));
    }

    let mut winners = Vec::new();
    let mut denials = Vec::new();
    for handle in handles {
        let (status, payload) = handle.await??;
        match status {
            StatusCode::OK => winners.push(payload),
            StatusCode::UNAUTHORIZED => denials.push(payload),
            other => anyhow::bail!("unexpected status {}", other),
        }
    }

    // Assert
    assert_eq!(winners.len(), 1, "Exactly one rotation may succeed");
    assert_eq!(denials.len(), RACERS - 1);
    for denial in &denials {
        assert_eq!(denial["error"]["code"], "REFRESH_DENIED");
    }

    // The winner's refresh token is the only live one
    let winner = &winners[0];
    let next = client
        .post(&url)
        .json(&json!({
            "access_token": winner["access_token"],
            "refresh_token": winner["refresh_token"],
        }))
        .send()
        .await?;
    assert_eq!(next.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_logins_leave_one_live_refresh_token() -> Result<(), anyhow::Error> {
    // Arrange
    let server = TestAuthServer::spawn().await?;
    server
        .create_user(TEST_USERNAME, TEST_PASSWORD, &[ROLE_USER])
        .await?;
    let client = reqwest::Client::new();
    let url = format!("{}/api/v1/auth/login", server.url());

    // Act
    let mut handles = Vec::new();
    for _ in 0..4 {
        let client = client.clone();
        let url = url.clone();
        handles.push(tokio::spawn(async move {
            let response = client
                .post(&url)
                .json(&json!({ "username": TEST_USERNAME, "password": TEST_PASSWORD }))
                .send()
                .await?;
            let status = response.status();
            let payload: Value = response.json().await?;
            Ok::<_, anyhow::Error>((status, payload))
        }));
    }

    let mut pairs = Vec::new();
    for handle in handles {
        let (status, payload) = handle.await??;
        if status == StatusCode::OK {
            pairs.push(payload);
        }
    }

    // Assert
    let mut live = 0;
    for pair in &pairs {
        let response = client
            .post(format!("{}/api/v1/auth/refresh", server.url()))
            .json(&json!({
                "access_token": pair["access_token"],
                "refresh_token": pair["refresh_token"],
            }))
            .send()
            .await?;
        if response.status() == StatusCode::OK {
            live += 1;
        }
    }
    assert_eq!(live, 1, "Only one refresh token per identity may be live");

    Ok(())
}
