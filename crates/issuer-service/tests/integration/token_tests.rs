//! Integration tests for `POST /token`.

use issuer_test_utils::{TestIssuerServer, TokenAssertions};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_token_carries_identity_and_one_hour_lifetime() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;
    let user = server.register_user("alice", "p", Some("admin,read")).await?;

    let token = server.issue_token(user.user_id, "p").await?;

    token
        .assert_valid_jwt()
        .assert_for_user(user.user_id)
        .assert_has_scopes("admin,read")
        .assert_expires_in(3600);
    Ok(())
}

#[tokio::test]
async fn test_second_request_returns_same_token() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;
    let user = server.register_user("alice", "p", None).await?;

    let first = server.issue_token(user.user_id, "p").await?;
    let second = server.issue_token(user.user_id, "p").await?;

    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn test_bad_credentials_are_401() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;
    let user = server.register_user("alice", "p", None).await?;
    let url = format!("{}/token", server.url());

    let wrong_password = server
        .client()
        .post(&url)
        .json(&json!({"user_id": user.user_id, "password": "nope"}))
        .send()
        .await?;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);

    let unknown_user = server
        .client()
        .post(&url)
        .json(&json!({"user_id": 9999, "password": "p"}))
        .send()
        .await?;
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    // Both failures look identical.
    let a: serde_json::Value = wrong_password.json().await?;
    let b: serde_json::Value = unknown_user.json().await?;
    assert_eq!(a, b);
    Ok(())
}

#[tokio::test]
async fn test_invalid_token_request_is_400() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;
    let url = format!("{}/token", server.url());

    for body in [
        json!({"user_id": "1", "password": "p"}),
        json!({"password": "p"}),
        json!({"user_id": 1}),
    ] {
        let response = server.client().post(&url).json(&body).send().await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
    }
    Ok(())
}

#[tokio::test]
async fn test_user_store_failure_is_500() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;
    let user = server.register_user("alice", "p", None).await?;
    server.users().set_failing(true);

    let response = server
        .client()
        .post(format!("{}/token", server.url()))
        .json(&json!({"user_id": user.user_id, "password": "p"}))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}
