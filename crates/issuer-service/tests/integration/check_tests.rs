//! Integration tests for `GET /check`.

use issuer_service::models::{IntrospectionResponse, TokenStatus};
use issuer_test_utils::{TestIssuerServer, TestTokenBuilder, TEST_SIGNING_SECRET};

fn inactive() -> IntrospectionResponse {
    IntrospectionResponse::inactive()
}

#[tokio::test]
async fn test_current_token_is_active_with_scope() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;
    let user = server.register_user("alice", "p", Some("admin,read")).await?;
    let token = server.issue_token(user.user_id, "p").await?;

    let (status, body) = server.check(&token).await?;

    assert_eq!(status, 200);
    assert_eq!(body.status, TokenStatus::Active);
    assert_eq!(body.scope.as_deref(), Some("admin,read"));
    Ok(())
}

#[tokio::test]
async fn test_missing_or_malformed_header_is_401_inactive() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;

    for header in [None, Some("Basic abc"), Some("Bearer "), Some("bearer abc"), Some("Bearer")] {
        let (status, body) = server.check_with_header(header).await?;
        assert_eq!(status, 401, "header: {:?}", header);
        assert_eq!(body, inactive());
    }
    Ok(())
}

#[tokio::test]
async fn test_inactive_body_serializes_null_scope() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;

    let response = server
        .client()
        .get(format!("{}/check", server.url()))
        .send()
        .await?;
    let body: serde_json::Value = response.json().await?;

    assert_eq!(body, serde_json::json!({"status": "inactive", "scope": null}));
    Ok(())
}

#[tokio::test]
async fn test_garbage_bearer_is_200_inactive() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;

    let (status, body) = server.check("garbage").await?;

    assert_eq!(status, 200);
    assert_eq!(body, inactive());
    Ok(())
}

#[tokio::test]
async fn test_foreign_signature_is_inactive() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;
    let token = TestTokenBuilder::new().for_user(1).sign(b"someone-elses-secret");

    let (status, body) = server.check(&token).await?;

    assert_eq!(status, 200);
    assert_eq!(body, inactive());
    Ok(())
}

#[tokio::test]
async fn test_expired_token_is_inactive() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;
    let token = TestTokenBuilder::new()
        .for_user(1)
        .expires_in(-60)
        .sign(TEST_SIGNING_SECRET);

    let (status, body) = server.check(&token).await?;

    assert_eq!(status, 200);
    assert_eq!(body, inactive());
    Ok(())
}

#[tokio::test]
async fn test_well_signed_token_outside_session_is_inactive() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;
    let user = server.register_user("alice", "p", None).await?;
    server.issue_token(user.user_id, "p").await?;

    let forged = TestTokenBuilder::new()
        .for_user(user.user_id)
        .sign(TEST_SIGNING_SECRET);

    let (status, body) = server.check(&forged).await?;

    assert_eq!(status, 200);
    assert_eq!(body, inactive());
    Ok(())
}

#[tokio::test]
async fn test_incomplete_claims_are_inactive() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;

    for token in [
        TestTokenBuilder::new().for_user(0).sign(TEST_SIGNING_SECRET),
        TestTokenBuilder::new().with_scopes("").sign(TEST_SIGNING_SECRET),
    ] {
        let (status, body) = server.check(&token).await?;
        assert_eq!(status, 200);
        assert_eq!(body, inactive());
    }
    Ok(())
}

#[tokio::test]
async fn test_lapsed_session_entry_is_inactive() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;
    let user = server.register_user("alice", "p", None).await?;
    let token = server.issue_token(user.user_id, "p").await?;

    assert!(server.forget_token(&token).await);

    let (status, body) = server.check(&token).await?;
    assert_eq!(status, 200);
    assert_eq!(body, inactive());
    Ok(())
}
