//! Integration tests for `POST /user`.

use common::secret::SecretBox;
use issuer_service::crypto::PasswordDigest;
use issuer_service::repositories::UserRepository;
use issuer_test_utils::{TestIssuerServer, TEST_HASH_SALT};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_register_without_scopes_gets_user_scope() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;

    let user = server.register_user("alice", "p", None).await?;

    assert!(user.user_id >= 1);
    assert_eq!(user.name, "alice");
    assert_eq!(user.scopes, "user");
    Ok(())
}

#[tokio::test]
async fn test_register_with_empty_scopes_gets_user_scope() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;

    let user = server.register_user("alice", "p", Some("")).await?;

    assert_eq!(user.scopes, "user");
    Ok(())
}

#[tokio::test]
async fn test_register_keeps_scopes_verbatim() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;

    let user = server.register_user("bob", "p", Some("admin,read")).await?;

    assert_eq!(user.scopes, "admin,read");
    Ok(())
}

#[tokio::test]
async fn test_register_stores_salted_digest_not_password() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;

    let user = server.register_user("carol", "hunter2", None).await?;
    let stored = server
        .users()
        .get_by_id(user.user_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user not stored"))?;

    let digest = PasswordDigest::new(SecretBox::new(Box::new(TEST_HASH_SALT.to_vec())));
    assert_ne!(stored.password_digest, "hunter2");
    assert_eq!(stored.password_digest, digest.digest("hunter2"));
    Ok(())
}

#[tokio::test]
async fn test_register_rejects_invalid_bodies() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;
    let url = format!("{}/user", server.url());

    let missing_password = server
        .client()
        .post(&url)
        .json(&json!({"name": "alice"}))
        .send()
        .await?;
    assert_eq!(missing_password.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = missing_password.json().await?;
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");

    let not_json = server
        .client()
        .post(&url)
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(not_json.status(), StatusCode::BAD_REQUEST);

    let wrong_content_type = server
        .client()
        .post(&url)
        .body(r#"{"name":"a","password":"p"}"#)
        .send()
        .await?;
    assert_eq!(wrong_content_type.status(), StatusCode::BAD_REQUEST);

    assert!(server.users().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_register_store_failure_is_500() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;
    server.users().set_failing(true);

    let response = server
        .client()
        .post(format!("{}/user", server.url()))
        .json(&json!({"name": "alice", "password": "p"}))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "DATABASE_ERROR");
    Ok(())
}
