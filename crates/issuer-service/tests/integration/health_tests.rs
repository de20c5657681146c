//! Integration tests for the operational endpoints.

use issuer_test_utils::TestIssuerServer;
use reqwest::StatusCode;

#[tokio::test]
async fn test_health_endpoint_returns_ok() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;

    let response = server
        .client()
        .get(format!("{}/health", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "OK");
    Ok(())
}

#[tokio::test]
async fn test_ready_endpoint_reports_both_stores() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;

    let response = server
        .client()
        .get(format!("{}/ready", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["database"], "healthy");
    assert_eq!(body["session_store"], "healthy");
    Ok(())
}

#[tokio::test]
async fn test_ready_endpoint_returns_503_when_user_store_down() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;
    server.users().set_failing(true);

    let response = server
        .client()
        .get(format!("{}/ready", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["database"], "unhealthy");
    assert_eq!(body["session_store"], "healthy");

    // No infrastructure detail leaks into the body.
    assert!(!body.to_string().contains("injected"));
    Ok(())
}

#[tokio::test]
async fn test_metrics_endpoint_is_served() -> Result<(), anyhow::Error> {
    let server = TestIssuerServer::spawn().await?;

    let response = server
        .client()
        .get(format!("{}/metrics", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}
