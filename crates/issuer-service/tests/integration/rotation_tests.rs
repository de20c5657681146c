//! Integration tests for near-expiry rotation under both policies.

use futures::future::join_all;
use issuer_service::config::RotationPolicy;
use issuer_service::models::TokenStatus;
use issuer_test_utils::TestIssuerServer;
use std::collections::HashSet;
use std::time::Duration;

/// Inside the refresh window (under 900 seconds left).
const NEAR_EXPIRY: Duration = Duration::from_secs(120);

/// Outside the refresh window.
const PLENTY_LEFT: Duration = Duration::from_secs(1800);

async fn server_with_user(
    policy: RotationPolicy,
) -> Result<(TestIssuerServer, i64), anyhow::Error> {
    let server = TestIssuerServer::spawn_with_policy(policy).await?;
    let user = server.register_user("alice", "p", Some("read")).await?;
    Ok((server, user.user_id))
}

#[tokio::test]
async fn test_token_with_plenty_left_is_reused() -> Result<(), anyhow::Error> {
    for policy in [RotationPolicy::Strict, RotationPolicy::Legacy] {
        let (server, user_id) = server_with_user(policy).await?;
        let first = server.issue_token(user_id, "p").await?;
        assert!(server.expire_token_in(&first, PLENTY_LEFT).await);

        let second = server.issue_token(user_id, "p").await?;
        assert_eq!(first, second, "policy: {:?}", policy);
    }
    Ok(())
}

#[tokio::test]
async fn test_near_expiry_token_is_rotated() -> Result<(), anyhow::Error> {
    for policy in [RotationPolicy::Strict, RotationPolicy::Legacy] {
        let (server, user_id) = server_with_user(policy).await?;
        let first = server.issue_token(user_id, "p").await?;
        assert!(server.expire_token_in(&first, NEAR_EXPIRY).await);

        let rotated = server.issue_token(user_id, "p").await?;
        assert_ne!(first, rotated, "policy: {:?}", policy);

        let (status, body) = server.check(&rotated).await?;
        assert_eq!(status, 200);
        assert_eq!(body.status, TokenStatus::Active);

        // The new token is the stable one now.
        assert_eq!(server.issue_token(user_id, "p").await?, rotated);
    }
    Ok(())
}

/// Legacy rotation leaves the superseded token resolvable until its own
/// entry lapses.
#[tokio::test]
async fn test_legacy_old_token_stays_active_after_rotation() -> Result<(), anyhow::Error> {
    let (server, user_id) = server_with_user(RotationPolicy::Legacy).await?;
    let first = server.issue_token(user_id, "p").await?;
    server.expire_token_in(&first, NEAR_EXPIRY).await;

    server.issue_token(user_id, "p").await?;

    let (_, body) = server.check(&first).await?;
    assert_eq!(body.status, TokenStatus::Active);
    Ok(())
}

#[tokio::test]
async fn test_strict_old_token_inactive_after_rotation() -> Result<(), anyhow::Error> {
    let (server, user_id) = server_with_user(RotationPolicy::Strict).await?;
    let first = server.issue_token(user_id, "p").await?;
    server.expire_token_in(&first, NEAR_EXPIRY).await;

    server.issue_token(user_id, "p").await?;

    let (status, body) = server.check(&first).await?;
    assert_eq!(status, 200);
    assert_eq!(body.status, TokenStatus::Inactive);
    Ok(())
}

#[tokio::test]
async fn test_lapsed_resolution_entry_per_policy() -> Result<(), anyhow::Error> {
    // Legacy: TTL unknown, so the dead token is handed out again.
    let (server, user_id) = server_with_user(RotationPolicy::Legacy).await?;
    let first = server.issue_token(user_id, "p").await?;
    server.forget_token(&first).await;
    let again = server.issue_token(user_id, "p").await?;
    assert_eq!(again, first);
    let (_, body) = server.check(&again).await?;
    assert_eq!(body.status, TokenStatus::Inactive);

    // Strict: the dead pointer is replaced.
    let (server, user_id) = server_with_user(RotationPolicy::Strict).await?;
    let first = server.issue_token(user_id, "p").await?;
    server.forget_token(&first).await;
    let fresh = server.issue_token(user_id, "p").await?;
    assert_ne!(fresh, first);
    let (_, body) = server.check(&fresh).await?;
    assert_eq!(body.status, TokenStatus::Active);
    Ok(())
}

#[tokio::test]
async fn test_strict_concurrent_refreshes_leave_one_active_token() -> Result<(), anyhow::Error> {
    let (server, user_id) = server_with_user(RotationPolicy::Strict).await?;
    let first = server.issue_token(user_id, "p").await?;
    server.expire_token_in(&first, NEAR_EXPIRY).await;

    let results = join_all((0..10).map(|_| server.issue_token(user_id, "p"))).await;
    let mut issued = HashSet::new();
    for result in results {
        issued.insert(result?);
    }
    assert_eq!(issued.len(), 1, "all refreshes converge on one token");

    let mut active = 0;
    for token in issued.iter().chain(std::iter::once(&first)) {
        let (_, body) = server.check(token).await?;
        if body.status == TokenStatus::Active {
            active += 1;
        }
    }
    assert_eq!(active, 1);
    Ok(())
}
