mod common;

use std::sync::Arc;

use chrono::Utc;
use jukeboxd::{
    error::JukeboxError,
    management::{TokenManager, TokenVault},
};
use tempfile::tempdir;

use common::{MockSpotify, seed_auth};

#[tokio::test]
async fn test_missing_credentials_fail_without_network() {
    let mock = MockSpotify::spawn().await;
    let dir = tempdir().unwrap();

    let manager = TokenManager::open(mock.provider(), TokenVault::new(dir.path()))
        .await
        .unwrap();

    let err = manager.get_valid_access_token().await.unwrap_err();
    assert!(matches!(err, JukeboxError::AuthRequired(_)));

    // The token endpoint was never contacted
    assert_eq!(mock.refresh_calls().await, 0);
}

#[tokio::test]
async fn test_fresh_token_returned_without_refresh() {
    let mock = MockSpotify::spawn().await;
    let dir = tempdir().unwrap();
    seed_auth(dir.path(), true).await;

    let manager = TokenManager::open(mock.provider(), TokenVault::new(dir.path()))
        .await
        .unwrap();

    let token = manager.get_valid_access_token().await.unwrap();
    assert_eq!(token, "access-0");
    assert_eq!(mock.refresh_calls().await, 0);
}

#[tokio::test]
async fn test_stale_token_refreshes_once() {
    let mock = MockSpotify::spawn().await;
    let dir = tempdir().unwrap();
    seed_auth(dir.path(), false).await;

    let manager = TokenManager::open(mock.provider(), TokenVault::new(dir.path()))
        .await
        .unwrap();

    let token = manager.get_valid_access_token().await.unwrap();
    assert_eq!(token, "access-1");
    assert_eq!(mock.refresh_calls().await, 1);

    // Now fresh; no further provider calls
    let token = manager.get_valid_access_token().await.unwrap();
    assert_eq!(token, "access-1");
    assert_eq!(mock.refresh_calls().await, 1);

    // The refreshed credentials survive a restart
    let reopened = TokenManager::open(mock.provider(), TokenVault::new(dir.path()))
        .await
        .unwrap();
    assert_eq!(reopened.get_valid_access_token().await.unwrap(), "access-1");
    assert_eq!(mock.refresh_calls().await, 1);
}

#[tokio::test]
async fn test_installed_expiry_carries_buffer() {
    let mock = MockSpotify::spawn().await;
    let dir = tempdir().unwrap();
    seed_auth(dir.path(), false).await;

    let manager = TokenManager::open(mock.provider(), TokenVault::new(dir.path()))
        .await
        .unwrap()
        .with_expiry_buffer(300);

    manager.get_valid_access_token().await.unwrap();

    // Stored expiry is provider expiry minus the buffer, applied once
    let now = Utc::now().timestamp();
    let creds = manager.credentials().await.unwrap();
    let expected = now + 3600 - 300;
    assert!(
        (creds.expires_at - expected).abs() <= 2,
        "expires_at {} not near {}",
        creds.expires_at,
        expected
    );
}

#[tokio::test]
async fn test_expiry_buffer_clamped_to_minimum() {
    let mock = MockSpotify::spawn().await;
    let dir = tempdir().unwrap();
    seed_auth(dir.path(), false).await;

    let manager = TokenManager::open(mock.provider(), TokenVault::new(dir.path()))
        .await
        .unwrap()
        .with_expiry_buffer(5);

    manager.get_valid_access_token().await.unwrap();

    let now = Utc::now().timestamp();
    let creds = manager.credentials().await.unwrap();
    let expected = now + 3600 - 60;
    assert!((creds.expires_at - expected).abs() <= 2);
}

#[tokio::test]
async fn test_refresh_keeps_unrotated_refresh_token() {
    let mock = MockSpotify::spawn().await;
    let dir = tempdir().unwrap();
    seed_auth(dir.path(), false).await;

    let manager = TokenManager::open(mock.provider(), TokenVault::new(dir.path()))
        .await
        .unwrap();

    manager.get_valid_access_token().await.unwrap();

    // The provider did not rotate, so the old refresh token stays
    let creds = manager.credentials().await.unwrap();
    assert_eq!(creds.refresh_token, "refresh-0");
}

#[tokio::test]
async fn test_refresh_adopts_rotated_refresh_token() {
    let mock = MockSpotify::spawn().await;
    let dir = tempdir().unwrap();
    seed_auth(dir.path(), false).await;
    mock.state.lock().await.rotate_refresh = true;

    let manager = TokenManager::open(mock.provider(), TokenVault::new(dir.path()))
        .await
        .unwrap();

    manager.get_valid_access_token().await.unwrap();

    let creds = manager.credentials().await.unwrap();
    assert_eq!(creds.refresh_token, "refresh-1");
}

#[tokio::test]
async fn test_invalid_grant_clears_credentials() {
    let mock = MockSpotify::spawn().await;
    let dir = tempdir().unwrap();
    seed_auth(dir.path(), false).await;

    {
        let mut state = mock.state.lock().await;
        state.fail_refresh_status = Some(400);
        state.fail_refresh_body = Some(
            r#"{"error":"invalid_grant","error_description":"Refresh token revoked"}"#.to_string(),
        );
    }

    let manager = TokenManager::open(mock.provider(), TokenVault::new(dir.path()))
        .await
        .unwrap();

    let err = manager.get_valid_access_token().await.unwrap_err();
    assert!(matches!(err, JukeboxError::AuthRequired(_)));

    // Credentials are gone, in memory and on disk
    assert!(!manager.is_authenticated().await);
    assert!(
        TokenVault::new(dir.path())
            .load()
            .await
            .unwrap()
            .is_none()
    );

    // Further calls fail fast without bothering the provider again
    let err = manager.get_valid_access_token().await.unwrap_err();
    assert!(matches!(err, JukeboxError::AuthRequired(_)));
    assert_eq!(mock.refresh_calls().await, 1);
}

#[tokio::test]
async fn test_transient_refresh_failure_keeps_credentials() {
    let mock = MockSpotify::spawn().await;
    let dir = tempdir().unwrap();
    seed_auth(dir.path(), false).await;

    mock.state.lock().await.fail_refresh_status = Some(503);

    let manager = TokenManager::open(mock.provider(), TokenVault::new(dir.path()))
        .await
        .unwrap();

    let err = manager.get_valid_access_token().await.unwrap_err();
    assert!(matches!(err, JukeboxError::Api { status: 503, .. }));

    // A transient failure is not a revocation; nothing was cleared
    assert!(manager.is_authenticated().await);
    assert!(
        TokenVault::new(dir.path())
            .load()
            .await
            .unwrap()
            .is_some()
    );

    // Once the provider recovers, the same manager refreshes fine
    mock.state.lock().await.fail_refresh_status = None;
    let token = manager.get_valid_access_token().await.unwrap();
    assert_eq!(token, "access-1");
}

#[tokio::test]
async fn test_concurrent_refresh_single_flight() {
    let mock = MockSpotify::spawn().await;
    let dir = tempdir().unwrap();
    seed_auth(dir.path(), false).await;

    let manager = Arc::new(
        TokenManager::open(mock.provider(), TokenVault::new(dir.path()))
            .await
            .unwrap(),
    );

    let mut handles = Vec::new();
    for _ in 0..8 {
        let manager = Arc::clone(&manager);
        handles.push(tokio::spawn(
            async move { manager.get_valid_access_token().await },
        ));
    }

    // Everyone gets the same token from a single provider round trip
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "access-1");
    }
    assert_eq!(mock.refresh_calls().await, 1);
}

#[tokio::test]
async fn test_force_refresh_skips_when_token_already_replaced() {
    let mock = MockSpotify::spawn().await;
    let dir = tempdir().unwrap();
    seed_auth(dir.path(), true).await;

    let manager = TokenManager::open(mock.provider(), TokenVault::new(dir.path()))
        .await
        .unwrap();

    let token = manager.force_refresh("access-0").await.unwrap();
    assert_eq!(token, "access-1");
    assert_eq!(mock.refresh_calls().await, 1);

    // Someone reporting the long-gone token gets the current one for free
    let token = manager.force_refresh("access-0").await.unwrap();
    assert_eq!(token, "access-1");
    assert_eq!(mock.refresh_calls().await, 1);
}

#[tokio::test]
async fn test_clear_is_idempotent() {
    let mock = MockSpotify::spawn().await;
    let dir = tempdir().unwrap();
    seed_auth(dir.path(), true).await;

    let manager = TokenManager::open(mock.provider(), TokenVault::new(dir.path()))
        .await
        .unwrap();

    manager.clear().await.unwrap();
    manager.clear().await.unwrap();

    assert!(!manager.is_authenticated().await);
    assert!(
        TokenVault::new(dir.path())
            .load()
            .await
            .unwrap()
            .is_none()
    );
}
