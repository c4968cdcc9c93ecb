mod common;

use std::{path::Path, sync::Arc};

use jukeboxd::{
    error::JukeboxError,
    management::{TokenManager, TokenVault},
    spotify::client::SpotifyClient,
};
use reqwest::Method;
use tempfile::tempdir;

use common::{MockSpotify, seed_auth};

async fn client_for(mock: &MockSpotify, dir: &Path) -> SpotifyClient {
    let tokens = Arc::new(
        TokenManager::open(mock.provider(), TokenVault::new(dir))
            .await
            .unwrap(),
    );
    SpotifyClient::new(mock.provider(), tokens)
}

#[tokio::test]
async fn test_401_refreshes_and_retries_same_request() {
    let mock = MockSpotify::spawn().await;
    let dir = tempdir().unwrap();
    seed_auth(dir.path(), true).await;

    // The seeded access-0 is fresh by expiry but the provider wants at
    // least access-1
    mock.state.lock().await.min_token_number = 1;

    let client = client_for(&mock, dir.path()).await;
    let profile = client.me().await.unwrap();

    assert_eq!(profile.id, "host");
    assert_eq!(mock.refresh_calls().await, 1);
}

#[tokio::test]
async fn test_refresh_ceiling_clears_credentials() {
    let mock = MockSpotify::spawn().await;
    let dir = tempdir().unwrap();
    seed_auth(dir.path(), true).await;

    mock.state.lock().await.always_401 = true;

    let client = client_for(&mock, dir.path()).await;
    let err = client.me().await.unwrap_err();

    assert!(matches!(err, JukeboxError::AuthRequired(_)));
    // One refresh per bounced retry, then the grant is declared dead
    assert_eq!(mock.refresh_calls().await, 3);
    assert!(!client.tokens().is_authenticated().await);

    // Cleared on disk too, not just in memory
    assert!(
        TokenVault::new(dir.path())
            .load()
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_429_surfaces_retry_after_without_retry() {
    let mock = MockSpotify::spawn().await;
    let dir = tempdir().unwrap();
    seed_auth(dir.path(), true).await;

    mock.state.lock().await.rate_limit_next = Some(7);

    let client = client_for(&mock, dir.path()).await;
    let err = client.me().await.unwrap_err();

    assert!(matches!(err, JukeboxError::RateLimited { retry_after: 7 }));
    assert_eq!(mock.refresh_calls().await, 0);

    // The 429 was consumed, not retried; the next call goes through
    let profile = client.me().await.unwrap();
    assert_eq!(profile.id, "host");
}

#[tokio::test]
async fn test_no_content_is_success_without_body() {
    let mock = MockSpotify::spawn().await;
    let dir = tempdir().unwrap();
    seed_auth(dir.path(), true).await;

    let client = client_for(&mock, dir.path()).await;

    let body = client.request(Method::GET, "/empty", None).await.unwrap();
    assert!(body.is_none());

    // A caller that requires a body gets a typed failure instead
    let err = client.get_json("/empty").await.unwrap_err();
    assert!(matches!(err, JukeboxError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_api_error_carries_provider_message() {
    let mock = MockSpotify::spawn().await;
    let dir = tempdir().unwrap();
    seed_auth(dir.path(), true).await;

    let client = client_for(&mock, dir.path()).await;
    let err = client.get_json("/teapot").await.unwrap_err();

    match err {
        JukeboxError::Api { status, message } => {
            assert_eq!(status, 418);
            assert!(message.contains("short and stout"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_network_failure_reports_attempts() {
    let mock = MockSpotify::spawn().await;
    let dir = tempdir().unwrap();
    seed_auth(dir.path(), true).await;

    // Grab a port nobody listens on by binding and immediately dropping it
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = listener.local_addr().unwrap();
    drop(listener);

    let mut provider = mock.provider();
    provider.api_url = format!("http://{dead_addr}");

    let tokens = Arc::new(
        TokenManager::open(provider.clone(), TokenVault::new(dir.path()))
            .await
            .unwrap(),
    );
    let client = SpotifyClient::new(provider, tokens).with_network_retries(1);

    let err = client.me().await.unwrap_err();
    match err {
        JukeboxError::Network { attempts, .. } => assert_eq!(attempts, 1),
        other => panic!("expected Network error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_search_encodes_query() {
    let mock = MockSpotify::spawn().await;
    let dir = tempdir().unwrap();
    seed_auth(dir.path(), true).await;

    let client = client_for(&mock, dir.path()).await;
    let hits = client.search_tracks("daft punk", 10).await.unwrap();

    assert_eq!(hits.len(), 1);
    // The mock echoes the decoded query back in the track id
    assert_eq!(hits[0].id.as_deref(), Some("found-daft punk"));
}
