#![allow(dead_code)]

//! Shared test harness: an in-process mock of the provider's token and Web
//! API endpoints, scriptable per test through [`MockState`].

use std::{collections::HashMap, path::Path, sync::Arc};

use axum::{
    Extension, Router,
    extract::{Form, Path as UrlPath, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use jukeboxd::{
    config::ProviderConfig,
    management::TokenVault,
    types::{Credentials, StoredAuth, UserIdentity},
};

/// Scripted provider behavior plus call counters, shared with the test body.
pub struct MockState {
    pub base_url: String,
    /// Lifetime reported by the token endpoint.
    pub expires_in: i64,
    /// Mint a new refresh token on refresh grants too.
    pub rotate_refresh: bool,
    /// Refresh grants answer with this status and body instead of a token.
    pub fail_refresh_status: Option<u16>,
    pub fail_refresh_body: Option<String>,
    /// Every API call answers 401 no matter the token.
    pub always_401: bool,
    /// Tokens `access-N` with N below this answer 401.
    pub min_token_number: u32,
    /// The next API call answers 429 with this Retry-After.
    pub rate_limit_next: Option<u64>,
    /// Playlist tracks per page; small values force pagination.
    pub page_size: usize,
    /// Track ids currently on the playlist.
    pub playlist: Vec<String>,
    /// Track ids whose batch or single add answers 500.
    pub fail_add_for: Vec<String>,
    /// Playlist track listing answers 500.
    pub fail_tracks_fetch: bool,
    /// First playlist page carries an item with a null track id.
    pub include_local_file: bool,
    pub refresh_calls: u32,
    pub exchange_calls: u32,
    pub token_counter: u32,
    pub add_calls: u32,
    pub remove_calls: u32,
}

impl Default for MockState {
    fn default() -> Self {
        MockState {
            base_url: String::new(),
            expires_in: 3600,
            rotate_refresh: false,
            fail_refresh_status: None,
            fail_refresh_body: None,
            always_401: false,
            min_token_number: 0,
            rate_limit_next: None,
            page_size: 100,
            playlist: Vec::new(),
            fail_add_for: Vec::new(),
            fail_tracks_fetch: false,
            include_local_file: false,
            refresh_calls: 0,
            exchange_calls: 0,
            token_counter: 0,
            add_calls: 0,
            remove_calls: 0,
        }
    }
}

pub struct MockSpotify {
    pub state: Arc<Mutex<MockState>>,
    base_url: String,
}

impl MockSpotify {
    pub async fn spawn() -> Self {
        let state = Arc::new(Mutex::new(MockState::default()));

        let app = Router::new()
            .route("/token", post(token))
            .route("/me", get(me))
            .route("/me/playlists", get(my_playlists))
            .route(
                "/playlists/{id}/tracks",
                get(playlist_tracks).post(add_tracks).delete(remove_tracks),
            )
            .route("/search", get(search))
            .route("/tracks/{id}", get(track))
            .route("/empty", get(empty))
            .route("/teapot", get(teapot))
            .layer(Extension(Arc::clone(&state)));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        state.lock().await.base_url = base_url.clone();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockSpotify { state, base_url }
    }

    pub fn provider(&self) -> ProviderConfig {
        ProviderConfig {
            client_id: "test-client".to_string(),
            client_secret: None,
            redirect_uri: format!("{}/callback", self.base_url),
            scope: "playlist-modify-private playlist-read-private".to_string(),
            auth_url: format!("{}/authorize", self.base_url),
            token_url: format!("{}/token", self.base_url),
            api_url: self.base_url.clone(),
        }
    }

    pub async fn refresh_calls(&self) -> u32 {
        self.state.lock().await.refresh_calls
    }

    pub async fn exchange_calls(&self) -> u32 {
        self.state.lock().await.exchange_calls
    }

    pub async fn add_calls(&self) -> u32 {
        self.state.lock().await.add_calls
    }

    pub async fn remove_calls(&self) -> u32 {
        self.state.lock().await.remove_calls
    }

    pub async fn playlist(&self) -> Vec<String> {
        self.state.lock().await.playlist.clone()
    }
}

pub fn credentials(access: &str, refresh: &str, expires_at: i64) -> Credentials {
    Credentials {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        scope: vec!["playlist-modify-private".to_string()],
        expires_at,
    }
}

/// Seeds the vault in `dir` with stored credentials, fresh or already stale.
pub async fn seed_auth(dir: &Path, fresh: bool) {
    let now = Utc::now().timestamp();
    let expires_at = if fresh { now + 3000 } else { now - 10 };

    TokenVault::new(dir)
        .store(&StoredAuth {
            credentials: credentials("access-0", "refresh-0", expires_at),
            identity: Some(UserIdentity {
                id: "host".to_string(),
                display_name: "Party Host".to_string(),
                email: None,
                avatar_url: None,
            }),
        })
        .await
        .unwrap();
}

fn token_number(headers: &HeaderMap) -> u32 {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer access-"))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

fn error_envelope(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({"error": {"status": status.as_u16(), "message": message}})),
    )
        .into_response()
}

fn gate(state: &mut MockState, headers: &HeaderMap) -> Option<Response> {
    if let Some(retry_after) = state.rate_limit_next.take() {
        let mut response = error_envelope(StatusCode::TOO_MANY_REQUESTS, "rate limited");
        response.headers_mut().insert(
            "Retry-After",
            retry_after.to_string().parse().expect("header value"),
        );
        return Some(response);
    }

    if state.always_401 || token_number(headers) < state.min_token_number {
        return Some(error_envelope(
            StatusCode::UNAUTHORIZED,
            "The access token expired",
        ));
    }

    None
}

fn track_json(track_id: &str) -> Value {
    json!({
        "id": track_id,
        "name": format!("Track {track_id}"),
        "uri": format!("spotify:track:{track_id}"),
        "artists": [{"id": "artist-1", "name": "The Artists"}],
        "album": {"name": "The Album", "images": [{"url": "https://img.example/cover.png"}]},
    })
}

async fn token(
    Extension(state): Extension<Arc<Mutex<MockState>>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let mut state = state.lock().await;
    let grant = form.get("grant_type").cloned().unwrap_or_default();

    if grant == "refresh_token" {
        state.refresh_calls += 1;
        if let Some(status) = state.fail_refresh_status {
            let body = state
                .fail_refresh_body
                .clone()
                .unwrap_or_else(|| json!({"error": "server_error"}).to_string());
            return (
                StatusCode::from_u16(status).expect("scripted status"),
                body,
            )
                .into_response();
        }
    } else {
        state.exchange_calls += 1;
    }

    state.token_counter += 1;
    let mut body = json!({
        "access_token": format!("access-{}", state.token_counter),
        "token_type": "Bearer",
        "expires_in": state.expires_in,
        "scope": "playlist-modify-private playlist-read-private",
    });
    if grant != "refresh_token" || state.rotate_refresh {
        body["refresh_token"] = json!(format!("refresh-{}", state.token_counter));
    }

    Json(body).into_response()
}

async fn me(headers: HeaderMap, Extension(state): Extension<Arc<Mutex<MockState>>>) -> Response {
    let mut state = state.lock().await;
    if let Some(denied) = gate(&mut state, &headers) {
        return denied;
    }

    Json(json!({
        "id": "host",
        "display_name": "Party Host",
        "email": "host@example.com",
        "images": [{"url": "https://img.example/avatar.png"}],
    }))
    .into_response()
}

async fn my_playlists(
    headers: HeaderMap,
    Extension(state): Extension<Arc<Mutex<MockState>>>,
) -> Response {
    let mut state = state.lock().await;
    if let Some(denied) = gate(&mut state, &headers) {
        return denied;
    }

    Json(json!({
        "items": [
            {
                "id": "pl1",
                "name": "Party Mix",
                "description": "the one",
                "public": false,
                "collaborative": false,
                "snapshot_id": "snap-1",
                "tracks": {"total": state.playlist.len()},
            },
            {
                "id": "pl2",
                "name": "Chill",
                "description": null,
                "public": true,
                "collaborative": false,
                "snapshot_id": "snap-2",
                "tracks": {"total": 0},
            },
        ],
        "next": null,
    }))
    .into_response()
}

async fn playlist_tracks(
    UrlPath(id): UrlPath<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Extension(state): Extension<Arc<Mutex<MockState>>>,
) -> Response {
    let mut state = state.lock().await;
    if let Some(denied) = gate(&mut state, &headers) {
        return denied;
    }
    if state.fail_tracks_fetch {
        return error_envelope(StatusCode::INTERNAL_SERVER_ERROR, "tracks unavailable");
    }

    let offset: usize = params
        .get("offset")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let mut items: Vec<Value> = state
        .playlist
        .iter()
        .skip(offset)
        .take(state.page_size)
        .map(|track_id| json!({"track": track_json(track_id)}))
        .collect();

    if state.include_local_file && offset == 0 {
        items.push(json!({
            "track": {"id": null, "name": "Living Room Demo", "uri": "spotify:local:demo", "artists": [], "album": null}
        }));
    }

    let next_offset = offset + state.page_size;
    let next = if next_offset < state.playlist.len() {
        json!(format!(
            "{}/playlists/{}/tracks?offset={}",
            state.base_url, id, next_offset
        ))
    } else {
        json!(null)
    };

    Json(json!({"items": items, "next": next, "total": state.playlist.len()})).into_response()
}

async fn add_tracks(
    UrlPath(_id): UrlPath<String>,
    headers: HeaderMap,
    Extension(state): Extension<Arc<Mutex<MockState>>>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().await;
    if let Some(denied) = gate(&mut state, &headers) {
        return denied;
    }
    state.add_calls += 1;

    let ids: Vec<String> = body["uris"]
        .as_array()
        .map(|uris| {
            uris.iter()
                .filter_map(|u| u.as_str())
                .filter_map(|u| u.rsplit_once(':').map(|(_, id)| id.to_string()))
                .collect()
        })
        .unwrap_or_default();

    if ids.iter().any(|id| state.fail_add_for.contains(id)) {
        return error_envelope(StatusCode::INTERNAL_SERVER_ERROR, "add rejected");
    }

    for id in ids {
        if !state.playlist.contains(&id) {
            state.playlist.push(id);
        }
    }

    Json(json!({"snapshot_id": "snap"})).into_response()
}

async fn remove_tracks(
    UrlPath(_id): UrlPath<String>,
    headers: HeaderMap,
    Extension(state): Extension<Arc<Mutex<MockState>>>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().await;
    if let Some(denied) = gate(&mut state, &headers) {
        return denied;
    }
    state.remove_calls += 1;

    let ids: Vec<String> = body["tracks"]
        .as_array()
        .map(|tracks| {
            tracks
                .iter()
                .filter_map(|t| t["uri"].as_str())
                .filter_map(|u| u.rsplit_once(':').map(|(_, id)| id.to_string()))
                .collect()
        })
        .unwrap_or_default();

    state.playlist.retain(|existing| !ids.contains(existing));

    Json(json!({"snapshot_id": "snap"})).into_response()
}

async fn search(
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Extension(state): Extension<Arc<Mutex<MockState>>>,
) -> Response {
    let mut state = state.lock().await;
    if let Some(denied) = gate(&mut state, &headers) {
        return denied;
    }

    let q = params.get("q").cloned().unwrap_or_default();
    Json(json!({"tracks": {"items": [track_json(&format!("found-{q}"))]}})).into_response()
}

async fn track(
    UrlPath(id): UrlPath<String>,
    headers: HeaderMap,
    Extension(state): Extension<Arc<Mutex<MockState>>>,
) -> Response {
    let mut state = state.lock().await;
    if let Some(denied) = gate(&mut state, &headers) {
        return denied;
    }

    Json(track_json(&id)).into_response()
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn teapot() -> Response {
    error_envelope(StatusCode::IM_A_TEAPOT, "short and stout")
}
