use std::sync::Arc;

use axum::{
    Extension,
    extract::{Path, Query},
    http::{HeaderMap, StatusCode, header},
    response::Json,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    error::{JukeboxError, Result},
    jukebox::Jukebox,
    types::{
        JukeboxStatus, PlaylistState, PlaylistSummary, SelectPlaylistPayload, SongRequest,
        SyncLogEntry, SyncOutcome,
    },
};

const ADMIN_ACTOR: &str = "admin";

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub limit: Option<usize>,
}

/// Compares the bearer token against the configured admin token. With no
/// token configured the admin surface is open; the server warns about
/// that at startup.
fn authorize(jukebox: &Jukebox, headers: &HeaderMap) -> Result<()> {
    let Some(expected) = jukebox.settings().admin_token.as_deref() else {
        return Ok(());
    };

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if presented == Some(expected) {
        Ok(())
    } else {
        Err(JukeboxError::AdminRequired)
    }
}

pub async fn admin_status(
    headers: HeaderMap,
    Extension(jukebox): Extension<Arc<Jukebox>>,
) -> Result<Json<JukeboxStatus>> {
    authorize(&jukebox, &headers)?;
    Ok(Json(jukebox.status().await))
}

pub async fn admin_auth_url(
    headers: HeaderMap,
    Extension(jukebox): Extension<Arc<Jukebox>>,
) -> Result<Json<Value>> {
    authorize(&jukebox, &headers)?;
    let auth = jukebox.begin_auth().await;
    Ok(Json(json!({
        "authorize_url": auth.authorize_url,
        "state": auth.state,
    })))
}

pub async fn admin_logout(
    headers: HeaderMap,
    Extension(jukebox): Extension<Arc<Jukebox>>,
) -> Result<StatusCode> {
    authorize(&jukebox, &headers)?;
    jukebox.logout().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn admin_playlists(
    headers: HeaderMap,
    Extension(jukebox): Extension<Arc<Jukebox>>,
) -> Result<Json<Vec<PlaylistSummary>>> {
    authorize(&jukebox, &headers)?;
    Ok(Json(jukebox.my_playlists().await?))
}

pub async fn admin_select_playlist(
    headers: HeaderMap,
    Extension(jukebox): Extension<Arc<Jukebox>>,
    Json(payload): Json<SelectPlaylistPayload>,
) -> Result<Json<PlaylistState>> {
    authorize(&jukebox, &headers)?;
    Ok(Json(
        jukebox.select_playlist(&payload.id, payload.name).await?,
    ))
}

pub async fn admin_sync(
    headers: HeaderMap,
    Extension(jukebox): Extension<Arc<Jukebox>>,
) -> Result<Json<SyncOutcome>> {
    authorize(&jukebox, &headers)?;
    Ok(Json(jukebox.sync_now(ADMIN_ACTOR).await?))
}

pub async fn admin_approve(
    headers: HeaderMap,
    Path(id): Path<String>,
    Extension(jukebox): Extension<Arc<Jukebox>>,
) -> Result<Json<SongRequest>> {
    authorize(&jukebox, &headers)?;
    Ok(Json(jukebox.approve_request(&id, ADMIN_ACTOR).await?))
}

pub async fn admin_reject(
    headers: HeaderMap,
    Path(id): Path<String>,
    Extension(jukebox): Extension<Arc<Jukebox>>,
) -> Result<Json<SongRequest>> {
    authorize(&jukebox, &headers)?;
    Ok(Json(jukebox.reject_request(&id, ADMIN_ACTOR).await?))
}

pub async fn admin_remove(
    headers: HeaderMap,
    Path(id): Path<String>,
    Extension(jukebox): Extension<Arc<Jukebox>>,
) -> Result<Json<SongRequest>> {
    authorize(&jukebox, &headers)?;
    Ok(Json(jukebox.remove_request(&id, ADMIN_ACTOR).await?))
}

pub async fn admin_log(
    headers: HeaderMap,
    Query(query): Query<LogQuery>,
    Extension(jukebox): Extension<Arc<Jukebox>>,
) -> Result<Json<Vec<SyncLogEntry>>> {
    authorize(&jukebox, &headers)?;
    Ok(Json(jukebox.sync_log(query.limit.unwrap_or(50)).await))
}
