use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use axum::{
    Extension,
    extract::{ConnectInfo, Path, Query},
    http::StatusCode,
    response::{
        Json,
        sse::{Event, KeepAlive, Sse},
    },
};
use serde::Deserialize;
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};

use crate::{
    error::Result,
    jukebox::Jukebox,
    types::{RequestStatus, SongRequest, SubmitRequestPayload, TrackHit, TrackObject, VotePayload},
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<RequestStatus>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default = "default_search_limit")]
    pub limit: u32,
}

fn default_search_limit() -> u32 {
    10
}

/// Accepts a guest submission. The rate limiter sees every attempt, even
/// those that later fail duplicate validation.
pub async fn submit_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Extension(jukebox): Extension<Arc<Jukebox>>,
    Json(payload): Json<SubmitRequestPayload>,
) -> Result<(StatusCode, Json<SongRequest>)> {
    let request = jukebox
        .submit_request(payload, &addr.ip().to_string())
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn list_requests(
    Query(query): Query<ListQuery>,
    Extension(jukebox): Extension<Arc<Jukebox>>,
) -> Json<Vec<SongRequest>> {
    Json(jukebox.list_requests(query.status).await)
}

pub async fn vote(
    Path(id): Path<String>,
    Extension(jukebox): Extension<Arc<Jukebox>>,
    Json(payload): Json<VotePayload>,
) -> Result<Json<SongRequest>> {
    Ok(Json(jukebox.vote(&id, &payload.voter).await?))
}

/// Live feed of request changes as server-sent events. Slow consumers that
/// lag behind the broadcast buffer simply miss events and catch up on the
/// next one.
pub async fn stream_requests(
    Extension(jukebox): Extension<Arc<Jukebox>>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let receiver = jukebox.subscribe().await;
    let stream = BroadcastStream::new(receiver).filter_map(|event| {
        let event = event.ok()?;
        let data = serde_json::to_string(&event).ok()?;
        Some(Ok(Event::default().event("request").data(data)))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub async fn search(
    Query(query): Query<SearchQuery>,
    Extension(jukebox): Extension<Arc<Jukebox>>,
) -> Result<Json<Vec<TrackHit>>> {
    Ok(Json(jukebox.search(&query.q, query.limit).await?))
}

pub async fn track(
    Path(id): Path<String>,
    Extension(jukebox): Extension<Arc<Jukebox>>,
) -> Result<Json<TrackObject>> {
    Ok(Json(jukebox.track(&id).await?))
}
