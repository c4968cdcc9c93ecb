use axum::{
    Extension, Router,
    routing::{delete, get, post, put},
};
use std::{net::SocketAddr, str::FromStr, sync::Arc};

use crate::{api, error, info, jukebox::Jukebox, warning};

/// Builds the full route table around a shared [`Jukebox`].
pub fn router(jukebox: Arc<Jukebox>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback))
        .route(
            "/api/requests",
            post(api::submit_request).get(api::list_requests),
        )
        .route("/api/requests/stream", get(api::stream_requests))
        .route("/api/requests/{id}/vote", post(api::vote))
        .route("/api/search", get(api::search))
        .route("/api/tracks/{id}", get(api::track))
        .route("/api/admin/status", get(api::admin_status))
        .route("/api/admin/auth/url", get(api::admin_auth_url))
        .route("/api/admin/auth/logout", post(api::admin_logout))
        .route("/api/admin/playlists", get(api::admin_playlists))
        .route("/api/admin/playlist", put(api::admin_select_playlist))
        .route("/api/admin/sync", post(api::admin_sync))
        .route("/api/admin/requests/{id}/approve", post(api::admin_approve))
        .route("/api/admin/requests/{id}/reject", post(api::admin_reject))
        .route("/api/admin/requests/{id}", delete(api::admin_remove))
        .route("/api/admin/log", get(api::admin_log))
        .layer(Extension(jukebox))
}

pub async fn start_server(jukebox: Arc<Jukebox>) {
    if jukebox.settings().admin_token.is_none() {
        warning!("JUKEBOX_ADMIN_TOKEN is not set; admin endpoints are open to the whole network");
    }

    let addr = match SocketAddr::from_str(&jukebox.settings().server_addr) {
        Ok(addr) => addr,
        Err(e) => error!("Failed to parse server address: {}", e),
    };

    let app = router(jukebox);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => error!("Failed to bind {}: {}", addr, e),
    };

    info!("Listening on http://{}", addr);

    // Guests connect straight from the party Wi-Fi, so the peer address is
    // what the rate limiter records.
    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        error!("Server error: {}", e);
    }
}
