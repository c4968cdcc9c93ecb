use std::sync::Arc;

use crate::{info, jukebox::Jukebox, server, warning};

/// Starts the guest-facing HTTP server. Missing auth or playlist selection
/// is worth a warning but not a refusal; both can be fixed through the
/// admin endpoints while the server runs.
pub async fn serve(jukebox: Arc<Jukebox>) {
    if !jukebox.is_authenticated().await {
        warning!("Not authenticated; run `jukeboxd auth` so approvals can reach the playlist.");
    }

    if jukebox.status().await.active_playlist_id.is_none() {
        warning!("No active playlist selected; run `jukeboxd playlists --use <ID>`.");
    }

    info!("Starting jukebox server...");
    server::start_server(jukebox).await;
}
