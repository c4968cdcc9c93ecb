use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{error, info, jukebox::Jukebox, success, types::PlaylistTableRow};

/// Lists the account's playlists, or with `--use` selects the one that
/// approvals and syncs target.
pub async fn playlists(jukebox: &Jukebox, use_id: Option<String>) {
    if let Some(id) = use_id {
        match jukebox.select_playlist(&id, None).await {
            Ok(state) => success!(
                "Active playlist: {} ({})",
                state.active_playlist_name.unwrap_or_default(),
                state.active_playlist_id.unwrap_or_default()
            ),
            Err(e) => error!("Failed to select playlist: {}", e),
        }
        return;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_message("Fetching your playlists...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let playlists = match jukebox.my_playlists().await {
        Ok(playlists) => {
            pb.finish_and_clear();
            playlists
        }
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to fetch playlists: {}", e)
        }
    };

    if playlists.is_empty() {
        info!("No playlists on this account.");
        return;
    }

    let active_id = jukebox.status().await.active_playlist_id;

    let table_rows: Vec<PlaylistTableRow> = playlists
        .iter()
        .map(|p| PlaylistTableRow {
            active: if active_id.as_deref() == Some(p.id.as_str()) {
                "*".to_string()
            } else {
                String::new()
            },
            id: p.id.clone(),
            name: p.name.clone(),
            tracks: p
                .tracks
                .as_ref()
                .map(|t| t.total.to_string())
                .unwrap_or_default(),
        })
        .collect();

    let table = Table::new(table_rows);
    println!("{}", table);
}
