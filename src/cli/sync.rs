use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{error, jukebox::Jukebox, success, warning};

/// Runs one reconciliation pass between the approved queue and the active
/// playlist.
pub async fn sync(jukebox: &Jukebox) {
    let pb = ProgressBar::new_spinner();
    pb.set_message("Reconciling playlist with approved requests...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    match jukebox.sync_now("cli").await {
        Ok(outcome) => {
            pb.finish_and_clear();
            success!(
                "Playlist in sync: {} added, {} removed, {} failed.",
                outcome.added,
                outcome.removed,
                outcome.failed
            );
            if outcome.failed > 0 {
                warning!("Some tracks could not be applied; see `jukeboxd log` for details.");
            }
        }
        Err(e) => {
            pb.finish_and_clear();
            error!("Sync failed: {}", e);
        }
    }
}
