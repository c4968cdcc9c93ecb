use crate::{info, jukebox::Jukebox, types::SyncStatus, warning};

/// Prints a status summary: authentication, active playlist, queue counts
/// and the outcome of the last sync run.
pub async fn info(jukebox: &Jukebox) {
    let status = jukebox.status().await;

    if status.authenticated {
        match status.account {
            Some(account) => info!("Authenticated as {}", account),
            None => info!("Authenticated with the provider"),
        }
    } else {
        warning!("Not authenticated; run `jukeboxd auth`.");
    }

    match (
        status.active_playlist_name.as_deref(),
        status.active_playlist_id.as_deref(),
    ) {
        (Some(name), Some(id)) => info!("Active playlist: {} ({})", name, id),
        _ => warning!("No active playlist; run `jukeboxd playlists --use <ID>`."),
    }

    info!("Pending requests: {}", status.pending_requests);
    info!("Approved requests: {}", status.approved_requests);
    info!(
        "Auto-approve: {}",
        if status.auto_approve { "on" } else { "off" }
    );

    match (status.last_sync_at, status.last_sync_status) {
        (Some(at), Some(outcome)) => {
            info!("Last sync: {} ({})", at.format("%Y-%m-%d %H:%M:%S"), outcome);
            if let Some(message) = status.last_sync_error {
                warning!("Last sync error: {}", message);
            }
        }
        _ => info!("Last sync: never"),
    }
}

/// Prints the most recent sync log entries, newest first.
pub async fn log(jukebox: &Jukebox, limit: Option<usize>) {
    let entries = jukebox.sync_log(limit.unwrap_or(20)).await;

    if entries.is_empty() {
        info!("Sync log is empty.");
        return;
    }

    for entry in entries {
        let line = format!(
            "{}  {:<13} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.action.to_string(),
            entry.details
        );
        match entry.status {
            SyncStatus::Success => info!("{}", line),
            SyncStatus::Failed => {
                warning!("{} ({})", line, entry.error.unwrap_or_default())
            }
        }
    }
}
