use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::{
    error::{JukeboxError, Result},
    types::{PlaylistState, SyncStatus},
};

/// Holder of the singleton playlist configuration record.
///
/// Only admin playlist selection and the sync engine recording its outcome
/// write here.
pub struct PlaylistStateManager {
    dir: PathBuf,
    state: PlaylistState,
}

impl PlaylistStateManager {
    pub async fn open(dir: &Path) -> Result<Self> {
        let path = dir.join("playlist.json");
        let state = match async_fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => PlaylistState::default(),
            Err(e) => return Err(JukeboxError::Storage(e)),
        };

        Ok(PlaylistStateManager {
            dir: dir.to_path_buf(),
            state,
        })
    }

    pub fn state(&self) -> &PlaylistState {
        &self.state
    }

    pub fn active_playlist_id(&self) -> Option<String> {
        self.state.active_playlist_id.clone()
    }

    /// Selects the playlist that sync and immediate adds target.
    pub async fn set_active(&mut self, id: &str, name: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(JukeboxError::Validation("playlist id is empty".to_string()));
        }
        if name.trim().is_empty() {
            return Err(JukeboxError::Validation(
                "playlist name is empty".to_string(),
            ));
        }

        self.state.active_playlist_id = Some(id.to_string());
        self.state.active_playlist_name = Some(name.to_string());
        self.persist().await
    }

    /// Records the outcome of a sync run, success or not.
    pub async fn record_sync(&mut self, status: SyncStatus, error: Option<String>) -> Result<()> {
        self.state.last_sync_at = Some(Utc::now());
        self.state.last_sync_status = Some(status);
        self.state.last_sync_error = error;
        self.persist().await
    }

    async fn persist(&self) -> Result<()> {
        let path = self.get_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.state)?;
        async_fs::write(path, json).await?;
        Ok(())
    }

    fn get_path(&self) -> PathBuf {
        self.dir.join("playlist.json")
    }
}
