use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use chrono::Utc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    error::{JukeboxError, Result},
    types::{
        RequestEvent, RequestEventKind, RequestStatus, SongRequest, SubmitRequestPayload,
    },
    utils,
};

/// File-backed store for guest song requests.
///
/// Enforces track uniqueness at creation time and fans every change out on
/// a broadcast channel so the server can stream live updates to guests.
pub struct RequestManager {
    dir: PathBuf,
    requests: Vec<SongRequest>,
    events: broadcast::Sender<RequestEvent>,
}

impl RequestManager {
    pub async fn open(dir: &Path) -> Result<Self> {
        let (events, _) = broadcast::channel(64);
        let path = dir.join("requests.json");
        let requests = match async_fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(JukeboxError::Storage(e)),
        };

        Ok(RequestManager {
            dir: dir.to_path_buf(),
            requests,
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RequestEvent> {
        self.events.subscribe()
    }

    /// Creates a pending request from a guest submission.
    ///
    /// Track ids are normalized first, so a pasted `spotify:track:` URI and
    /// a bare id count as the same track. A second submission for a track
    /// already in the queue is rejected before anything is persisted,
    /// whatever status the first one has.
    pub async fn submit(&mut self, payload: SubmitRequestPayload) -> Result<SongRequest> {
        let track_id = utils::track_id_from_uri(payload.track_id.trim());
        if track_id.is_empty() {
            return Err(JukeboxError::Validation("track id is empty".to_string()));
        }

        if self.requests.iter().any(|r| r.track_id == track_id) {
            return Err(JukeboxError::DuplicateRequest { track_id });
        }

        let request = SongRequest {
            id: Uuid::new_v4().to_string(),
            track_id,
            title: payload.title,
            artist: payload.artist,
            album_art: payload.album_art,
            requested_by: payload.requested_by,
            device_id: payload.device_id,
            requested_at: Utc::now(),
            message: payload.message,
            status: RequestStatus::Pending,
            votes: 0,
            voted_by: Vec::new(),
        };

        self.requests.push(request.clone());
        self.persist().await?;
        self.emit(RequestEventKind::Created, &request);
        Ok(request)
    }

    pub fn get(&self, id: &str) -> Option<&SongRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    /// Lists requests, optionally filtered by status, oldest first.
    pub fn list(&self, status: Option<RequestStatus>) -> Vec<SongRequest> {
        let mut requests: Vec<SongRequest> = self
            .requests
            .iter()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        requests.sort_by_key(|r| r.requested_at);
        requests
    }

    /// Track ids of every approved request, the sync engine's target set.
    pub fn approved_track_ids(&self) -> HashSet<String> {
        self.requests
            .iter()
            .filter(|r| r.status == RequestStatus::Approved)
            .map(|r| r.track_id.clone())
            .collect()
    }

    pub async fn set_status(&mut self, id: &str, status: RequestStatus) -> Result<SongRequest> {
        let request = self
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| JukeboxError::NotFound(format!("request {id}")))?;

        request.status = status;
        let updated = request.clone();
        self.persist().await?;
        self.emit(RequestEventKind::Updated, &updated);
        Ok(updated)
    }

    /// Registers a vote. A voter who already voted is a no-op, not an error.
    pub async fn vote(&mut self, id: &str, voter: &str) -> Result<SongRequest> {
        let request = self
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| JukeboxError::NotFound(format!("request {id}")))?;

        if request.voted_by.iter().any(|v| v == voter) {
            return Ok(request.clone());
        }

        request.votes += 1;
        request.voted_by.push(voter.to_string());
        let updated = request.clone();
        self.persist().await?;
        self.emit(RequestEventKind::Updated, &updated);
        Ok(updated)
    }

    pub async fn remove(&mut self, id: &str) -> Result<SongRequest> {
        let index = self
            .requests
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| JukeboxError::NotFound(format!("request {id}")))?;

        let removed = self.requests.remove(index);
        self.persist().await?;
        self.emit(RequestEventKind::Deleted, &removed);
        Ok(removed)
    }

    async fn persist(&self) -> Result<()> {
        let path = self.get_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.requests)?;
        async_fs::write(path, json).await?;
        Ok(())
    }

    fn emit(&self, kind: RequestEventKind, request: &SongRequest) {
        // Nobody listening is fine; the stream is best effort.
        let _ = self.events.send(RequestEvent {
            kind,
            request: request.clone(),
        });
    }

    fn get_path(&self) -> PathBuf {
        self.dir.join("requests.json")
    }
}
