use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Stored credential record. `expires_at` is epoch seconds with the safety
/// buffer already subtracted from the provider's reported expiry, so a
/// freshness check is a plain comparison against the current time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: Vec<String>,
    pub expires_at: i64,
}

impl Credentials {
    pub fn is_fresh(&self, now: i64) -> bool {
        now < self.expires_at
    }
}

/// Wire shape of the provider's token endpoint response, for both the
/// authorization-code and the refresh-token grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub expires_in: i64,
}

/// Credentials plus the cached account identity, as persisted by the vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAuth {
    pub credentials: Credentials,
    pub identity: Option<UserIdentity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

/// One in-flight authorization attempt. Single-use; consumed on callback,
/// pruned by TTL when abandoned.
#[derive(Debug, Clone)]
pub struct PkceAttempt {
    pub code_verifier: String,
    pub state: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Approved => write!(f, "approved"),
            RequestStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(format!("unknown request status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongRequest {
    pub id: String,
    pub track_id: String,
    pub title: String,
    pub artist: String,
    pub album_art: Option<String>,
    pub requested_by: String,
    pub device_id: String,
    pub requested_at: DateTime<Utc>,
    pub message: Option<String>,
    pub status: RequestStatus,
    pub votes: u32,
    pub voted_by: Vec<String>,
}

/// Singleton playlist configuration record. Mutated only by admin playlist
/// selection and by sync/refresh operations recording their own outcome.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaylistState {
    pub active_playlist_id: Option<String>,
    pub active_playlist_name: Option<String>,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub last_sync_status: Option<SyncStatus>,
    pub last_sync_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Add,
    Remove,
    Sync,
    RefreshToken,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::Add => write!(f, "add"),
            SyncAction::Remove => write!(f, "remove"),
            SyncAction::Sync => write!(f, "sync"),
            SyncAction::RefreshToken => write!(f, "refresh_token"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Success,
    Failed,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Success => write!(f, "success"),
            SyncStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Append-only audit record. The core writes these and never mutates or
/// deletes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncLogEntry {
    pub timestamp: DateTime<Utc>,
    pub action: SyncAction,
    pub status: SyncStatus,
    pub details: String,
    pub affected_count: u32,
    pub error: Option<String>,
    pub actor: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitRecord {
    pub device_id: String,
    pub ip_address: String,
    pub window_count: u32,
    pub window_started_at: i64,
    pub blocked_until: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub added: u32,
    pub removed: u32,
    pub failed: u32,
}

/// Snapshot of the jukebox for the admin status endpoint and `jukeboxd info`.
#[derive(Debug, Clone, Serialize)]
pub struct JukeboxStatus {
    pub authenticated: bool,
    pub account: Option<String>,
    pub active_playlist_id: Option<String>,
    pub active_playlist_name: Option<String>,
    pub pending_requests: usize,
    pub approved_requests: usize,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub last_sync_status: Option<SyncStatus>,
    pub last_sync_error: Option<String>,
    pub auto_approve: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestEventKind {
    Created,
    Updated,
    Deleted,
}

/// Change notification fanned out to SSE subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEvent {
    pub kind: RequestEventKind,
    pub request: SongRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequestPayload {
    pub track_id: String,
    pub title: String,
    pub artist: String,
    pub album_art: Option<String>,
    pub requested_by: String,
    pub device_id: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VotePayload {
    pub voter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectPlaylistPayload {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Tabled)]
pub struct RequestTableRow {
    pub id: String,
    pub requested: String,
    pub title: String,
    pub artist: String,
    pub by: String,
    pub votes: u32,
    pub status: String,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub active: String,
    pub id: String,
    pub name: String,
    pub tracks: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub images: Option<Vec<ImageObject>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageObject {
    pub url: String,
}

/// Track object as the provider returns it. `id` is null for local files,
/// which the sync engine skips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackObject {
    pub id: Option<String>,
    pub name: String,
    pub uri: String,
    pub artists: Vec<TrackArtist>,
    pub album: Option<AlbumInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumInfo {
    pub name: Option<String>,
    pub images: Option<Vec<ImageObject>>,
}

/// Trimmed search result for the guest UI. Carries exactly the fields a
/// submission needs; tracks without an id (local files) are dropped before
/// this is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackHit {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album_art: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTracksResponse {
    pub items: Vec<PlaylistTrackItem>,
    pub next: Option<String>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrackItem {
    pub track: Option<TrackObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub tracks: Option<TracksPage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracksPage {
    pub items: Vec<TrackObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPlaylistsResponse {
    pub items: Vec<PlaylistSummary>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub public: Option<bool>,
    pub collaborative: Option<bool>,
    pub snapshot_id: Option<String>,
    pub tracks: Option<PlaylistTracksRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTracksRef {
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTracksRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveTracksRequest {
    pub tracks: Vec<TrackUri>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackUri {
    pub uri: String,
}
