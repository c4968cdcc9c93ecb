//! Composition root.
//!
//! [`Jukebox`] owns every manager and engine, wired once at startup and
//! passed around explicitly (the HTTP layer shares it behind an `Arc`).
//! All guest and admin operations enter through here, so policy concerns
//! like rate limiting and auto-approval live in one place.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};

use crate::{
    config::{ProviderConfig, ServiceConfig},
    error::{JukeboxError, Result},
    management::{
        PlaylistStateManager, RateDecision, RateLimiter, RequestManager, SyncLogManager,
        TokenManager, TokenVault,
    },
    spotify::{
        auth::{AuthFlow, AuthorizationRequest},
        client::SpotifyClient,
    },
    sync::SyncEngine,
    types::{
        JukeboxStatus, PlaylistState, PlaylistSummary, RequestEvent, RequestStatus, SongRequest,
        SubmitRequestPayload, SyncLogEntry, SyncOutcome, TrackHit, TrackObject,
    },
    utils, warning,
};

pub struct Jukebox {
    settings: ServiceConfig,
    tokens: Arc<TokenManager>,
    auth: AuthFlow,
    spotify: Arc<SpotifyClient>,
    engine: SyncEngine,
    requests: Arc<Mutex<RequestManager>>,
    playlist: Arc<Mutex<PlaylistStateManager>>,
    log: Arc<Mutex<SyncLogManager>>,
    limiter: Mutex<RateLimiter>,
}

impl Jukebox {
    /// Opens all stores under the configured data directory and wires the
    /// token manager, auth flow, API client and sync engine together.
    pub async fn open(provider: ProviderConfig, settings: ServiceConfig) -> Result<Self> {
        let data_dir = settings.data_dir.clone();

        let log = Arc::new(Mutex::new(SyncLogManager::open(&data_dir).await?));
        let vault = TokenVault::new(&data_dir);
        let tokens = Arc::new(
            TokenManager::open(provider.clone(), vault)
                .await?
                .with_audit(Arc::clone(&log)),
        );
        let auth = AuthFlow::new(provider.clone(), Arc::clone(&tokens));
        let spotify = Arc::new(SpotifyClient::new(provider, Arc::clone(&tokens)));
        let requests = Arc::new(Mutex::new(RequestManager::open(&data_dir).await?));
        let playlist = Arc::new(Mutex::new(PlaylistStateManager::open(&data_dir).await?));
        let limiter = Mutex::new(
            RateLimiter::open(
                &data_dir,
                settings.request_limit,
                settings.request_window_secs,
            )
            .await?,
        );
        let engine = SyncEngine::new(
            Arc::clone(&spotify),
            Arc::clone(&requests),
            Arc::clone(&playlist),
            Arc::clone(&log),
        );

        Ok(Jukebox {
            settings,
            tokens,
            auth,
            spotify,
            engine,
            requests,
            playlist,
            log,
            limiter,
        })
    }

    pub fn settings(&self) -> &ServiceConfig {
        &self.settings
    }

    /// Takes a guest submission through the gauntlet: rate limiter first,
    /// then duplicate-checked persistence, then auto-approval when
    /// configured.
    ///
    /// Auto-approval failing to reach the playlist leaves the request
    /// pending for an admin instead of losing it.
    pub async fn submit_request(
        &self,
        payload: SubmitRequestPayload,
        ip_address: &str,
    ) -> Result<SongRequest> {
        let decision = self
            .limiter
            .lock()
            .await
            .check_and_consume(&payload.device_id, ip_address)
            .await?;
        if let RateDecision::Blocked { retry_after } = decision {
            return Err(JukeboxError::GuestRateLimited { retry_after });
        }

        let request = self.requests.lock().await.submit(payload).await?;

        if self.settings.auto_approve {
            match self.approve_request(&request.id, "auto-approval").await {
                Ok(approved) => return Ok(approved),
                Err(e) => {
                    warning!("Auto-approval of request {} failed: {}", request.id, e);
                    return Ok(request);
                }
            }
        }

        Ok(request)
    }

    /// Marks a request approved and pushes its track onto the playlist.
    ///
    /// The push is best effort: approval stands even when the playlist
    /// mutation fails, and the next sync run will reconcile it.
    pub async fn approve_request(&self, id: &str, actor: &str) -> Result<SongRequest> {
        let updated = self
            .requests
            .lock()
            .await
            .set_status(id, RequestStatus::Approved)
            .await?;

        match self.engine.add_track(&updated.track_id, actor).await {
            Ok(_) => {}
            Err(JukeboxError::NoActivePlaylist) => {
                warning!(
                    "Request {} approved with no active playlist; it will sync once one is selected",
                    updated.id
                );
            }
            Err(e) => {
                warning!(
                    "Approved request {} but the playlist add failed: {}",
                    updated.id,
                    e
                );
            }
        }

        Ok(updated)
    }

    /// Marks a request rejected and pulls its track off the playlist if an
    /// earlier approval already put it there.
    pub async fn reject_request(&self, id: &str, actor: &str) -> Result<SongRequest> {
        let updated = self
            .requests
            .lock()
            .await
            .set_status(id, RequestStatus::Rejected)
            .await?;

        match self.engine.remove_track(&updated.track_id, actor).await {
            Ok(_) | Err(JukeboxError::NoActivePlaylist) => {}
            Err(e) => {
                warning!(
                    "Rejected request {} but the playlist removal failed: {}",
                    updated.id,
                    e
                );
            }
        }

        Ok(updated)
    }

    /// Deletes a request outright. An approved request's track comes off
    /// the playlist too, best effort.
    pub async fn remove_request(&self, id: &str, actor: &str) -> Result<SongRequest> {
        let removed = self.requests.lock().await.remove(id).await?;

        if removed.status == RequestStatus::Approved {
            match self.engine.remove_track(&removed.track_id, actor).await {
                Ok(_) | Err(JukeboxError::NoActivePlaylist) => {}
                Err(e) => {
                    warning!(
                        "Removed request {} but the playlist removal failed: {}",
                        removed.id,
                        e
                    );
                }
            }
        }

        Ok(removed)
    }

    pub async fn vote(&self, id: &str, voter: &str) -> Result<SongRequest> {
        self.requests.lock().await.vote(id, voter).await
    }

    pub async fn list_requests(&self, status: Option<RequestStatus>) -> Vec<SongRequest> {
        self.requests.lock().await.list(status)
    }

    pub async fn get_request(&self, id: &str) -> Option<SongRequest> {
        self.requests.lock().await.get(id).cloned()
    }

    pub async fn subscribe(&self) -> broadcast::Receiver<RequestEvent> {
        self.requests.lock().await.subscribe()
    }

    /// Searches the provider catalog and trims the hits down to what a
    /// submission needs. Local files have no id and are dropped.
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<TrackHit>> {
        let tracks = self.spotify.search_tracks(query, limit).await?;
        Ok(tracks
            .iter()
            .filter_map(|track| {
                let id = track.id.clone()?;
                Some(TrackHit {
                    id,
                    title: track.name.clone(),
                    artist: utils::primary_artist(track),
                    album_art: utils::album_art_url(track),
                })
            })
            .collect())
    }

    pub async fn track(&self, track_id: &str) -> Result<TrackObject> {
        self.spotify.track(track_id).await
    }

    pub async fn sync_now(&self, actor: &str) -> Result<SyncOutcome> {
        self.engine.sync_now(actor).await
    }

    pub async fn begin_auth(&self) -> AuthorizationRequest {
        self.auth.begin().await
    }

    pub async fn handle_callback(
        &self,
        code: Option<&str>,
        state: Option<&str>,
        error: Option<&str>,
    ) -> Result<()> {
        self.auth.handle_callback(code, state, error).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.auth.logout().await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.tokens.is_authenticated().await
    }

    pub async fn my_playlists(&self) -> Result<Vec<PlaylistSummary>> {
        self.spotify.my_playlists().await
    }

    /// Selects the playlist that approvals and syncs target.
    ///
    /// Without an explicit name the account's playlists are consulted; an
    /// id that is not among them is rejected rather than stored blind.
    pub async fn select_playlist(&self, id: &str, name: Option<String>) -> Result<PlaylistState> {
        let name = match name {
            Some(name) => name,
            None => {
                let playlists = self.spotify.my_playlists().await?;
                playlists
                    .iter()
                    .find(|p| p.id == id)
                    .map(|p| p.name.clone())
                    .ok_or_else(|| JukeboxError::NotFound(format!("playlist {id}")))?
            }
        };

        let mut playlist = self.playlist.lock().await;
        playlist.set_active(id, &name).await?;
        Ok(playlist.state().clone())
    }

    pub async fn sync_log(&self, limit: usize) -> Vec<SyncLogEntry> {
        self.log.lock().await.recent(limit)
    }

    pub async fn status(&self) -> JukeboxStatus {
        let identity = self.tokens.identity().await;
        let playlist = self.playlist.lock().await.state().clone();
        let (pending, approved) = {
            let requests = self.requests.lock().await;
            (
                requests.list(Some(RequestStatus::Pending)).len(),
                requests.list(Some(RequestStatus::Approved)).len(),
            )
        };

        JukeboxStatus {
            authenticated: self.tokens.is_authenticated().await,
            account: identity.map(|i| i.display_name),
            active_playlist_id: playlist.active_playlist_id,
            active_playlist_name: playlist.active_playlist_name,
            pending_requests: pending,
            approved_requests: approved,
            last_sync_at: playlist.last_sync_at,
            last_sync_status: playlist.last_sync_status,
            last_sync_error: playlist.last_sync_error,
            auto_approve: self.settings.auto_approve,
        }
    }
}
