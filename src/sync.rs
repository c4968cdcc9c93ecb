//! Playlist reconciliation.
//!
//! The engine compares the approved request set against the live playlist
//! membership and applies the difference, batched at the provider's
//! per-call limit, with per-item fallback so one bad track cannot sink the
//! rest of a run. Every mutation lands in the append-only sync log.

use std::{collections::HashSet, sync::Arc};

use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    error::{JukeboxError, Result},
    management::{PlaylistStateManager, RequestManager, SyncLogManager},
    spotify::client::SpotifyClient,
    types::{SyncAction, SyncLogEntry, SyncOutcome, SyncStatus},
    warning,
};

/// Provider cap on items per playlist mutation call.
const MAX_TRACKS_PER_CALL: usize = 100;

#[derive(Debug, Clone, Copy)]
enum Mutation {
    Add,
    Remove,
}

impl Mutation {
    fn action(self) -> SyncAction {
        match self {
            Mutation::Add => SyncAction::Add,
            Mutation::Remove => SyncAction::Remove,
        }
    }
}

/// Reconciles approved requests into the active playlist.
///
/// Runs are serialized behind an in-process gate: two overlapping `sync_now`
/// calls, or a sync racing an immediate add, never interleave their
/// mutations. Membership comparison is by track id only, so re-running a
/// sync against unchanged state performs zero mutations.
pub struct SyncEngine {
    spotify: Arc<SpotifyClient>,
    requests: Arc<Mutex<RequestManager>>,
    playlist: Arc<Mutex<PlaylistStateManager>>,
    log: Arc<Mutex<SyncLogManager>>,
    gate: Mutex<()>,
}

impl SyncEngine {
    pub fn new(
        spotify: Arc<SpotifyClient>,
        requests: Arc<Mutex<RequestManager>>,
        playlist: Arc<Mutex<PlaylistStateManager>>,
        log: Arc<Mutex<SyncLogManager>>,
    ) -> Self {
        SyncEngine {
            spotify,
            requests,
            playlist,
            log,
            gate: Mutex::new(()),
        }
    }

    /// Runs one full reconciliation.
    ///
    /// Fetches the approved track ids and the live playlist membership,
    /// computes the set difference both ways, then applies additions and
    /// removals in chunks. A failing chunk degrades to per-item calls so
    /// the healthy items still land; failures are logged and counted, never
    /// rolled back. The playlist record's last-sync fields are written at
    /// the end whatever happened.
    pub async fn sync_now(&self, actor: &str) -> Result<SyncOutcome> {
        let _gate = self.gate.lock().await;

        let playlist_id = self
            .playlist
            .lock()
            .await
            .active_playlist_id()
            .ok_or(JukeboxError::NoActivePlaylist)?;

        let approved: HashSet<String> = self.requests.lock().await.approved_track_ids();
        let live = match self.spotify.playlist_track_ids(&playlist_id).await {
            Ok(ids) => ids,
            Err(e) => {
                self.append_entries(vec![self.entry(
                    SyncAction::Sync,
                    SyncStatus::Failed,
                    "could not read playlist membership".to_string(),
                    0,
                    Some(e.to_string()),
                    actor,
                )])
                .await;
                self.record_sync_state(SyncStatus::Failed, Some(e.to_string()))
                    .await;
                return Err(e);
            }
        };

        let additions: Vec<String> = approved.difference(&live).cloned().collect();
        let removals: Vec<String> = live.difference(&approved).cloned().collect();

        let mut outcome = SyncOutcome::default();
        self.apply(&playlist_id, &additions, Mutation::Add, actor, &mut outcome)
            .await;
        self.apply(&playlist_id, &removals, Mutation::Remove, actor, &mut outcome)
            .await;

        let status = if outcome.failed == 0 {
            SyncStatus::Success
        } else {
            SyncStatus::Failed
        };
        let error = (outcome.failed > 0).then(|| format!("{} track mutations failed", outcome.failed));

        self.append_entries(vec![self.entry(
            SyncAction::Sync,
            status,
            format!(
                "{} added, {} removed, {} failed",
                outcome.added, outcome.removed, outcome.failed
            ),
            outcome.added + outcome.removed,
            error.clone(),
            actor,
        )])
        .await;
        self.record_sync_state(status, error).await;

        Ok(outcome)
    }

    /// Adds one track to the active playlist right away.
    ///
    /// Membership is checked first: a track already on the playlist is a
    /// no-op and the call reports `false` without touching the provider.
    pub async fn add_track(&self, track_id: &str, actor: &str) -> Result<bool> {
        let _gate = self.gate.lock().await;

        let playlist_id = self
            .playlist
            .lock()
            .await
            .active_playlist_id()
            .ok_or(JukeboxError::NoActivePlaylist)?;

        let live = self.spotify.playlist_track_ids(&playlist_id).await?;
        if live.contains(track_id) {
            return Ok(false);
        }

        match self
            .spotify
            .add_playlist_tracks(&playlist_id, &[track_id.to_string()])
            .await
        {
            Ok(()) => {
                self.append_entries(vec![self.entry(
                    SyncAction::Add,
                    SyncStatus::Success,
                    format!("track {track_id}"),
                    1,
                    None,
                    actor,
                )])
                .await;
                Ok(true)
            }
            Err(e) => {
                self.append_entries(vec![self.entry(
                    SyncAction::Add,
                    SyncStatus::Failed,
                    format!("track {track_id}"),
                    0,
                    Some(e.to_string()),
                    actor,
                )])
                .await;
                Err(e)
            }
        }
    }

    /// Removes one track from the active playlist right away.
    ///
    /// The mirror of [`add_track`](Self::add_track): removing a track that
    /// is not on the playlist reports `false` and performs no call.
    pub async fn remove_track(&self, track_id: &str, actor: &str) -> Result<bool> {
        let _gate = self.gate.lock().await;

        let playlist_id = self
            .playlist
            .lock()
            .await
            .active_playlist_id()
            .ok_or(JukeboxError::NoActivePlaylist)?;

        let live = self.spotify.playlist_track_ids(&playlist_id).await?;
        if !live.contains(track_id) {
            return Ok(false);
        }

        match self
            .spotify
            .remove_playlist_tracks(&playlist_id, &[track_id.to_string()])
            .await
        {
            Ok(()) => {
                self.append_entries(vec![self.entry(
                    SyncAction::Remove,
                    SyncStatus::Success,
                    format!("track {track_id}"),
                    1,
                    None,
                    actor,
                )])
                .await;
                Ok(true)
            }
            Err(e) => {
                self.append_entries(vec![self.entry(
                    SyncAction::Remove,
                    SyncStatus::Failed,
                    format!("track {track_id}"),
                    0,
                    Some(e.to_string()),
                    actor,
                )])
                .await;
                Err(e)
            }
        }
    }

    /// Applies one direction of the reconciliation in provider-sized
    /// chunks.
    ///
    /// A chunk that fails as a whole is retried item by item; only the
    /// items that fail alone count as failures.
    async fn apply(
        &self,
        playlist_id: &str,
        track_ids: &[String],
        mutation: Mutation,
        actor: &str,
        outcome: &mut SyncOutcome,
    ) {
        for chunk in track_ids.chunks(MAX_TRACKS_PER_CALL) {
            match self.mutate(playlist_id, mutation, chunk).await {
                Ok(()) => {
                    let entries = chunk
                        .iter()
                        .map(|id| {
                            self.entry(
                                mutation.action(),
                                SyncStatus::Success,
                                format!("track {id}"),
                                1,
                                None,
                                actor,
                            )
                        })
                        .collect();
                    self.append_entries(entries).await;
                    self.count(mutation, chunk.len() as u32, outcome);
                }
                Err(chunk_error) => {
                    warning!(
                        "Batch of {} tracks failed ({}), retrying items individually",
                        chunk.len(),
                        chunk_error
                    );

                    let mut entries = Vec::with_capacity(chunk.len());
                    for id in chunk {
                        match self
                            .mutate(playlist_id, mutation, std::slice::from_ref(id))
                            .await
                        {
                            Ok(()) => {
                                entries.push(self.entry(
                                    mutation.action(),
                                    SyncStatus::Success,
                                    format!("track {id}"),
                                    1,
                                    None,
                                    actor,
                                ));
                                self.count(mutation, 1, outcome);
                            }
                            Err(e) => {
                                entries.push(self.entry(
                                    mutation.action(),
                                    SyncStatus::Failed,
                                    format!("track {id}"),
                                    0,
                                    Some(e.to_string()),
                                    actor,
                                ));
                                outcome.failed += 1;
                            }
                        }
                    }
                    self.append_entries(entries).await;
                }
            }
        }
    }

    async fn mutate(&self, playlist_id: &str, mutation: Mutation, chunk: &[String]) -> Result<()> {
        match mutation {
            Mutation::Add => self.spotify.add_playlist_tracks(playlist_id, chunk).await,
            Mutation::Remove => self.spotify.remove_playlist_tracks(playlist_id, chunk).await,
        }
    }

    fn count(&self, mutation: Mutation, n: u32, outcome: &mut SyncOutcome) {
        match mutation {
            Mutation::Add => outcome.added += n,
            Mutation::Remove => outcome.removed += n,
        }
    }

    fn entry(
        &self,
        action: SyncAction,
        status: SyncStatus,
        details: String,
        affected_count: u32,
        error: Option<String>,
        actor: &str,
    ) -> SyncLogEntry {
        SyncLogEntry {
            timestamp: Utc::now(),
            action,
            status,
            details,
            affected_count,
            error,
            actor: actor.to_string(),
        }
    }

    async fn append_entries(&self, entries: Vec<SyncLogEntry>) {
        if let Err(e) = self.log.lock().await.append_all(entries).await {
            warning!("Failed to write sync log entries: {}", e);
        }
    }

    async fn record_sync_state(&self, status: SyncStatus, error: Option<String>) {
        if let Err(e) = self.playlist.lock().await.record_sync(status, error).await {
            warning!("Failed to record sync outcome: {}", e);
        }
    }
}
