use std::collections::HashSet;

use serde_json::json;

use crate::{
    error::Result,
    spotify::client::SpotifyClient,
    types::{
        AddTracksRequest, PlaylistSummary, PlaylistTracksResponse, RemoveTracksRequest,
        TrackObject, TrackUri, UserPlaylistsResponse,
    },
    utils,
};

impl SpotifyClient {
    /// Retrieves every playlist owned or followed by the authorized account.
    ///
    /// Follows the provider's `next` links until the listing is exhausted,
    /// so the result is the complete set, not the first page.
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(Vec<PlaylistSummary>)` - All playlists of the current user
    /// - `Err(JukeboxError)` - Auth, network or API failure
    ///
    /// # Example
    ///
    /// ```
    /// let playlists = client.my_playlists().await?;
    /// for p in &playlists {
    ///     println!("{} ({})", p.name, p.id);
    /// }
    /// ```
    pub async fn my_playlists(&self) -> Result<Vec<PlaylistSummary>> {
        let mut playlists = Vec::new();
        let mut endpoint = "/me/playlists?limit=50".to_string();

        loop {
            let value = self.get_json(&endpoint).await?;
            let page: UserPlaylistsResponse = Self::parse(value)?;
            playlists.extend(page.items);

            match page.next {
                Some(next) => endpoint = next,
                None => break,
            }
        }

        Ok(playlists)
    }

    /// Retrieves the full track listing of a playlist.
    ///
    /// Pages through the playlist 100 tracks at a time via the provider's
    /// `next` links. Entries without a track object (removed or otherwise
    /// unavailable items) are skipped.
    ///
    /// # Arguments
    ///
    /// * `playlist_id` - Spotify ID of the playlist to read
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(Vec<TrackObject>)` - Every playable track on the playlist
    /// - `Err(JukeboxError)` - Auth, network or API failure
    pub async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<TrackObject>> {
        let mut tracks = Vec::new();
        let mut endpoint = format!("/playlists/{playlist_id}/tracks?limit=100");

        loop {
            let value = self.get_json(&endpoint).await?;
            let page: PlaylistTracksResponse = Self::parse(value)?;
            tracks.extend(page.items.into_iter().filter_map(|item| item.track));

            match page.next {
                Some(next) => endpoint = next,
                None => break,
            }
        }

        Ok(tracks)
    }

    /// Current playlist membership as a set of track ids.
    ///
    /// Local files carry no id and are ignored; reconciliation compares by
    /// id only.
    pub async fn playlist_track_ids(&self, playlist_id: &str) -> Result<HashSet<String>> {
        let tracks = self.playlist_tracks(playlist_id).await?;
        Ok(tracks.into_iter().filter_map(|track| track.id).collect())
    }

    /// Adds tracks to a playlist in one call.
    ///
    /// The provider caps a single call at 100 items; callers chunk larger
    /// sets (the sync engine does).
    ///
    /// # Arguments
    ///
    /// * `playlist_id` - Target playlist
    /// * `track_ids` - Bare track ids; converted to `spotify:track:` URIs
    pub async fn add_playlist_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<()> {
        if track_ids.is_empty() {
            return Ok(());
        }

        let body = AddTracksRequest {
            uris: track_ids.iter().map(|id| utils::track_uri(id)).collect(),
        };
        self.post_json(
            &format!("/playlists/{playlist_id}/tracks"),
            &json!(body),
        )
        .await?;
        Ok(())
    }

    /// Removes tracks from a playlist in one call, same 100-item cap as
    /// [`add_playlist_tracks`](Self::add_playlist_tracks).
    pub async fn remove_playlist_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<()> {
        if track_ids.is_empty() {
            return Ok(());
        }

        let body = RemoveTracksRequest {
            tracks: track_ids
                .iter()
                .map(|id| TrackUri {
                    uri: utils::track_uri(id),
                })
                .collect(),
        };
        self.delete_json(
            &format!("/playlists/{playlist_id}/tracks"),
            &json!(body),
        )
        .await?;
        Ok(())
    }
}
