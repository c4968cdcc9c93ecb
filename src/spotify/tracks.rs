use crate::{
    error::Result,
    spotify::client::SpotifyClient,
    types::{SearchResponse, TrackObject, UserProfile},
};

impl SpotifyClient {
    /// Fetches the authorizing account's profile.
    pub async fn me(&self) -> Result<UserProfile> {
        let value = self.get_json("/me").await?;
        Self::parse(value)
    }

    /// Searches the provider's catalog for tracks.
    ///
    /// # Arguments
    ///
    /// * `query` - Free-text search terms, encoded before transmission
    /// * `limit` - Maximum number of results (the provider caps this at 50)
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(Vec<TrackObject>)` - Matching tracks, best match first
    /// - `Err(JukeboxError)` - Auth, network or API failure
    ///
    /// # Example
    ///
    /// ```
    /// let hits = client.search_tracks("daft punk around the world", 10).await?;
    /// ```
    pub async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<TrackObject>> {
        let endpoint = format!(
            "/search?q={q}&type=track&limit={limit}",
            q = urlencoding::encode(query),
            limit = limit,
        );

        let value = self.get_json(&endpoint).await?;
        let response: SearchResponse = Self::parse(value)?;
        Ok(response
            .tracks
            .map(|page| page.items)
            .unwrap_or_default())
    }

    /// Looks up a single track by id.
    pub async fn track(&self, track_id: &str) -> Result<TrackObject> {
        let value = self.get_json(&format!("/tracks/{track_id}")).await?;
        Self::parse(value)
    }
}
