//! Configuration management for the jukebox.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files, and assembles them into the
//! fixed-shape [`ProviderConfig`] and [`ServiceConfig`] records that get
//! injected into the components that need them. Components never read the
//! environment themselves; all ambient lookup happens here.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use dotenv;
use std::{env, path::PathBuf};

/// Everything needed to talk to the OAuth provider and its Web API.
///
/// Built once from the environment via [`provider`] and handed to the token
/// manager, the auth flow and the API client. Tests construct it directly
/// and point the URLs at a local mock server.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub client_id: String,
    /// Confidential secret, sent only with refresh-token exchanges. PKCE
    /// keeps the authorization-code exchange secret-free, so deployments
    /// without a secret still work.
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
}

/// Local service settings: where state lives, how the server binds and how
/// guest submissions are throttled and moderated.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub server_addr: String,
    pub data_dir: PathBuf,
    /// When set, submitted requests are approved and pushed to the playlist
    /// immediately instead of waiting for admin review.
    pub auto_approve: bool,
    /// Bearer token guarding the admin endpoints. `None` leaves them open,
    /// which is only sensible on a trusted network.
    pub admin_token: Option<String>,
    pub request_limit: u32,
    pub request_window_secs: i64,
}

/// Assembles a [`ProviderConfig`] from the environment.
///
/// # Panics
///
/// Panics if a required variable (client id, redirect URI) is not set.
pub fn provider() -> ProviderConfig {
    ProviderConfig {
        client_id: spotify_client_id(),
        client_secret: spotify_client_secret(),
        redirect_uri: spotify_redirect_uri(),
        scope: spotify_scope(),
        auth_url: spotify_apiauth_url(),
        token_url: spotify_apitoken_url(),
        api_url: spotify_apiurl(),
    }
}

/// Assembles a [`ServiceConfig`] from the environment.
pub fn service() -> ServiceConfig {
    ServiceConfig {
        server_addr: server_addr(),
        data_dir: data_dir(),
        auto_approve: auto_approve(),
        admin_token: admin_token(),
        request_limit: request_limit(),
        request_window_secs: request_window_secs(),
    }
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from a `.env` file located in the platform-specific
/// local data directory under `jukeboxd/.env`. This allows users to store
/// configuration securely without hardcoding sensitive values.
///
/// A missing `.env` file is not an error; in that case configuration must
/// come entirely from the process environment.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/jukeboxd/.env`
/// - macOS: `~/Library/Application Support/jukeboxd/.env`
/// - Windows: `%LOCALAPPDATA%/jukeboxd/.env`
///
/// # Returns
///
/// Returns `Ok(())` if the environment is usable, or an error string if the
/// directory structure cannot be created.
///
/// # Example
///
/// ```
/// use jukeboxd::config;
///
/// #[tokio::main]
/// async fn main() {
///     if let Err(e) = config::load_env().await {
///         eprintln!("Configuration error: {}", e);
///     }
/// }
/// ```
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("jukeboxd/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    let _ = dotenv::from_path(path);
    Ok(())
}

/// Returns the address the jukebox HTTP server binds to.
///
/// Retrieves the `SERVER_ADDRESS` environment variable, falling back to
/// `0.0.0.0:8080`. The server handles guest requests, admin operations and
/// the OAuth callback, so the address must be reachable from the redirect
/// URI registered with the provider.
///
/// # Example
///
/// ```
/// let addr = server_addr(); // e.g., "0.0.0.0:8080"
/// ```
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
}

/// Returns the directory where the jukebox persists its state.
///
/// Retrieves the `JUKEBOX_DATA_DIR` environment variable, falling back to
/// `jukeboxd/` under the platform-specific local data directory. Requests,
/// rate-limit records, the sync log, playlist state and the token vault all
/// live below this directory.
pub fn data_dir() -> PathBuf {
    match env::var("JUKEBOX_DATA_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
            path.push("jukeboxd");
            path
        }
    }
}

/// Returns whether submitted requests are approved without admin review.
///
/// Retrieves the `JUKEBOX_AUTO_APPROVE` environment variable; `1`, `true`
/// and `yes` (case-insensitive) enable it. Defaults to manual moderation.
pub fn auto_approve() -> bool {
    env::var("JUKEBOX_AUTO_APPROVE")
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Returns the bearer token protecting the admin endpoints, if configured.
///
/// Retrieves the `JUKEBOX_ADMIN_TOKEN` environment variable. When unset the
/// admin endpoints accept any caller.
pub fn admin_token() -> Option<String> {
    env::var("JUKEBOX_ADMIN_TOKEN").ok().filter(|t| !t.is_empty())
}

/// Returns how many song requests a device may submit per window.
///
/// Retrieves the `JUKEBOX_REQUEST_LIMIT` environment variable, defaulting
/// to 20 requests per window.
pub fn request_limit() -> u32 {
    env::var("JUKEBOX_REQUEST_LIMIT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(20)
}

/// Returns the rate-limit window length in seconds.
///
/// Retrieves the `JUKEBOX_REQUEST_WINDOW_SECS` environment variable,
/// defaulting to one hour.
pub fn request_window_secs() -> i64 {
    env::var("JUKEBOX_REQUEST_WINDOW_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3600)
}

/// Returns the Spotify API client ID for authentication.
///
/// Retrieves the `SPOTIFY_API_AUTH_CLIENT_ID` environment variable which
/// contains the client ID obtained when registering the application with
/// Spotify's developer platform.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_AUTH_CLIENT_ID` environment variable is not set.
///
/// # Example
///
/// ```
/// let client_id = spotify_client_id(); // e.g., "abc123..."
/// ```
pub fn spotify_client_id() -> String {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID").expect("SPOTIFY_API_AUTH_CLIENT_ID must be set")
}

/// Returns the Spotify API client secret, if configured.
///
/// Retrieves the `SPOTIFY_API_AUTH_CLIENT_SECRET` environment variable. The
/// secret is only used for refresh-token exchanges; the PKCE authorization
/// flow works without it, so this is optional.
///
/// # Security Note
///
/// The client secret should be kept confidential and never exposed in logs
/// or version control.
pub fn spotify_client_secret() -> Option<String> {
    env::var("SPOTIFY_API_AUTH_CLIENT_SECRET")
        .ok()
        .filter(|s| !s.is_empty())
}

/// Returns the Spotify OAuth redirect URI.
///
/// Retrieves the `SPOTIFY_API_REDIRECT_URI` environment variable which specifies
/// the callback URL that Spotify should redirect to after user authorization.
/// This must match the redirect URI registered in the Spotify application
/// settings, and providers require a publicly reachable HTTPS URL here;
/// loopback addresses are rejected at registration time.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_REDIRECT_URI` environment variable is not set.
///
/// # Example
///
/// ```
/// let redirect_uri = spotify_redirect_uri(); // e.g., "https://jukebox.example.com/callback"
/// ```
pub fn spotify_redirect_uri() -> String {
    env::var("SPOTIFY_API_REDIRECT_URI").expect("SPOTIFY_API_REDIRECT_URI must be set")
}

/// Returns the Spotify API scope permissions.
///
/// Retrieves the `SPOTIFY_API_AUTH_SCOPE` environment variable which defines
/// the scope of permissions requested during OAuth authentication. Defaults
/// to the playlist and profile scopes the jukebox needs.
///
/// # Example
///
/// ```
/// let scope = spotify_scope(); // e.g., "playlist-modify-public user-read-private"
/// ```
pub fn spotify_scope() -> String {
    env::var("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|_| {
        "playlist-read-private playlist-modify-public playlist-modify-private user-read-private user-read-email"
            .to_string()
    })
}

/// Returns the Spotify OAuth authorization URL.
///
/// Retrieves the `SPOTIFY_API_AUTH_URL` environment variable which contains
/// the base URL for Spotify's OAuth authorization endpoint. This is where
/// users are redirected to grant permissions to the application.
///
/// # Example
///
/// ```
/// let auth_url = spotify_apiauth_url(); // e.g., "https://accounts.spotify.com/authorize"
/// ```
pub fn spotify_apiauth_url() -> String {
    env::var("SPOTIFY_API_AUTH_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/authorize".to_string())
}

/// Returns the Spotify Web API base URL.
///
/// Retrieves the `SPOTIFY_API_URL` environment variable which contains the
/// base URL for Spotify's Web API endpoints. This is used for all API
/// operations after authentication.
///
/// # Example
///
/// ```
/// let api_url = spotify_apiurl(); // e.g., "https://api.spotify.com/v1"
/// ```
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").unwrap_or_else(|_| "https://api.spotify.com/v1".to_string())
}

/// Returns the Spotify OAuth token exchange URL.
///
/// Retrieves the `SPOTIFY_API_TOKEN_URL` environment variable which contains
/// the URL for exchanging authorization codes and refresh tokens for access
/// tokens during the OAuth flow.
///
/// # Example
///
/// ```
/// let token_url = spotify_apitoken_url(); // e.g., "https://accounts.spotify.com/api/token"
/// ```
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/api/token".to_string())
}
