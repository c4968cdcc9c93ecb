//! Error taxonomy shared across the jukebox core.
//!
//! Library code returns these typed errors and lets callers decide; the CLI
//! layer translates them into colored terminal output and the HTTP layer
//! into status codes via the `IntoResponse` implementation below.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors produced by the token lifecycle, the Spotify client, the sync
/// engine and the request stores.
#[derive(Debug, Error)]
pub enum JukeboxError {
    /// No usable credential and no way to refresh one. The admin must run
    /// the authorization flow again. Carries a short reason for logs.
    #[error("authorization required: {0}")]
    AuthRequired(String),

    /// The OAuth callback was rejected: state mismatch, missing attempt,
    /// or a provider-reported authorization error. Never retried.
    #[error("authorization callback failed: {0}")]
    AuthCallback(String),

    /// Non-2xx, non-401, non-429 answer from the provider.
    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    /// HTTP 429 from the provider, with its Retry-After value in seconds.
    /// Propagated to the caller, never silently retried.
    #[error("provider rate limit hit, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    /// No response from the provider after the bounded retry loop.
    #[error("network failure after {attempts} attempts")]
    Network {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    /// A song request for a track that is already in the queue.
    #[error("track {track_id} has already been requested")]
    DuplicateRequest { track_id: String },

    /// The guest rate limiter denied the submission.
    #[error("too many requests from this device, retry after {retry_after}s")]
    GuestRateLimited { retry_after: u64 },

    /// Sync or playlist mutation requested while no playlist is selected.
    #[error("no active playlist configured")]
    NoActivePlaylist,

    /// The provider answered 2xx but the payload did not parse into the
    /// expected shape.
    #[error("unexpected provider response: {0}")]
    InvalidResponse(String),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    /// A caller-supplied value failed validation before any side effect.
    #[error("invalid input: {0}")]
    Validation(String),

    /// An admin endpoint was called without (or with a wrong) admin token.
    #[error("admin token required")]
    AdminRequired,
}

impl IntoResponse for JukeboxError {
    fn into_response(self) -> Response {
        let retry_after = match &self {
            JukeboxError::RateLimited { retry_after }
            | JukeboxError::GuestRateLimited { retry_after } => Some(*retry_after),
            _ => None,
        };

        let (status, message) = match &self {
            JukeboxError::AuthRequired(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            JukeboxError::AuthCallback(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            JukeboxError::Api { .. } => (StatusCode::BAD_GATEWAY, self.to_string()),
            JukeboxError::RateLimited { .. } => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            JukeboxError::Network { .. } => (StatusCode::BAD_GATEWAY, self.to_string()),
            JukeboxError::DuplicateRequest { .. } => (StatusCode::CONFLICT, self.to_string()),
            JukeboxError::GuestRateLimited { .. } => {
                (StatusCode::TOO_MANY_REQUESTS, self.to_string())
            }
            JukeboxError::NoActivePlaylist => (StatusCode::CONFLICT, self.to_string()),
            JukeboxError::InvalidResponse(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            JukeboxError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            JukeboxError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            JukeboxError::AdminRequired => (StatusCode::UNAUTHORIZED, self.to_string()),
            JukeboxError::Storage(_) | JukeboxError::Serde(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            ),
        };

        let body = Json(json!({ "error": message }));
        let mut response = (status, body).into_response();

        if let Some(secs) = retry_after {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

/// Result alias for the jukebox core.
pub type Result<T> = std::result::Result<T, JukeboxError>;
