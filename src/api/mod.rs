//! # API Module
//!
//! HTTP endpoints for the jukeboxd server. The module splits into the
//! guest surface (anything a phone on the party Wi-Fi may call) and the
//! admin surface (host-only, guarded by a bearer token when one is
//! configured).
//!
//! ## Endpoints
//!
//! ### Infrastructure
//!
//! - [`health`] - Health check returning application status and version.
//! - [`callback`] - OAuth 2.0 PKCE callback target. Completes the
//!   authorization flow started by `jukeboxd auth` or the admin UI.
//!
//! ### Guest
//!
//! - [`submit_request`] - Submit a song request (rate limited per device).
//! - [`list_requests`] - List requests, optionally filtered by status.
//! - [`vote`] - Upvote an existing request, one vote per guest.
//! - [`stream_requests`] - Server-sent events feed of request changes.
//! - [`search`] - Track search proxied through the provider.
//! - [`track`] - Single track lookup for pasted links.
//!
//! ### Admin
//!
//! - [`admin_status`] - Snapshot of auth, playlist and queue state.
//! - [`admin_auth_url`] / [`admin_logout`] - Token lifecycle control.
//! - [`admin_playlists`] / [`admin_select_playlist`] - Target playlist.
//! - [`admin_approve`] / [`admin_reject`] / [`admin_remove`] - Moderation.
//! - [`admin_sync`] - Force a full reconciliation run.
//! - [`admin_log`] - Recent sync/audit log entries.
//!
//! ## Architecture
//!
//! Built on the [Axum](https://docs.rs/axum) web framework. Every handler
//! receives the shared [`crate::jukebox::Jukebox`] via an extension layer
//! and returns [`crate::error::JukeboxError`] on failure, which maps
//! itself onto an HTTP status and JSON body in one place.

mod admin;
mod callback;
mod health;
mod requests;

pub use admin::{
    admin_approve, admin_auth_url, admin_log, admin_logout, admin_playlists, admin_reject,
    admin_remove, admin_select_playlist, admin_status, admin_sync,
};
pub use callback::callback;
pub use health::health;
pub use requests::{list_requests, search, stream_requests, submit_request, track, vote};
