//! # Spotify Integration Module
//!
//! This module provides the complete interface between the jukebox and the
//! Spotify Web API: the OAuth 2.0 PKCE authorization flow, the authenticated
//! request client with its retry/refresh behavior, and typed wrappers for
//! the handful of endpoints the jukebox consumes.
//!
//! ## Overview
//!
//! Everything network-facing lives here. Higher layers (the sync engine,
//! the HTTP handlers, the CLI) never see raw HTTP; they call typed methods
//! and receive domain types or errors from the crate's taxonomy.
//!
//! ## Architecture
//!
//! ```text
//! Application Layer (server, sync engine, CLI)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authorization (OAuth 2.0 PKCE, anti-CSRF state)
//!     ├── Request Client (401 refresh-retry, 429 signaling, backoff)
//!     ├── Playlist Operations (membership, batched add/remove)
//!     └── Track Operations (search, lookup, profile)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Core Modules
//!
//! ### Authorization Module
//!
//! [`auth`] - Implements OAuth 2.0 PKCE (Proof Key for Code Exchange):
//! - **Authorization URL**: Builds the browser redirect with code challenge,
//!   scopes and a random anti-CSRF state token
//! - **Attempt Tracking**: Every attempt is single-use and expires after
//!   ten minutes; a callback must present a matching state or it is rejected
//! - **Code Exchange**: Trades the authorization code plus verifier for the
//!   initial token pair
//! - **Identity**: Fetches and caches the authorizing account's profile
//!
//! ### Request Client Module
//!
//! [`client`] - Executes authenticated REST calls:
//! - **Token Handling**: Every call obtains a token from the manager first;
//!   a 401 answer triggers one forced refresh and a retry of the same
//!   request, bounded by a fixed ceiling
//! - **Rate Limits**: 429 answers surface as errors carrying the provider's
//!   `Retry-After`; this layer never waits out a rate limit on its own
//! - **Network Resilience**: Transport failures retry with linear backoff
//!   before giving up
//!
//! ### Playlist and Track Modules
//!
//! [`playlist`] / [`tracks`] - Typed endpoint wrappers: current user's
//! playlists, playlist track membership with pagination, batched track
//! add/remove, track search and lookup, account profile.
//!
//! ## Error Types
//!
//! All functions return [`crate::error::JukeboxError`] variants; see the
//! crate-level taxonomy for the mapping of HTTP answers to error kinds.
//!
//! ## Thread Safety
//!
//! The client and flow are designed to be shared behind `Arc`: all interior
//! state funnels through the token manager, which serializes refreshes.

pub mod auth;
pub mod client;
pub mod playlist;
pub mod tracks;
