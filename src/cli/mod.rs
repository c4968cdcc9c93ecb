//! # CLI Module
//!
//! This module provides the command-line interface layer for jukeboxd, a
//! self-hosted party jukebox backed by the Spotify API. It implements all
//! user-facing CLI commands and coordinates between the HTTP server, the
//! request queue, playlist sync, and the authorization flow.
//!
//! ## Overview
//!
//! The CLI module is the host's interface to the jukebox. It provides a
//! set of commands for:
//!
//! - **Authentication Management**: OAuth 2.0 PKCE flow for Spotify API access
//! - **Serving Guests**: Running the HTTP server that phones connect to
//! - **Queue Moderation**: Listing, approving, rejecting and removing requests
//! - **Playlist Control**: Choosing the playlist that approvals land on
//! - **Reconciliation**: Forcing a sync run between queue and playlist
//! - **Information Queries**: Status summary and the sync audit log
//!
//! ## Command Categories
//!
//! ### Authentication
//!
//! - [`auth`] - Initiates the Spotify OAuth authentication flow with PKCE
//!
//! ### Serving
//!
//! - [`serve`] - Starts the guest-facing HTTP server
//!
//! ### Queue Operations
//!
//! - [`list_requests`] - Displays the request queue with optional status filter
//! - [`approve_request`] / [`reject_request`] / [`remove_request`] - Moderation
//!
//! ### Playlist Operations
//!
//! - [`playlists`] - Lists account playlists or selects the active one
//! - [`sync`] - Reconciles the playlist with the approved queue
//!
//! ### Information Commands
//!
//! - [`info`] - Status summary: auth, playlist, queue counts, last sync
//! - [`log`] - Recent entries from the sync audit log
//!
//! ## Architecture Design
//!
//! The CLI follows the same layering as the HTTP API:
//!
//! ```text
//! CLI Layer (User Interface)
//!     ↓
//! Jukebox (Policy / Composition)
//!     ↓
//! Management + Sync Layer (Persistence, Reconciliation)
//!     ↓
//! Spotify Client (HTTP, Tokens)
//! ```
//!
//! Each command builds the shared [`crate::jukebox::Jukebox`] once and
//! delegates to it, keeping user interaction, progress feedback and error
//! presentation here.
//!
//! ## Error Handling Philosophy
//!
//! - **Graceful Degradation**: A playlist hiccup never loses a request
//! - **Helpful Messages**: Clear guidance on how to resolve issues
//! - **Terminal Errors**: Unrecoverable failures exit with a red message
//!
//! ## Usage Patterns
//!
//! ### Initial Setup
//! ```bash
//! jukeboxd auth                    # Authenticate with Spotify
//! jukeboxd playlists               # See account playlists
//! jukeboxd playlists --use <ID>    # Pick the party playlist
//! jukeboxd serve                   # Open the doors
//! ```
//!
//! ### During the Party
//! ```bash
//! jukeboxd requests                # See what guests asked for
//! jukeboxd requests approve <ID>   # Put a request on the playlist
//! jukeboxd sync                    # Force a reconciliation run
//! jukeboxd info                    # Quick status check
//! ```

mod auth;
mod info;
mod playlists;
mod requests;
mod serve;
mod sync;

pub use auth::auth;
pub use info::{info, log};
pub use playlists::playlists;
pub use requests::{approve_request, list_requests, reject_request, remove_request};
pub use serve::serve;
pub use sync::sync;
