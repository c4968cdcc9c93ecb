//! Jukeboxd Library
//!
//! This library provides the core of a self-hosted party jukebox backed by
//! Spotify. Guests submit song requests over HTTP, requests are rate limited
//! and de-duplicated, admins approve or reject them, and approved requests
//! are reconciled into a shared Spotify playlist through an OAuth-authorized
//! admin connection.
//!
//! # Modules
//!
//! - `api` - HTTP API endpoints served by the jukebox server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error taxonomy shared across the crate
//! - `jukebox` - Composition root wiring stores, token manager and sync engine
//! - `management` - Persistent state managers (tokens, requests, rate limits, logs)
//! - `server` - HTTP server for guest requests and the OAuth callback
//! - `spotify` - Spotify Web API client, PKCE flow and endpoint wrappers
//! - `sync` - Playlist reconciliation engine
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use jukeboxd::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> jukeboxd::Res<()> {
//!     config::load_env().await?;
//!     // Use CLI functions...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod jukebox;
pub mod management;
pub mod server;
pub mod spotify;
pub mod sync;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Boxed dynamic error with Send + Sync bounds, used by the CLI plumbing
/// and startup code where the precise error kind stops mattering. The core
/// contracts return [`error::JukeboxError`] instead.
///
/// # Example
///
/// ```
/// use jukeboxd::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Status output for the host's terminal: server startup lines, queue
/// summaries, sync progress. Accepts the same arguments as `println!`,
/// including format interpolation.
///
/// # Example
///
/// ```
/// info!("Serving guests on {}", addr);
/// info!("Found {} pending requests", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// Positive feedback once an operation lands: tokens stored, playlist
/// selected, reconciliation finished. Accepts the same arguments as
/// `println!`.
///
/// # Example
///
/// ```
/// success!("Authentication completed successfully");
/// success!("Playlist in sync: {} added", outcome.added);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Terminal failures only: configuration that cannot be loaded, a port
/// that cannot be bound. Library code returns `Result`s instead; this
/// macro belongs at the CLI surface where there is nothing left to unwind.
///
/// # Behavior
///
/// Exits with code 1 immediately after printing. Code after an `error!`
/// call never runs.
///
/// # Example
///
/// ```
/// error!("Failed to start the jukebox: {}", e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Recoverable trouble the host should see without the program stopping:
/// a playlist push that failed after an approval, a missing admin token.
///
/// # Example
///
/// ```
/// warning!("Cache file not found, will create new one");
/// warning!("Request {} skipped: {}", id, reason);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
