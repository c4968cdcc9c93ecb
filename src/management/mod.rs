mod auth;
mod playlist_state;
mod rate_limit;
mod requests;
mod sync_log;
mod tokens;

pub use auth::TokenManager;
pub use playlist_state::PlaylistStateManager;
pub use rate_limit::RateDecision;
pub use rate_limit::RateLimiter;
pub use requests::RequestManager;
pub use sync_log::SyncLogManager;
pub use tokens::TokenVault;
