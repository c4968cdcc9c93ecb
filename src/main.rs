use std::sync::Arc;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use jukeboxd::{cli, config, error, jukebox::Jukebox};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Run the guest-facing jukebox server
    Serve,

    /// Reconcile the playlist with approved requests
    Sync,

    /// Handle guest requests
    Requests(RequestsOptions),

    /// Handle account playlists and the active selection
    Playlists(PlaylistsOptions),

    /// Show jukebox status
    Info,

    /// Show recent sync log entries
    Log(LogOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
#[command(
    about = "Handle guest requests",
    args_conflicts_with_subcommands = true // disallow mixing --status with subcommands
)]
pub struct RequestsOptions {
    /// Filter by status (pending, approved, rejected)
    #[clap(long)]
    pub status: Option<String>,

    /// Subcommands under `requests` (e.g., `approve`)
    #[command(subcommand)]
    pub command: Option<RequestsSubcommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RequestsSubcommand {
    /// Approve a request and add its track to the playlist
    Approve(RequestIdOpts),

    /// Reject a request and pull its track off the playlist
    Reject(RequestIdOpts),

    /// Delete a request entirely
    Remove(RequestIdOpts),
}

#[derive(Parser, Debug, Clone)]
pub struct RequestIdOpts {
    /// Request id as shown by `jukeboxd requests`
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistsOptions {
    /// Select the playlist approvals should land on
    #[clap(long = "use")]
    pub use_id: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct LogOptions {
    /// Number of entries to show
    #[clap(long)]
    pub limit: Option<usize>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    // Completions must work without provider configuration.
    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command_for_update();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    let jukebox = match Jukebox::open(config::provider(), config::service()).await {
        Ok(jukebox) => Arc::new(jukebox),
        Err(e) => error!("Failed to open jukebox state: {}", e),
    };

    match cli.command {
        Command::Auth => cli::auth(Arc::clone(&jukebox)).await,
        Command::Serve => cli::serve(Arc::clone(&jukebox)).await,
        Command::Sync => cli::sync(&jukebox).await,
        Command::Requests(opt) => match opt.command {
            Some(RequestsSubcommand::Approve(o)) => cli::approve_request(&jukebox, o.id).await,
            Some(RequestsSubcommand::Reject(o)) => cli::reject_request(&jukebox, o.id).await,
            Some(RequestsSubcommand::Remove(o)) => cli::remove_request(&jukebox, o.id).await,
            None => cli::list_requests(&jukebox, opt.status).await,
        },
        Command::Playlists(opt) => cli::playlists(&jukebox, opt.use_id).await,
        Command::Info => cli::info(&jukebox).await,
        Command::Log(opt) => cli::log(&jukebox, opt.limit).await,
        Command::Completions(_) => {}
    }
}
