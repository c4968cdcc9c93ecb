use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crate::{error, info, jukebox::Jukebox, server, success, warning};

/// Runs the full OAuth authorization flow from the terminal.
///
/// Starts the HTTP server so the provider has a callback target, opens the
/// authorization URL in the default browser, then polls until the callback
/// installed credentials or the wait times out.
pub async fn auth(jukebox: Arc<Jukebox>) {
    if jukebox.is_authenticated().await {
        info!("Replacing the stored login; clearing the previous session first.");
        if let Err(e) = jukebox.logout().await {
            error!("Failed to clear stored credentials: {}", e);
        }
    }

    let authorization = jukebox.begin_auth().await;

    let server_jukebox = Arc::clone(&jukebox);
    tokio::spawn(async move {
        server::start_server(server_jukebox).await;
    });

    if webbrowser::open(&authorization.authorize_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            authorization.authorize_url
        )
    }

    if wait_for_login(&jukebox).await {
        success!("Authentication successful!");
    } else {
        error!("Authentication failed or timed out.");
    }
}

/// Polls for installed credentials with a two minute timeout. Runs
/// concurrently with the callback handler that installs them.
async fn wait_for_login(jukebox: &Jukebox) -> bool {
    let max_wait = Duration::from_secs(120);
    let start = Instant::now();

    while start.elapsed() < max_wait {
        if jukebox.is_authenticated().await {
            return true;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    false
}
