use tabled::Table;

use crate::{
    error, info,
    jukebox::Jukebox,
    success,
    types::{RequestStatus, RequestTableRow},
};

pub async fn list_requests(jukebox: &Jukebox, status: Option<String>) {
    let status = match status {
        Some(raw) => match raw.parse::<RequestStatus>() {
            Ok(parsed) => Some(parsed),
            Err(e) => error!("{}", e),
        },
        None => None,
    };

    let requests = jukebox.list_requests(status).await;

    if requests.is_empty() {
        info!("No requests yet.");
        return;
    }

    let table_rows: Vec<RequestTableRow> = requests
        .iter()
        .map(|r| RequestTableRow {
            id: r.id.clone(),
            requested: r.requested_at.format("%Y-%m-%d %H:%M").to_string(),
            title: r.title.clone(),
            artist: r.artist.clone(),
            by: r.requested_by.clone(),
            votes: r.votes,
            status: r.status.to_string(),
        })
        .collect();

    let table = Table::new(table_rows);
    println!("{}", table);
}

pub async fn approve_request(jukebox: &Jukebox, id: String) {
    match jukebox.approve_request(&id, "cli").await {
        Ok(request) => success!("Approved: {} - {}", request.artist, request.title),
        Err(e) => error!("Failed to approve request: {}", e),
    }
}

pub async fn reject_request(jukebox: &Jukebox, id: String) {
    match jukebox.reject_request(&id, "cli").await {
        Ok(request) => success!("Rejected: {} - {}", request.artist, request.title),
        Err(e) => error!("Failed to reject request: {}", e),
    }
}

pub async fn remove_request(jukebox: &Jukebox, id: String) {
    match jukebox.remove_request(&id, "cli").await {
        Ok(request) => success!("Removed: {} - {}", request.artist, request.title),
        Err(e) => error!("Failed to remove request: {}", e),
    }
}
