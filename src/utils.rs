use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::TrackObject;

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Random anti-CSRF state token carried through the authorization redirect.
pub fn generate_state_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

pub fn track_uri(track_id: &str) -> String {
    format!("spotify:track:{track_id}")
}

/// Extracts the bare track id from a `spotify:track:` URI. Ids pass through
/// unchanged.
pub fn track_id_from_uri(uri: &str) -> String {
    match uri.rsplit_once(':') {
        Some((_, id)) => id.to_string(),
        None => uri.to_string(),
    }
}

pub fn primary_artist(track: &TrackObject) -> String {
    track
        .artists
        .first()
        .map(|a| a.name.clone())
        .unwrap_or_default()
}

pub fn album_art_url(track: &TrackObject) -> Option<String> {
    track
        .album
        .as_ref()
        .and_then(|album| album.images.as_ref())
        .and_then(|images| images.first())
        .map(|image| image.url.clone())
}
