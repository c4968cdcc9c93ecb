use jukeboxd::types::{AlbumInfo, ImageObject, TrackArtist, TrackObject};
use jukeboxd::utils::*;

// Helper function to create a test track
fn create_test_track(id: &str, artists: Vec<&str>, album_art: Option<&str>) -> TrackObject {
    TrackObject {
        id: Some(id.to_string()),
        name: format!("Track {id}"),
        uri: format!("spotify:track:{id}"),
        artists: artists
            .into_iter()
            .map(|name| TrackArtist {
                id: None,
                name: name.to_string(),
            })
            .collect(),
        album: album_art.map(|url| AlbumInfo {
            name: Some("Album".to_string()),
            images: Some(vec![ImageObject {
                url: url.to_string(),
            }]),
        }),
    }
}

#[test]
fn test_generate_code_verifier() {
    let verifier = generate_code_verifier();

    // Should be exactly 128 characters
    assert_eq!(verifier.len(), 128);

    // Should contain only alphanumeric characters
    assert!(verifier.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated verifiers should be different
    let verifier2 = generate_code_verifier();
    assert_ne!(verifier, verifier2);
}

#[test]
fn test_generate_code_challenge() {
    let verifier = "test_verifier_123";
    let challenge = generate_code_challenge(verifier);

    // Should not be empty
    assert!(!challenge.is_empty());

    // Should be deterministic - same input produces same output
    let challenge2 = generate_code_challenge(verifier);
    assert_eq!(challenge, challenge2);

    // Different input should produce different output
    let challenge3 = generate_code_challenge("different_verifier");
    assert_ne!(challenge, challenge3);

    // Should be base64-encoded (URL-safe, no padding)
    assert!(
        challenge
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    );
}

#[test]
fn test_generate_code_challenge_known_vector() {
    // S256 example from RFC 7636 appendix B
    let challenge = generate_code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk");
    assert_eq!(challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
}

#[test]
fn test_generate_state_token() {
    let state = generate_state_token();

    // Should be exactly 32 characters
    assert_eq!(state.len(), 32);

    // Should contain only alphanumeric characters
    assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated tokens should be different
    let state2 = generate_state_token();
    assert_ne!(state, state2);
}

#[test]
fn test_track_uri_round_trip() {
    let uri = track_uri("4uLU6hMCjMI75M1A2tKUQC");
    assert_eq!(uri, "spotify:track:4uLU6hMCjMI75M1A2tKUQC");
    assert_eq!(track_id_from_uri(&uri), "4uLU6hMCjMI75M1A2tKUQC");
}

#[test]
fn test_track_id_from_uri_passthrough() {
    // A bare id has no colon and passes through unchanged
    assert_eq!(track_id_from_uri("4uLU6hMCjMI75M1A2tKUQC"), "4uLU6hMCjMI75M1A2tKUQC");
}

#[test]
fn test_primary_artist() {
    let track = create_test_track("t1", vec!["First Artist", "Second Artist"], None);
    assert_eq!(primary_artist(&track), "First Artist");

    // No artists at all should not panic
    let anonymous = create_test_track("t2", vec![], None);
    assert_eq!(primary_artist(&anonymous), "");
}

#[test]
fn test_album_art_url() {
    let track = create_test_track("t1", vec!["Artist"], Some("https://img.example/cover.png"));
    assert_eq!(
        album_art_url(&track),
        Some("https://img.example/cover.png".to_string())
    );

    // Missing album means no artwork
    let bare = create_test_track("t2", vec!["Artist"], None);
    assert_eq!(album_art_url(&bare), None);
}
