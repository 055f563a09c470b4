//! End-to-end tests for the prompt-driven flows
//!
//! Drives the curator against in-memory collaborators: feature ranking,
//! recommendation blending, text-model selection and publishing.

mod common;

use common::{
    curator_with_fixture_catalog, curator_with_settings, fixture_catalog, fixture_tracks,
    make_track, BatchRecordingFeatures, FailingProvider, RecordingRecommender, RecordingSelector,
    BLUE_TRACK_IDS, PULSE_TRACK_IDS, STILL_TRACK_IDS,
};
use pezzottify_curator::curation::models::Feature;
use pezzottify_curator::curation::{
    CurationError, CurationSettings, Curator, ErrorKind, InputError, SelectionOrigin,
};
use pezzottify_curator::providers::InMemoryPlaylistStore;
use std::collections::HashSet;
use std::sync::Arc;

// =============================================================================
// Feature ranking
// =============================================================================

#[tokio::test]
async fn test_calm_prompt_picks_the_calm_tracks() {
    let curator = curator_with_fixture_catalog();
    let tracks = fixture_tracks();

    let selection = curator
        .curate_by_features(&tracks, "calm acoustic songs for sleep", 4)
        .await
        .unwrap();

    assert_eq!(selection.origin, SelectionOrigin::Curated);
    let ids: Vec<&str> = selection.tracks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, STILL_TRACK_IDS.to_vec());
}

#[tokio::test]
async fn test_feature_ranking_respects_limit_and_skips_missing_features() {
    let curator = curator_with_fixture_catalog();
    let mut tracks = fixture_tracks();
    tracks.push(make_track("unknown-1", "artist-x", "X", 10));

    let selection = curator
        .curate_by_features(&tracks, "energetic party", 50)
        .await
        .unwrap();

    assert_eq!(selection.tracks.len(), 12);
    assert!(selection.tracks.iter().all(|t| t.id != "unknown-1"));
    // Most energetic act ranks first for a party prompt
    assert!(PULSE_TRACK_IDS.contains(&selection.tracks[0].id.as_str()));
}

#[tokio::test]
async fn test_feature_provider_failure_falls_back_to_random_sample() {
    let failing = Arc::new(FailingProvider);
    let curator = Curator::new(CurationSettings::default(), failing.clone(), failing);
    let tracks = fixture_tracks();

    let selection = curator
        .curate_by_features(&tracks, "calm", 4)
        .await
        .unwrap();

    assert_eq!(selection.origin, SelectionOrigin::Fallback);
    assert_eq!(selection.tracks.len(), 3);
    let source_ids: HashSet<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
    assert!(selection
        .tracks
        .iter()
        .all(|t| source_ids.contains(t.id.as_str())));
}

#[tokio::test]
async fn test_feature_lookups_are_batched() {
    let mut settings = CurationSettings::default();
    settings.feature_batch_size = 5;
    let features = Arc::new(BatchRecordingFeatures::new(fixture_catalog()));
    let curator = Curator::new(settings, features.clone(), Arc::new(fixture_catalog()));

    curator
        .curate_by_features(&fixture_tracks(), "chill", 10)
        .await
        .unwrap();

    assert_eq!(features.batches(), vec![5, 5, 2]);
}

#[tokio::test]
async fn test_prompt_flows_reject_empty_source_and_blank_prompt() {
    let curator = curator_with_fixture_catalog();

    let err = curator.curate_by_features(&[], "calm", 5).await.unwrap_err();
    assert!(matches!(err, CurationError::Input(InputError::EmptySource)));

    let err = curator
        .curate_by_features(&fixture_tracks(), "", 5)
        .await
        .unwrap_err();
    assert!(matches!(err, CurationError::Input(InputError::MissingPrompt)));
    assert_eq!(err.kind(), ErrorKind::Input);
}

// =============================================================================
// Recommendation blending
// =============================================================================

#[tokio::test]
async fn test_recommendation_request_is_seeded_from_popular_tracks() {
    let recommender = Arc::new(RecordingRecommender::new(vec![
        make_track("rec-1", "artist-r", "R", 70),
        make_track("rec-2", "artist-r", "R", 65),
    ]));
    let curator = curator_with_fixture_catalog().with_recommendations(recommender.clone());
    let tracks = fixture_tracks();

    curator
        .curate_with_recommendations(&tracks, "energetic workout")
        .await
        .unwrap();

    let requests = recommender.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    let mut expected_seeds: Vec<String> = PULSE_TRACK_IDS.iter().map(|s| s.to_string()).collect();
    expected_seeds.push(BLUE_TRACK_IDS[0].to_string());
    assert_eq!(request.seed_track_ids, expected_seeds);
    assert_eq!(request.seed_genres, vec!["dance", "work-out"]);
    assert_eq!(request.limit, 50);

    // Seed energy averages 0.8; the prompt pushes it past the ceiling
    assert_eq!(request.target.get(Feature::Energy), Some(1.0));
    // Seed tempo averages 122.4; raised by 20 BPM
    let tempo = request.target.get(Feature::Tempo).unwrap();
    assert!((tempo - 142.4).abs() < 1e-9);
}

#[tokio::test]
async fn test_blend_puts_recommendations_first_without_duplicates() {
    let tracks = fixture_tracks();
    let recommender = Arc::new(RecordingRecommender::new(vec![
        make_track("rec-1", "artist-r", "R", 70),
        tracks[0].clone(),
        make_track("rec-2", "artist-r", "R", 65),
    ]));
    let curator = curator_with_fixture_catalog().with_recommendations(recommender);

    let selection = curator
        .curate_with_recommendations(&tracks, "happy jazz")
        .await
        .unwrap();

    assert_eq!(selection.origin, SelectionOrigin::Curated);
    let ids: Vec<&str> = selection.tracks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(&ids[..3], &["rec-1", PULSE_TRACK_IDS[0], "rec-2"]);

    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());
    // 3 recommended plus round(12 * 0.3) = 4 sampled, minus at most one overlap
    assert!(ids.len() >= 6 && ids.len() <= 7);
    assert!(selection.metadata.name.starts_with("Jazz Mix"));
}

#[tokio::test]
async fn test_empty_recommendations_still_blend_source_sample() {
    let recommender = Arc::new(RecordingRecommender::new(Vec::new()));
    let curator = curator_with_fixture_catalog().with_recommendations(recommender);

    let selection = curator
        .curate_with_recommendations(&fixture_tracks(), "rock")
        .await
        .unwrap();

    assert_eq!(selection.origin, SelectionOrigin::Curated);
    assert_eq!(selection.tracks.len(), 4);
}

#[tokio::test]
async fn test_recommendation_failure_is_a_provider_error() {
    let curator = curator_with_fixture_catalog().with_recommendations(Arc::new(FailingProvider));

    let err = curator
        .curate_with_recommendations(&fixture_tracks(), "rock")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Provider);
}

// =============================================================================
// Text-model selection
// =============================================================================

#[tokio::test]
async fn test_selector_sees_at_most_configured_descriptions() {
    let mut settings = CurationSettings::default();
    settings.max_described_tracks = 5;
    let selector = Arc::new(RecordingSelector::new(vec![1, 4]));
    let curator = curator_with_settings(settings).with_selector(selector.clone());
    let tracks = fixture_tracks();

    let selection = curator
        .curate_with_selector(&tracks, "late night")
        .await
        .unwrap();

    let descriptions = selector.descriptions();
    assert_eq!(descriptions.len(), 5);
    assert_eq!(descriptions[1], "1: 'Song still-1' by Still Waters");

    let ids: Vec<&str> = selection.tracks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec![STILL_TRACK_IDS[0], STILL_TRACK_IDS[1]]);
    assert_eq!(selection.origin, SelectionOrigin::Curated);
}

// =============================================================================
// Publishing
// =============================================================================

#[tokio::test]
async fn test_publish_creates_playlist_in_batches() {
    let mut settings = CurationSettings::default();
    settings.playlist_batch_size = 5;
    let curator = curator_with_settings(settings);
    let store = InMemoryPlaylistStore::new();
    let tracks = fixture_tracks();

    let selection = curator
        .curate_by_features(&tracks, "jazz for focus", 12)
        .await
        .unwrap();
    let published = curator
        .publish(&store, &selection.metadata, &selection.tracks)
        .await
        .unwrap();

    assert_eq!(published.track_count, 12);
    assert_eq!(published.name, selection.metadata.name);

    let stored = store.playlists();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, published.id);
    assert_eq!(stored[0].append_calls, 3);
    assert_eq!(stored[0].description, "Curated for \"jazz for focus\"");
    let expected: Vec<String> = selection.tracks.iter().map(|t| t.uri.clone()).collect();
    assert_eq!(stored[0].uris, expected);
}
