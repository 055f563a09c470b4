//! Fixture collection and scripted collaborators

use super::constants::*;
use async_trait::async_trait;
use pezzottify_curator::agent::TrackSelector;
use pezzottify_curator::curation::models::{ArtistRef, AudioFeatures, Track};
use pezzottify_curator::curation::ProviderError;
use pezzottify_curator::providers::{
    FeatureProvider, GenreProvider, InMemoryCatalog, RecommendationProvider,
    RecommendationRequest,
};
use std::collections::HashMap;
use std::sync::Mutex;

pub fn make_track(id: &str, artist_id: &str, artist_name: &str, popularity: u32) -> Track {
    Track {
        id: id.to_string(),
        name: format!("Song {}", id),
        artists: vec![ArtistRef {
            id: artist_id.to_string(),
            name: artist_name.to_string(),
        }],
        uri: format!("spotify:track:{}", id),
        popularity,
    }
}

/// 12 tracks, interleaved by artist: pulse-1, still-1, blue-1, pulse-2, ...
///
/// Popularity strictly decreases within each artist; Pulse is the most
/// popular act, Blue Quartet second, Still Waters last.
pub fn fixture_tracks() -> Vec<Track> {
    let mut tracks = Vec::new();
    for i in 0..TRACKS_PER_ARTIST {
        let rank = i as u32;
        tracks.push(make_track(PULSE_TRACK_IDS[i], PULSE_ID, PULSE_NAME, 90 - rank));
        tracks.push(make_track(
            STILL_TRACK_IDS[i],
            STILL_WATERS_ID,
            STILL_WATERS_NAME,
            30 - rank,
        ));
        tracks.push(make_track(
            BLUE_TRACK_IDS[i],
            BLUE_QUARTET_ID,
            BLUE_QUARTET_NAME,
            60 - rank,
        ));
    }
    tracks
}

pub fn pulse_features() -> AudioFeatures {
    AudioFeatures::new(0.85, 0.9, 0.8, 128.0, 0.05, 0.0)
}

pub fn still_features() -> AudioFeatures {
    AudioFeatures::new(0.3, 0.2, 0.4, 70.0, 0.9, 0.3)
}

pub fn blue_features() -> AudioFeatures {
    AudioFeatures::new(0.5, 0.4, 0.5, 100.0, 0.7, 0.8)
}

pub fn fixture_features() -> HashMap<String, AudioFeatures> {
    let mut features = HashMap::new();
    for i in 0..TRACKS_PER_ARTIST {
        features.insert(PULSE_TRACK_IDS[i].to_string(), pulse_features());
        features.insert(STILL_TRACK_IDS[i].to_string(), still_features());
        features.insert(BLUE_TRACK_IDS[i].to_string(), blue_features());
    }
    features
}

pub fn fixture_genres() -> HashMap<String, Vec<String>> {
    let mut genres = HashMap::new();
    genres.insert(
        PULSE_ID.to_string(),
        vec!["dance".to_string(), "house".to_string()],
    );
    genres.insert(
        STILL_WATERS_ID.to_string(),
        vec!["ambient".to_string(), "chill".to_string()],
    );
    genres.insert(BLUE_QUARTET_ID.to_string(), vec!["jazz".to_string()]);
    genres
}

/// Catalogue with the fixture collection, its features and its genres.
pub fn fixture_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_source(SOURCE_ID, fixture_tracks())
        .with_features(fixture_features())
        .with_artist_genres(fixture_genres())
}

// ============================================================================
// Scripted collaborators
// ============================================================================

/// Every lookup fails.
pub struct FailingProvider;

#[async_trait]
impl FeatureProvider for FailingProvider {
    async fn audio_features(
        &self,
        _track_ids: &[String],
    ) -> Result<HashMap<String, AudioFeatures>, ProviderError> {
        Err(ProviderError::Request("feature service unavailable".to_string()))
    }
}

#[async_trait]
impl GenreProvider for FailingProvider {
    async fn artist_genres(
        &self,
        _artist_ids: &[String],
    ) -> Result<HashMap<String, Vec<String>>, ProviderError> {
        Err(ProviderError::Request("genre service unavailable".to_string()))
    }
}

#[async_trait]
impl RecommendationProvider for FailingProvider {
    async fn recommend(
        &self,
        _request: &RecommendationRequest,
    ) -> Result<Vec<Track>, ProviderError> {
        Err(ProviderError::MalformedResponse("unexpected payload".to_string()))
    }
}

/// Returns a fixed list and records every request.
pub struct RecordingRecommender {
    tracks: Vec<Track>,
    requests: Mutex<Vec<RecommendationRequest>>,
}

impl RecordingRecommender {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RecommendationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecommendationProvider for RecordingRecommender {
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<Track>, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.tracks.clone())
    }
}

/// Wraps the fixture catalogue and records the size of every feature batch.
pub struct BatchRecordingFeatures {
    inner: InMemoryCatalog,
    batches: Mutex<Vec<usize>>,
}

impl BatchRecordingFeatures {
    pub fn new(inner: InMemoryCatalog) -> Self {
        Self {
            inner,
            batches: Mutex::new(Vec::new()),
        }
    }

    pub fn batches(&self) -> Vec<usize> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeatureProvider for BatchRecordingFeatures {
    async fn audio_features(
        &self,
        track_ids: &[String],
    ) -> Result<HashMap<String, AudioFeatures>, ProviderError> {
        self.batches.lock().unwrap().push(track_ids.len());
        self.inner.audio_features(track_ids).await
    }
}

/// Returns fixed indices and records the descriptions it was shown.
pub struct RecordingSelector {
    indices: Vec<usize>,
    descriptions: Mutex<Vec<String>>,
}

impl RecordingSelector {
    pub fn new(indices: Vec<usize>) -> Self {
        Self {
            indices,
            descriptions: Mutex::new(Vec::new()),
        }
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.descriptions.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrackSelector for RecordingSelector {
    async fn select(
        &self,
        _prompt: &str,
        descriptions: &[String],
    ) -> Result<Vec<usize>, ProviderError> {
        self.descriptions
            .lock()
            .unwrap()
            .extend_from_slice(descriptions);
        Ok(self.indices.clone())
    }
}
