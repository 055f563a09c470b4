//! Collaborator trait definitions.
//!
//! The curation engine never talks to a streaming service directly. Every
//! external fact it needs (source tracks, audio features, artist genres,
//! recommendations) and the single side effect it produces (a new
//! playlist) go through one of these traits.

use crate::curation::error::ProviderError;
use crate::curation::models::{AudioFeatures, TargetFeatures, Track};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;

// =========================================================================
// Read side
// =========================================================================

/// Source of track collections (playlists, liked songs, ...).
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// All tracks of the collection identified by `source_id`, in order.
    async fn read_tracks(&self, source_id: &str) -> Result<Vec<Track>, ProviderError>;
}

/// Audio features by track id.
#[async_trait]
pub trait FeatureProvider: Send + Sync {
    /// Look up features for `track_ids`. Unknown ids are simply absent from
    /// the returned map.
    async fn audio_features(
        &self,
        track_ids: &[String],
    ) -> Result<HashMap<String, AudioFeatures>, ProviderError>;
}

/// Genre tags by artist id.
#[async_trait]
pub trait GenreProvider: Send + Sync {
    /// Look up genres for `artist_ids`. Unknown ids are absent from the
    /// returned map.
    async fn artist_genres(
        &self,
        artist_ids: &[String],
    ) -> Result<HashMap<String, Vec<String>>, ProviderError>;
}

/// Query sent to a [`RecommendationProvider`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRequest {
    pub seed_track_ids: Vec<String>,
    pub seed_genres: Vec<String>,
    pub target: TargetFeatures,
    pub limit: usize,
}

/// Service producing tracks similar to a set of seeds.
#[async_trait]
pub trait RecommendationProvider: Send + Sync {
    async fn recommend(&self, request: &RecommendationRequest) -> Result<Vec<Track>, ProviderError>;
}

// =========================================================================
// Write side
// =========================================================================

/// Destination for curated playlists.
#[async_trait]
pub trait PlaylistWriter: Send + Sync {
    /// Create an empty playlist and return its id.
    async fn create_playlist(&self, name: &str, description: &str) -> Result<String, ProviderError>;

    /// Append `uris` to an existing playlist. Callers keep each call within
    /// the writer's batch limit.
    async fn append_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), ProviderError>;
}
