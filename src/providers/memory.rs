//! In-memory collaborators.
//!
//! Used by the CLI (backed by JSON files) and by tests.

use super::trait_def::{CatalogReader, FeatureProvider, GenreProvider, PlaylistWriter};
use crate::curation::error::ProviderError;
use crate::curation::models::{AudioFeatures, Track};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;

/// Catalogue held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    sources: HashMap<String, Vec<Track>>,
    features: HashMap<String, AudioFeatures>,
    artist_genres: HashMap<String, Vec<String>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source_id: impl Into<String>, tracks: Vec<Track>) -> Self {
        self.sources.insert(source_id.into(), tracks);
        self
    }

    pub fn with_features(mut self, features: HashMap<String, AudioFeatures>) -> Self {
        self.features.extend(features);
        self
    }

    pub fn with_artist_genres(mut self, genres: HashMap<String, Vec<String>>) -> Self {
        self.artist_genres.extend(genres);
        self
    }

    /// Source ids, sorted.
    pub fn source_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.sources.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }
}

#[async_trait]
impl CatalogReader for InMemoryCatalog {
    async fn read_tracks(&self, source_id: &str) -> Result<Vec<Track>, ProviderError> {
        self.sources
            .get(source_id)
            .cloned()
            .ok_or_else(|| ProviderError::Request(format!("Unknown source: {}", source_id)))
    }
}

#[async_trait]
impl FeatureProvider for InMemoryCatalog {
    async fn audio_features(
        &self,
        track_ids: &[String],
    ) -> Result<HashMap<String, AudioFeatures>, ProviderError> {
        Ok(track_ids
            .iter()
            .filter_map(|id| self.features.get(id).map(|f| (id.clone(), f.clone())))
            .collect())
    }
}

#[async_trait]
impl GenreProvider for InMemoryCatalog {
    async fn artist_genres(
        &self,
        artist_ids: &[String],
    ) -> Result<HashMap<String, Vec<String>>, ProviderError> {
        Ok(artist_ids
            .iter()
            .filter_map(|id| self.artist_genres.get(id).map(|g| (id.clone(), g.clone())))
            .collect())
    }
}

/// A playlist recorded by [`InMemoryPlaylistStore`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredPlaylist {
    pub id: String,
    pub name: String,
    pub description: String,
    pub uris: Vec<String>,
    /// Number of `append_tracks` calls received.
    pub append_calls: usize,
}

/// [`PlaylistWriter`] that keeps created playlists in memory.
#[derive(Debug, Default)]
pub struct InMemoryPlaylistStore {
    playlists: Mutex<Vec<StoredPlaylist>>,
}

impl InMemoryPlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every playlist created so far, in creation order.
    pub fn playlists(&self) -> Vec<StoredPlaylist> {
        self.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<StoredPlaylist>>, ProviderError> {
        self.playlists
            .lock()
            .map_err(|_| ProviderError::Request("Playlist store lock poisoned".to_string()))
    }
}

#[async_trait]
impl PlaylistWriter for InMemoryPlaylistStore {
    async fn create_playlist(
        &self,
        name: &str,
        description: &str,
    ) -> Result<String, ProviderError> {
        let mut playlists = self.lock()?;
        let id = format!("playlist-{}", playlists.len() + 1);
        playlists.push(StoredPlaylist {
            id: id.clone(),
            name: name.to_string(),
            description: description.to_string(),
            uris: Vec::new(),
            append_calls: 0,
        });
        Ok(id)
    }

    async fn append_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), ProviderError> {
        let mut playlists = self.lock()?;
        let playlist = playlists
            .iter_mut()
            .find(|p| p.id == playlist_id)
            .ok_or_else(|| ProviderError::Request(format!("Unknown playlist: {}", playlist_id)))?;
        playlist.uris.extend_from_slice(uris);
        playlist.append_calls += 1;
        Ok(())
    }
}
