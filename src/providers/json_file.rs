//! Loading an [`InMemoryCatalog`] from JSON files.
//!
//! - tracks: either an array of tracks (registered under
//!   [`DEFAULT_SOURCE_ID`]) or an object mapping source id to tracks
//! - features: object mapping track id to audio features
//! - genres: object mapping artist id to a list of genre tags

use super::memory::InMemoryCatalog;
use crate::curation::models::{AudioFeatures, Track};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Source id used when the tracks file is a bare array.
pub const DEFAULT_SOURCE_ID: &str = "default";

#[derive(Deserialize)]
#[serde(untagged)]
enum TracksFile {
    Single(Vec<Track>),
    Sources(HashMap<String, Vec<Track>>),
}

/// Builder reading catalogue data from JSON files.
pub struct JsonFileCatalog;

impl JsonFileCatalog {
    pub fn load(
        tracks_path: &Path,
        features_path: Option<&Path>,
        genres_path: Option<&Path>,
    ) -> Result<InMemoryCatalog> {
        let mut catalog = InMemoryCatalog::new();

        match read_json::<TracksFile>(tracks_path)? {
            TracksFile::Single(tracks) => {
                info!(tracks = tracks.len(), "Loaded tracks");
                catalog = catalog.with_source(DEFAULT_SOURCE_ID, tracks);
            }
            TracksFile::Sources(sources) => {
                for (source_id, tracks) in sources {
                    info!(source = %source_id, tracks = tracks.len(), "Loaded tracks");
                    catalog = catalog.with_source(source_id, tracks);
                }
            }
        }

        if let Some(path) = features_path {
            let features: HashMap<String, AudioFeatures> = read_json(path)?;
            info!(count = features.len(), "Loaded audio features");
            catalog = catalog.with_features(features);
        }

        if let Some(path) = genres_path {
            let genres: HashMap<String, Vec<String>> = read_json(path)?;
            info!(count = genres.len(), "Loaded artist genres");
            catalog = catalog.with_artist_genres(genres);
        }

        Ok(catalog)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}
