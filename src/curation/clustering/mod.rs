//! Partitioning a track collection into clusters.
//!
//! Three interchangeable strategies:
//! - **feature**: k-means over normalised audio-feature vectors
//! - **genre**: k-means over one-hot artist-genre vectors, falling back to
//!   artist bucketing when too few tracks carry genres
//! - **artist**: whole-artist buckets balanced by size
//!
//! Feature and genre clustering silently exclude tracks lacking the data
//! they need, and may return empty clusters. Artist clustering never drops
//! a track.

mod artist;
mod kmeans;

pub use artist::cluster_by_artist;
pub use kmeans::{kmeans, KMeansSettings};

use super::error::InputError;
use super::models::{AudioFeatures, Cluster, Track};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::str::FromStr;
use tracing::debug;

/// Which clustering strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusteringMethod {
    Feature,
    Genre,
    Artist,
}

impl ClusteringMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusteringMethod::Feature => "feature",
            ClusteringMethod::Genre => "genre",
            ClusteringMethod::Artist => "artist",
        }
    }
}

impl std::fmt::Display for ClusteringMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClusteringMethod {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "feature" | "features" | "kmeans" => Ok(ClusteringMethod::Feature),
            "genre" => Ok(ClusteringMethod::Genre),
            "artist" => Ok(ClusteringMethod::Artist),
            other => Err(InputError::UnsupportedMethod(other.to_string())),
        }
    }
}

/// Runs the clustering strategies with fixed k-means parameters.
#[derive(Debug, Clone, Default)]
pub struct ClusteringEngine {
    settings: KMeansSettings,
}

impl ClusteringEngine {
    pub fn new(settings: KMeansSettings) -> Self {
        Self { settings }
    }

    /// Partition `tracks` into `num_clusters` groups.
    ///
    /// `features` maps track id to audio features; `artist_genres` maps
    /// artist id to genre tags. Only the lookup the method needs is read.
    pub fn cluster<'a>(
        &self,
        tracks: &'a [Track],
        num_clusters: usize,
        method: ClusteringMethod,
        features: &HashMap<String, AudioFeatures>,
        artist_genres: &HashMap<String, Vec<String>>,
    ) -> Result<Vec<Cluster<'a>>, InputError> {
        if num_clusters < 1 || num_clusters > tracks.len() {
            return Err(InputError::InvalidClusterCount {
                requested: num_clusters,
                available: tracks.len(),
            });
        }

        let clusters = match method {
            ClusteringMethod::Feature => self.cluster_by_features(tracks, num_clusters, features),
            ClusteringMethod::Genre => self.cluster_by_genre(tracks, num_clusters, artist_genres),
            ClusteringMethod::Artist => cluster_by_artist(tracks, num_clusters),
        };

        debug!(
            method = %method,
            num_clusters,
            produced = clusters.len(),
            clustered_tracks = clusters.iter().map(|c| c.len()).sum::<usize>(),
            "Clustering complete"
        );

        Ok(clusters)
    }

    fn cluster_by_features<'a>(
        &self,
        tracks: &'a [Track],
        num_clusters: usize,
        features: &HashMap<String, AudioFeatures>,
    ) -> Vec<Cluster<'a>> {
        let (retained, points): (Vec<&Track>, Vec<Vec<f64>>) = tracks
            .iter()
            .filter_map(|t| {
                let vector = features.get(&t.id)?.feature_vector()?;
                Some((t, vector.to_vec()))
            })
            .unzip();

        self.partition(retained, &points, num_clusters)
    }

    fn cluster_by_genre<'a>(
        &self,
        tracks: &'a [Track],
        num_clusters: usize,
        artist_genres: &HashMap<String, Vec<String>>,
    ) -> Vec<Cluster<'a>> {
        let tagged: Vec<(&Track, BTreeSet<&str>)> = tracks
            .iter()
            .map(|t| (t, track_genres(t, artist_genres)))
            .filter(|(_, genres)| !genres.is_empty())
            .collect();

        if tagged.len() < num_clusters {
            debug!(
                tagged = tagged.len(),
                num_clusters, "Too few tracks with genres, falling back to artist clustering"
            );
            return cluster_by_artist(tracks, num_clusters);
        }

        let vocabulary: BTreeMap<&str, usize> = tagged
            .iter()
            .flat_map(|(_, genres)| genres.iter().copied())
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .enumerate()
            .map(|(i, genre)| (genre, i))
            .collect();

        let (retained, points): (Vec<&Track>, Vec<Vec<f64>>) = tagged
            .into_iter()
            .map(|(track, genres)| {
                let mut vector = vec![0.0; vocabulary.len()];
                for genre in genres {
                    vector[vocabulary[genre]] = 1.0;
                }
                (track, vector)
            })
            .unzip();

        self.partition(retained, &points, num_clusters)
    }

    /// Run k-means and bucket the retained tracks by assignment.
    fn partition<'a>(
        &self,
        retained: Vec<&'a Track>,
        points: &[Vec<f64>],
        num_clusters: usize,
    ) -> Vec<Cluster<'a>> {
        let assignments = kmeans(points, num_clusters, &self.settings);

        let mut clusters: Vec<Cluster> = vec![Cluster::default(); num_clusters];
        for (track, cluster) in retained.into_iter().zip(assignments) {
            clusters[cluster].tracks.push(track);
        }
        clusters
    }
}

/// Union of the genre tags of every artist on a track.
fn track_genres<'g>(
    track: &Track,
    artist_genres: &'g HashMap<String, Vec<String>>,
) -> BTreeSet<&'g str> {
    track
        .artists
        .iter()
        .filter_map(|a| artist_genres.get(&a.id))
        .flatten()
        .map(|g| g.as_str())
        .collect()
}
