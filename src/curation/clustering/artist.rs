//! Artist-frequency bucketing.

use crate::curation::models::{Cluster, Track};
use std::collections::HashMap;

/// Group key for tracks without any listed artist.
const UNKNOWN_ARTIST: &str = "";

/// Partition tracks by first-listed artist.
///
/// Artist groups are ordered by size (descending, ties by first appearance).
/// The largest `num_clusters` groups each seed a cluster; every remaining
/// group is appended whole to the currently smallest cluster, ties going to
/// the lowest index. No track is ever dropped and no group is split.
pub fn cluster_by_artist(tracks: &[Track], num_clusters: usize) -> Vec<Cluster<'_>> {
    let mut group_index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Vec<&Track>> = Vec::new();

    for track in tracks {
        let artist = track.first_artist_name().unwrap_or(UNKNOWN_ARTIST);
        let idx = *group_index.entry(artist).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[idx].push(track);
    }

    // Stable, so equal-sized groups stay in first-seen order
    groups.sort_by(|a, b| b.len().cmp(&a.len()));

    let seeded = num_clusters.min(groups.len());
    let remaining = groups.split_off(seeded);
    let mut clusters: Vec<Cluster> = groups.into_iter().map(Cluster::new).collect();

    for group in remaining {
        let smallest = clusters
            .iter()
            .enumerate()
            .min_by_key(|(i, c)| (c.len(), *i))
            .map(|(i, _)| i);
        if let Some(idx) = smallest {
            clusters[idx].tracks.extend(group);
        }
    }

    clusters
}
