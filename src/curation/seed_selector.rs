//! Seed selection for recommendation and feature averaging.
//!
//! Recommendation collaborators behave better with a handful of popular,
//! representative seeds than with a large arbitrary set, so we sample a
//! bounded candidate pool and keep its most popular members.

use super::models::Track;
use super::sampling::sample_indices;
use rand::Rng;

/// Bounds for seed selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedSettings {
    /// Size of the random candidate pool.
    pub max_candidates: usize,
    /// Number of seeds kept from the pool.
    pub max_seeds: usize,
    /// Number of prompt genres forwarded as seed genres.
    pub max_seed_genres: usize,
}

impl Default for SeedSettings {
    fn default() -> Self {
        Self {
            max_candidates: 50,
            max_seeds: 5,
            max_seed_genres: 3,
        }
    }
}

/// Select seeds using the thread-local random source.
pub fn select_seeds(tracks: &[Track], max_candidates: usize, max_seeds: usize) -> Vec<&Track> {
    select_seeds_with_rng(&mut rand::rng(), tracks, max_candidates, max_seeds)
}

/// Sample `min(max_candidates, |tracks|)` tracks, order them by popularity
/// (descending, ties by input order) and keep the first `max_seeds`.
pub fn select_seeds_with_rng<'a, R: Rng + ?Sized>(
    rng: &mut R,
    tracks: &'a [Track],
    max_candidates: usize,
    max_seeds: usize,
) -> Vec<&'a Track> {
    let mut candidates: Vec<&Track> = sample_indices(rng, tracks.len(), max_candidates)
        .into_iter()
        .map(|i| &tracks[i])
        .collect();

    // sort_by is stable, and candidates are still in input order here
    candidates.sort_by(|a, b| b.popularity.cmp(&a.popularity));
    candidates.truncate(max_seeds);
    candidates
}
