//! Blending of recommended candidates with a slice of the source collection.

use super::models::Track;
use super::sampling::shuffled_sample;
use rand::Rng;
use std::collections::HashSet;

/// Proportions for blending.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendSettings {
    /// Fraction of the source collection mixed in (0.0-1.0).
    pub source_fraction: f64,
    /// Upper bound on source tracks mixed in.
    pub source_cap: usize,
    /// Maximum length of the blended list.
    pub output_cap: usize,
}

impl Default for BlendSettings {
    fn default() -> Self {
        Self {
            source_fraction: 0.3,
            source_cap: 20,
            output_cap: 50,
        }
    }
}

impl BlendSettings {
    /// Number of source tracks to draw for a collection of `source_len`.
    pub fn source_sample_size(&self, source_len: usize) -> usize {
        let scaled = (source_len as f64 * self.source_fraction).round().max(0.0) as usize;
        scaled.min(self.source_cap)
    }
}

/// Blend using the thread-local random source.
pub fn blend(recommended: Vec<Track>, source: &[Track], settings: &BlendSettings) -> Vec<Track> {
    blend_with_rng(&mut rand::rng(), recommended, source, settings)
}

/// `recommended ++ sample(source)`, deduplicated by id (first occurrence
/// wins) and truncated to `output_cap`.
pub fn blend_with_rng<R: Rng + ?Sized>(
    rng: &mut R,
    recommended: Vec<Track>,
    source: &[Track],
    settings: &BlendSettings,
) -> Vec<Track> {
    let sample_size = settings.source_sample_size(source.len());
    let sampled = shuffled_sample(rng, source, sample_size);

    let mut seen: HashSet<String> = HashSet::new();
    let mut blended: Vec<Track> = Vec::with_capacity(recommended.len() + sampled.len());

    let candidates = recommended.into_iter().chain(sampled.into_iter().cloned());
    for track in candidates {
        if blended.len() >= settings.output_cap {
            break;
        }
        if seen.insert(track.id.clone()) {
            blended.push(track);
        }
    }

    blended
}
