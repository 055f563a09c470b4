//! Request-scoped data shapes used by the curation engine.
//!
//! Nothing in here outlives a single curation call: tracks come from the
//! catalogue reader, features and genres from the providers, and everything
//! else is derived on the fly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lowest tempo a target may be adjusted down to.
pub const TEMPO_FLOOR_BPM: f64 = 60.0;

/// Tempo assumed when a target has no tempo value yet.
pub const TEMPO_BASELINE_BPM: f64 = 120.0;

/// Divisor bringing tempo into a range comparable with the unit axes.
pub const TEMPO_SCALE: f64 = 200.0;

// =============================================================================
// Catalogue records
// =============================================================================

/// Artist reference as listed on a track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: String,
    pub name: String,
}

/// A catalogue track. Identity is `id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub uri: String,
    #[serde(default)]
    pub popularity: u32,
}

impl Track {
    /// Name of the first listed artist, if any.
    pub fn first_artist_name(&self) -> Option<&str> {
        self.artists.first().map(|a| a.name.as_str())
    }

    /// All artist names joined with ", ".
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// =============================================================================
// Audio features
// =============================================================================

/// The six audio axes the engine reasons about.
///
/// Declaration order is the order used for feature vectors and query
/// parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Danceability,
    Energy,
    Valence,
    Tempo,
    Acousticness,
    Instrumentalness,
}

impl Feature {
    pub const ALL: [Feature; 6] = [
        Feature::Danceability,
        Feature::Energy,
        Feature::Valence,
        Feature::Tempo,
        Feature::Acousticness,
        Feature::Instrumentalness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Danceability => "danceability",
            Feature::Energy => "energy",
            Feature::Valence => "valence",
            Feature::Tempo => "tempo",
            Feature::Acousticness => "acousticness",
            Feature::Instrumentalness => "instrumentalness",
        }
    }

    /// Clamp a value into this axis' valid range.
    pub fn clamp_value(self, value: f64) -> f64 {
        match self {
            Feature::Tempo => value.max(TEMPO_FLOOR_BPM),
            _ => value.clamp(0.0, 1.0),
        }
    }

    /// Value a target starts from when it has no entry for this axis.
    pub fn baseline(&self) -> f64 {
        match self {
            Feature::Tempo => TEMPO_BASELINE_BPM,
            _ => 0.0,
        }
    }

    /// Size of a single prompt nudge on this axis.
    pub fn bias_step(&self) -> f64 {
        match self {
            Feature::Tempo => 20.0,
            _ => 0.3,
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audio attributes of one track.
///
/// Every axis is optional so that partially populated provider records can
/// be represented; in practice all six come together.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioFeatures {
    pub danceability: Option<f64>,
    pub energy: Option<f64>,
    pub valence: Option<f64>,
    pub tempo: Option<f64>,
    pub acousticness: Option<f64>,
    pub instrumentalness: Option<f64>,
}

impl AudioFeatures {
    /// Build a fully populated record.
    pub fn new(
        danceability: f64,
        energy: f64,
        valence: f64,
        tempo: f64,
        acousticness: f64,
        instrumentalness: f64,
    ) -> Self {
        Self {
            danceability: Some(danceability),
            energy: Some(energy),
            valence: Some(valence),
            tempo: Some(tempo),
            acousticness: Some(acousticness),
            instrumentalness: Some(instrumentalness),
        }
    }

    pub fn get(&self, feature: Feature) -> Option<f64> {
        match feature {
            Feature::Danceability => self.danceability,
            Feature::Energy => self.energy,
            Feature::Valence => self.valence,
            Feature::Tempo => self.tempo,
            Feature::Acousticness => self.acousticness,
            Feature::Instrumentalness => self.instrumentalness,
        }
    }

    /// Clustering vector `[danceability, energy, valence, tempo/200,
    /// acousticness, instrumentalness]`, or `None` if any axis is missing.
    pub fn feature_vector(&self) -> Option<[f64; 6]> {
        let mut vector = [0.0; 6];
        for (slot, feature) in vector.iter_mut().zip(Feature::ALL) {
            let value = self.get(feature)?;
            *slot = match feature {
                Feature::Tempo => value / TEMPO_SCALE,
                _ => value,
            };
        }
        Some(vector)
    }
}

// =============================================================================
// Derived query values
// =============================================================================

/// Desired feature values, used as a query bias rather than a filter.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TargetFeatures(BTreeMap<Feature, f64>);

impl TargetFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.0.get(&feature).copied()
    }

    pub fn set(&mut self, feature: Feature, value: f64) {
        self.0.insert(feature, value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    /// Render as `target_{axis}` pairs, in axis order.
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(feature, value)| (format!("target_{}", feature), value.to_string()))
            .collect()
    }

    /// Same normalisation as [`AudioFeatures::feature_vector`], with missing
    /// axes taken from their baseline.
    pub fn feature_vector(&self) -> [f64; 6] {
        let mut vector = [0.0; 6];
        for (slot, feature) in vector.iter_mut().zip(Feature::ALL) {
            let value = self.get(feature).unwrap_or_else(|| feature.baseline());
            *slot = match feature {
                Feature::Tempo => value / TEMPO_SCALE,
                _ => value,
            };
        }
        vector
    }
}

impl FromIterator<(Feature, f64)> for TargetFeatures {
    fn from_iter<I: IntoIterator<Item = (Feature, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One signed nudge requested by a prompt.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BiasDelta {
    pub feature: Feature,
    pub delta: f64,
}

/// What a prompt asks for: candidate genres and feature nudges.
///
/// Deltas are kept in the order they were matched and are applied in that
/// order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PromptSignal {
    pub genres: Vec<String>,
    pub feature_bias: Vec<BiasDelta>,
}

// =============================================================================
// Results
// =============================================================================

/// One group of a partition, borrowing tracks from the input collection.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Cluster<'a> {
    pub tracks: Vec<&'a Track>,
}

impl<'a> Cluster<'a> {
    pub fn new(tracks: Vec<&'a Track>) -> Self {
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn track_ids(&self) -> Vec<&'a str> {
        self.tracks.iter().map(|t| t.id.as_str()).collect()
    }
}
