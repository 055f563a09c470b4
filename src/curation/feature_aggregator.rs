//! Target feature computation.
//!
//! Averages the audio features of a seed sample and merges the prompt's
//! nudges on top, producing the target values handed to recommendation
//! collaborators.

use super::models::{AudioFeatures, Feature, PromptSignal, TargetFeatures};

/// Per-axis mean over the records that are present.
///
/// Each axis is averaged only over the records that carry it. Returns an
/// empty target when nothing is present.
pub fn average<'a, I>(features: I) -> TargetFeatures
where
    I: IntoIterator<Item = Option<&'a AudioFeatures>>,
{
    let mut sums = [0.0_f64; 6];
    let mut counts = [0_usize; 6];

    for record in features.into_iter().flatten() {
        for (i, feature) in Feature::ALL.iter().enumerate() {
            if let Some(value) = record.get(*feature) {
                sums[i] += value;
                counts[i] += 1;
            }
        }
    }

    Feature::ALL
        .iter()
        .enumerate()
        .filter(|(i, _)| counts[*i] > 0)
        .map(|(i, feature)| (*feature, sums[i] / counts[i] as f64))
        .collect()
}

/// Apply the prompt's nudges to a target.
///
/// Axes missing from the target start from their baseline (0 for unit
/// axes, 120 BPM for tempo). Each delta is clamped as it is applied.
pub fn adjust_from_prompt(signal: &PromptSignal, mut target: TargetFeatures) -> TargetFeatures {
    for bias in &signal.feature_bias {
        let current = target
            .get(bias.feature)
            .unwrap_or_else(|| bias.feature.baseline());
        target.set(bias.feature, bias.feature.clamp_value(current + bias.delta));
    }
    target
}
