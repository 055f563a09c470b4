//! Prompt interpretation.
//!
//! Turns a free-text mood/theme prompt into candidate genre tags and a list
//! of feature nudges. Matching is plain substring containment on the
//! lower-cased prompt, so it is fully deterministic.

use super::models::{BiasDelta, Feature, PromptSignal};

/// Genre literals recognised directly in a prompt.
const KNOWN_GENRES: &[&str] = &[
    "pop",
    "rock",
    "hip hop",
    "hip-hop",
    "rap",
    "trap",
    "jazz",
    "blues",
    "classical",
    "opera",
    "country",
    "folk",
    "singer-songwriter",
    "electronic",
    "edm",
    "house",
    "deep house",
    "techno",
    "trance",
    "dubstep",
    "drum and bass",
    "ambient",
    "synthwave",
    "lo-fi",
    "indie",
    "indie pop",
    "indie rock",
    "alternative",
    "grunge",
    "hard rock",
    "psychedelic",
    "metal",
    "heavy metal",
    "punk",
    "pop punk",
    "emo",
    "r&b",
    "soul",
    "funk",
    "disco",
    "gospel",
    "reggae",
    "reggaeton",
    "latin",
    "salsa",
    "k-pop",
    "j-pop",
    "grime",
    "soundtrack",
    "bossa nova",
];

/// Mood, activity, decade and descriptor keywords, consulted only when no
/// genre literal matched.
const KEYWORD_GENRES: &[(&str, &str)] = &[
    ("happy", "happy"),
    ("sad", "sad"),
    ("party", "party"),
    ("dance", "dance"),
    ("energetic", "dance"),
    ("workout", "work-out"),
    ("gym", "work-out"),
    ("running", "work-out"),
    ("study", "study"),
    ("focus", "study"),
    ("sleep", "sleep"),
    ("relax", "chill"),
    ("chill", "chill"),
    ("calm", "ambient"),
    ("romantic", "romance"),
    ("love", "romance"),
    ("summer", "summer"),
    ("rainy", "rainy-day"),
    ("road trip", "road-trip"),
    ("driving", "road-trip"),
    ("60s", "rock-n-roll"),
    ("70s", "disco"),
    ("80s", "synth-pop"),
    ("90s", "grunge"),
    ("2000s", "pop"),
    ("dark", "goth"),
    ("aggressive", "metal"),
    ("mellow", "acoustic"),
    ("upbeat", "pop"),
    ("epic", "soundtrack"),
    ("nostalgic", "indie"),
];

/// Opposed keyword sets for one axis.
struct BiasRule {
    feature: Feature,
    raise: &'static [&'static str],
    lower: &'static [&'static str],
}

const BIAS_RULES: &[BiasRule] = &[
    BiasRule {
        feature: Feature::Energy,
        raise: &["energetic", "energy", "party", "workout", "gym", "intense", "hype", "pump"],
        lower: &["calm", "chill", "sleep", "relax", "mellow", "peaceful", "quiet", "soft"],
    },
    BiasRule {
        feature: Feature::Danceability,
        raise: &["dance", "dancing", "party", "club", "groove"],
        lower: &["sleep", "meditat", "study", "focus"],
    },
    BiasRule {
        feature: Feature::Valence,
        raise: &["happy", "joy", "cheerful", "sunny", "uplifting", "positive"],
        lower: &["sad", "melanchol", "gloomy", "dark", "heartbreak", "angry"],
    },
    BiasRule {
        feature: Feature::Acousticness,
        raise: &["acoustic", "unplugged", "organic", "folk"],
        lower: &["electronic", "synth", "edm", "techno"],
    },
    BiasRule {
        feature: Feature::Instrumentalness,
        raise: &["instrumental", "no vocals", "background", "study", "focus"],
        lower: &["vocal", "lyrics", "karaoke", "sing along"],
    },
    BiasRule {
        feature: Feature::Tempo,
        raise: &["fast", "workout", "running", "energetic", "upbeat"],
        lower: &["slow", "sleep", "calm", "relax", "chill"],
    },
];

/// Analyze a prompt into genres and feature nudges.
pub fn analyze(prompt: &str) -> PromptSignal {
    PromptSignal {
        genres: extract_genres(prompt),
        feature_bias: extract_feature_bias(prompt),
    }
}

/// Genres mentioned by, or implied by, the prompt, deduplicated in
/// first-seen order.
pub fn extract_genres(prompt: &str) -> Vec<String> {
    let prompt = prompt.to_lowercase();

    let mut genres: Vec<String> = Vec::new();
    for genre in KNOWN_GENRES {
        if prompt.contains(genre) {
            push_unique(&mut genres, genre);
        }
    }

    if genres.is_empty() {
        for (keyword, genre) in KEYWORD_GENRES {
            if prompt.contains(keyword) {
                push_unique(&mut genres, genre);
            }
        }
    }

    genres
}

/// Feature nudges requested by the prompt, in rule order.
///
/// A prompt hitting both sides of one axis yields both deltas, raise first.
pub fn extract_feature_bias(prompt: &str) -> Vec<BiasDelta> {
    let prompt = prompt.to_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|k| prompt.contains(k));

    let mut bias = Vec::new();
    for rule in BIAS_RULES {
        let step = rule.feature.bias_step();
        if mentions(rule.raise) {
            bias.push(BiasDelta {
                feature: rule.feature,
                delta: step,
            });
        }
        if mentions(rule.lower) {
            bias.push(BiasDelta {
                feature: rule.feature,
                delta: -step,
            });
        }
    }
    bias
}

fn push_unique(genres: &mut Vec<String>, genre: &str) {
    if !genres.iter().any(|g| g == genre) {
        genres.push(genre.to_string());
    }
}
