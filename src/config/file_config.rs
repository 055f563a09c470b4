use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub seeds: Option<SeedsConfig>,
    pub blend: Option<BlendConfig>,
    pub clustering: Option<ClusteringConfig>,
    pub llm: Option<LlmConfig>,
    pub playlist: Option<PlaylistConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SeedsConfig {
    pub max_candidates: Option<usize>,
    pub max_seeds: Option<usize>,
    pub max_seed_genres: Option<usize>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct BlendConfig {
    pub source_fraction: Option<f64>,
    pub source_cap: Option<usize>,
    pub output_cap: Option<usize>,
    pub recommendation_limit: Option<usize>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ClusteringConfig {
    pub seed: Option<u64>,
    pub max_iterations: Option<usize>,
    pub feature_batch_size: Option<usize>,
    pub artist_batch_size: Option<usize>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API, e.g. "http://localhost:1234/v1".
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_sec: Option<u64>,
    pub max_described_tracks: Option<usize>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct PlaylistConfig {
    pub batch_size: Option<usize>,
    pub empty_fallback_size: Option<usize>,
    pub failure_fallback_size: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
