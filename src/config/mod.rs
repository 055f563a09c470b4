mod file_config;

pub use file_config::{
    BlendConfig, ClusteringConfig, FileConfig, LlmConfig, PlaylistConfig, SeedsConfig,
};

use crate::agent::llm::{CompletionOptions, DEFAULT_BASE_URL};
use crate::curation::blender::BlendSettings;
use crate::curation::clustering::KMeansSettings;
use crate::curation::seed_selector::SeedSettings;
use crate::curation::CurationSettings;
use anyhow::{bail, Context, Result};
use std::time::Duration;

/// Model name sent when none is configured. LM Studio answers with
/// whichever model is loaded.
pub const DEFAULT_LLM_MODEL: &str = "local-model";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
    pub kmeans_seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub curation: CurationSettings,
    pub llm: LlmSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            api_key: None,
            temperature: 0.7,
            max_tokens: 1000,
            timeout: Duration::from_secs(120),
        }
    }
}

impl LlmSettings {
    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
            timeout: self.timeout,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();
        let defaults = CurationSettings::default();

        let seeds_file = file.seeds.unwrap_or_default();
        let seeds = SeedSettings {
            max_candidates: seeds_file
                .max_candidates
                .unwrap_or(defaults.seeds.max_candidates),
            max_seeds: seeds_file.max_seeds.unwrap_or(defaults.seeds.max_seeds),
            max_seed_genres: seeds_file
                .max_seed_genres
                .unwrap_or(defaults.seeds.max_seed_genres),
        };

        let blend_file = file.blend.unwrap_or_default();
        let blend = BlendSettings {
            source_fraction: blend_file
                .source_fraction
                .unwrap_or(defaults.blend.source_fraction),
            source_cap: blend_file.source_cap.unwrap_or(defaults.blend.source_cap),
            output_cap: blend_file.output_cap.unwrap_or(defaults.blend.output_cap),
        };

        let clustering_file = file.clustering.unwrap_or_default();
        let kmeans = KMeansSettings {
            seed: clustering_file
                .seed
                .or(cli.kmeans_seed)
                .unwrap_or(defaults.kmeans.seed),
            max_iterations: clustering_file
                .max_iterations
                .unwrap_or(defaults.kmeans.max_iterations),
        };

        let llm_file = file.llm.unwrap_or_default();
        let playlist_file = file.playlist.unwrap_or_default();

        let curation = CurationSettings {
            seeds,
            blend,
            kmeans,
            recommendation_limit: blend_file
                .recommendation_limit
                .unwrap_or(defaults.recommendation_limit),
            feature_batch_size: clustering_file
                .feature_batch_size
                .unwrap_or(defaults.feature_batch_size),
            artist_batch_size: clustering_file
                .artist_batch_size
                .unwrap_or(defaults.artist_batch_size),
            max_described_tracks: llm_file
                .max_described_tracks
                .unwrap_or(defaults.max_described_tracks),
            playlist_batch_size: playlist_file
                .batch_size
                .unwrap_or(defaults.playlist_batch_size),
            empty_fallback_size: playlist_file
                .empty_fallback_size
                .unwrap_or(defaults.empty_fallback_size),
            failure_fallback_size: playlist_file
                .failure_fallback_size
                .unwrap_or(defaults.failure_fallback_size),
        };
        curation
            .validate()
            .context("Invalid curation settings")?;

        let llm_defaults = LlmSettings::default();
        let llm = LlmSettings {
            base_url: llm_file
                .base_url
                .or_else(|| cli.llm_base_url.clone())
                .unwrap_or(llm_defaults.base_url),
            model: llm_file
                .model
                .or_else(|| cli.llm_model.clone())
                .unwrap_or(llm_defaults.model),
            api_key: llm_file.api_key,
            temperature: llm_file.temperature.unwrap_or(llm_defaults.temperature),
            max_tokens: llm_file.max_tokens.unwrap_or(llm_defaults.max_tokens),
            timeout: llm_file
                .timeout_sec
                .map(Duration::from_secs)
                .unwrap_or(llm_defaults.timeout),
        };

        if !(0.0..=2.0).contains(&llm.temperature) {
            bail!("llm.temperature must be within [0, 2], got {}", llm.temperature);
        }
        if llm.timeout.is_zero() {
            bail!("llm.timeout_sec must be positive");
        }

        Ok(Self { curation, llm })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_resolve_defaults() {
        let config = AppConfig::resolve(&CliConfig::default(), None).unwrap();

        assert_eq!(config.curation, CurationSettings::default());
        assert_eq!(config.llm, LlmSettings::default());
        assert_eq!(config.llm.base_url, "http://localhost:1234/v1");
        assert_eq!(config.curation.seeds.max_candidates, 50);
        assert_eq!(config.curation.playlist_batch_size, 100);
    }

    #[test]
    fn test_resolve_cli_only() {
        let cli = CliConfig {
            llm_base_url: Some("http://gpu-box:8080/v1".to_string()),
            llm_model: Some("mistral".to_string()),
            kmeans_seed: Some(7),
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.llm.base_url, "http://gpu-box:8080/v1");
        assert_eq!(config.llm.model, "mistral");
        assert_eq!(config.curation.kmeans.seed, 7);
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let cli = CliConfig {
            llm_base_url: Some("http://cli:1234/v1".to_string()),
            llm_model: Some("cli-model".to_string()),
            kmeans_seed: Some(7),
        };
        let file_config = FileConfig {
            llm: Some(LlmConfig {
                base_url: Some("http://toml:1234/v1".to_string()),
                temperature: Some(0.2),
                ..Default::default()
            }),
            clustering: Some(ClusteringConfig {
                seed: Some(99),
                ..Default::default()
            }),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        // TOML values should override CLI
        assert_eq!(config.llm.base_url, "http://toml:1234/v1");
        assert_eq!(config.curation.kmeans.seed, 99);
        assert_eq!(config.llm.temperature, 0.2);
        // CLI value used when TOML doesn't specify
        assert_eq!(config.llm.model, "cli-model");
    }

    #[test]
    fn test_resolve_rejects_bad_fraction() {
        let file_config = FileConfig {
            blend: Some(BlendConfig {
                source_fraction: Some(1.5),
                ..Default::default()
            }),
            ..Default::default()
        };

        let err = AppConfig::resolve(&CliConfig::default(), Some(file_config)).unwrap_err();
        assert!(err.to_string().contains("Invalid curation settings"));
    }

    #[test]
    fn test_resolve_rejects_seeds_above_candidates() {
        let file_config = FileConfig {
            seeds: Some(SeedsConfig {
                max_candidates: Some(3),
                max_seeds: Some(5),
                ..Default::default()
            }),
            ..Default::default()
        };

        assert!(AppConfig::resolve(&CliConfig::default(), Some(file_config)).is_err());
    }

    #[test]
    fn test_resolve_rejects_zero_timeout() {
        let file_config = FileConfig {
            llm: Some(LlmConfig {
                timeout_sec: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };

        let err = AppConfig::resolve(&CliConfig::default(), Some(file_config)).unwrap_err();
        assert!(err.to_string().contains("timeout_sec"));
    }

    #[test]
    fn test_resolve_rejects_zero_fallback_size() {
        let file_config = FileConfig {
            playlist: Some(PlaylistConfig {
                empty_fallback_size: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };

        let err = AppConfig::resolve(&CliConfig::default(), Some(file_config)).unwrap_err();
        assert!(format!("{:#}", err).contains("empty_fallback_size"));
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[seeds]
max_seeds = 3

[blend]
source_fraction = 0.5
recommendation_limit = 20

[clustering]
seed = 1

[llm]
model = "qwen"
max_described_tracks = 40

[playlist]
batch_size = 25
"#
        )
        .unwrap();

        let file_config = FileConfig::load(file.path()).unwrap();
        let config = AppConfig::resolve(&CliConfig::default(), Some(file_config)).unwrap();

        assert_eq!(config.curation.seeds.max_seeds, 3);
        assert_eq!(config.curation.blend.source_fraction, 0.5);
        assert_eq!(config.curation.recommendation_limit, 20);
        assert_eq!(config.curation.kmeans.seed, 1);
        assert_eq!(config.curation.max_described_tracks, 40);
        assert_eq!(config.curation.playlist_batch_size, 25);
        assert_eq!(config.llm.model, "qwen");
        assert_eq!(config.llm.completion_options().max_tokens, Some(1000));
    }

    #[test]
    fn test_load_rejects_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[seeds\nmax_seeds = ").unwrap();
        let err = FileConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
