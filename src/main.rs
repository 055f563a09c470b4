use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pezzottify_curator::agent::llm::{LlmProvider, OpenAiCompatibleProvider};
use pezzottify_curator::agent::LlmTrackSelector;
use pezzottify_curator::config::{AppConfig, CliConfig, FileConfig};
use pezzottify_curator::curation::models::Track;
use pezzottify_curator::curation::namer::{self, PlaylistMetadata};
use pezzottify_curator::curation::{ClusteringMethod, Curator, Selection};
use pezzottify_curator::providers::{
    CatalogReader, InMemoryCatalog, InMemoryPlaylistStore, JsonFileCatalog, StoredPlaylist,
    DEFAULT_SOURCE_ID,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(name = "curator")]
#[command(about = "Curate playlists from a track collection")]
struct CliArgs {
    /// Path to a TOML config file. Its values override command-line flags.
    #[clap(long, global = true, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Base URL of an OpenAI-compatible API.
    #[clap(long, global = true)]
    pub llm_url: Option<String>,

    /// Model name sent to the text model.
    #[clap(long, global = true)]
    pub llm_model: Option<String>,

    /// Seed for k-means initialisation.
    #[clap(long, global = true)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct CatalogArgs {
    /// JSON file with tracks: an array, or an object of source id to array.
    #[clap(long, value_parser = parse_path)]
    pub tracks: PathBuf,

    /// Source collection to read from the tracks file.
    #[clap(long, default_value = DEFAULT_SOURCE_ID)]
    pub source: String,

    /// JSON object of track id to audio features.
    #[clap(long, value_parser = parse_path)]
    pub features: Option<PathBuf>,

    /// JSON object of artist id to genre tags.
    #[clap(long, value_parser = parse_path)]
    pub genres: Option<PathBuf>,

    /// Also create the resulting playlist(s) and report their ids.
    #[clap(long)]
    pub publish: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pick tracks closest to the mood of a prompt using audio features.
    Generate {
        #[command(flatten)]
        catalog: CatalogArgs,

        #[clap(long)]
        prompt: String,

        /// Maximum number of tracks to select.
        #[clap(long, default_value_t = 50)]
        limit: usize,
    },

    /// Ask a text model to pick tracks matching a prompt.
    Select {
        #[command(flatten)]
        catalog: CatalogArgs,

        #[clap(long)]
        prompt: String,
    },

    /// Split a collection into clusters.
    Cluster {
        #[command(flatten)]
        catalog: CatalogArgs,

        /// Number of clusters.
        #[clap(long, default_value_t = 5)]
        clusters: usize,

        /// One of: feature (alias kmeans), genre, artist.
        #[clap(long, default_value = "feature")]
        method: String,
    },

    /// Check that the configured text model answers.
    LlmHealth,
}

#[derive(Serialize)]
struct SelectionOutput<'a> {
    #[serde(flatten)]
    selection: &'a Selection,
    published: Vec<StoredPlaylist>,
}

#[derive(Serialize)]
struct ClusterOutput<'a> {
    #[serde(flatten)]
    metadata: PlaylistMetadata,
    tracks: &'a [&'a Track],
}

#[derive(Serialize)]
struct ClusteringOutput<'a> {
    method: ClusteringMethod,
    clusters: Vec<ClusterOutput<'a>>,
    published: Vec<StoredPlaylist>,
}

struct Loaded {
    curator: Curator,
    tracks: Vec<Track>,
}

async fn load(config: &AppConfig, args: &CatalogArgs) -> Result<Loaded> {
    let catalog: Arc<InMemoryCatalog> = Arc::new(JsonFileCatalog::load(
        &args.tracks,
        args.features.as_deref(),
        args.genres.as_deref(),
    )?);
    let tracks = catalog
        .read_tracks(&args.source)
        .await
        .with_context(|| format!("Failed to read source {}", args.source))?;
    info!(source = %args.source, tracks = tracks.len(), "Loaded source collection");

    let curator = Curator::new(config.curation.clone(), catalog.clone(), catalog);
    Ok(Loaded { curator, tracks })
}

fn llm_provider(config: &AppConfig) -> Arc<dyn LlmProvider> {
    Arc::new(OpenAiCompatibleProvider::new(
        config.llm.base_url.clone(),
        config.llm.model.clone(),
        config.llm.api_key.clone(),
    ))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

async fn print_selection(curator: &Curator, selection: &Selection, publish: bool) -> Result<()> {
    let store = InMemoryPlaylistStore::new();
    if publish {
        curator
            .publish(&store, &selection.metadata, &selection.tracks)
            .await?;
    }
    print_json(&SelectionOutput {
        selection,
        published: store.playlists(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialise logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let cli_config = CliConfig {
        llm_base_url: cli_args.llm_url.clone(),
        llm_model: cli_args.llm_model.clone(),
        kmeans_seed: cli_args.seed,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    match cli_args.command {
        Command::Generate {
            catalog,
            prompt,
            limit,
        } => {
            let loaded = load(&config, &catalog).await?;
            let selection = loaded
                .curator
                .curate_by_features(&loaded.tracks, &prompt, limit)
                .await?;
            print_selection(&loaded.curator, &selection, catalog.publish).await
        }
        Command::Select { catalog, prompt } => {
            let loaded = load(&config, &catalog).await?;
            let selector =
                LlmTrackSelector::new(llm_provider(&config), config.llm.completion_options());
            let curator = loaded.curator.with_selector(Arc::new(selector));
            let selection = curator.curate_with_selector(&loaded.tracks, &prompt).await?;
            print_selection(&curator, &selection, catalog.publish).await
        }
        Command::Cluster {
            catalog,
            clusters,
            method,
        } => {
            let method: ClusteringMethod = method.parse()?;
            let loaded = load(&config, &catalog).await?;
            let partition = loaded
                .curator
                .cluster_collection(&loaded.tracks, clusters, method)
                .await?;

            let store = InMemoryPlaylistStore::new();
            if catalog.publish {
                loaded
                    .curator
                    .publish_clusters(&store, &partition, method)
                    .await?;
            }

            let clusters = partition
                .iter()
                .filter(|cluster| !cluster.is_empty())
                .enumerate()
                .map(|(index, cluster)| ClusterOutput {
                    metadata: namer::cluster_metadata(index, cluster, method),
                    tracks: &cluster.tracks,
                })
                .collect();
            print_json(&ClusteringOutput {
                method,
                clusters,
                published: store.playlists(),
            })
        }
        Command::LlmHealth => {
            let provider = llm_provider(&config);
            match provider.health_check().await {
                Ok(()) => {
                    info!(
                        url = %config.llm.base_url,
                        model = provider.model(),
                        "Text model is reachable"
                    );
                    Ok(())
                }
                Err(e) => bail!("Text model at {} is not reachable: {}", config.llm.base_url, e),
            }
        }
    }
}
