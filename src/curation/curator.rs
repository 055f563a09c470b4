//! Curation flows over the async collaborators.
//!
//! The pure components (prompt analysis, aggregation, seeding, blending,
//! clustering, naming) are synchronous; [`Curator`] fetches whatever external
//! data a flow needs, runs them in order and turns the outcome into a
//! [`Selection`] or a set of clusters.

use super::blender::{blend, BlendSettings};
use super::clustering::{ClusteringEngine, ClusteringMethod, KMeansSettings};
use super::error::{CurationError, InputError};
use super::feature_aggregator::{adjust_from_prompt, average};
use super::models::{AudioFeatures, Cluster, Track};
use super::namer::{self, PlaylistMetadata};
use super::prompt_analyzer::analyze;
use super::sampling::random_sample;
use super::seed_selector::{select_seeds, SeedSettings};
use crate::agent::selector::TrackSelector;
use crate::providers::{
    FeatureProvider, GenreProvider, PlaylistWriter, RecommendationProvider, RecommendationRequest,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

// =============================================================================
// Settings
// =============================================================================

/// Every tunable used by [`Curator`].
#[derive(Debug, Clone, PartialEq)]
pub struct CurationSettings {
    pub seeds: SeedSettings,
    pub blend: BlendSettings,
    pub kmeans: KMeansSettings,
    /// Number of tracks requested from the recommendation provider.
    pub recommendation_limit: usize,
    /// Track ids per feature lookup.
    pub feature_batch_size: usize,
    /// Artist ids per genre lookup.
    pub artist_batch_size: usize,
    /// How many source tracks are shown to the track selector.
    pub max_described_tracks: usize,
    /// Track URIs per playlist append.
    pub playlist_batch_size: usize,
    /// Fallback sample size when a prompt-driven pass selects nothing.
    pub empty_fallback_size: usize,
    /// Fallback sample size when the track selector fails.
    pub failure_fallback_size: usize,
}

impl Default for CurationSettings {
    fn default() -> Self {
        Self {
            seeds: SeedSettings::default(),
            blend: BlendSettings::default(),
            kmeans: KMeansSettings::default(),
            recommendation_limit: 50,
            feature_batch_size: 100,
            artist_batch_size: 50,
            max_described_tracks: 100,
            playlist_batch_size: 100,
            empty_fallback_size: 3,
            failure_fallback_size: 5,
        }
    }
}

impl CurationSettings {
    /// Reject combinations the flows cannot work with.
    pub fn validate(&self) -> Result<(), InputError> {
        let positive = [
            ("seeds.max_candidates", self.seeds.max_candidates),
            ("seeds.max_seeds", self.seeds.max_seeds),
            ("blend.output_cap", self.blend.output_cap),
            ("clustering.max_iterations", self.kmeans.max_iterations),
            ("recommendation_limit", self.recommendation_limit),
            ("feature_batch_size", self.feature_batch_size),
            ("artist_batch_size", self.artist_batch_size),
            ("max_described_tracks", self.max_described_tracks),
            ("playlist_batch_size", self.playlist_batch_size),
            ("empty_fallback_size", self.empty_fallback_size),
            ("failure_fallback_size", self.failure_fallback_size),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(InputError::InvalidSetting(format!("{} must be positive", name)));
        }
        if self.seeds.max_seeds > self.seeds.max_candidates {
            return Err(InputError::InvalidSetting(format!(
                "seeds.max_seeds ({}) exceeds seeds.max_candidates ({})",
                self.seeds.max_seeds, self.seeds.max_candidates
            )));
        }
        if !(0.0..=1.0).contains(&self.blend.source_fraction) {
            return Err(InputError::InvalidSetting(format!(
                "blend.source_fraction must be within [0, 1], got {}",
                self.blend.source_fraction
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Results
// =============================================================================

/// How a [`Selection`] came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionOrigin {
    /// The flow itself picked the tracks.
    Curated,
    /// The flow picked nothing (or failed) and a random sample of the
    /// source was substituted.
    Fallback,
}

/// Outcome of a prompt-driven flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub tracks: Vec<Track>,
    pub origin: SelectionOrigin,
    pub metadata: PlaylistMetadata,
}

impl Selection {
    pub fn is_fallback(&self) -> bool {
        self.origin == SelectionOrigin::Fallback
    }
}

/// A playlist created through a [`PlaylistWriter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedPlaylist {
    pub id: String,
    pub name: String,
    pub track_count: usize,
}

// =============================================================================
// Curator
// =============================================================================

/// Runs curation flows against a set of collaborators.
pub struct Curator {
    settings: CurationSettings,
    engine: ClusteringEngine,
    features: Arc<dyn FeatureProvider>,
    genres: Arc<dyn GenreProvider>,
    recommendations: Option<Arc<dyn RecommendationProvider>>,
    selector: Option<Arc<dyn TrackSelector>>,
}

impl Curator {
    pub fn new(
        settings: CurationSettings,
        features: Arc<dyn FeatureProvider>,
        genres: Arc<dyn GenreProvider>,
    ) -> Self {
        let engine = ClusteringEngine::new(settings.kmeans.clone());
        Self {
            settings,
            engine,
            features,
            genres,
            recommendations: None,
            selector: None,
        }
    }

    pub fn with_recommendations(mut self, provider: Arc<dyn RecommendationProvider>) -> Self {
        self.recommendations = Some(provider);
        self
    }

    pub fn with_selector(mut self, selector: Arc<dyn TrackSelector>) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn settings(&self) -> &CurationSettings {
        &self.settings
    }

    // =========================================================================
    // Prompt-driven flows
    // =========================================================================

    /// Seed a recommendation request from the source and the prompt, then
    /// blend the recommendations with a sample of the source.
    pub async fn curate_with_recommendations(
        &self,
        tracks: &[Track],
        prompt: &str,
    ) -> Result<Selection, CurationError> {
        validate_prompt_input(tracks, prompt)?;
        let provider = self.recommendations.as_ref().ok_or_else(|| {
            InputError::InvalidSetting("No recommendation provider configured".to_string())
        })?;

        let seeds = select_seeds(
            tracks,
            self.settings.seeds.max_candidates,
            self.settings.seeds.max_seeds,
        );
        let seed_ids: Vec<String> = seeds.iter().map(|t| t.id.clone()).collect();
        let seed_features = self.fetch_features(&seed_ids).await;

        let signal = analyze(prompt);
        let target = adjust_from_prompt(
            &signal,
            average(seeds.iter().map(|t| seed_features.get(&t.id))),
        );

        let request = RecommendationRequest {
            seed_track_ids: seed_ids,
            seed_genres: signal
                .genres
                .iter()
                .take(self.settings.seeds.max_seed_genres)
                .cloned()
                .collect(),
            target,
            limit: self.settings.recommendation_limit,
        };
        debug!(
            seeds = request.seed_track_ids.len(),
            genres = ?request.seed_genres,
            target = ?request.target,
            "Requesting recommendations"
        );

        let recommended = provider.recommend(&request).await?;
        info!(recommended = recommended.len(), "Received recommendations");

        let blended = blend(recommended, tracks, &self.settings.blend);
        Ok(self.finish(tracks, prompt, blended, "blending"))
    }

    /// Rank the source by distance to a prompt-adjusted feature target.
    ///
    /// Needs no recommendation provider. Tracks without complete features
    /// are skipped.
    pub async fn curate_by_features(
        &self,
        tracks: &[Track],
        prompt: &str,
        limit: usize,
    ) -> Result<Selection, CurationError> {
        validate_prompt_input(tracks, prompt)?;
        if limit == 0 {
            return Err(InputError::InvalidSetting("limit must be positive".to_string()).into());
        }

        let ids: Vec<String> = tracks.iter().map(|t| t.id.clone()).collect();
        let features = self.fetch_features(&ids).await;

        let target = adjust_from_prompt(
            &analyze(prompt),
            average(tracks.iter().map(|t| features.get(&t.id))),
        );
        let target_vector = target.feature_vector();

        let mut ranked: Vec<(f64, &Track)> = tracks
            .iter()
            .filter_map(|t| {
                let vector = features.get(&t.id)?.feature_vector()?;
                Some((euclidean(&vector, &target_vector), t))
            })
            .collect();
        ranked.sort_by(|(a, _), (b, _)| a.total_cmp(b));

        debug!(
            ranked = ranked.len(),
            skipped = tracks.len() - ranked.len(),
            target = ?target,
            "Ranked tracks by feature distance"
        );

        let selected = ranked.into_iter().take(limit).map(|(_, t)| t.clone()).collect();
        Ok(self.finish(tracks, prompt, selected, "feature ranking"))
    }

    /// Ask the configured [`TrackSelector`] to pick tracks matching the
    /// prompt from a numbered list of the source.
    pub async fn curate_with_selector(
        &self,
        tracks: &[Track],
        prompt: &str,
    ) -> Result<Selection, CurationError> {
        validate_prompt_input(tracks, prompt)?;
        let selector = self
            .selector
            .as_ref()
            .ok_or_else(|| InputError::InvalidSetting("No track selector configured".to_string()))?;

        let descriptions: Vec<String> = tracks
            .iter()
            .take(self.settings.max_described_tracks)
            .enumerate()
            .map(|(i, t)| describe(i, t))
            .collect();

        let indices = match selector.select(prompt, &descriptions).await {
            Ok(indices) => indices,
            Err(e) => {
                warn!(error = %e, "Track selection failed, using a random sample");
                return Ok(self.fallback(tracks, prompt, self.settings.failure_fallback_size));
            }
        };

        let mut seen: HashSet<&str> = HashSet::new();
        let selected: Vec<Track> = indices
            .into_iter()
            .filter_map(|i| tracks.get(i))
            .filter(|t| seen.insert(t.id.as_str()))
            .cloned()
            .collect();

        Ok(self.finish(tracks, prompt, selected, "track selection"))
    }

    /// Wrap a flow's output, substituting a random sample when it is empty.
    fn finish(
        &self,
        source: &[Track],
        prompt: &str,
        selected: Vec<Track>,
        stage: &'static str,
    ) -> Selection {
        if selected.is_empty() {
            let empty = CurationError::SelectionEmpty { stage };
            warn!(error = %empty, "Falling back to a random sample");
            return self.fallback(source, prompt, self.settings.empty_fallback_size);
        }

        info!(selected = selected.len(), stage, "Curated selection");
        Selection {
            metadata: namer::name(&selected, prompt),
            tracks: selected,
            origin: SelectionOrigin::Curated,
        }
    }

    fn fallback(&self, source: &[Track], prompt: &str, size: usize) -> Selection {
        let tracks: Vec<Track> = random_sample(&mut rand::rng(), source, size)
            .into_iter()
            .cloned()
            .collect();
        Selection {
            metadata: namer::name(&tracks, prompt),
            tracks,
            origin: SelectionOrigin::Fallback,
        }
    }

    // =========================================================================
    // Clustering
    // =========================================================================

    /// Fetch whatever `method` needs and partition `tracks` into
    /// `num_clusters` groups.
    pub async fn cluster_collection<'a>(
        &self,
        tracks: &'a [Track],
        num_clusters: usize,
        method: ClusteringMethod,
    ) -> Result<Vec<Cluster<'a>>, CurationError> {
        if tracks.is_empty() {
            return Err(InputError::EmptySource.into());
        }
        if num_clusters < 1 || num_clusters >= tracks.len() {
            return Err(InputError::InvalidClusterCount {
                requested: num_clusters,
                available: tracks.len(),
            }
            .into());
        }

        let (features, genres) = match method {
            ClusteringMethod::Feature => {
                let ids: Vec<String> = tracks.iter().map(|t| t.id.clone()).collect();
                (self.fetch_features(&ids).await, HashMap::new())
            }
            ClusteringMethod::Genre => (HashMap::new(), self.fetch_genres(tracks).await),
            ClusteringMethod::Artist => (HashMap::new(), HashMap::new()),
        };

        let clusters = self
            .engine
            .cluster(tracks, num_clusters, method, &features, &genres)?;

        if clusters.iter().all(|c| c.is_empty()) {
            return Err(CurationError::SelectionEmpty { stage: "clustering" });
        }

        info!(
            method = %method,
            clusters = clusters.len(),
            sizes = ?clusters.iter().map(|c| c.len()).collect::<Vec<_>>(),
            "Clustered collection"
        );
        Ok(clusters)
    }

    // =========================================================================
    // Publishing
    // =========================================================================

    /// Create a playlist and fill it in batches of `playlist_batch_size`.
    pub async fn publish<'t, I>(
        &self,
        writer: &dyn PlaylistWriter,
        metadata: &PlaylistMetadata,
        tracks: I,
    ) -> Result<PublishedPlaylist, CurationError>
    where
        I: IntoIterator<Item = &'t Track>,
    {
        let uris: Vec<String> = tracks.into_iter().map(|t| t.uri.clone()).collect();
        let id = writer
            .create_playlist(&metadata.name, &metadata.description)
            .await?;

        for batch in uris.chunks(self.settings.playlist_batch_size.max(1)) {
            writer.append_tracks(&id, batch).await?;
        }

        info!(playlist = %id, name = %metadata.name, tracks = uris.len(), "Published playlist");
        Ok(PublishedPlaylist {
            id,
            name: metadata.name.clone(),
            track_count: uris.len(),
        })
    }

    /// One playlist per non-empty cluster, numbered in order.
    pub async fn publish_clusters(
        &self,
        writer: &dyn PlaylistWriter,
        clusters: &[Cluster<'_>],
        method: ClusteringMethod,
    ) -> Result<Vec<PublishedPlaylist>, CurationError> {
        let mut published = Vec::new();
        for (index, cluster) in clusters.iter().filter(|c| !c.is_empty()).enumerate() {
            let metadata = namer::cluster_metadata(index, cluster, method);
            published.push(
                self.publish(writer, &metadata, cluster.tracks.iter().copied())
                    .await?,
            );
        }
        Ok(published)
    }

    // =========================================================================
    // Collaborator lookups
    // =========================================================================

    /// Batched feature lookup. A failed batch is treated as missing data.
    async fn fetch_features(&self, track_ids: &[String]) -> HashMap<String, AudioFeatures> {
        let mut found = HashMap::new();
        for batch in track_ids.chunks(self.settings.feature_batch_size.max(1)) {
            match self.features.audio_features(batch).await {
                Ok(features) => found.extend(features),
                Err(e) => warn!(
                    error = %e,
                    batch_size = batch.len(),
                    "Feature lookup failed, treating batch as missing"
                ),
            }
        }
        debug!(requested = track_ids.len(), found = found.len(), "Fetched audio features");
        found
    }

    /// Batched genre lookup over the distinct artists of `tracks`. A failed
    /// batch is treated as missing data.
    async fn fetch_genres(&self, tracks: &[Track]) -> HashMap<String, Vec<String>> {
        let mut seen: HashSet<&str> = HashSet::new();
        let artist_ids: Vec<String> = tracks
            .iter()
            .flat_map(|t| t.artists.iter())
            .filter(|a| seen.insert(a.id.as_str()))
            .map(|a| a.id.clone())
            .collect();

        let mut found = HashMap::new();
        for batch in artist_ids.chunks(self.settings.artist_batch_size.max(1)) {
            match self.genres.artist_genres(batch).await {
                Ok(genres) => found.extend(genres),
                Err(e) => warn!(
                    error = %e,
                    batch_size = batch.len(),
                    "Genre lookup failed, treating batch as missing"
                ),
            }
        }
        debug!(requested = artist_ids.len(), found = found.len(), "Fetched artist genres");
        found
    }
}

fn validate_prompt_input(tracks: &[Track], prompt: &str) -> Result<(), InputError> {
    if tracks.is_empty() {
        return Err(InputError::EmptySource);
    }
    if prompt.trim().is_empty() {
        return Err(InputError::MissingPrompt);
    }
    Ok(())
}

/// `"{i}: '{name}' by {artist, artist}"`
fn describe(index: usize, track: &Track) -> String {
    format!("{}: '{}' by {}", index, track.name, track.artist_names())
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
