//! Pezzottify Curator Library
//!
//! Curates subsets of a track collection, either by matching a free-text
//! mood prompt or by partitioning the collection into clusters.

pub mod agent;
pub mod config;
pub mod curation;
pub mod providers;

// Re-export commonly used types for convenience
pub use curation::{
    ClusteringEngine, ClusteringMethod, CurationError, CurationSettings, Curator, Selection,
    SelectionOrigin,
};
pub use providers::{
    CatalogReader, FeatureProvider, GenreProvider, InMemoryCatalog, PlaylistWriter,
    RecommendationProvider,
};
