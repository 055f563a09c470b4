//! Track curation engine.
//!
//! Turns a collection of tracks plus a free-text prompt into a curated
//! selection, or partitions a collection into clusters. Everything except
//! [`curator`] is synchronous and free of I/O.

pub mod blender;
pub mod clustering;
pub mod curator;
pub mod error;
pub mod feature_aggregator;
pub mod models;
pub mod namer;
pub mod prompt_analyzer;
pub mod sampling;
pub mod seed_selector;

pub use clustering::{ClusteringEngine, ClusteringMethod};
pub use curator::{CurationSettings, Curator, PublishedPlaylist, Selection, SelectionOrigin};
pub use error::{CurationError, ErrorKind, InputError, ProviderError};
pub use models::{AudioFeatures, Cluster, Feature, PromptSignal, TargetFeatures, Track};
pub use namer::PlaylistMetadata;
