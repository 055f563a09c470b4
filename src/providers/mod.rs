mod json_file;
mod memory;
mod trait_def;

pub use json_file::{JsonFileCatalog, DEFAULT_SOURCE_ID};
pub use memory::{InMemoryCatalog, InMemoryPlaylistStore, StoredPlaylist};
pub use trait_def::{
    CatalogReader, FeatureProvider, GenreProvider, PlaylistWriter, RecommendationProvider,
    RecommendationRequest,
};
