//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{curator_with_fixture_catalog, fixture_tracks};
//!
//! #[tokio::test]
//! async fn test_generate() {
//!     let curator = curator_with_fixture_catalog();
//!     let selection = curator
//!         .curate_by_features(&fixture_tracks(), "calm", 4)
//!         .await
//!         .unwrap();
//!     assert_eq!(selection.tracks.len(), 4);
//! }
//! ```

mod constants;
mod fixtures;

use pezzottify_curator::curation::{CurationSettings, Curator};
use std::sync::Arc;

// Public API - this is what tests import
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::*;

/// Curator backed by the fixture catalogue with default settings.
#[allow(dead_code)]
pub fn curator_with_fixture_catalog() -> Curator {
    curator_with_settings(CurationSettings::default())
}

#[allow(dead_code)]
pub fn curator_with_settings(settings: CurationSettings) -> Curator {
    let catalog = Arc::new(fixture_catalog());
    Curator::new(settings, catalog.clone(), catalog)
}
