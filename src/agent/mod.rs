//! Text-model backed collaborators.

pub mod llm;
pub mod selector;

pub use selector::{parse_indices, LlmTrackSelector, TrackSelector};
