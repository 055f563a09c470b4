//! Error taxonomy for curation requests.

use crate::agent::llm::LlmError;
use thiserror::Error;

/// Problems with the request itself. Never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Source collection is empty")]
    EmptySource,

    #[error("No prompt provided")]
    MissingPrompt,

    #[error("Invalid number of clusters {requested} for {available} tracks")]
    InvalidClusterCount { requested: usize, available: usize },

    #[error("Unsupported clustering method: {0}")]
    UnsupportedMethod(String),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

/// Failures of an external collaborator.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider request failed: {0}")]
    Request(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Text model error: {0}")]
    Llm(#[from] LlmError),
}

/// Coarse classification of a [`CurationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Provider,
    SelectionEmpty,
}

/// Errors returned by curation operations.
#[derive(Debug, Error)]
pub enum CurationError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("No tracks left after {stage}")]
    SelectionEmpty { stage: &'static str },
}

impl CurationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CurationError::Input(_) => ErrorKind::Input,
            CurationError::Provider(_) => ErrorKind::Provider,
            CurationError::SelectionEmpty { .. } => ErrorKind::SelectionEmpty,
        }
    }
}
