//! Prompt-driven track selection backed by a text model.

use super::llm::{CompletionOptions, LlmProvider, Message};
use crate::curation::error::ProviderError;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info, warn};

const SYSTEM_PROMPT: &str =
    "You are a music curator that selects songs based on themes and moods.";

lazy_static! {
    static ref ARRAY_BLOCK: Regex =
        Regex::new(r"(?s)\[.*?\]").expect("Failed to compile array pattern");
    static ref STANDALONE_INTEGER: Regex =
        Regex::new(r"\b\d+\b").expect("Failed to compile integer pattern");
}

/// Picks tracks matching a theme out of a numbered list of descriptions.
#[async_trait]
pub trait TrackSelector: Send + Sync {
    /// Return 0-based indices into `descriptions`. Indices may be out of
    /// range or repeated; callers filter them.
    async fn select(
        &self,
        prompt: &str,
        descriptions: &[String],
    ) -> Result<Vec<usize>, ProviderError>;
}

/// [`TrackSelector`] that asks a chat model for a JSON array of indices.
pub struct LlmTrackSelector {
    provider: Arc<dyn LlmProvider>,
    options: CompletionOptions,
}

impl LlmTrackSelector {
    pub fn new(provider: Arc<dyn LlmProvider>, options: CompletionOptions) -> Self {
        Self { provider, options }
    }

    fn build_messages(prompt: &str, descriptions: &[String]) -> Vec<Message> {
        let user = format!(
            "I have a list of songs and need to select ones that match this theme: \"{}\".\n\n\
             Here are the songs:\n{}\n\n\
             Please respond with ONLY the indices (0-based) of songs that strongly match \
             the theme.\n\
             Format your response as a JSON array of integers, e.g., [0, 5, 10]\n\
             Focus on quality over quantity - only select songs that truly match the theme.",
            prompt,
            descriptions.join("\n")
        );
        vec![Message::system(SYSTEM_PROMPT), Message::user(user)]
    }
}

#[async_trait]
impl TrackSelector for LlmTrackSelector {
    async fn select(
        &self,
        prompt: &str,
        descriptions: &[String],
    ) -> Result<Vec<usize>, ProviderError> {
        info!(
            provider = self.provider.name(),
            model = self.provider.model(),
            candidates = descriptions.len(),
            "Requesting track selection"
        );

        let response = self
            .provider
            .complete(&Self::build_messages(prompt, descriptions), &self.options)
            .await?;

        debug!(response = %response.message.content, "Selection response");
        Ok(parse_indices(&response.message.content))
    }
}

/// Extract indices from free-form model output.
///
/// The first `[...]` block is read as a JSON integer array. If there is none,
/// or it does not parse, every standalone integer in the text is used
/// instead. Negative values are dropped.
pub fn parse_indices(text: &str) -> Vec<usize> {
    if let Some(block) = ARRAY_BLOCK.find(text) {
        match serde_json::from_str::<Vec<i64>>(block.as_str()) {
            Ok(values) => {
                return values
                    .into_iter()
                    .filter_map(|v| usize::try_from(v).ok())
                    .collect();
            }
            Err(e) => warn!(error = %e, "Array block in selection response is not valid JSON"),
        }
    }

    STANDALONE_INTEGER
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<usize>().ok())
        .collect()
}
