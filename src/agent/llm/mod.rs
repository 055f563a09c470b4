//! Text-model provider abstraction.
//!
//! The track selector only needs a chat completion endpoint; everything
//! behind it is swappable through [`LlmProvider`].

mod openai;
mod provider;
mod types;

pub use openai::{OpenAiCompatibleProvider, DEFAULT_BASE_URL};
pub use provider::{CompletionOptions, LlmError, LlmProvider};
pub use types::{CompletionResponse, FinishReason, Message, MessageRole, TokenUsage};
