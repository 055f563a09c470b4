//! OpenAI-compatible text-model provider.
//!
//! Talks to any server implementing the chat completions API, including a
//! local LM Studio instance.

use super::provider::{CompletionOptions, LlmError, LlmProvider};
use super::types::{CompletionResponse, FinishReason, Message, TokenUsage};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default endpoint of a local LM Studio server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:1234/v1";

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);
const HEALTH_CHECK_PROMPT: &str = "Say hello";
const HEALTH_CHECK_MAX_TOKENS: u32 = 10;

/// Provider for OpenAI-compatible chat completion endpoints.
pub struct OpenAiCompatibleProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiCompatibleProvider {
    /// # Arguments
    /// * `base_url` - Base URL of the API, without the trailing
    ///   `/chat/completions` (e.g. "http://localhost:1234/v1").
    /// * `model` - Model identifier sent with each request.
    /// * `api_key` - Optional bearer token; local servers need none.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("Authorization", format!("Bearer {}", key)),
            None => builder,
        }
    }

    fn build_request(&self, messages: &[Message], options: &CompletionOptions) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: messages.iter().map(ChatMessage::from).collect(),
            temperature: Some(options.temperature),
            max_tokens: options.max_tokens,
        }
    }
}

fn map_send_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Connection(e.to_string())
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        let request = self.build_request(messages, options);

        debug!(
            model = %self.model,
            message_count = messages.len(),
            "Sending completion request"
        );

        let response = self
            .authorize(self.client.post(self.completions_url()).json(&request))
            .timeout(options.timeout)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        parse_response(body)
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        let options = CompletionOptions {
            max_tokens: Some(HEALTH_CHECK_MAX_TOKENS),
            timeout: HEALTH_CHECK_TIMEOUT,
            ..CompletionOptions::default()
        };
        let request = self.build_request(&[Message::user(HEALTH_CHECK_PROMPT)], &options);

        let response = self
            .authorize(self.client.post(self.completions_url()).json(&request))
            .timeout(options.timeout)
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            return Err(LlmError::Api {
                status: response.status().as_u16(),
                message: "Health check failed".to_string(),
            });
        }

        Ok(())
    }
}

fn parse_response(body: ChatResponse) -> Result<CompletionResponse, LlmError> {
    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

    let finish_reason = match choice.finish_reason.as_deref() {
        Some("length") => FinishReason::MaxTokens,
        _ => FinishReason::Stop,
    };

    let usage = body.usage.map(|u| TokenUsage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    debug!(finish_reason = ?finish_reason, "Received completion response");

    Ok(CompletionResponse {
        message: Message::assistant(choice.message.content.unwrap_or_default()),
        finish_reason,
        usage,
    })
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

impl From<&Message> for ChatMessage {
    fn from(msg: &Message) -> Self {
        ChatMessage {
            role: msg.role.as_str(),
            content: msg.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
