//! Language Model Abstraction
//!
//! Defines the single capability the agents need from a provider: generate
//! one assistant turn from a conversation and a set of tools. Provider
//! bindings (OpenAI, Gemini, Bedrock, ...) live in `agent-runtime`; the
//! agents only ever see a [`ModelHandle`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::model::{GenerationOptions, LanguageModel};
//!
//! let model = ProviderFactory::get_model("openai", Some("small"))?;
//! let completion = model.generate(conversation.messages(), &[], &GenerationOptions::default()).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::message::Message;
use crate::tool::{ToolCall, ToolSchema};

/// Shared handle to a provider-bound model
pub type ModelHandle = Arc<dyn LanguageModel>;

/// How the model may use the tools it is offered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    /// Model decides
    #[default]
    Auto,
    /// Tools are described but must not be called
    None,
    /// Model must call at least one tool
    Required,
}

/// Per-request generation settings
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for sampling; provider default when unset
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate; provider default when unset
    #[serde(default)]
    pub max_tokens: Option<u32>,

    #[serde(default)]
    pub tool_choice: ToolChoice,
}

/// One assistant turn returned by a model
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text (may be empty when the turn only calls tools)
    pub content: String,

    /// Tool calls requested in this turn, in the order the provider sent them
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (zero when the provider reports none)
    #[serde(default)]
    pub usage: TokenUsage,

    /// Finish reason
    pub finish_reason: Option<FinishReason>,
}

/// Token usage statistics
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub const fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(rhs.prompt_tokens);
        self.completion_tokens = self.completion_tokens.saturating_add(rhs.completion_tokens);
        self.total_tokens = self.total_tokens.saturating_add(rhs.total_tokens);
    }
}

/// Reason for completion finishing
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolUse,
    ContentFilter,
    Error,
}

/// A provider-bound language model
///
/// Implement this trait to add support for new LLM backends.
/// The agents work exclusively through this interface.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Provider name (e.g. "openai")
    fn provider(&self) -> &str;

    /// Provider-level model identifier (e.g. "gpt-4o-mini")
    fn model_id(&self) -> &str;

    /// Generate one assistant turn.
    ///
    /// `messages` starts with the system message when there is one. Tools
    /// are only advertised; executing them is the caller's job.
    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion>;
}

const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Call `generate`, retrying retryable failures up to `max_retries` times
/// with exponential backoff.
pub async fn generate_with_retries(
    model: &dyn LanguageModel,
    messages: &[Message],
    tools: &[ToolSchema],
    options: &GenerationOptions,
    max_retries: u32,
) -> Result<Completion> {
    let mut attempt = 0;
    loop {
        match model.generate(messages, tools, options).await {
            Err(err) if err.is_retryable() && attempt < max_retries => {
                let delay = RETRY_BASE_DELAY * 2u32.pow(attempt);
                attempt += 1;
                tracing::warn!(
                    provider = model.provider(),
                    model = model.model_id(),
                    attempt,
                    error = %err,
                    "Retrying generation after {delay:?}"
                );
                tokio::time::sleep(delay).await;
            }
            other => return other,
        }
    }
}
