//! Execution Loop
//!
//! Bounded multi-step tool orchestration. Each step asks the model for one
//! turn; if the turn requests tools they are executed in order and their
//! results are appended to the conversation for the next step. The loop
//! stops at the first turn without tool calls or after `max_steps` turns.
//!
//! The loop owns the step log and threads it through every step, so step
//! `N + 1` is only recorded after step `N` (including its tool calls) has
//! fully returned.

use serde::Serialize;
use std::time::Instant;

use crate::agent::{AgentConfig, AgentContext, AgentOutput, AgentResult};
use crate::error::Result;
use crate::message::{Conversation, Message};
use crate::model::{GenerationOptions, LanguageModel, TokenUsage, generate_with_retries};
use crate::tool::{ToolCall, ToolRegistry, ToolResult};

/// Step ceiling shared by the built-in agents
pub const MAX_STEPS: usize = 3;

/// Error text used when the underlying error has no message
pub const FALLBACK_ERROR_MESSAGE: &str = "Unknown error occurred";

/// Telemetry for one step
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepLog {
    /// 1-based, equal to one plus the number of earlier steps
    pub step_number: usize,
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    /// Results of `tool_calls`, in the same order
    pub tool_results: Vec<ToolResult>,
}

/// The bounded step driver
pub struct ExecutionLoop<'a> {
    model: &'a dyn LanguageModel,
    tools: &'a ToolRegistry,
    system_prompt: &'a str,
    max_steps: usize,
    max_retries: u32,
    options: GenerationOptions,
}

impl<'a> ExecutionLoop<'a> {
    pub fn new(model: &'a dyn LanguageModel, tools: &'a ToolRegistry, system_prompt: &'a str) -> Self {
        Self {
            model,
            tools,
            system_prompt,
            max_steps: MAX_STEPS,
            max_retries: 0,
            options: GenerationOptions::default(),
        }
    }

    /// Override the step ceiling (at least one step always runs)
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Retries for each model call that fails with a retryable error.
    ///
    /// Only the call is repeated; a step is never re-run once its tools
    /// have executed.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the loop for `query`.
    ///
    /// Any generation or tool error aborts the run; nothing partial is
    /// returned.
    pub async fn run(&self, query: &str) -> Result<AgentOutput> {
        let mut conversation = Conversation::with_system_prompt(self.system_prompt);
        conversation.push(Message::user(query));

        let schemas = self.tools.schemas();
        let mut steps: Vec<StepLog> = Vec::with_capacity(self.max_steps);
        let mut usage = TokenUsage::default();

        loop {
            let step_number = steps.len() + 1;
            tracing::debug!(
                step = step_number,
                model = self.model.model_id(),
                tools = schemas.len(),
                "Starting step"
            );

            let completion = generate_with_retries(
                self.model,
                conversation.messages(),
                &schemas,
                &self.options,
                self.max_retries,
            )
            .await?;
            usage += completion.usage;

            let tool_results = self.dispatch(&completion.tool_calls).await?;

            conversation.push(Message::assistant_with_tool_calls(
                completion.content.clone(),
                completion.tool_calls.clone(),
            ));
            for (call, result) in completion.tool_calls.iter().zip(&tool_results) {
                conversation.push(Message::tool(result, call.id.clone()));
            }

            steps.push(StepLog {
                step_number,
                text: completion.content.clone(),
                tool_calls: completion.tool_calls.clone(),
                tool_results,
            });

            if completion.tool_calls.is_empty() || steps.len() >= self.max_steps {
                tracing::debug!(
                    steps = steps.len(),
                    natural = completion.tool_calls.is_empty(),
                    "Execution finished"
                );
                return Ok(AgentOutput {
                    text: completion.content,
                    tool_calls: completion.tool_calls,
                    usage,
                    steps,
                });
            }
        }
    }

    /// Execute one step's tool calls sequentially, in arrival order
    async fn dispatch(&self, calls: &[ToolCall]) -> Result<Vec<ToolResult>> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            tracing::debug!(tool = %call.name, id = %call.id, "Executing tool");
            let result = self.tools.execute(call).await?;
            if !result.success {
                tracing::debug!(tool = %call.name, output = %result.output, "Tool reported failure");
            }
            results.push(result);
        }
        Ok(results)
    }
}

/// The custom prompt, or `default` when it is absent or empty
pub fn resolve_system_prompt<'a>(custom: Option<&'a str>, default: &'a str) -> &'a str {
    custom.filter(|p| !p.is_empty()).unwrap_or(default)
}

/// Run an agent invocation and wrap the outcome in an [`AgentResult`].
///
/// This is the catch boundary: errors become a failure envelope and the
/// elapsed time is reported either way. `max_retries` applies to each model
/// call, see [`ExecutionLoop::with_max_retries`].
pub async fn execute_agent(
    config: &AgentConfig,
    tools: &ToolRegistry,
    default_system_prompt: &str,
    context: &AgentContext,
    max_retries: u32,
) -> AgentResult {
    let started = Instant::now();
    let system_prompt = resolve_system_prompt(config.system_prompt.as_deref(), default_system_prompt);

    let outcome = ExecutionLoop::new(config.model.as_ref(), tools, system_prompt)
        .with_options(context.generation_options())
        .with_max_retries(max_retries)
        .run(&context.query)
        .await;
    let duration = elapsed_millis(started);

    match outcome {
        Ok(output) => {
            tracing::info!(
                agent = %config.name,
                steps = output.steps.len(),
                tool_calls = output.tool_calls.len(),
                duration_ms = duration,
                "Agent finished"
            );
            AgentResult::success(output, duration, config.model.model_id())
        }
        Err(err) => {
            tracing::warn!(agent = %config.name, error = %err, duration_ms = duration, "Agent failed");
            let message = err.to_string();
            if message.is_empty() {
                AgentResult::failure(FALLBACK_ERROR_MESSAGE, duration)
            } else {
                AgentResult::failure(message, duration)
            }
        }
    }
}

fn elapsed_millis(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
