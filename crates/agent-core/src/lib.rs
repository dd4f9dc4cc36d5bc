//! # agent-core
//!
//! Core agent logic with a provider-agnostic model abstraction, a tool
//! registry and the bounded multi-step execution loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Agent                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  Execution  │  │    Tools    │  │   LanguageModel     │  │
//! │  │    Loop     │──│   Registry  │──│   (ModelHandle)     │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LanguageModel` trait lets agents run against OpenAI, Gemini, Bedrock
//! or a scripted test model without changing agent logic.

pub mod agent;
pub mod error;
pub mod execution;
pub mod message;
pub mod model;
pub mod tool;

pub use agent::{Agent, AgentConfig, AgentContext, AgentOutput, AgentResult, ResultMetadata};
pub use error::{AgentError, Result};
pub use execution::{ExecutionLoop, MAX_STEPS, StepLog, execute_agent};
pub use message::{Conversation, Message, Role};
pub use model::{Completion, GenerationOptions, LanguageModel, ModelHandle, TokenUsage};
pub use tool::{ParameterSchema, Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
