//! # agent-runtime
//!
//! Model provider bindings for the agent playground.
//!
//! ## Providers
//!
//! - **OpenAI**: Chat Completions with function calling
//! - **Gemini**: `generateContent` with function declarations
//! - **Bedrock**: Converse API, SigV4-signed
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::ProviderFactory;
//!
//! let model = ProviderFactory::get_model("openai", Some("small"))?;
//! let agent = create_agent("weather", model, AgentOverrides::default(), registry)?;
//! ```

pub mod bedrock;
pub mod config;
pub mod factory;
pub mod gemini;
mod http;
pub mod openai;
pub mod sigv4;

pub use bedrock::BedrockModel;
pub use config::{EnvLookup, ModelTier, ModelTiers, ProviderConfig, ProviderInfo, ProviderName, process_env};
pub use factory::ProviderFactory;
pub use gemini::GeminiModel;
pub use openai::OpenAiModel;

// Re-export core types for convenience
pub use agent_core::{AgentError, LanguageModel, ModelHandle, Result};
