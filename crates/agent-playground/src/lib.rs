//! # agent-playground
//!
//! Built-in tools and agents for the `ai` command-line playground.
//!
//! ## Agents
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  weather  WeatherAgent     tools: weather                   │
//! │  multi    MultiToolAgent   tools: caller-chosen subset      │
//! │                            (default: every registered tool) │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both run the same bounded execution loop from `agent-core`; they differ
//! only in default prompt and tool selection.

pub mod agents;
pub mod error;
pub mod prompts;
pub mod tools;

pub use agents::{AgentKind, AgentOverrides, MultiToolAgent, WeatherAgent, create_agent, list_agents};
pub use error::{PlaygroundError, Result};
pub use tools::builtin_registry;
