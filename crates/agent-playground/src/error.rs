//! Error Types for the Playground Tools

use agent_core::AgentError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlaygroundError>;

#[derive(Error, Debug)]
pub enum PlaygroundError {
    #[error("Failed to fetch weather for {location}: {cause}")]
    WeatherFetch { location: String, cause: String },

    #[error("Weather source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<PlaygroundError> for AgentError {
    fn from(err: PlaygroundError) -> Self {
        Self::ToolExecution(err.to_string())
    }
}
