//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider name is not one of the known bindings
    #[error("Unknown provider: {name}. Available providers: {}", available.join(", "))]
    UnknownProvider { name: String, available: Vec<String> },

    /// Agent type discriminator is not registered
    #[error("Unknown agent type: {name}. Available agents: {}", available.join(", "))]
    UnknownAgent { name: String, available: Vec<String> },

    /// Required credential is absent from config and environment
    #[error("{provider} API key is required. Set {env_var} environment variable.")]
    MissingApiKey { provider: String, env_var: String },

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool validation failed
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    /// Tool execution failed
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Parse error (e.g., malformed tool call arguments)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Check if error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_) | Self::RateLimited(_) | Self::Io(_)
        )
    }

    /// Hint shown to CLI users alongside the raw error
    pub const fn remediation(&self) -> Option<&'static str> {
        match self {
            Self::MissingApiKey { .. } | Self::Auth(_) => Some(
                "Make sure you have set up your .env file with the required API keys. \
                 Run `ai setup` for interactive configuration.",
            ),
            Self::UnknownProvider { .. } => {
                Some("Run `ai list-providers` to see the supported providers.")
            }
            Self::UnknownAgent { .. } => Some("Run `ai list-agents` to see the available agents."),
            Self::RateLimited(_) => Some("Wait a moment before trying again."),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
