//! Command-line interface definition

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ai", version, about = "AI Agent Playground CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run an agent with a query
    Run(RunArgs),

    /// Quick weather lookup (shortcut for the weather agent)
    Weather {
        /// Place to look up, e.g. "Exeter, NH"
        location: String,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Chat directly with a model, without tools
    Chat {
        prompt: String,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// List all available agents
    ListAgents,

    /// List providers, their model tiers and credential status
    ListProviders,

    /// Interactive setup for provider keys and defaults
    Setup,

    /// Show configuration paths and current settings
    Config,
}

/// Provider and model selection shared by the model-backed commands
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// LLM provider (openai, gemini, bedrock)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Model id or tier (small, default, large)
    #[arg(short, long)]
    pub model: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Agent type (see `ai list-agents`)
    pub agent: String,

    pub query: String,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Custom system prompt
    #[arg(long)]
    pub system: Option<String>,

    /// Comma-separated tool names (multi agent only)
    #[arg(long, value_delimiter = ',')]
    pub tools: Option<Vec<String>>,

    /// Print the full result envelope as JSON
    #[arg(long)]
    pub json: bool,
}
