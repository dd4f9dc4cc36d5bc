//! `ai`: command-line playground for LLM agents
//!
//! Runs the built-in agents against OpenAI, Gemini or Bedrock and manages
//! the per-user configuration under `~/.config/ai-agent`.

mod cli;
mod commands;
mod config;
mod env;
mod setup;
mod style;

use std::process::ExitCode;
use std::sync::Arc;

use agent_core::AgentError;
use agent_playground::builtin_registry;
use agent_runtime::process_env;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::commands::Session;
use crate::config::ConfigManager;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so `--json` output stays parseable
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let manager = ConfigManager::from_env()
        .inspect_err(|err| tracing::warn!(error = %err, "Per-user configuration disabled"))
        .ok();
    match std::env::current_dir() {
        Ok(cwd) => {
            env::load_environment(&cwd, manager.as_ref().map(ConfigManager::home));
        }
        Err(err) => tracing::warn!(error = %err, "Cannot determine working directory"),
    }
    if !env::has_any_key(&process_env) {
        eprintln!("{}\n", style::warning(env::MISSING_KEYS_GUIDANCE));
    }

    let session = Session {
        config: manager.as_ref().map(ConfigManager::load).unwrap_or_default(),
        manager,
        registry: Arc::new(builtin_registry()),
        env: &process_env,
    };

    let mut stdout = std::io::stdout();
    match commands::dispatch(cli.command, &session, &mut stdout).await {
        Ok(outcome) => outcome.into(),
        Err(err) => {
            eprintln!("{} {err:#}", style::error("❌ Fatal error:"));
            if let Some(tip) = err.downcast_ref::<AgentError>().and_then(AgentError::remediation) {
                eprintln!("{} {tip}", style::warning("💡 Tip:"));
            }
            ExitCode::FAILURE
        }
    }
}
