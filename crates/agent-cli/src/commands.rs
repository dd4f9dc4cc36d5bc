//! Command handlers
//!
//! Every handler writes to the given output so it can be exercised in tests;
//! `main` passes stdout.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use agent_core::model::{GenerationOptions, generate_with_retries};
use agent_core::{AgentContext, AgentError, AgentResult, Message, ModelHandle, ToolRegistry};
use agent_playground::prompts::CHAT_PROMPT;
use agent_playground::{AgentOverrides, create_agent, list_agents};
use agent_runtime::{EnvLookup, ProviderFactory, ProviderName};
use anyhow::Context;

use crate::cli::{Command, ModelArgs, RunArgs};
use crate::config::{ConfigManager, GlobalConfig};
use crate::setup::run_setup;
use crate::style;

/// Retries for `chat`, which calls the model without the agent loop
const CHAT_MAX_RETRIES: u32 = 3;

/// Tier used by `weather` when no `--model` is given
const WEATHER_TIER: &str = "small";

/// How a command finished when it did not hit a fatal error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The agent ran but reported a failure result
    AgentFailed,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Completed => Self::SUCCESS,
            Outcome::AgentFailed => Self::FAILURE,
        }
    }
}

/// Process-wide state shared by the commands
pub struct Session<'a> {
    pub config: GlobalConfig,
    pub manager: Option<ConfigManager>,
    pub registry: Arc<ToolRegistry>,
    pub env: EnvLookup<'a>,
}

/// A model resolved from command-line flags and config
struct ResolvedModel {
    provider: ProviderName,
    tier: String,
    model: ModelHandle,
}

impl Session<'_> {
    fn resolve_model(&self, args: &ModelArgs) -> Result<ResolvedModel, AgentError> {
        let provider: ProviderName = match &args.provider {
            Some(name) => name.parse()?,
            None => self.config.resolve_provider_name(self.env).parse()?,
        };
        let tier = self.config.resolve_tier(args.model.as_deref());
        let model = ProviderFactory::create_model(
            provider,
            Some(&tier),
            self.config.provider_overrides(provider),
            self.env,
        )?;
        Ok(ResolvedModel { provider, tier, model })
    }
}

pub async fn dispatch<W: Write>(command: Command, session: &Session<'_>, out: &mut W) -> anyhow::Result<Outcome> {
    match command {
        Command::Run(args) => run(session, &args, out).await,
        Command::Weather { location, mut model } => {
            model.model.get_or_insert_with(|| WEATHER_TIER.to_string());
            let args = RunArgs {
                agent: "weather".into(),
                query: format!("What's the weather in {location}?"),
                model,
                system: None,
                tools: None,
                json: false,
            };
            run(session, &args, out).await
        }
        Command::Chat { prompt, model } => {
            let resolved = session.resolve_model(&model)?;
            writeln!(out, "{}", style::info(format!("\n💬 Chatting with {}...\n", resolved.provider)))?;
            chat(&resolved.model, &prompt, out).await?;
            Ok(Outcome::Completed)
        }
        Command::ListAgents => {
            print_agents(out)?;
            Ok(Outcome::Completed)
        }
        Command::ListProviders => {
            print_providers(out, session.env)?;
            Ok(Outcome::Completed)
        }
        Command::Config => {
            print_config(out, session)?;
            Ok(Outcome::Completed)
        }
        Command::Setup => {
            let manager = session
                .manager
                .as_ref()
                .context("Cannot run setup without a home directory")?;
            let stdin = std::io::stdin();
            run_setup(&mut stdin.lock(), out, manager)?;
            Ok(Outcome::Completed)
        }
    }
}

async fn run<W: Write>(session: &Session<'_>, args: &RunArgs, out: &mut W) -> anyhow::Result<Outcome> {
    let resolved = session.resolve_model(&args.model)?;
    if !args.json {
        writeln!(out, "{}", style::info(format!("\n🤖 Starting {} agent...", args.agent)))?;
        writeln!(out, "📝 Query: \"{}\"", args.query)?;
        writeln!(
            out,
            "{}",
            style::info(format!("🔧 Using {} ({})\n", resolved.provider, resolved.tier))
        )?;
    }
    run_agent(args, resolved.model, Arc::clone(&session.registry), out).await
}

/// Build the agent named in `args`, run it once and print the result
pub async fn run_agent<W: Write>(
    args: &RunArgs,
    model: ModelHandle,
    registry: Arc<ToolRegistry>,
    out: &mut W,
) -> anyhow::Result<Outcome> {
    let overrides = AgentOverrides {
        system_prompt: args.system.clone(),
        tools: args.tools.clone(),
        ..Default::default()
    };
    let agent = create_agent(&args.agent, model, overrides, registry)?;
    let result = agent.execute(&AgentContext::new(args.query.clone())).await;

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
    } else {
        print_result(out, &result)?;
    }

    Ok(if result.success {
        Outcome::Completed
    } else {
        Outcome::AgentFailed
    })
}

fn print_result<W: Write>(out: &mut W, result: &AgentResult) -> std::io::Result<()> {
    match (&result.data, &result.error) {
        (Some(data), _) if result.success => {
            writeln!(out, "{}", style::success("✅ Success!\n"))?;
            writeln!(out, "Response: {}", data.text)?;
            if let Some(count) = result.metadata.tool_calls.filter(|c| *c > 0) {
                writeln!(out, "{}", style::info(format!("\n📊 Tools used: {count}")))?;
            }
        }
        (_, error) => {
            let message = error.as_deref().unwrap_or(agent_core::execution::FALLBACK_ERROR_MESSAGE);
            writeln!(out, "{} {message}", style::error("❌ Error:"))?;
        }
    }
    writeln!(out, "{}", style::info(format!("⏱️  Duration: {}ms", result.metadata.duration)))
}

/// One direct generation with the chat prompt, retrying transient failures
pub async fn chat<W: Write>(model: &ModelHandle, prompt: &str, out: &mut W) -> anyhow::Result<()> {
    let messages = [Message::system(CHAT_PROMPT), Message::user(prompt)];
    let completion = generate_with_retries(
        model.as_ref(),
        &messages,
        &[],
        &GenerationOptions::default(),
        CHAT_MAX_RETRIES,
    )
    .await?;
    writeln!(out, "{}", completion.content)?;
    Ok(())
}

fn print_agents<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{}", style::info("\n📋 Available Agents:\n"))?;
    for (name, description) in list_agents() {
        writeln!(out, "  - {name}: {}", style::dim(description))?;
    }
    writeln!(out)
}

fn print_providers<W: Write>(out: &mut W, env: EnvLookup<'_>) -> std::io::Result<()> {
    writeln!(out, "{}", style::info("\n📋 Available Providers:\n"))?;

    for provider in ProviderFactory::list_providers() {
        let info = ProviderFactory::provider_info(*provider);
        writeln!(out, "{}:", info.name)?;
        writeln!(out, "  Models:")?;
        writeln!(out, "    Small:   {}", info.models.small)?;
        writeln!(out, "    Default: {}", info.models.default)?;
        writeln!(out, "    Large:   {}", info.models.large)?;

        writeln!(out, "  Required environment variables:")?;
        for &var in &info.required_env_vars {
            let status = if env(var).is_some() {
                style::success("✅")
            } else {
                style::error("❌")
            };
            writeln!(out, "    {status} {var}")?;
        }

        writeln!(out, "  Optional environment variables:")?;
        for &var in &info.optional_env_vars {
            let status = if env(var).is_some() { "✅" } else { "⚪" };
            writeln!(out, "    {status} {var}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn print_config<W: Write>(out: &mut W, session: &Session<'_>) -> std::io::Result<()> {
    writeln!(out, "{}", style::info("\n📁 Configuration Locations:\n"))?;
    match &session.manager {
        Some(manager) => {
            writeln!(out, "Config file: {}", manager.config_path().display())?;
            writeln!(out, "Environment file: {}", manager.env_path().display())?;
        }
        None => writeln!(out, "{}", style::warning("Home directory unknown; config files unavailable"))?,
    }

    let config = &session.config;
    let settings = [
        ("Default provider", config.default_provider.as_deref()),
        ("Default model", config.default_model.as_deref()),
        ("Default model tier", config.default_tier.as_deref()),
    ];
    if settings.iter().any(|(_, v)| v.is_some()) {
        writeln!(out, "\nCurrent settings:")?;
        for (label, value) in settings {
            if let Some(value) = value {
                writeln!(out, "  {label}: {value}")?;
            }
        }
    }

    writeln!(out, "\nCurrent environment:")?;
    let mut any = false;
    for provider in ProviderFactory::list_providers() {
        for &var in provider.required_env_vars() {
            if let Some(value) = (session.env)(var) {
                any = true;
                writeln!(out, "  {} {var}: {}", style::success("✓"), style::mask_secret(&value))?;
            }
        }
    }
    if !any {
        writeln!(out, "  {}", style::warning("No API keys configured"))?;
    }
    Ok(())
}
