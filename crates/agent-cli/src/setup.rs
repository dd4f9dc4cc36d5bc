//! Interactive setup wizard

use std::io::{BufRead, Write};
use std::path::PathBuf;

use agent_runtime::ProviderName;
use anyhow::Context;

use crate::config::ConfigManager;
use crate::style;

/// What the wizard wrote
#[derive(Debug)]
pub struct SetupSummary {
    pub default_provider: ProviderName,
    pub config_path: PathBuf,
    pub env_path: Option<PathBuf>,
}

/// Walk the user through choosing a default provider and entering keys.
///
/// The default provider is merged into the existing config file; keys go to
/// the per-user env file.
pub fn run_setup<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    manager: &ConfigManager,
) -> anyhow::Result<SetupSummary> {
    writeln!(out, "\n🚀 AI Agent Setup Wizard\n")?;
    writeln!(out, "This will help you configure your API keys and preferences.\n")?;

    let names: Vec<&str> = ProviderName::ALL.iter().map(|p| p.as_str()).collect();
    writeln!(out, "Available providers: {}", names.join(", "))?;

    let default_provider = loop {
        let answer = ask(input, out, "Default provider (openai): ")?.unwrap_or_default();
        if answer.is_empty() {
            break ProviderName::OpenAi;
        }
        match answer.parse::<ProviderName>() {
            Ok(provider) => break provider,
            Err(err) => writeln!(out, "{}", style::warning(err))?,
        }
    };

    let mut vars: Vec<(&str, String)> = Vec::new();

    if default_provider == ProviderName::OpenAi || confirm(input, out, "\nSet up OpenAI? (y/N): ")? {
        if let Some(key) = ask(input, out, "OpenAI API key: ")?.filter(|k| !k.is_empty()) {
            vars.push(("OPENAI_API_KEY", key));
        }
    }

    if default_provider == ProviderName::Gemini || confirm(input, out, "\nSet up Gemini? (y/N): ")? {
        if let Some(key) = ask(input, out, "Gemini API key: ")?.filter(|k| !k.is_empty()) {
            vars.push(("GEMINI_API_KEY", key));
        }
    }

    if default_provider == ProviderName::Bedrock || confirm(input, out, "\nSet up AWS Bedrock? (y/N): ")? {
        for (var, label) in [
            ("AWS_ACCESS_KEY_ID", "AWS access key id: "),
            ("AWS_SECRET_ACCESS_KEY", "AWS secret access key: "),
            ("AWS_REGION", "AWS region (us-east-1): "),
        ] {
            if let Some(value) = ask(input, out, label)?.filter(|v| !v.is_empty()) {
                vars.push((var, value));
            }
        }
    }

    let mut config = manager.load();
    config.default_provider = Some(default_provider.to_string());
    let config_path = manager.save(&config).context("Failed to save configuration")?;
    writeln!(out, "{}", style::success(format!("✅ Configuration saved to {}", config_path.display())))?;

    let env_path = if vars.is_empty() {
        None
    } else {
        let path = manager.update_env_file(&vars).context("Failed to save API keys")?;
        writeln!(out, "{}", style::success(format!("\n✅ API keys saved to {}", path.display())))?;
        Some(path)
    };

    writeln!(out, "\n✨ Setup complete! You can now use ai commands.\n")?;
    writeln!(out, "Try: ai run weather \"What's the weather in Boston?\"\n")?;

    Ok(SetupSummary {
        default_provider,
        config_path,
        env_path,
    })
}

/// Print `question` and read one trimmed line; `None` at end of input
fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> std::io::Result<Option<String>> {
    write!(out, "{question}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn confirm<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> std::io::Result<bool> {
    Ok(ask(input, out, question)?.is_some_and(|a| a.eq_ignore_ascii_case("y")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;

    fn run(answers: &str, manager: &ConfigManager) -> (SetupSummary, String) {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut out = Vec::new();
        let summary = run_setup(&mut input, &mut out, manager).unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_defaults_to_openai() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::new(dir.path());

        // provider, openai key, gemini? n, bedrock? n
        let (summary, output) = run("\nsk-test\nn\nn\n", &manager);

        assert_eq!(summary.default_provider, ProviderName::OpenAi);
        assert_eq!(manager.try_load().unwrap().default_provider.as_deref(), Some("openai"));
        assert_eq!(fs::read_to_string(manager.env_path()).unwrap(), "OPENAI_API_KEY=sk-test\n");
        assert!(output.contains("Setup complete"));
    }

    #[test]
    fn test_invalid_provider_is_asked_again() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::new(dir.path());

        // bad provider, gemini, openai? n, gemini key, bedrock? n
        let (summary, output) = run("mistral\ngemini\nn\ng-key\nn\n", &manager);

        assert_eq!(summary.default_provider, ProviderName::Gemini);
        assert!(output.contains("Unknown provider: mistral"));
        assert_eq!(fs::read_to_string(manager.env_path()).unwrap(), "GEMINI_API_KEY=g-key\n");
    }

    #[test]
    fn test_existing_settings_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::new(dir.path());
        let mut config = manager.load();
        config.default_tier = Some("small".into());
        manager.save(&config).unwrap();

        // bedrock, openai? n, gemini? n, empty aws answers
        let (summary, _) = run("bedrock\nn\nn\n\n\n\n", &manager);

        assert_eq!(summary.default_provider, ProviderName::Bedrock);
        assert!(summary.env_path.is_none());
        let saved = manager.try_load().unwrap();
        assert_eq!(saved.default_provider.as_deref(), Some("bedrock"));
        assert_eq!(saved.default_tier.as_deref(), Some("small"));
    }

    #[test]
    fn test_end_of_input_finishes_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::new(dir.path());
        let (summary, _) = run("", &manager);
        assert_eq!(summary.default_provider, ProviderName::OpenAi);
        assert!(summary.env_path.is_none());
    }
}
