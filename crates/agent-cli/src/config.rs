//! Global Configuration
//!
//! Per-user settings persisted as JSON under `~/.config/ai-agent/`, plus the
//! rules for picking a default provider and model tier.

use std::fs;
use std::path::{Path, PathBuf};

use agent_runtime::{EnvLookup, ProviderConfig, ProviderName};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONFIG_DIR: &str = ".config/ai-agent";
const CONFIG_FILE: &str = "config.json";
const ENV_FILE: &str = ".env.ai-agent";

/// Provider used when nothing is configured and no credentials are found
pub const FALLBACK_PROVIDER: ProviderName = ProviderName::Gemini;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Neither HOME nor USERPROFILE is set; cannot locate the config directory")]
    HomeNotSet,

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid line in {}: {source}", path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// API keys stored in the config file
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeys {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anthropic: Option<String>,
}

impl ApiKeys {
    const fn is_empty(&self) -> bool {
        self.openai.is_none() && self.gemini.is_none() && self.anthropic.is_none()
    }
}

/// Contents of `config.json`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_tier: Option<String>,
    #[serde(default, skip_serializing_if = "ApiKeys::is_empty")]
    pub api_keys: ApiKeys,
}

impl GlobalConfig {
    /// Configured default provider, else the first one with credentials in
    /// `env`, else [`FALLBACK_PROVIDER`]
    pub fn resolve_provider_name(&self, env: EnvLookup<'_>) -> String {
        if let Some(provider) = self.default_provider.as_deref().filter(|p| !p.trim().is_empty()) {
            return provider.to_string();
        }
        ProviderName::ALL
            .into_iter()
            .find(|p| p.has_required_env(env))
            .unwrap_or(FALLBACK_PROVIDER)
            .to_string()
    }

    /// `--model`, else `defaultModel`, else `defaultTier`, else `default`
    pub fn resolve_tier(&self, cli_model: Option<&str>) -> String {
        [cli_model, self.default_model.as_deref(), self.default_tier.as_deref()]
            .into_iter()
            .flatten()
            .find(|v| !v.trim().is_empty())
            .unwrap_or("default")
            .to_string()
    }

    /// Credentials from `apiKeys` for `provider`; environment fills the rest
    pub fn provider_overrides(&self, provider: ProviderName) -> ProviderConfig {
        let api_key = match provider {
            ProviderName::OpenAi => self.api_keys.openai.clone(),
            ProviderName::Gemini => self.api_keys.gemini.clone(),
            ProviderName::Bedrock => None,
        };
        ProviderConfig {
            api_key,
            ..Default::default()
        }
    }
}

/// Locates and persists configuration files
#[derive(Clone, Debug)]
pub struct ConfigManager {
    home: PathBuf,
}

impl ConfigManager {
    /// Rooted at an explicit home directory
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Rooted at the user's home directory
    pub fn from_env() -> Result<Self> {
        home_dir().map(Self::new).ok_or(ConfigError::HomeNotSet)
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn config_dir(&self) -> PathBuf {
        self.home.join(CONFIG_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir().join(CONFIG_FILE)
    }

    pub fn env_path(&self) -> PathBuf {
        self.home.join(ENV_FILE)
    }

    fn ensure_config_dir(&self) -> Result<()> {
        let dir = self.config_dir();
        fs::create_dir_all(&dir).map_err(|source| ConfigError::Io { path: dir, source })
    }

    /// Read the config file; a missing file is an empty config
    pub fn try_load(&self) -> Result<GlobalConfig> {
        let path = self.config_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(GlobalConfig::default()),
            Err(source) => return Err(ConfigError::Io { path, source }),
        };
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Like [`Self::try_load`], but an unreadable file is logged and ignored
    pub fn load(&self) -> GlobalConfig {
        self.try_load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Ignoring unreadable config file");
            GlobalConfig::default()
        })
    }

    /// Write `config` as pretty-printed JSON, returning the path written
    pub fn save(&self, config: &GlobalConfig) -> Result<PathBuf> {
        self.ensure_config_dir()?;
        let path = self.config_path();
        let content = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, content + "\n").map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Saved config");
        Ok(path)
    }

    /// Set `vars` in the env file, keeping any other entries already there
    pub fn update_env_file(&self, vars: &[(&str, String)]) -> Result<PathBuf> {
        let path = self.env_path();
        let mut entries: Vec<(String, String)> = Vec::new();

        if path.exists() {
            let iter = dotenvy::from_path_iter(&path).map_err(|source| ConfigError::EnvFile {
                path: path.clone(),
                source,
            })?;
            for item in iter {
                let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                    path: path.clone(),
                    source,
                })?;
                entries.push((key, value));
            }
        }

        for (key, value) in vars {
            match entries.iter_mut().find(|(k, _)| k == key) {
                Some(entry) => entry.1.clone_from(value),
                None => entries.push(((*key).to_string(), value.clone())),
            }
        }

        let content: String = entries.iter().map(|(k, v)| format!("{k}={v}\n")).collect();
        fs::write(&path, content).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Home directory from `HOME` (or `USERPROFILE` on Windows)
pub fn home_dir() -> Option<PathBuf> {
    ["HOME", "USERPROFILE"]
        .into_iter()
        .find_map(|key| std::env::var_os(key).filter(|v| !v.is_empty()))
        .map(PathBuf::from)
}
