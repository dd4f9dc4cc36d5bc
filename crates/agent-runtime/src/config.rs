//! Provider Names, Model Tiers and Credentials
//!
//! Everything needed to turn `("openai", "small")` into a concrete model id
//! and a set of credentials, without touching the network.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use agent_core::{AgentError, Result};
use serde::Serialize;

/// Environment lookup, injectable for tests
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Reads the process environment, treating empty values as unset
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Supported provider bindings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    OpenAi,
    Gemini,
    Bedrock,
}

impl ProviderName {
    /// In the order used for default-provider detection
    pub const ALL: [Self; 3] = [Self::OpenAi, Self::Gemini, Self::Bedrock];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::Bedrock => "bedrock",
        }
    }

    /// Name used in user-facing messages
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Gemini => "Gemini",
            Self::Bedrock => "Bedrock",
        }
    }

    pub const fn tiers(self) -> ModelTiers {
        match self {
            Self::OpenAi => ModelTiers {
                small: "gpt-4o-mini",
                default: "gpt-4o",
                large: "gpt-4-turbo",
            },
            Self::Gemini => ModelTiers {
                small: "gemini-1.5-flash-8b",
                default: "gemini-1.5-flash",
                large: "gemini-1.5-pro",
            },
            Self::Bedrock => ModelTiers {
                small: "anthropic.claude-3-haiku-20240307-v1:0",
                default: "anthropic.claude-3-sonnet-20240229-v1:0",
                large: "anthropic.claude-3-opus-20240229-v1:0",
            },
        }
    }

    /// Variables that must be set for the provider to work
    pub const fn required_env_vars(self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => &["OPENAI_API_KEY"],
            Self::Gemini => &["GEMINI_API_KEY"],
            Self::Bedrock => &["AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY"],
        }
    }

    pub const fn optional_env_vars(self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => &["OPENAI_BASE_URL", "OPENAI_ORGANIZATION"],
            Self::Gemini => &["GEMINI_BASE_URL"],
            Self::Bedrock => &["AWS_REGION", "AWS_SESSION_TOKEN", "BEDROCK_BASE_URL"],
        }
    }

    const fn base_url_env(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_BASE_URL",
            Self::Gemini => "GEMINI_BASE_URL",
            Self::Bedrock => "BEDROCK_BASE_URL",
        }
    }

    /// Resolve a tier name or literal model id; `None` means the default tier
    pub fn resolve_model(self, tier_or_name: Option<&str>) -> String {
        let tiers = self.tiers();
        match tier_or_name.map(str::trim).filter(|s| !s.is_empty()) {
            None => tiers.default.to_string(),
            Some(value) => value
                .parse::<ModelTier>()
                .map_or_else(|()| value.to_string(), |tier| tiers.get(tier).to_string()),
        }
    }

    /// Whether every required variable is present
    pub fn has_required_env(self, env: EnvLookup<'_>) -> bool {
        self.required_env_vars().iter().all(|key| env(key).is_some())
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderName {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AgentError::UnknownProvider {
                name: s.to_string(),
                available: Self::ALL.iter().map(|p| p.as_str().to_string()).collect(),
            })
    }
}

/// Named model-quality/cost bucket
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Small,
    Default,
    Large,
}

impl FromStr for ModelTier {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "default" => Ok(Self::Default),
            "large" => Ok(Self::Large),
            _ => Err(()),
        }
    }
}

/// Concrete model ids per tier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ModelTiers {
    pub small: &'static str,
    pub default: &'static str,
    pub large: &'static str,
}

impl ModelTiers {
    pub const fn get(&self, tier: ModelTier) -> &'static str {
        match tier {
            ModelTier::Small => self.small,
            ModelTier::Default => self.default,
            ModelTier::Large => self.large,
        }
    }
}

/// Credentials and endpoint settings for one provider.
///
/// Fields left unset are filled from the environment by
/// [`ProviderConfig::with_env_fallback`].
#[derive(Clone, Default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub organization: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("organization", &self.organization)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &self.secret_access_key.as_ref().map(|_| "<redacted>"))
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ProviderConfig {
    /// Explicit values win; anything unset comes from `env`
    #[must_use]
    pub fn with_env_fallback(mut self, provider: ProviderName, env: EnvLookup<'_>) -> Self {
        fn fill(slot: &mut Option<String>, env: EnvLookup<'_>, key: &str) {
            if slot.as_deref().is_none_or(|v| v.trim().is_empty()) {
                *slot = env(key);
            }
        }

        fill(&mut self.base_url, env, provider.base_url_env());
        match provider {
            ProviderName::OpenAi => {
                fill(&mut self.api_key, env, "OPENAI_API_KEY");
                fill(&mut self.organization, env, "OPENAI_ORGANIZATION");
            }
            ProviderName::Gemini => fill(&mut self.api_key, env, "GEMINI_API_KEY"),
            ProviderName::Bedrock => {
                fill(&mut self.region, env, "AWS_REGION");
                fill(&mut self.access_key_id, env, "AWS_ACCESS_KEY_ID");
                fill(&mut self.secret_access_key, env, "AWS_SECRET_ACCESS_KEY");
                fill(&mut self.session_token, env, "AWS_SESSION_TOKEN");
            }
        }
        self
    }

    /// Non-empty value or a `MissingApiKey` error naming `env_var`
    pub(crate) fn require(value: Option<&String>, provider: ProviderName, env_var: &str) -> Result<String> {
        value
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AgentError::MissingApiKey {
                provider: provider.display_name().to_string(),
                env_var: env_var.to_string(),
            })
    }
}

/// Summary used by `list-providers`
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub name: ProviderName,
    pub models: ModelTiers,
    pub default_model: &'static str,
    pub required_env_vars: Vec<&'static str>,
    pub optional_env_vars: Vec<&'static str>,
}

impl From<ProviderName> for ProviderInfo {
    fn from(name: ProviderName) -> Self {
        let models = name.tiers();
        Self {
            name,
            models,
            default_model: models.default,
            required_env_vars: name.required_env_vars().to_vec(),
            optional_env_vars: name.optional_env_vars().to_vec(),
        }
    }
}
