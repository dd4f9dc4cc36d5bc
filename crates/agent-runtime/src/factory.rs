//! Provider Factory
//!
//! Turns a provider name and a tier or model name into a [`ModelHandle`].

use std::sync::Arc;

use agent_core::{ModelHandle, Result};

use crate::bedrock::BedrockModel;
use crate::config::{EnvLookup, ProviderConfig, ProviderInfo, ProviderName, process_env};
use crate::gemini::GeminiModel;
use crate::openai::OpenAiModel;

/// Entry point for building provider-bound models
#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderFactory;

impl ProviderFactory {
    /// Known providers, in default-detection order
    pub const fn list_providers() -> &'static [ProviderName] {
        &ProviderName::ALL
    }

    pub fn provider_info(provider: ProviderName) -> ProviderInfo {
        provider.into()
    }

    /// Model for `provider` using credentials from the process environment.
    ///
    /// `tier_or_name` is a tier (`small`, `default`, `large`) or a literal
    /// model id; `None` selects the default tier.
    pub fn get_model(provider: &str, tier_or_name: Option<&str>) -> Result<ModelHandle> {
        Self::create_model(
            provider.parse()?,
            tier_or_name,
            ProviderConfig::default(),
            &process_env,
        )
    }

    /// Model for `provider` with explicit settings layered over `env`
    pub fn create_model(
        provider: ProviderName,
        tier_or_name: Option<&str>,
        overrides: ProviderConfig,
        env: EnvLookup<'_>,
    ) -> Result<ModelHandle> {
        let model_id = provider.resolve_model(tier_or_name);
        let config = overrides.with_env_fallback(provider, env);

        tracing::debug!(%provider, model = %model_id, "Creating model");
        let model: ModelHandle = match provider {
            ProviderName::OpenAi => Arc::new(OpenAiModel::new(model_id, &config)?),
            ProviderName::Gemini => Arc::new(GeminiModel::new(model_id, &config)?),
            ProviderName::Bedrock => Arc::new(BedrockModel::new(model_id, &config)?),
        };
        Ok(model)
    }
}
