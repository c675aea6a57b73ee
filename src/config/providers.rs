//! Upstream provider configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::routing::ProviderRouter;

/// Upstream base addresses and the provider used when none is requested
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    /// Provider used when `X-LLM-Provider` is absent
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// OpenAI base URL
    #[serde(default = "default_openai_base")]
    pub openai_base: String,

    /// Anthropic base URL
    #[serde(default = "default_anthropic_base")]
    pub anthropic_base: String,

    /// Cohere base URL
    #[serde(default = "default_cohere_base")]
    pub cohere_base: String,

    /// Self-hosted base URL used by the `local` and `ollama` providers
    pub local_base: Option<String>,
}

impl ProvidersConfig {
    /// Build the routing table from this configuration
    pub fn router(&self) -> ProviderRouter {
        ProviderRouter::empty()
            .with_provider("openai", self.openai_base.clone())
            .with_provider("anthropic", self.anthropic_base.clone())
            .with_provider("cohere", self.cohere_base.clone())
            .with_self_hosted(self.local_base.clone())
    }

    /// Validate provider configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let bases = [
            ("openai", Some(&self.openai_base)),
            ("anthropic", Some(&self.anthropic_base)),
            ("cohere", Some(&self.cohere_base)),
            ("local", self.local_base.as_ref().filter(|b| !b.is_empty())),
        ];
        for (name, base) in bases {
            if let Some(base) = base {
                if !is_http_url(base) {
                    return Err(ValidationError::InvalidProviderUrl(name.to_string()));
                }
            }
        }
        if self.router().route(&self.default_provider).is_none() {
            return Err(ValidationError::UnroutableDefaultProvider(
                self.default_provider.clone(),
            ));
        }
        Ok(())
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            openai_base: default_openai_base(),
            anthropic_base: default_anthropic_base(),
            cohere_base: default_cohere_base(),
            local_base: None,
        }
    }
}

pub(super) fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_openai_base() -> String {
    "https://api.openai.com".to_string()
}

fn default_anthropic_base() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_cohere_base() -> String {
    "https://api.cohere.ai".to_string()
}
