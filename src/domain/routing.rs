//! Logical provider name to upstream base address.

use std::collections::HashMap;

/// Provider names that resolve to the self-hosted base address.
pub const SELF_HOSTED_PROVIDERS: [&str; 2] = ["local", "ollama"];

/// Built-in upstreams.
pub const DEFAULT_PROVIDERS: [(&str, &str); 3] = [
    ("openai", "https://api.openai.com"),
    ("anthropic", "https://api.anthropic.com"),
    ("cohere", "https://api.cohere.ai"),
];

/// Case-insensitive routing table.
#[derive(Debug, Clone)]
pub struct ProviderRouter {
    bases: HashMap<String, String>,
    self_hosted: Option<String>,
}

impl ProviderRouter {
    /// Creates a router with the built-in providers and no self-hosted base.
    pub fn new() -> Self {
        let bases = DEFAULT_PROVIDERS
            .iter()
            .map(|(name, base)| (name.to_string(), base.to_string()))
            .collect();
        Self {
            bases,
            self_hosted: None,
        }
    }

    /// Creates a router with no providers at all.
    pub fn empty() -> Self {
        Self {
            bases: HashMap::new(),
            self_hosted: None,
        }
    }

    /// Adds or replaces a provider's base address.
    pub fn with_provider(mut self, name: &str, base: impl Into<String>) -> Self {
        self.bases
            .insert(name.to_ascii_lowercase(), normalize_base(base.into()));
        self
    }

    /// Sets the base address used by the self-hosted provider names.
    pub fn with_self_hosted(mut self, base: Option<String>) -> Self {
        self.self_hosted = base.filter(|b| !b.is_empty()).map(normalize_base);
        self
    }

    /// Resolves `provider` to its base address.
    ///
    /// Configured entries win; the self-hosted names fall back to the
    /// self-hosted base. `None` means the provider is unknown.
    pub fn route(&self, provider: &str) -> Option<&str> {
        let name = provider.to_ascii_lowercase();
        if let Some(base) = self.bases.get(&name) {
            return Some(base);
        }
        if SELF_HOSTED_PROVIDERS.contains(&name.as_str()) {
            return self.self_hosted.as_deref();
        }
        None
    }
}

impl Default for ProviderRouter {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_base(base: String) -> String {
    base.trim_end_matches('/').to_string()
}
