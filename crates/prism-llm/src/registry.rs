//! Maps resolved provider kinds to configured vendor adapters

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::bail;
use prism_config::{LlmConfig, VendorType};
use prism_models::{ProviderKind, Vendor};

use crate::error::LlmError;
use crate::provider::anthropic::AnthropicProvider;
use crate::provider::google::GoogleProvider;
use crate::provider::openai::OpenAiProvider;
use crate::provider::Provider;

/// Configured providers, keyed by the kind the resolver selects
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Builds the registry from vendor configuration.
    ///
    /// Later entries of the same type win, which lets a local config
    /// override an earlier one.
    pub fn from_config(config: &LlmConfig) -> anyhow::Result<Self> {
        let mut providers: HashMap<ProviderKind, Arc<dyn Provider>> = HashMap::new();

        for (name, vendor) in &config.vendors {
            let (kind, provider): (ProviderKind, Arc<dyn Provider>) = match vendor.vendor_type {
                VendorType::Aggregator => {
                    if vendor.base_url.is_none() {
                        bail!("vendor {name:?}: aggregator requires base_url");
                    }
                    (ProviderKind::Aggregator, Arc::new(OpenAiProvider::new(name, vendor)))
                }
                VendorType::Openai => (
                    ProviderKind::Direct(Vendor::OpenAi),
                    Arc::new(OpenAiProvider::new(name, vendor)),
                ),
                VendorType::Anthropic => (
                    ProviderKind::Direct(Vendor::Anthropic),
                    Arc::new(AnthropicProvider::new(name, vendor)),
                ),
                VendorType::Google => (
                    ProviderKind::Direct(Vendor::Google),
                    Arc::new(GoogleProvider::new(name, vendor)),
                ),
            };
            tracing::info!(vendor = %name, ?kind, "registered llm provider");
            providers.insert(kind, provider);
        }

        if providers.is_empty() {
            tracing::warn!("no llm vendors configured");
        }

        Ok(Self { providers })
    }

    /// Registry with explicit entries, for tests and embedding.
    pub fn with_providers(entries: Vec<(ProviderKind, Arc<dyn Provider>)>) -> Self {
        Self {
            providers: entries.into_iter().collect(),
        }
    }

    /// Looks up the provider serving a resolved model.
    pub fn get(&self, kind: ProviderKind, model: &str) -> Result<&Arc<dyn Provider>, LlmError> {
        self.providers.get(&kind).ok_or_else(|| LlmError::ModelNotFound {
            model: model.to_owned(),
        })
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("kinds", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregator_without_base_url_is_rejected() {
        let config: LlmConfig = toml::from_str(
            r#"
            [vendors.router]
            type = "aggregator"
            api_key = "sk-test"
            "#,
        )
        .unwrap();
        assert!(ProviderRegistry::from_config(&config).is_err());
    }

    #[test]
    fn unconfigured_kind_maps_to_model_not_found() {
        let registry = ProviderRegistry::with_providers(Vec::new());
        let err = registry.get(ProviderKind::Direct(Vendor::OpenAi), "gpt-4.1").unwrap_err();
        assert!(matches!(err, LlmError::ModelNotFound { model } if model == "gpt-4.1"));
    }
}
