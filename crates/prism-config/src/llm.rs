use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Top-level LLM configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// Vendor configurations keyed by name
    #[serde(default)]
    pub vendors: IndexMap<String, VendorConfig>,
}

/// Configuration for a single upstream vendor
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VendorConfig {
    /// Wire protocol spoken by the vendor
    #[serde(rename = "type")]
    pub vendor_type: VendorType,
    /// API key for authentication
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Forward the caller's bearer token instead of the configured key
    #[serde(default)]
    pub forward_authorization: bool,
}

/// Supported vendor protocols
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorType {
    /// Multi-vendor aggregator speaking the OpenAI wire format
    Aggregator,
    /// Canonical OpenAI API
    Openai,
    /// Anthropic Messages API
    Anthropic,
    /// Google Generative Language API
    Google,
}
