use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Caller identity resolution configuration
///
/// Bearer credentials are exchanged for a user id at the identity API;
/// resolutions are cached in-process.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Whether bearer credentials are resolved at all
    #[serde(default)]
    pub enabled: bool,
    /// Base URL of the identity API
    pub api_url: Url,
    /// Shared secret authenticating the gateway to the identity API
    pub gateway_secret: SecretString,
    /// Cache entry lifetime in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
    /// Maximum number of cached resolutions
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
}

const fn default_cache_ttl() -> u64 {
    300
}

const fn default_cache_capacity() -> u64 {
    10_000
}
