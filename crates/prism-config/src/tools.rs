use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Connected-accounts tool directory configuration
///
/// When no directory URL is configured, requests that ask for tool
/// augmentation are rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    /// Base URL of the tool directory service
    #[serde(default)]
    pub directory_url: Option<Url>,
    /// Service credential for directory calls
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Connected-account page size for the paginated lookup
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            directory_url: None,
            api_key: None,
            page_size: default_page_size(),
        }
    }
}

const fn default_page_size() -> u32 {
    100
}
