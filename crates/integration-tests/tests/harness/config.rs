//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use prism_config::{Config, ServerConfig, VendorConfig, VendorType};
use secrecy::SecretString;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    ..ServerConfig::default()
                },
                ..Config::default()
            },
        }
    }

    /// Add a vendor pointed at a mock backend
    pub fn with_vendor(mut self, name: &str, vendor_type: VendorType, base_url: &str) -> Self {
        self.config.llm.vendors.insert(
            name.to_owned(),
            VendorConfig {
                vendor_type,
                api_key: Some(SecretString::from("test-key")),
                base_url: Some(base_url.parse().expect("valid URL")),
                forward_authorization: false,
            },
        );
        self
    }

    /// Add an OpenAI-protocol vendor pointed at a mock backend
    pub fn with_openai_vendor(self, base_url: &str) -> Self {
        self.with_vendor("openai", VendorType::Openai, base_url)
    }

    /// Point the tool directory at a mock backend
    pub fn with_tool_directory(mut self, base_url: &str) -> Self {
        self.config.tools.directory_url = Some(base_url.parse().expect("valid URL"));
        self.config.tools.api_key = Some(SecretString::from("directory-key"));
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
