use std::path::Path;

use secrecy::ExposeSecret;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded =
            crate::env::expand_env(&raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if no vendor is configured or a section carries
    /// invalid values
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.llm.vendors.is_empty() {
            anyhow::bail!("at least one LLM vendor must be configured");
        }

        if self.tools.page_size == 0 {
            anyhow::bail!("tools.page_size must be greater than 0");
        }

        if let Some(ref identity) = self.identity
            && identity.enabled
        {
            if identity.gateway_secret.expose_secret().is_empty() {
                anyhow::bail!("identity.gateway_secret must not be empty when identity is enabled");
            }
            if identity.cache_ttl_seconds == 0 {
                anyhow::bail!("identity.cache_ttl_seconds must be greater than 0");
            }
        }

        Ok(())
    }
}
