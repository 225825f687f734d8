#![allow(clippy::must_use_candidate)]

mod env;
pub mod identity;
pub mod llm;
mod loader;
pub mod server;
pub mod tools;

use serde::Deserialize;

pub use identity::IdentityConfig;
pub use llm::{LlmConfig, VendorConfig, VendorType};
pub use server::ServerConfig;
pub use tools::ToolsConfig;

/// Top-level Prism configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// LLM vendor configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Tool directory configuration
    #[serde(default)]
    pub tools: ToolsConfig,
    /// Caller identity resolution configuration
    #[serde(default)]
    pub identity: Option<IdentityConfig>,
}
