use std::net::SocketAddr;

use serde::Deserialize;

/// HTTP server configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind, defaults to 0.0.0.0:3000
    pub listen_address: Option<SocketAddr>,
    /// Whether the liveness endpoint is exposed
    #[serde(default = "default_health_enabled")]
    pub health_enabled: bool,
    /// Path of the liveness endpoint
    #[serde(default = "default_health_path")]
    pub health_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: None,
            health_enabled: default_health_enabled(),
            health_path: default_health_path(),
        }
    }
}

const fn default_health_enabled() -> bool {
    true
}

fn default_health_path() -> String {
    "/health".to_owned()
}
