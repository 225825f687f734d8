//! Bearer-credential resolution against the identity API
//!
//! Credentials are exchanged for a user id with a short-lived in-process
//! cache. Cache keys are digests so raw credentials never sit in memory
//! longer than the request that carried them.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use mini_moka::sync::Cache;
use prism_config::IdentityConfig;
use prism_core::CallerIdentity;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    /// The identity API does not recognize the credential
    #[error("unknown credential")]
    InvalidCredential,

    /// The identity API failed or was unreachable
    #[error("identity api error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        Self::Api {
            status: err.status().map_or(0, |s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Identity API response for a resolved credential
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolvedCredential {
    user_id: String,
}

/// Resolves bearer credentials to caller identities, with caching
#[derive(Clone)]
pub struct IdentityResolver {
    http: reqwest::Client,
    api_url: url::Url,
    gateway_secret: SecretString,
    cache: Cache<String, Arc<CallerIdentity>>,
}

impl IdentityResolver {
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built.
    pub fn from_config(config: &IdentityConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(config.cache_ttl_seconds))
            .max_capacity(config.cache_capacity)
            .build();

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            gateway_secret: config.gateway_secret.clone(),
            cache,
        })
    }

    /// Resolves a raw bearer credential to a caller identity.
    ///
    /// # Errors
    ///
    /// `InvalidCredential` when the identity API rejects the credential,
    /// `Api` when the lookup itself fails.
    pub async fn resolve(&self, credential: &str) -> Result<Arc<CallerIdentity>, IdentityError> {
        let cache_key = sha256_hex(credential);
        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(cached);
        }

        let url = self
            .api_url
            .join("/internal/resolve-key")
            .map_err(|e| IdentityError::Api {
                status: 0,
                message: e.to_string(),
            })?;

        let response = self
            .http
            .post(url)
            .header("X-Gateway-Secret", self.gateway_secret.expose_secret())
            .json(&serde_json::json!({ "key": credential }))
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(IdentityError::InvalidCredential);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(IdentityError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let resolved: ResolvedCredential = response.json().await.map_err(|e| IdentityError::Api {
            status: 0,
            message: format!("failed to parse response: {e}"),
        })?;

        let identity = Arc::new(CallerIdentity {
            user_id: resolved.user_id,
        });
        self.cache.insert(cache_key, Arc::clone(&identity));
        Ok(identity)
    }

    /// Drops a cached resolution, e.g. after revocation.
    pub fn invalidate(&self, credential: &str) {
        self.cache.invalidate(&sha256_hex(credential));
    }
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(64);
    for byte in digest {
        // Writing hex into a String is infallible
        write!(hex, "{byte:02x}").unwrap();
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_stable_and_hex() {
        let a = sha256_hex("sk-test");
        let b = sha256_hex("sk-test");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
