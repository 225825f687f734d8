use async_trait::async_trait;
use prism_config::ToolsConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::ToolError;
use crate::scheme::AuthScheme;

/// One connected account in the caller's directory
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectedAccount {
    /// Connection id used when executing tools for this application
    pub id: String,
    /// Application slug the connection belongs to
    pub app: String,
}

/// A page of connected accounts
#[derive(Debug, Clone, Deserialize)]
pub struct AccountPage {
    pub items: Vec<ConnectedAccount>,
    /// Opaque cursor for the next page, absent on the last page
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Directory metadata for one application
#[derive(Debug, Clone, Deserialize)]
pub struct AppInfo {
    pub slug: String,
    /// Raw scheme strings as the directory reports them
    #[serde(default)]
    pub auth_schemes: Vec<String>,
    /// Whether the application needs no connection at all
    #[serde(default)]
    pub no_auth: bool,
}

impl AppInfo {
    /// Parses the reported schemes, rejecting unrecognized ones.
    pub fn schemes(&self) -> Result<Vec<AuthScheme>, ToolError> {
        self.auth_schemes
            .iter()
            .map(|raw| {
                raw.parse().map_err(|()| ToolError::UnknownAuthScheme {
                    app: self.slug.clone(),
                    scheme: raw.clone(),
                })
            })
            .collect()
    }
}

/// Parameter schema for one tool, as published by the directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// JSON Schema for the tool's arguments
    pub parameters: Value,
}

/// Connected-accounts tool directory
///
/// The HTTP implementation talks to the hosted directory; tests substitute
/// in-memory fakes.
#[async_trait]
pub trait ToolDirectory: Send + Sync {
    /// One page of the user's connected accounts.
    async fn connected_accounts(
        &self,
        user_id: &str,
        cursor: Option<&str>,
    ) -> Result<AccountPage, ToolError>;

    /// Metadata for an application.
    async fn app_info(&self, app: &str) -> Result<AppInfo, ToolError>;

    /// Parameter schema for a tool.
    async fn tool_schema(&self, tool: &str) -> Result<ToolSchema, ToolError>;

    /// Executes a tool through the user's connection.
    async fn execute(
        &self,
        user_id: &str,
        connection_id: &str,
        tool: &str,
        arguments: Value,
    ) -> Result<Value, ToolError>;

    /// Creates a connection from submitted credential fields.
    async fn register_auth_fields(
        &self,
        user_id: &str,
        app: &str,
        scheme: AuthScheme,
        fields: Value,
    ) -> Result<Value, ToolError>;
}

/// `ToolDirectory` backed by the hosted directory's REST API
pub struct HttpToolDirectory {
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
    page_size: u32,
}

impl HttpToolDirectory {
    /// Builds a directory client from configuration.
    ///
    /// # Errors
    ///
    /// `NotConfigured` when no directory URL is set.
    pub fn from_config(config: &ToolsConfig) -> Result<Self, ToolError> {
        let base_url = config.directory_url.clone().ok_or(ToolError::NotConfigured)?;
        Ok(Self {
            client: Client::new(),
            base_url,
            api_key: config.api_key.clone(),
            page_size: config.page_size,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ToolError> {
        self.base_url.join(path).map_err(|e| ToolError::Directory {
            message: format!("invalid directory endpoint {path}: {e}"),
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, ToolError> {
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| ToolError::Directory {
                message: e.to_string(),
            })?;
        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ToolError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::Directory {
                message: format!("directory returned {status}: {body}"),
            });
        }
        response.json().await.map_err(|e| ToolError::Directory {
            message: format!("invalid directory response: {e}"),
        })
    }
}

#[async_trait]
impl ToolDirectory for HttpToolDirectory {
    async fn connected_accounts(
        &self,
        user_id: &str,
        cursor: Option<&str>,
    ) -> Result<AccountPage, ToolError> {
        let mut url = self.endpoint("connected_accounts")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("user_id", user_id);
            query.append_pair("limit", &self.page_size.to_string());
            if let Some(cursor) = cursor {
                query.append_pair("cursor", cursor);
            }
        }
        self.get_json(url).await
    }

    async fn app_info(&self, app: &str) -> Result<AppInfo, ToolError> {
        let url = self.endpoint(&format!("apps/{app}"))?;
        self.get_json(url).await
    }

    async fn tool_schema(&self, tool: &str) -> Result<ToolSchema, ToolError> {
        let url = self.endpoint(&format!("tools/{tool}"))?;
        self.get_json(url).await
    }

    async fn execute(
        &self,
        user_id: &str,
        connection_id: &str,
        tool: &str,
        arguments: Value,
    ) -> Result<Value, ToolError> {
        let url = self.endpoint(&format!("tools/{tool}/execute"))?;
        let response = self
            .authorize(self.client.post(url))
            .json(&serde_json::json!({
                "user_id": user_id,
                "connected_account_id": connection_id,
                "arguments": arguments,
            }))
            .send()
            .await
            .map_err(|e| ToolError::Directory {
                message: e.to_string(),
            })?;
        Self::decode(response).await
    }

    async fn register_auth_fields(
        &self,
        user_id: &str,
        app: &str,
        scheme: AuthScheme,
        fields: Value,
    ) -> Result<Value, ToolError> {
        let url = self.endpoint(&format!("apps/{app}/connections"))?;
        let response = self
            .authorize(self.client.post(url))
            .json(&serde_json::json!({
                "user_id": user_id,
                "auth_scheme": scheme,
                "fields": fields,
            }))
            .send()
            .await
            .map_err(|e| ToolError::Directory {
                message: e.to_string(),
            })?;
        Self::decode(response).await
    }
}
