//! Provider trait and vendor adapter implementations

pub mod anthropic;
pub mod google;
pub mod openai;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;
use prism_core::RequestContext;
use secrecy::{ExposeSecret, SecretString};

use crate::error::LlmError;
use crate::types::{CompletionRequest, CompletionResponse, StreamEvent};

/// Token stream yielded by a provider
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send>>;

/// One upstream vendor adapter
#[async_trait]
pub trait Provider: Send + Sync {
    /// Vendor name, used in logs
    fn name(&self) -> &str;

    /// Sends a non-streaming completion.
    async fn complete(
        &self,
        request: &CompletionRequest,
        context: &RequestContext,
    ) -> Result<CompletionResponse, LlmError>;

    /// Sends a streaming completion.
    async fn complete_stream(
        &self,
        request: &CompletionRequest,
        context: &RequestContext,
    ) -> Result<EventStream, LlmError>;
}

impl std::fmt::Debug for dyn Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider").field("name", &self.name()).finish()
    }
}

/// Key used for the upstream call: the caller's forwarded key when the
/// vendor config allows it, the configured key otherwise
pub(crate) fn resolve_api_key(
    configured: Option<&SecretString>,
    forward_authorization: bool,
    context: &RequestContext,
) -> Option<String> {
    if forward_authorization
        && let Some(key) = &context.api_key
    {
        return Some(key.expose_secret().to_owned());
    }
    configured.map(|k| k.expose_secret().to_owned())
}

/// Wraps a failed upstream response, preserving the status code.
pub(crate) async fn upstream_failure(provider: &str, response: reqwest::Response) -> LlmError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(provider, status = %status, "upstream returned error");
    LlmError::Upstream {
        status: status.as_u16(),
        message: body,
    }
}

/// Wraps a transport-level failure where no status was received.
pub(crate) fn transport_failure(provider: &str, error: &reqwest::Error) -> LlmError {
    tracing::error!(provider, error = %error, "upstream request failed");
    LlmError::Upstream {
        status: 502,
        message: error.to_string(),
    }
}
