//! Provider speaking the Anthropic Messages wire format

use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use prism_config::VendorConfig;
use prism_core::RequestContext;
use secrecy::SecretString;

use super::{resolve_api_key, transport_failure, upstream_failure, EventStream, Provider};
use crate::convert::anthropic::AnthropicStreamState;
use crate::error::LlmError;
use crate::protocol::anthropic::{AnthropicRequest, AnthropicResponse, AnthropicStreamEvent};
use crate::types::{CompletionRequest, CompletionResponse};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    name: String,
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    forward_authorization: bool,
}

impl AnthropicProvider {
    pub fn new(name: impl Into<String>, config: &VendorConfig) -> Self {
        Self {
            name: name.into(),
            client: reqwest::Client::new(),
            base_url: config
                .base_url
                .as_ref()
                .map_or_else(|| DEFAULT_BASE_URL.to_owned(), |u| u.as_str().trim_end_matches('/').to_owned()),
            api_key: config.api_key.clone(),
            forward_authorization: config.forward_authorization,
        }
    }

    async fn send(
        &self,
        request: &CompletionRequest,
        context: &RequestContext,
    ) -> Result<reqwest::Response, LlmError> {
        let wire: AnthropicRequest = request.into();
        let url = format!("{}/messages", self.base_url);

        let mut builder = self
            .client
            .post(&url)
            .header("anthropic-version", API_VERSION)
            .json(&wire);
        if let Some(key) = resolve_api_key(self.api_key.as_ref(), self.forward_authorization, context) {
            builder = builder.header("x-api-key", key);
        }

        let response = builder.send().await.map_err(|e| transport_failure(&self.name, &e))?;
        if !response.status().is_success() {
            return Err(upstream_failure(&self.name, response).await);
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        context: &RequestContext,
    ) -> Result<CompletionResponse, LlmError> {
        let response = self.send(request, context).await?;
        let wire: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Streaming(format!("invalid upstream response: {e}")))?;
        Ok(wire.into())
    }

    async fn complete_stream(
        &self,
        request: &CompletionRequest,
        context: &RequestContext,
    ) -> Result<EventStream, LlmError> {
        let response = self.send(request, context).await?;
        let provider = self.name.clone();
        let mut state = AnthropicStreamState::new();

        let stream = response
            .bytes_stream()
            .eventsource()
            .map(move |event| match event {
                Ok(event) => match serde_json::from_str::<AnthropicStreamEvent>(&event.data) {
                    Ok(parsed) => state.convert_event(&parsed).into_iter().map(Ok).collect(),
                    Err(e) => {
                        tracing::debug!(provider, error = %e, "skipping unparseable stream event");
                        Vec::new()
                    }
                },
                Err(e) => vec![Err(LlmError::Streaming(e.to_string()))],
            })
            .flat_map(futures_util::stream::iter);

        Ok(Box::pin(stream))
    }
}
