//! Provider speaking the OpenAI chat-completions wire format
//!
//! Also serves aggregator vendors, which expose the same protocol in
//! front of many upstream models.

use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use prism_config::VendorConfig;
use prism_core::RequestContext;
use secrecy::SecretString;

use super::{resolve_api_key, transport_failure, upstream_failure, EventStream, Provider};
use crate::convert::openai::openai_chunk_to_events;
use crate::error::LlmError;
use crate::protocol::openai::{OpenAiRequest, OpenAiResponse, OpenAiStreamChunk};
use crate::types::{CompletionRequest, CompletionResponse, StreamEvent};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DONE_SENTINEL: &str = "[DONE]";

pub struct OpenAiProvider {
    name: String,
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    forward_authorization: bool,
}

impl OpenAiProvider {
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
        let wire: OpenAiRequest = request.into();
        let url = format!("{}/chat/completions", self.base_url);

        let mut builder = self.client.post(&url).json(&wire);
        if let Some(key) = resolve_api_key(self.api_key.as_ref(), self.forward_authorization, context) {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| transport_failure(&self.name, &e))?;
        if !response.status().is_success() {
            return Err(upstream_failure(&self.name, response).await);
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        context: &RequestContext,
    ) -> Result<CompletionResponse, LlmError> {
        let response = self.send(request, context).await?;
        let wire: OpenAiResponse = response
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

        let stream = response
            .bytes_stream()
            .eventsource()
            .map(move |event| match event {
                Ok(event) => {
                    if event.data.trim() == DONE_SENTINEL {
                        return vec![Ok(StreamEvent::Done)];
                    }
                    match serde_json::from_str::<OpenAiStreamChunk>(&event.data) {
                        Ok(chunk) => openai_chunk_to_events(&chunk).into_iter().map(Ok).collect(),
                        Err(e) => {
                            tracing::debug!(provider, error = %e, "skipping unparseable stream chunk");
                            Vec::new()
                        }
                    }
                }
                Err(e) => vec![Err(LlmError::Streaming(e.to_string()))],
            })
            .flat_map(futures_util::stream::iter);

        Ok(Box::pin(stream))
    }
}
