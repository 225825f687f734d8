//! Provider speaking the Google Generative Language wire format
//!
//! Google authenticates with a `key` query parameter and streams plain
//! `GenerateContentResponse` objects over SSE, one per event.

use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use prism_config::VendorConfig;
use prism_core::RequestContext;
use secrecy::SecretString;

use super::{resolve_api_key, transport_failure, upstream_failure, EventStream, Provider};
use crate::convert::google::google_chunk_to_events;
use crate::error::LlmError;
use crate::protocol::google::{GoogleRequest, GoogleResponse};
use crate::types::{CompletionRequest, CompletionResponse, StreamEvent};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GoogleProvider {
    name: String,
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    forward_authorization: bool,
}

impl GoogleProvider {
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
        method: &str,
        query: &str,
    ) -> Result<reqwest::Response, LlmError> {
        let wire: GoogleRequest = request.into();
        let mut url = format!("{}/models/{}:{method}{query}", self.base_url, request.model);
        if let Some(key) = resolve_api_key(self.api_key.as_ref(), self.forward_authorization, context) {
            let sep = if query.is_empty() { '?' } else { '&' };
            url.push_str(&format!("{sep}key={key}"));
        }

        let response = self
            .client
            .post(&url)
            .json(&wire)
            .send()
            .await
            .map_err(|e| transport_failure(&self.name, &e))?;
        if !response.status().is_success() {
            return Err(upstream_failure(&self.name, response).await);
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl Provider for GoogleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        context: &RequestContext,
    ) -> Result<CompletionResponse, LlmError> {
        let response = self.send(request, context, "generateContent", "").await?;
        let wire: GoogleResponse = response
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
        let response = self
            .send(request, context, "streamGenerateContent", "?alt=sse")
            .await?;
        let provider = self.name.clone();

        let stream = response
            .bytes_stream()
            .eventsource()
            .map(move |event| match event {
                Ok(event) => match serde_json::from_str::<GoogleResponse>(&event.data) {
                    Ok(chunk) => google_chunk_to_events(&chunk).into_iter().map(Ok).collect(),
                    Err(e) => {
                        tracing::debug!(provider, error = %e, "skipping unparseable stream chunk");
                        Vec::new()
                    }
                },
                Err(e) => vec![Err(LlmError::Streaming(e.to_string()))],
            })
            .flat_map(futures_util::stream::iter)
            // Google has no terminator event
            .chain(futures_util::stream::once(async { Ok(StreamEvent::Done) }));

        Ok(Box::pin(stream))
    }
}
