//! Completion orchestrator
//!
//! Ties the pipeline together: identifier parsing, catalog resolution,
//! tool binding, schema normalization, provider dispatch, and envelope
//! shaping. The sync path additionally runs the tool-execution loop.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use prism_core::RequestContext;
use prism_models::{Catalog, ModelIdentifier, ProviderKind, ResolvedModel, Vendor};
use prism_tools::{resolve_tools, ToolBinding, ToolDirectory};

use crate::error::LlmError;
use crate::provider::EventStream;
use crate::registry::ProviderRegistry;
use crate::schema;
use crate::stream::uuid_simple;
use crate::types::{
    ChatRequest, CompletionRequest, CompletionResponse, FinishReason, Message, OutputSchema, ToolDefinition, Usage,
};

/// Upper bound on tool round trips within one request
const MAX_TOOL_STEPS: usize = 10;

/// Shared gateway state handed to the router
#[derive(Clone)]
pub struct GatewayState {
    inner: Arc<Inner>,
}

struct Inner {
    registry: ProviderRegistry,
    catalog: Catalog,
    directory: Option<Arc<dyn ToolDirectory>>,
    tool_icon_base: Option<url::Url>,
}

/// A request after resolution, ready for dispatch
struct Prepared {
    resolved: ResolvedModel,
    completion: CompletionRequest,
    bindings: Vec<ToolBinding>,
    user_id: Option<String>,
    /// Caller asked for structured output
    schema_requested: bool,
    /// The vendor enforces the schema natively
    native_schema: bool,
}

impl GatewayState {
    pub fn new(registry: ProviderRegistry, directory: Option<Arc<dyn ToolDirectory>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry,
                catalog: Catalog::builtin(),
                directory,
                tool_icon_base: None,
            }),
        }
    }

    /// Sets the base URL tool icon lookups redirect under.
    #[must_use]
    pub fn with_tool_icon_base(mut self, base: Option<url::Url>) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.tool_icon_base = base;
        }
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    pub(crate) fn directory(&self) -> Option<&dyn ToolDirectory> {
        self.inner.directory.as_deref()
    }

    pub(crate) fn tool_icon_base(&self) -> Option<&url::Url> {
        self.inner.tool_icon_base.as_ref()
    }

    /// Runs a non-streaming completion, including the tool loop.
    pub async fn complete(
        &self,
        request: ChatRequest,
        context: &RequestContext,
    ) -> Result<CompletionResponse, LlmError> {
        let created = unix_now();
        let raw_model = request.model.clone();
        let prepared = self.prepare(&request, context, false).await?;
        let provider = self.inner.registry.get(prepared.resolved.kind, &raw_model)?;

        let mut completion = prepared.completion.clone();
        let mut total_usage = Usage::default();
        let mut response = provider.complete(&completion, context).await?;
        accumulate(&mut total_usage, response.usage);

        let mut steps = 1;
        while steps < MAX_TOOL_STEPS && wants_tool_round(&response, &prepared.bindings) {
            let Some(next) = self.run_tool_round(&response, &prepared, context).await? else {
                break;
            };
            completion.messages.extend(next);
            response = provider.complete(&completion, context).await?;
            accumulate(&mut total_usage, response.usage);
            steps += 1;
        }

        if prepared.schema_requested && !prepared.native_schema {
            for choice in &mut response.choices {
                if let Some(content) = &choice.message.content {
                    choice.message.content = Some(schema::strip_code_fence(content));
                }
            }
        }

        Ok(shape_envelope(response, &raw_model, created, total_usage))
    }

    /// Starts a streaming completion.
    ///
    /// Returns the event stream plus whether the caller asked for
    /// structured output, which the emitter needs for fence framing.
    /// Tool calls are forwarded in deltas but never executed here.
    pub async fn complete_stream(
        &self,
        request: ChatRequest,
        context: &RequestContext,
    ) -> Result<(EventStream, bool), LlmError> {
        let raw_model = request.model.clone();
        let prepared = self.prepare(&request, context, true).await?;
        let provider = self.inner.registry.get(prepared.resolved.kind, &raw_model)?;
        let events = provider.complete_stream(&prepared.completion, context).await?;
        Ok((events, prepared.schema_requested))
    }

    /// Resolves the model, binds tools, and normalizes schemas.
    async fn prepare(
        &self,
        request: &ChatRequest,
        context: &RequestContext,
        stream: bool,
    ) -> Result<Prepared, LlmError> {
        let mut options = request.options.clone();
        if options.output_schema.is_none()
            && let Some(format) = &request.response_format
        {
            options.output_schema = Some(format.name.clone());
        }

        let identifier = ModelIdentifier::parse(&request.model, options);
        let resolved = self.inner.catalog.resolve(&identifier)?;
        tracing::debug!(
            model = %request.model,
            slug = %resolved.slug,
            endpoint = resolved.endpoint.tag,
            "resolved model"
        );

        let schema_requested = request.response_format.is_some();
        let native_schema = schema_requested && resolved.capabilities.structured_output;

        let user_id = request
            .user
            .clone()
            .or_else(|| context.user_id().map(ToOwned::to_owned));

        let mut bindings = Vec::new();
        if !identifier.options.tools.is_empty() {
            let directory = self.inner.directory.as_deref().ok_or_else(|| {
                LlmError::InvalidRequest("tool augmentation is not configured".to_owned())
            })?;
            let user = user_id.as_deref().ok_or_else(|| {
                LlmError::InvalidRequest("tool use requires a user identifier".to_owned())
            })?;
            bindings = resolve_tools(directory, user, &identifier.options.tools).await?;
        }

        let mut tools: Vec<ToolDefinition> = bindings
            .iter()
            .map(|b| {
                let parameters = schema::normalize_for(resolved.kind, &b.schema.parameters);
                let description = (!b.schema.description.is_empty()).then(|| b.schema.description.clone());
                ToolDefinition::function(b.name.clone(), description, parameters)
            })
            .collect();
        if let Some(declared) = &request.declared_tools {
            tools.extend(declared.iter().cloned());
        }

        let response_format = native_schema
            .then(|| request.response_format.as_ref())
            .flatten()
            .map(|format| OutputSchema {
                name: format.name.clone(),
                schema: schema::normalize_for(resolved.kind, &format.schema),
                strict: resolved.kind == ProviderKind::Direct(Vendor::OpenAi),
            });

        let completion = CompletionRequest {
            model: resolved.upstream_id.clone(),
            messages: request.messages.clone(),
            params: request.params.clone(),
            tools: if tools.is_empty() { None } else { Some(tools) },
            tool_choice: None,
            response_format,
            reasoning: resolved.capabilities.reasoning,
            stream,
        };

        Ok(Prepared {
            resolved,
            completion,
            bindings,
            user_id,
            schema_requested,
            native_schema,
        })
    }

    /// Executes the tool calls of the first choice.
    ///
    /// Returns the messages to append, or `None` when a call targets a
    /// declared tool this gateway does not execute.
    async fn run_tool_round(
        &self,
        response: &CompletionResponse,
        prepared: &Prepared,
        _context: &RequestContext,
    ) -> Result<Option<Vec<Message>>, LlmError> {
        let Some(directory) = self.inner.directory.as_deref() else {
            return Ok(None);
        };
        let Some(user_id) = prepared.user_id.as_deref() else {
            return Ok(None);
        };
        let Some(choice) = response.choices.first() else {
            return Ok(None);
        };
        let Some(calls) = &choice.message.tool_calls else {
            return Ok(None);
        };

        let mut messages = vec![Message {
            role: crate::types::Role::Assistant,
            content: crate::types::Content::Text(choice.message.content.clone().unwrap_or_default()),
            tool_calls: Some(calls.clone()),
            tool_call_id: None,
        }];

        for call in calls {
            let Some(binding) = prepared.bindings.iter().find(|b| b.name == call.function.name) else {
                // Caller-declared tool: hand the calls back unexecuted
                return Ok(None);
            };
            let arguments: serde_json::Value =
                serde_json::from_str(&call.function.arguments).unwrap_or_else(|_| serde_json::json!({}));
            tracing::debug!(tool = %binding.name, "executing tool call");
            let result = directory
                .execute(user_id, &binding.connection_id, &binding.name, arguments)
                .await?;
            let text = serde_json::to_string(&result).unwrap_or_else(|_| result.to_string());
            messages.push(Message::tool_result(call.id.clone(), text));
        }

        Ok(Some(messages))
    }
}

fn wants_tool_round(response: &CompletionResponse, bindings: &[ToolBinding]) -> bool {
    if bindings.is_empty() {
        return false;
    }
    response
        .choices
        .first()
        .is_some_and(|c| c.finish_reason == Some(FinishReason::ToolCalls) && c.message.tool_calls.is_some())
}

fn accumulate(total: &mut Usage, usage: Option<Usage>) {
    if let Some(usage) = usage {
        total.add(usage);
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Final envelope shaping: stable object tag, caller's model string,
/// request-time timestamp, and a generated id when the vendor sent none.
fn shape_envelope(mut response: CompletionResponse, model: &str, created: u64, usage: Usage) -> CompletionResponse {
    if response.id.is_empty() {
        response.id = format!("chatcmpl-{}", uuid_simple());
    }
    response.object = "chat.completion".to_owned();
    response.created = created;
    response.model = model.to_owned();
    if usage.total_tokens > 0 || response.usage.is_some() {
        response.usage = Some(usage);
    }
    response
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use prism_models::ModelOptions;
    use serde_json::json;

    use super::*;
    use crate::provider::Provider;
    use crate::types::{Choice, ChoiceMessage, CompletionParams, FunctionCall, Role, ToolCall};

    struct ScriptedProvider {
        responses: std::sync::Mutex<Vec<CompletionResponse>>,
        calls: std::sync::atomic::AtomicU32,
        last_model: std::sync::Mutex<Option<String>>,
    }

    impl ScriptedProvider {
        fn new(mut responses: Vec<CompletionResponse>) -> Self {
            responses.reverse();
            Self {
                responses: std::sync::Mutex::new(responses),
                calls: std::sync::atomic::AtomicU32::new(0),
                last_model: std::sync::Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
            _context: &RequestContext,
        ) -> Result<CompletionResponse, LlmError> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            *self.last_model.lock().unwrap() = Some(request.model.clone());
            Ok(self.responses.lock().unwrap().pop().expect("scripted response"))
        }

        async fn complete_stream(
            &self,
            _request: &CompletionRequest,
            _context: &RequestContext,
        ) -> Result<EventStream, LlmError> {
            Ok(Box::pin(futures_util::stream::empty()))
        }
    }

    struct SingleToolDirectory;

    #[async_trait]
    impl ToolDirectory for SingleToolDirectory {
        async fn connected_accounts(
            &self,
            _user_id: &str,
            _cursor: Option<&str>,
        ) -> Result<prism_tools::AccountPage, prism_tools::ToolError> {
            Ok(prism_tools::AccountPage {
                items: vec![prism_tools::ConnectedAccount {
                    id: "conn-1".to_owned(),
                    app: "github".to_owned(),
                }],
                next_cursor: None,
            })
        }

        async fn app_info(&self, app: &str) -> Result<prism_tools::AppInfo, prism_tools::ToolError> {
            Ok(prism_tools::AppInfo {
                slug: app.to_owned(),
                auth_schemes: vec!["OAUTH2".to_owned()],
                no_auth: false,
            })
        }

        async fn tool_schema(&self, tool: &str) -> Result<prism_tools::ToolSchema, prism_tools::ToolError> {
            Ok(prism_tools::ToolSchema {
                name: tool.to_owned(),
                description: String::new(),
                parameters: json!({"type": "object"}),
            })
        }

        async fn execute(
            &self,
            _user_id: &str,
            _connection_id: &str,
            _tool: &str,
            _arguments: serde_json::Value,
        ) -> Result<serde_json::Value, prism_tools::ToolError> {
            Ok(json!({"ok": true}))
        }

        async fn register_auth_fields(
            &self,
            _user_id: &str,
            _app: &str,
            _scheme: prism_tools::AuthScheme,
            _fields: serde_json::Value,
        ) -> Result<serde_json::Value, prism_tools::ToolError> {
            Ok(json!({}))
        }
    }

    fn text_response(id: &str, content: &str, usage: Usage) -> CompletionResponse {
        CompletionResponse {
            id: id.to_owned(),
            object: "chat.completion".to_owned(),
            created: 0,
            model: String::new(),
            choices: vec![Choice {
                index: 0,
                message: ChoiceMessage::text(content.to_owned()),
                finish_reason: Some(FinishReason::Stop),
            }],
            usage: Some(usage),
        }
    }

    fn tool_call_response(usage: Usage) -> CompletionResponse {
        CompletionResponse {
            id: "resp-1".to_owned(),
            object: "chat.completion".to_owned(),
            created: 0,
            model: String::new(),
            choices: vec![Choice {
                index: 0,
                message: ChoiceMessage {
                    role: "assistant".to_owned(),
                    content: None,
                    tool_calls: Some(vec![ToolCall {
                        id: "call-1".to_owned(),
                        function: FunctionCall {
                            name: "github.create_issue".to_owned(),
                            arguments: "{\"title\":\"t\"}".to_owned(),
                        },
                    }]),
                },
                finish_reason: Some(FinishReason::ToolCalls),
            }],
            usage: Some(usage),
        }
    }

    fn chat_request(model: &str, options: ModelOptions) -> ChatRequest {
        ChatRequest {
            model: model.to_owned(),
            messages: vec![Message::text(Role::User, "hi")],
            params: CompletionParams::default(),
            stream: false,
            use_chat: false,
            response_format: None,
            declared_tools: None,
            options,
            user: Some("user-1".to_owned()),
        }
    }

    fn state_with(provider: Arc<dyn Provider>, directory: Option<Arc<dyn ToolDirectory>>) -> GatewayState {
        let registry = ProviderRegistry::with_providers(vec![
            (ProviderKind::Direct(Vendor::OpenAi), Arc::clone(&provider)),
            (ProviderKind::Direct(Vendor::Anthropic), provider),
        ]);
        GatewayState::new(registry, directory)
    }

    #[tokio::test]
    async fn envelope_echoes_the_callers_model_string() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response(
            "",
            "hello",
            Usage {
                prompt_tokens: 3,
                completion_tokens: 2,
                total_tokens: 5,
            },
        )]));
        let state = state_with(provider, None);

        let response = state
            .complete(chat_request("openai/gpt-4.1", ModelOptions::default()), &RequestContext::empty())
            .await
            .unwrap();

        assert!(response.id.starts_with("chatcmpl-"));
        assert_eq!(response.object, "chat.completion");
        assert_eq!(response.model, "openai/gpt-4.1");
        assert!(response.created > 0);
        assert_eq!(response.usage.unwrap().total_tokens, 5);
    }

    #[tokio::test]
    async fn tool_loop_executes_and_sums_usage() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call_response(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            text_response(
                "resp-2",
                "done",
                Usage {
                    prompt_tokens: 20,
                    completion_tokens: 4,
                    total_tokens: 24,
                },
            ),
        ]));
        let state = state_with(Arc::clone(&provider) as Arc<dyn Provider>, Some(Arc::new(SingleToolDirectory)));

        let options = ModelOptions {
            tools: vec!["github.create_issue".to_owned()],
            ..ModelOptions::default()
        };
        let response = state
            .complete(chat_request("openai/gpt-4.1", options), &RequestContext::empty())
            .await
            .unwrap();

        assert_eq!(provider.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert_eq!(response.choices[0].message.content.as_deref(), Some("done"));
        let usage = response.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 30);
        assert_eq!(usage.completion_tokens, 9);
        assert_eq!(usage.total_tokens, 39);
    }

    #[tokio::test]
    async fn tools_without_a_user_are_rejected() {
        let provider = Arc::new(ScriptedProvider::new(Vec::new()));
        let state = state_with(provider, Some(Arc::new(SingleToolDirectory)));

        let options = ModelOptions {
            tools: vec!["github.create_issue".to_owned()],
            ..ModelOptions::default()
        };
        let mut request = chat_request("openai/gpt-4.1", options);
        request.user = None;

        let err = state.complete(request, &RequestContext::empty()).await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn code_fence_is_stripped_when_schema_is_emulated() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response(
            "resp-1",
            "```json\n{\"a\": 1}\n```",
            Usage::default(),
        )]));
        let state = state_with(provider, None);

        // claude has tools but no native structured output
        let mut request = chat_request("anthropic/claude-sonnet-4", ModelOptions::default());
        request.response_format = Some(OutputSchema {
            name: "response".to_owned(),
            schema: json!({"type": "object"}),
            strict: false,
        });

        let response = state.complete(request, &RequestContext::empty()).await.unwrap();
        assert_eq!(response.choices[0].message.content.as_deref(), Some("{\"a\": 1}"));
    }

    #[tokio::test]
    async fn unknown_model_never_reaches_the_provider() {
        let provider = Arc::new(ScriptedProvider::new(Vec::new()));
        let state = state_with(Arc::clone(&provider) as Arc<dyn Provider>, None);

        let err = state
            .complete(chat_request("no-such/model", ModelOptions::default()), &RequestContext::empty())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::ModelNotFound { .. }));
        assert_eq!(provider.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn aggregator_dispatch_carries_the_variant_tag() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response("resp-1", "ok", Usage::default())]));
        let registry = ProviderRegistry::with_providers(vec![(
            ProviderKind::Aggregator,
            Arc::clone(&provider) as Arc<dyn Provider>,
        )]);
        let state = GatewayState::new(registry, None);

        state
            .complete(
                chat_request("deepseek/deepseek-reasoner:thinking", ModelOptions::default()),
                &RequestContext::empty(),
            )
            .await
            .unwrap();

        assert_eq!(
            provider.last_model.lock().unwrap().as_deref(),
            Some("deepseek/deepseek-r1-0528:thinking")
        );
    }
}
