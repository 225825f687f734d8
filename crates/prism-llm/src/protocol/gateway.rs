//! Inbound chat-completion wire format
//!
//! OpenAI-compatible, extended with `useChat`, `modelOptions`, and a bare
//! `prompt` alternative to `messages`.

use prism_models::ModelOptions;
use serde::Deserialize;
use serde_json::Value;

use crate::error::LlmError;
use crate::types::{
    ChatRequest, CompletionParams, Content, ContentPart, Message, OutputSchema, Role, ToolDefinition,
};

/// `POST /chat/completions` request body
#[derive(Debug, Deserialize)]
pub struct ChatCompletionBody {
    pub model: String,
    #[serde(default)]
    pub messages: Option<Vec<WireMessage>>,
    /// Single-turn alternative to `messages`
    #[serde(default)]
    pub prompt: Option<String>,
    /// System prompt prepended to the conversation
    #[serde(default)]
    pub system: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub top_p: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub stop: Option<Vec<String>>,
    #[serde(default)]
    pub stream: bool,
    /// Data-stream framing instead of raw text when streaming
    #[serde(default, rename = "useChat", alias = "use_chat")]
    pub use_chat: bool,
    #[serde(default, rename = "modelOptions", alias = "model_options")]
    pub model_options: Option<ModelOptions>,
    #[serde(default)]
    pub response_format: Option<WireResponseFormat>,
    /// Caller-declared tool definitions, forwarded upstream verbatim
    #[serde(default)]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(default)]
    pub user: Option<String>,
}

/// Message as received on the wire
#[derive(Debug, Deserialize)]
pub struct WireMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<WireContent>,
    #[serde(default)]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WireContent {
    Text(String),
    Parts(Vec<WirePart>),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WirePart {
    Text { text: String },
    ImageUrl { image_url: WireImageUrl },
}

#[derive(Debug, Deserialize)]
pub struct WireImageUrl {
    pub url: String,
    #[serde(default)]
    pub detail: Option<String>,
}

/// `response_format` variants accepted on the wire
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireResponseFormat {
    JsonSchema { json_schema: WireJsonSchema },
    JsonObject,
    Text,
}

#[derive(Debug, Deserialize)]
pub struct WireJsonSchema {
    #[serde(default = "default_schema_name")]
    pub name: String,
    pub schema: Value,
}

fn default_schema_name() -> String {
    "response".to_owned()
}

impl TryFrom<ChatCompletionBody> for ChatRequest {
    type Error = LlmError;

    /// Validates the wire body into a gateway request.
    ///
    /// Exactly one of `prompt` and `messages` must be present.
    fn try_from(body: ChatCompletionBody) -> Result<Self, Self::Error> {
        let mut messages: Vec<Message> = Vec::new();

        if let Some(system) = body.system {
            messages.push(Message::text(Role::System, system));
        }

        match (body.prompt, body.messages) {
            (Some(_), Some(_)) => {
                return Err(LlmError::InvalidRequest(
                    "provide either prompt or messages, not both".to_owned(),
                ));
            }
            (None, None) => {
                return Err(LlmError::InvalidRequest(
                    "one of prompt or messages is required".to_owned(),
                ));
            }
            (Some(prompt), None) => messages.push(Message::text(Role::User, prompt)),
            (None, Some(wire_messages)) => {
                if wire_messages.is_empty() {
                    return Err(LlmError::InvalidRequest("messages must not be empty".to_owned()));
                }
                for msg in wire_messages {
                    messages.push(wire_message_to_internal(msg));
                }
            }
        }

        let response_format = match body.response_format {
            Some(WireResponseFormat::JsonSchema { json_schema }) => Some(OutputSchema {
                name: json_schema.name,
                schema: json_schema.schema,
                strict: false,
            }),
            Some(WireResponseFormat::JsonObject) => Some(OutputSchema {
                name: default_schema_name(),
                schema: Value::Object(serde_json::Map::new()),
                strict: false,
            }),
            Some(WireResponseFormat::Text) | None => None,
        };

        Ok(Self {
            model: body.model,
            messages,
            params: CompletionParams {
                temperature: body.temperature,
                top_p: body.top_p,
                max_tokens: body.max_tokens,
                stop: body.stop,
            },
            stream: body.stream,
            use_chat: body.use_chat,
            response_format,
            declared_tools: body.tools,
            options: body.model_options.unwrap_or_default(),
            user: body.user,
        })
    }
}

fn wire_message_to_internal(msg: WireMessage) -> Message {
    let role = match msg.role.as_str() {
        "system" => Role::System,
        "assistant" => Role::Assistant,
        "tool" => Role::Tool,
        _ => Role::User,
    };

    let content = match msg.content {
        Some(WireContent::Text(text)) => Content::Text(text),
        Some(WireContent::Parts(parts)) => Content::Parts(
            parts
                .into_iter()
                .map(|part| match part {
                    WirePart::Text { text } => ContentPart::Text { text },
                    WirePart::ImageUrl { image_url } => ContentPart::Image {
                        url: image_url.url,
                        detail: image_url.detail,
                    },
                })
                .collect(),
        ),
        None => Content::Text(String::new()),
    };

    Message {
        role,
        content,
        tool_calls: None,
        tool_call_id: msg.tool_call_id,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn body(value: Value) -> ChatCompletionBody {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn prompt_becomes_a_user_message() {
        let request: ChatRequest = body(json!({"model": "gpt-4.1", "prompt": "hello"}))
            .try_into()
            .unwrap();
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, Role::User);
        assert_eq!(request.messages[0].content.as_text(), "hello");
    }

    #[test]
    fn prompt_and_messages_together_are_rejected() {
        let result: Result<ChatRequest, _> = body(json!({
            "model": "gpt-4.1",
            "prompt": "hello",
            "messages": [{"role": "user", "content": "hi"}]
        }))
        .try_into();
        assert!(matches!(result, Err(LlmError::InvalidRequest(_))));
    }

    #[test]
    fn neither_prompt_nor_messages_is_rejected() {
        let result: Result<ChatRequest, _> = body(json!({"model": "gpt-4.1"})).try_into();
        assert!(matches!(result, Err(LlmError::InvalidRequest(_))));
    }

    #[test]
    fn system_prompt_is_prepended() {
        let request: ChatRequest = body(json!({
            "model": "gpt-4.1",
            "system": "be brief",
            "prompt": "hello"
        }))
        .try_into()
        .unwrap();
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1].role, Role::User);
    }

    #[test]
    fn camel_case_extensions_deserialize() {
        let request: ChatRequest = body(json!({
            "model": "gpt-4.1",
            "prompt": "hello",
            "stream": true,
            "useChat": true,
            "modelOptions": {"maxPrice": 1.5}
        }))
        .try_into()
        .unwrap();
        assert!(request.stream);
        assert!(request.use_chat);
        assert_eq!(request.options.max_price, Some(1.5));
    }

    #[test]
    fn json_schema_response_format_is_captured() {
        let request: ChatRequest = body(json!({
            "model": "gpt-4.1",
            "prompt": "hello",
            "response_format": {
                "type": "json_schema",
                "json_schema": {"name": "invoice", "schema": {"type": "object"}}
            }
        }))
        .try_into()
        .unwrap();
        let format = request.response_format.unwrap();
        assert_eq!(format.name, "invoice");
        assert_eq!(format.schema, json!({"type": "object"}));
    }
}
