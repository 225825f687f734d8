//! Conversion between canonical types and the OpenAI wire format

use super::parse_finish_reason;
use crate::protocol::openai::{
    OpenAiChoiceMessage, OpenAiContent, OpenAiContentPart, OpenAiFunction, OpenAiFunctionCall, OpenAiImageUrl,
    OpenAiJsonSchema, OpenAiMessage, OpenAiRequest, OpenAiResponse, OpenAiResponseFormat, OpenAiStreamChunk,
    OpenAiStreamOptions, OpenAiTool, OpenAiToolCall,
};
use crate::types::{
    Choice, ChoiceMessage, CompletionRequest, CompletionResponse, Content, ContentPart, FunctionCall, Message, Role,
    StreamDelta, StreamEvent, StreamFunctionCall, StreamToolCall, ToolCall, ToolChoice, ToolChoiceMode, Usage,
};

// -- Outbound: canonical request -> OpenAI wire request --

impl From<&CompletionRequest> for OpenAiRequest {
    fn from(req: &CompletionRequest) -> Self {
        let response_format = req.response_format.as_ref().map(|format| OpenAiResponseFormat {
            format_type: "json_schema".to_owned(),
            json_schema: OpenAiJsonSchema {
                name: format.name.clone(),
                schema: format.schema.clone(),
                strict: format.strict,
            },
        });

        Self {
            model: req.model.clone(),
            messages: req.messages.iter().map(Into::into).collect(),
            temperature: req.params.temperature,
            top_p: req.params.top_p,
            max_tokens: req.params.max_tokens,
            stop: req.params.stop.clone(),
            stream: req.stream.then_some(true),
            tools: req.tools.as_ref().map(|tools| {
                tools
                    .iter()
                    .map(|t| OpenAiTool {
                        tool_type: t.tool_type.clone(),
                        function: OpenAiFunction {
                            name: t.function.name.clone(),
                            description: t.function.description.clone(),
                            parameters: t.function.parameters.clone(),
                            strict: None,
                        },
                    })
                    .collect()
            }),
            tool_choice: req.tool_choice.as_ref().map(tool_choice_to_value),
            response_format,
            stream_options: req.stream.then_some(OpenAiStreamOptions { include_usage: true }),
        }
    }
}

impl From<&Message> for OpenAiMessage {
    fn from(msg: &Message) -> Self {
        let role = match msg.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        };

        let content = match &msg.content {
            Content::Text(text) => Some(OpenAiContent::Text(text.clone())),
            Content::Parts(parts) => Some(OpenAiContent::Parts(parts.iter().map(Into::into).collect())),
        };

        Self {
            role: role.to_owned(),
            content,
            tool_calls: msg
                .tool_calls
                .as_ref()
                .map(|calls| calls.iter().map(tool_call_to_wire).collect()),
            tool_call_id: msg.tool_call_id.clone(),
        }
    }
}

impl From<&ContentPart> for OpenAiContentPart {
    fn from(part: &ContentPart) -> Self {
        match part {
            ContentPart::Text { text } => Self::Text { text: text.clone() },
            ContentPart::Image { url, detail } => Self::ImageUrl {
                image_url: OpenAiImageUrl {
                    url: url.clone(),
                    detail: detail.clone(),
                },
            },
        }
    }
}

fn tool_call_to_wire(tc: &ToolCall) -> OpenAiToolCall {
    OpenAiToolCall {
        id: tc.id.clone(),
        tool_type: "function".to_owned(),
        function: OpenAiFunctionCall {
            name: tc.function.name.clone(),
            arguments: tc.function.arguments.clone(),
        },
    }
}

fn tool_choice_to_value(choice: &ToolChoice) -> serde_json::Value {
    match choice {
        ToolChoice::Mode(mode) => {
            let s = match mode {
                ToolChoiceMode::None => "none",
                ToolChoiceMode::Auto => "auto",
                ToolChoiceMode::Required => "required",
            };
            serde_json::Value::String(s.to_owned())
        }
        ToolChoice::Function { name } => serde_json::json!({
            "type": "function",
            "function": {"name": name}
        }),
    }
}

// -- Inbound: OpenAI wire response -> canonical --

impl From<OpenAiResponse> for CompletionResponse {
    fn from(resp: OpenAiResponse) -> Self {
        Self {
            // Shaped by the orchestrator when absent
            id: resp.id.unwrap_or_default(),
            object: "chat.completion".to_owned(),
            created: 0,
            model: String::new(),
            choices: resp.choices.into_iter().map(wire_choice_to_internal).collect(),
            usage: resp.usage.map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
        }
    }
}

fn wire_choice_to_internal(c: crate::protocol::openai::OpenAiChoice) -> Choice {
    let OpenAiChoiceMessage {
        role,
        content,
        tool_calls,
    } = c.message;

    Choice {
        index: c.index,
        message: ChoiceMessage {
            role,
            content,
            tool_calls: tool_calls.map(|calls| {
                calls
                    .into_iter()
                    .map(|tc| ToolCall {
                        id: tc.id,
                        function: FunctionCall {
                            name: tc.function.name,
                            arguments: tc.function.arguments,
                        },
                    })
                    .collect()
            }),
        },
        finish_reason: c.finish_reason.as_deref().and_then(parse_finish_reason),
    }
}

// -- Streaming --

/// Converts one OpenAI SSE chunk into canonical stream events.
pub fn openai_chunk_to_events(chunk: &OpenAiStreamChunk) -> Vec<StreamEvent> {
    let mut events = Vec::new();

    for choice in &chunk.choices {
        let tool_call = choice
            .delta
            .tool_calls
            .as_ref()
            .and_then(|calls| calls.first())
            .map(|tc| StreamToolCall {
                index: tc.index,
                id: tc.id.clone(),
                function: tc.function.as_ref().map(|f| StreamFunctionCall {
                    name: f.name.clone(),
                    arguments: f.arguments.clone(),
                }),
            });

        events.push(StreamEvent::Delta(StreamDelta {
            index: choice.index,
            content: choice.delta.content.clone(),
            tool_call,
            finish_reason: choice.finish_reason.as_deref().and_then(parse_finish_reason),
        }));
    }

    if let Some(usage) = &chunk.usage {
        events.push(StreamEvent::Usage(Usage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }));
    }

    events
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::{CompletionParams, OutputSchema};

    #[test]
    fn response_format_serializes_in_openai_dialect() {
        let request = CompletionRequest {
            model: "gpt-4.1".to_owned(),
            messages: vec![Message::text(Role::User, "hi")],
            params: CompletionParams::default(),
            tools: None,
            tool_choice: None,
            response_format: Some(OutputSchema {
                name: "invoice".to_owned(),
                schema: json!({"type": "object", "additionalProperties": false}),
                strict: true,
            }),
            reasoning: false,
            stream: false,
        };

        let wire: OpenAiRequest = (&request).into();
        let value = serde_json::to_value(&wire).unwrap();
        assert_eq!(value["response_format"]["type"], "json_schema");
        assert_eq!(value["response_format"]["json_schema"]["name"], "invoice");
        assert_eq!(value["response_format"]["json_schema"]["strict"], json!(true));
    }

    #[test]
    fn usage_chunk_becomes_a_usage_event() {
        let chunk: OpenAiStreamChunk = serde_json::from_value(json!({
            "choices": [],
            "usage": {"prompt_tokens": 3, "completion_tokens": 4, "total_tokens": 7}
        }))
        .unwrap();
        let events = openai_chunk_to_events(&chunk);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], StreamEvent::Usage(u) if u.total_tokens == 7));
    }
}
