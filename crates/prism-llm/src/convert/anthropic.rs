//! Conversion between canonical types and the Anthropic Messages format

use super::parse_finish_reason;
use crate::protocol::anthropic::{
    AnthropicContent, AnthropicContentBlock, AnthropicImageSource, AnthropicMessage, AnthropicRequest,
    AnthropicResponse, AnthropicResponseBlock, AnthropicStreamContentBlock, AnthropicStreamDelta,
    AnthropicStreamEvent, AnthropicThinking, AnthropicTool, AnthropicToolChoice,
};
use crate::types::{
    Choice, ChoiceMessage, CompletionRequest, CompletionResponse, Content, ContentPart, FunctionCall, Message, Role,
    StreamDelta, StreamEvent, StreamFunctionCall, StreamToolCall, ToolCall, ToolChoice, ToolChoiceMode, Usage,
};

/// The Messages API requires `max_tokens`
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Thinking budget when the reasoning variant is forced on
const THINKING_BUDGET_TOKENS: u32 = 8192;

// -- Outbound: canonical request -> Anthropic wire request --

impl From<&CompletionRequest> for AnthropicRequest {
    fn from(req: &CompletionRequest) -> Self {
        let mut system = None;
        let mut messages = Vec::new();

        for msg in &req.messages {
            if msg.role == Role::System {
                system = Some(msg.content.as_text());
            } else {
                messages.push(message_to_wire(msg));
            }
        }

        let tools = req.tools.as_ref().map(|tools| {
            tools
                .iter()
                .map(|t| AnthropicTool {
                    name: t.function.name.clone(),
                    description: t.function.description.clone(),
                    input_schema: t
                        .function
                        .parameters
                        .clone()
                        .unwrap_or_else(|| serde_json::json!({"type": "object"})),
                })
                .collect()
        });

        Self {
            model: req.model.clone(),
            max_tokens: req.params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system,
            messages,
            temperature: req.params.temperature,
            top_p: req.params.top_p,
            stop_sequences: req.params.stop.clone(),
            stream: req.stream.then_some(true),
            tools,
            tool_choice: req.tool_choice.as_ref().map(tool_choice_to_wire),
            thinking: req.reasoning.then_some(AnthropicThinking {
                thinking_type: "enabled".to_owned(),
                budget_tokens: THINKING_BUDGET_TOKENS,
            }),
        }
    }
}

fn message_to_wire(msg: &Message) -> AnthropicMessage {
    // Tool results travel as user-role tool_result blocks
    if msg.role == Role::Tool
        && let Some(tool_call_id) = &msg.tool_call_id
    {
        return AnthropicMessage {
            role: "user".to_owned(),
            content: AnthropicContent::Blocks(vec![AnthropicContentBlock::ToolResult {
                tool_use_id: tool_call_id.clone(),
                content: Some(msg.content.as_text()),
            }]),
        };
    }

    let role = if msg.role == Role::Assistant { "assistant" } else { "user" };

    if let Some(tool_calls) = &msg.tool_calls {
        let mut blocks = Vec::new();
        let text = msg.content.as_text();
        if !text.is_empty() {
            blocks.push(AnthropicContentBlock::Text { text });
        }
        for tc in tool_calls {
            let input = serde_json::from_str(&tc.function.arguments).unwrap_or_else(|_| serde_json::json!({}));
            blocks.push(AnthropicContentBlock::ToolUse {
                id: tc.id.clone(),
                name: tc.function.name.clone(),
                input,
            });
        }
        return AnthropicMessage {
            role: role.to_owned(),
            content: AnthropicContent::Blocks(blocks),
        };
    }

    let content = match &msg.content {
        Content::Text(text) => AnthropicContent::Text(text.clone()),
        Content::Parts(parts) => AnthropicContent::Blocks(parts.iter().map(part_to_block).collect()),
    };

    AnthropicMessage {
        role: role.to_owned(),
        content,
    }
}

fn part_to_block(part: &ContentPart) -> AnthropicContentBlock {
    match part {
        ContentPart::Text { text } => AnthropicContentBlock::Text { text: text.clone() },
        ContentPart::Image { url, .. } => {
            if let Some(rest) = url.strip_prefix("data:")
                && let Some((mime_and_encoding, data)) = rest.split_once(',')
            {
                let media_type = mime_and_encoding.strip_suffix(";base64").unwrap_or(mime_and_encoding);
                AnthropicContentBlock::Image {
                    source: AnthropicImageSource {
                        source_type: "base64".to_owned(),
                        media_type: Some(media_type.to_owned()),
                        data: data.to_owned(),
                    },
                }
            } else {
                AnthropicContentBlock::Image {
                    source: AnthropicImageSource {
                        source_type: "url".to_owned(),
                        media_type: None,
                        data: url.clone(),
                    },
                }
            }
        }
    }
}

fn tool_choice_to_wire(choice: &ToolChoice) -> AnthropicToolChoice {
    match choice {
        // The Messages API has no "none" mode
        ToolChoice::Mode(ToolChoiceMode::None | ToolChoiceMode::Auto) => AnthropicToolChoice {
            choice_type: "auto".to_owned(),
            name: None,
        },
        ToolChoice::Mode(ToolChoiceMode::Required) => AnthropicToolChoice {
            choice_type: "any".to_owned(),
            name: None,
        },
        ToolChoice::Function { name } => AnthropicToolChoice {
            choice_type: "tool".to_owned(),
            name: Some(name.clone()),
        },
    }
}

// -- Inbound: Anthropic wire response -> canonical --

impl From<AnthropicResponse> for CompletionResponse {
    fn from(resp: AnthropicResponse) -> Self {
        let mut text_content = String::new();
        let mut tool_calls = Vec::new();

        for block in &resp.content {
            match block {
                AnthropicResponseBlock::Text { text } => text_content.push_str(text),
                // Reasoning output never reaches the envelope
                AnthropicResponseBlock::Thinking { .. } => {}
                AnthropicResponseBlock::ToolUse { id, name, input } => {
                    let arguments = serde_json::to_string(input).unwrap_or_else(|_| "{}".to_owned());
                    tool_calls.push(ToolCall {
                        id: id.clone(),
                        function: FunctionCall {
                            name: name.clone(),
                            arguments,
                        },
                    });
                }
            }
        }

        let message = ChoiceMessage {
            role: "assistant".to_owned(),
            content: if text_content.is_empty() && !tool_calls.is_empty() {
                None
            } else {
                Some(text_content)
            },
            tool_calls: if tool_calls.is_empty() { None } else { Some(tool_calls) },
        };

        Self {
            id: resp.id,
            object: "chat.completion".to_owned(),
            created: 0,
            model: String::new(),
            choices: vec![Choice {
                index: 0,
                message,
                finish_reason: resp.stop_reason.as_deref().and_then(parse_finish_reason),
            }],
            usage: Some(Usage {
                prompt_tokens: resp.usage.input_tokens,
                completion_tokens: resp.usage.output_tokens,
                total_tokens: resp.usage.input_tokens + resp.usage.output_tokens,
            }),
        }
    }
}

// -- Streaming --

/// Tracks block state across the Anthropic SSE event sequence
///
/// Anthropic's content block index is shared across block types, so tool
/// calls get their own sequential numbering.
#[derive(Debug, Default)]
pub struct AnthropicStreamState {
    current_tool_call_index: u32,
    next_tool_call_index: u32,
}

impl AnthropicStreamState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts one SSE event into canonical stream events.
    pub fn convert_event(&mut self, event: &AnthropicStreamEvent) -> Vec<StreamEvent> {
        match event {
            AnthropicStreamEvent::MessageStart { .. }
            | AnthropicStreamEvent::ContentBlockStop { .. }
            | AnthropicStreamEvent::Ping => Vec::new(),

            AnthropicStreamEvent::ContentBlockStart { content_block, .. } => match content_block {
                AnthropicStreamContentBlock::Text { .. } | AnthropicStreamContentBlock::Thinking { .. } => Vec::new(),
                AnthropicStreamContentBlock::ToolUse { id, name, .. } => {
                    self.current_tool_call_index = self.next_tool_call_index;
                    self.next_tool_call_index += 1;
                    vec![StreamEvent::Delta(StreamDelta {
                        index: 0,
                        content: None,
                        tool_call: Some(StreamToolCall {
                            index: self.current_tool_call_index,
                            id: Some(id.clone()),
                            function: Some(StreamFunctionCall {
                                name: Some(name.clone()),
                                arguments: None,
                            }),
                        }),
                        finish_reason: None,
                    })]
                }
            },

            AnthropicStreamEvent::ContentBlockDelta { delta, .. } => match delta {
                AnthropicStreamDelta::TextDelta { text } => vec![StreamEvent::Delta(StreamDelta {
                    index: 0,
                    content: Some(text.clone()),
                    tool_call: None,
                    finish_reason: None,
                })],
                AnthropicStreamDelta::InputJsonDelta { partial_json } => {
                    vec![StreamEvent::Delta(StreamDelta {
                        index: 0,
                        content: None,
                        tool_call: Some(StreamToolCall {
                            index: self.current_tool_call_index,
                            id: None,
                            function: Some(StreamFunctionCall {
                                name: None,
                                arguments: Some(partial_json.clone()),
                            }),
                        }),
                        finish_reason: None,
                    })]
                }
                // Reasoning deltas are dropped
                AnthropicStreamDelta::ThinkingDelta { .. } | AnthropicStreamDelta::SignatureDelta { .. } => Vec::new(),
            },

            AnthropicStreamEvent::MessageDelta { delta, usage } => {
                let mut events = Vec::new();
                let finish_reason = delta.stop_reason.as_deref().and_then(parse_finish_reason);
                if finish_reason.is_some() {
                    events.push(StreamEvent::Delta(StreamDelta {
                        index: 0,
                        content: None,
                        tool_call: None,
                        finish_reason,
                    }));
                }
                if let Some(usage) = usage {
                    events.push(StreamEvent::Usage(Usage {
                        prompt_tokens: usage.input_tokens,
                        completion_tokens: usage.output_tokens,
                        total_tokens: usage.input_tokens + usage.output_tokens,
                    }));
                }
                events
            }

            AnthropicStreamEvent::MessageStop => vec![StreamEvent::Done],
        }
    }
}
