use serde::{Deserialize, Serialize};

use super::response::{FinishReason, Usage};

/// One event in a provider token stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StreamEvent {
    /// Incremental content
    Delta(StreamDelta),
    /// Final usage, sent near stream end
    Usage(Usage),
    /// Stream completed
    Done,
}

/// Incremental update within a streaming response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamDelta {
    pub index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<StreamToolCall>,
    /// Present on the final delta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

/// Partial tool call within a stream delta
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamToolCall {
    /// Index in the `tool_calls` array
    pub index: u32,
    /// Present on the first chunk only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<StreamFunctionCall>,
}

/// Partial function call within a streaming tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamFunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Incremental arguments JSON fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}
