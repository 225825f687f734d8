use prism_models::ModelOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::Message;
use super::tool::{ToolChoice, ToolDefinition};

/// Parameters controlling text generation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

/// Structured-output schema after vendor normalization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSchema {
    pub name: String,
    pub schema: Value,
    /// Whether the vendor should enforce the schema strictly
    pub strict: bool,
}

/// Validated gateway request, before model resolution
///
/// `model` is kept verbatim for echoing into the response envelope.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub params: CompletionParams,
    pub stream: bool,
    /// Data-stream wire format instead of raw text when streaming
    pub use_chat: bool,
    /// Inline response-format schema, before normalization
    pub response_format: Option<OutputSchema>,
    /// Tools declared by the caller, passed upstream but never executed here
    pub declared_tools: Option<Vec<ToolDefinition>>,
    pub options: ModelOptions,
    pub user: Option<String>,
}

/// Canonical request sent to a provider adapter
///
/// `model` here is the concrete upstream identifier, not the caller's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub params: CompletionParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    /// Vendor-normalized structured-output schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<OutputSchema>,
    /// Extended reasoning, forced on by the `:thinking` variant
    #[serde(default)]
    pub reasoning: bool,
    #[serde(default)]
    pub stream: bool,
}
