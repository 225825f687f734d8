//! Internal canonical types for completion request/response representation
//!
//! Provider-agnostic: every vendor wire format converts to and from these.

pub mod message;
pub mod request;
pub mod response;
pub mod stream;
pub mod tool;

pub use message::{Content, ContentPart, FunctionCall, Message, Role, ToolCall};
pub use request::{ChatRequest, CompletionParams, CompletionRequest, OutputSchema};
pub use response::{Choice, ChoiceMessage, CompletionResponse, FinishReason, Usage};
pub use stream::{StreamDelta, StreamEvent, StreamFunctionCall, StreamToolCall};
pub use tool::{FunctionDefinition, ToolChoice, ToolChoiceMode, ToolDefinition};
