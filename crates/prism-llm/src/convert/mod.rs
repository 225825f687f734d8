//! Conversions between canonical types and vendor wire formats

pub mod anthropic;
pub mod google;
pub mod openai;

use crate::types::FinishReason;

/// Parses the finish-reason strings the vendors emit.
pub(crate) fn parse_finish_reason(s: &str) -> Option<FinishReason> {
    match s {
        "stop" | "end_turn" | "STOP" => Some(FinishReason::Stop),
        "length" | "max_tokens" | "MAX_TOKENS" => Some(FinishReason::Length),
        "tool_calls" | "tool_use" => Some(FinishReason::ToolCalls),
        "content_filter" | "SAFETY" => Some(FinishReason::ContentFilter),
        _ => None,
    }
}
