//! Result of a processed stream.

use serde::{Deserialize, Serialize};

use super::generation::FinishReason;
use super::tool_call::ToolCall;
use super::usage::Usage;

/// Final summary of one aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorResult {
    /// Full accumulated assistant text.
    pub content: String,
    /// Tool calls in first-seen order; `None` when the stream carried none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Accumulated reasoning text, when the provider streamed any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    /// Finish reason of the last `done` chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    /// Usage summed over every `done` chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ProcessorResult {
    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls.is_some()
    }
}
