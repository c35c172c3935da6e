//! Stream chunk vocabulary shared with provider adapters.
//!
//! Chunks travel as JSON objects discriminated by `type`. Older adapters emit
//! `text` and `tool-call-delta`; both spellings are accepted.

use serde::{Deserialize, Serialize};

use super::generation::FinishReason;
use super::usage::Usage;

/// One event of a provider's streaming response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StreamChunk {
    #[serde(rename = "content", alias = "text")]
    Content(ContentChunk),
    #[serde(rename = "thinking")]
    Thinking(ThinkingChunk),
    #[serde(rename = "tool_call", alias = "tool-call-delta")]
    ToolCall(ToolCallChunk),
    #[serde(rename = "tool-input-available")]
    ToolInputAvailable(ToolInputAvailableChunk),
    #[serde(rename = "approval-requested")]
    ApprovalRequested(ApprovalRequestedChunk),
    #[serde(rename = "tool_result")]
    ToolResult(ToolResultChunk),
    #[serde(rename = "done")]
    Done(DoneChunk),
    #[serde(rename = "error")]
    Error(ErrorChunk),
}

/// Envelope fields every chunk may carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Unix timestamp in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Assistant text.
///
/// `delta` is the increment; `content` is the provider's cumulative view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentChunk {
    #[serde(flatten)]
    pub meta: ChunkMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Reasoning text. Same delta/content rules as [`ContentChunk`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThinkingChunk {
    #[serde(flatten)]
    pub meta: ChunkMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A fragment of one tool call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallChunk {
    #[serde(flatten)]
    pub meta: ChunkMeta,
    /// Position in the provider's parallel tool-call array.
    #[serde(default, alias = "index")]
    pub tool_call_index: u32,
    #[serde(default)]
    pub tool_call: ToolCallDelta,
}

/// Partial tool call: any field may be empty on any fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallDelta {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub function: FunctionDelta,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDelta {
    #[serde(default)]
    pub name: String,
    /// Fragment of the serialized JSON arguments.
    #[serde(default)]
    pub arguments: String,
}

/// Tool inputs are complete and ready for client-side execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInputAvailableChunk {
    #[serde(flatten)]
    pub meta: ChunkMeta,
    pub tool_call_id: String,
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub input: serde_json::Value,
}

/// A tool requires user approval before it may run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequestedChunk {
    #[serde(flatten)]
    pub meta: ChunkMeta,
    pub tool_call_id: String,
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub input: serde_json::Value,
    pub approval: ApprovalInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalInfo {
    pub id: String,
    #[serde(default)]
    pub needs_approval: bool,
}

/// Output of an executed tool, JSON-stringified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultChunk {
    #[serde(flatten)]
    pub meta: ChunkMeta,
    pub tool_call_id: String,
    #[serde(default)]
    pub content: String,
}

/// End of one provider turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoneChunk {
    #[serde(flatten)]
    pub meta: ChunkMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// The provider reported a failure mid-stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorChunk {
    #[serde(flatten)]
    pub meta: ChunkMeta,
    pub error: ErrorInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl StreamChunk {
    /// Text chunk carrying only an increment.
    pub fn text_delta(delta: impl Into<String>) -> Self {
        Self::Content(ContentChunk {
            delta: Some(delta.into()),
            ..Default::default()
        })
    }

    /// Text chunk carrying only `content`.
    pub fn content(content: impl Into<String>) -> Self {
        Self::Content(ContentChunk {
            content: Some(content.into()),
            ..Default::default()
        })
    }

    /// Text chunk carrying both the cumulative content and the increment.
    pub fn content_with_delta(content: impl Into<String>, delta: impl Into<String>) -> Self {
        Self::Content(ContentChunk {
            content: Some(content.into()),
            delta: Some(delta.into()),
            ..Default::default()
        })
    }

    pub fn thinking_delta(delta: impl Into<String>) -> Self {
        Self::Thinking(ThinkingChunk {
            delta: Some(delta.into()),
            ..Default::default()
        })
    }

    pub fn tool_call_delta(
        index: u32,
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self::ToolCall(ToolCallChunk {
            meta: ChunkMeta::default(),
            tool_call_index: index,
            tool_call: ToolCallDelta {
                id: id.into(),
                function: FunctionDelta {
                    name: name.into(),
                    arguments: arguments.into(),
                },
            },
        })
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult(ToolResultChunk {
            meta: ChunkMeta::default(),
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        })
    }

    pub fn done(finish_reason: Option<FinishReason>) -> Self {
        Self::Done(DoneChunk {
            finish_reason,
            ..Default::default()
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ErrorChunk {
            meta: ChunkMeta::default(),
            error: ErrorInfo {
                message: message.into(),
                code: None,
            },
        })
    }

    /// Envelope metadata of this chunk.
    pub fn meta(&self) -> &ChunkMeta {
        match self {
            Self::Content(c) => &c.meta,
            Self::Thinking(c) => &c.meta,
            Self::ToolCall(c) => &c.meta,
            Self::ToolInputAvailable(c) => &c.meta,
            Self::ApprovalRequested(c) => &c.meta,
            Self::ToolResult(c) => &c.meta,
            Self::Done(c) => &c.meta,
            Self::Error(c) => &c.meta,
        }
    }

    /// Wire name of this chunk's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Content(_) => "content",
            Self::Thinking(_) => "thinking",
            Self::ToolCall(_) => "tool_call",
            Self::ToolInputAvailable(_) => "tool-input-available",
            Self::ApprovalRequested(_) => "approval-requested",
            Self::ToolResult(_) => "tool_result",
            Self::Done(_) => "done",
            Self::Error(_) => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_type_names_deserialize() {
        let text: StreamChunk = serde_json::from_str(r#"{"type":"text","content":"Hi"}"#).unwrap();
        assert_eq!(text, StreamChunk::content("Hi"));

        let call: StreamChunk = serde_json::from_str(
            r#"{"type":"tool-call-delta","toolCallIndex":2,"toolCall":{"id":"call_1","function":{"name":"f","arguments":"{"}}}"#,
        )
        .unwrap();
        assert_eq!(call, StreamChunk::tool_call_delta(2, "call_1", "f", "{"));
    }

    #[test]
    fn tool_call_accepts_index_field_and_envelope() {
        let chunk: StreamChunk = serde_json::from_str(
            r#"{"type":"tool_call","id":"chatcmpl-1","model":"gpt-4o","timestamp":1762118703060,
                "toolCall":{"id":"call_1","type":"function","function":{"name":"getGuitars","arguments":""}},
                "index":0}"#,
        )
        .unwrap();
        let StreamChunk::ToolCall(call) = &chunk else {
            panic!("expected tool call chunk, got {chunk:?}");
        };
        assert_eq!(call.tool_call_index, 0);
        assert_eq!(call.tool_call.function.name, "getGuitars");
        assert_eq!(chunk.meta().model.as_deref(), Some("gpt-4o"));
        assert_eq!(chunk.meta().timestamp, Some(1762118703060));
    }

    #[test]
    fn missing_tool_call_fields_default_to_empty() {
        let chunk: StreamChunk =
            serde_json::from_str(r#"{"type":"tool_call","index":1,"toolCall":{}}"#).unwrap();
        assert_eq!(chunk, StreamChunk::tool_call_delta(1, "", "", ""));
    }

    #[test]
    fn done_and_error_payloads() {
        let done: StreamChunk = serde_json::from_str(
            r#"{"type":"done","finishReason":"tool_calls","usage":{"promptTokens":3,"completionTokens":4,"totalTokens":7}}"#,
        )
        .unwrap();
        let StreamChunk::Done(done) = done else {
            panic!("expected done chunk");
        };
        assert_eq!(done.finish_reason, Some(FinishReason::ToolCalls));
        assert_eq!(done.usage.map(|u| u.total_tokens), Some(7));

        let unknown: StreamChunk =
            serde_json::from_str(r#"{"type":"done","finishReason":"max_tokens"}"#).unwrap();
        assert_eq!(unknown, StreamChunk::done(Some(FinishReason::Other)));

        let error: StreamChunk =
            serde_json::from_str(r#"{"type":"error","error":{"message":"overloaded","code":"529"}}"#)
                .unwrap();
        assert_eq!(error.kind(), "error");
    }

    #[test]
    fn serializes_with_canonical_type_names() {
        let json = serde_json::to_value(StreamChunk::tool_call_delta(0, "a", "b", "c")).unwrap();
        assert_eq!(json["type"], "tool_call");
        assert_eq!(json["toolCallIndex"], 0);
        assert_eq!(json["toolCall"]["function"]["arguments"], "c");

        let json = serde_json::to_value(StreamChunk::text_delta("x")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "content", "delta": "x"}));
    }
}
