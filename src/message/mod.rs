//! Client-side message assembly.
//!
//! [`MessageBuilder`] is a [`StreamHandlers`] implementation that turns the
//! processor's notifications into a [`UiMessage`]: an ordered list of parts a
//! chat UI can render directly. Tool calls move through [`ToolCallState`] and
//! carry their partially parsed input while arguments stream in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ChunkwiseError, Result};
use crate::processor::{StreamHandlers, ToolInputState};
use crate::types::ToolCall;
use crate::util::{JsonParser, PartialJsonParser};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    #[default]
    Assistant,
}

/// A message as rendered by a chat UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UiMessage {
    pub id: String,
    pub role: MessageRole,
    pub parts: Vec<MessagePart>,
    pub created_at: DateTime<Utc>,
}

impl UiMessage {
    pub fn new(role: MessageRole) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            parts: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// All text parts joined in order.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                MessagePart::Text { content } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn tool_call(&self, id: &str) -> Option<&ToolCallPart> {
        self.parts.iter().find_map(|part| match part {
            MessagePart::ToolCall(call) if call.id == id => Some(call),
            _ => None,
        })
    }

    fn tool_call_mut(&mut self, id: &str) -> Option<&mut ToolCallPart> {
        self.parts.iter_mut().find_map(|part| match part {
            MessagePart::ToolCall(call) if call.id == id => Some(call),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MessagePart {
    Text { content: String },
    Thinking { content: String },
    ToolCall(ToolCallPart),
    ToolResult(ToolResultPart),
}

/// Lifecycle of a tool call part. States only move forward.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ToolCallState {
    #[default]
    AwaitingInput,
    InputStreaming,
    InputComplete,
    ApprovalRequested,
    ApprovalResponded,
}

impl From<ToolInputState> for ToolCallState {
    fn from(state: ToolInputState) -> Self {
        match state {
            ToolInputState::AwaitingInput => Self::AwaitingInput,
            ToolInputState::InputStreaming => Self::InputStreaming,
            ToolInputState::InputComplete => Self::InputComplete,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub id: String,
    pub needs_approval: bool,
    /// `None` until the user responds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallPart {
    pub id: String,
    pub name: String,
    /// Raw accumulated JSON arguments.
    pub arguments: String,
    /// Best-effort parse of `arguments`, updated as fragments arrive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    pub state: ToolCallState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval: Option<Approval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

impl ToolCallPart {
    fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            arguments: String::new(),
            input: None,
            state: ToolCallState::AwaitingInput,
            approval: None,
            output: None,
        }
    }

    fn advance(&mut self, state: ToolCallState) {
        if state > self.state {
            self.state = state;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ToolResultState {
    Streaming,
    #[default]
    Complete,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultPart {
    pub tool_call_id: String,
    pub content: String,
    pub state: ToolResultState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Builds a [`UiMessage`] from processor notifications.
///
/// ```
/// use chunkwise::message::MessageBuilder;
/// use chunkwise::processor::StreamProcessor;
/// use chunkwise::types::StreamChunk;
///
/// # async fn example() -> chunkwise::error::Result<()> {
/// let chunks = futures::stream::iter(
///     [
///         StreamChunk::text_delta("Let me check."),
///         StreamChunk::tool_call_delta(0, "call_1", "weather", r#"{"city":"Oslo"}"#),
///         StreamChunk::tool_result("call_1", r#"{"temp":4}"#),
///         StreamChunk::text_delta(" It is 4 degrees."),
///     ]
///     .map(Ok),
/// );
/// let mut processor = StreamProcessor::with_handlers(MessageBuilder::new());
/// processor.process(chunks).await?;
/// let message = processor.into_handlers().into_message();
/// assert_eq!(message.parts.len(), 4);
/// # Ok(())
/// # }
/// ```
pub struct MessageBuilder {
    message: UiMessage,
    json_parser: Box<dyn JsonParser>,
    /// Part index of the text segment currently being extended.
    text_part: Option<usize>,
    /// Offset into the cumulative text where the current segment starts.
    text_offset: usize,
    /// Length of the cumulative text last reported.
    text_seen: usize,
    error: Option<String>,
    finished: bool,
}

impl Default for MessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MessageBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBuilder")
            .field("message", &self.message)
            .field("error", &self.error)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl MessageBuilder {
    /// Builder for a fresh assistant message.
    pub fn new() -> Self {
        Self::for_message(UiMessage::new(MessageRole::Assistant))
    }

    /// Continue filling an existing message, e.g. after a tool round trip.
    pub fn for_message(message: UiMessage) -> Self {
        Self {
            message,
            json_parser: Box::new(PartialJsonParser),
            text_part: None,
            text_offset: 0,
            text_seen: 0,
            error: None,
            finished: false,
        }
    }

    /// Replace the parser used for partial tool inputs.
    pub fn with_json_parser(mut self, parser: impl JsonParser + 'static) -> Self {
        self.json_parser = Box::new(parser);
        self
    }

    pub fn message(&self) -> &UiMessage {
        &self.message
    }

    pub fn into_message(self) -> UiMessage {
        self.message
    }

    /// Message of the error that ended the stream, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True once `on_stream_end` has been seen for the latest run.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Record the user's decision for a pending approval.
    pub fn add_approval_response(&mut self, approval_id: &str, approved: bool) -> Result<()> {
        let part = self
            .message
            .parts
            .iter_mut()
            .find_map(|part| match part {
                MessagePart::ToolCall(call)
                    if call.approval.as_ref().is_some_and(|a| a.id == approval_id) =>
                {
                    Some(call)
                }
                _ => None,
            })
            .ok_or_else(|| {
                ChunkwiseError::InvalidArgument(format!("unknown approval id '{approval_id}'"))
            })?;

        if let Some(approval) = part.approval.as_mut() {
            approval.approved = Some(approved);
        }
        part.advance(ToolCallState::ApprovalResponded);
        debug!(tool_call_id = %part.id, approval_id, approved, "approval responded");
        Ok(())
    }

    /// Attach the output of a tool executed on the client.
    pub fn add_tool_result(&mut self, tool_call_id: &str, output: Value) -> Result<()> {
        let content = serde_json::to_string(&output)?;
        let call = self.message.tool_call_mut(tool_call_id).ok_or_else(|| {
            ChunkwiseError::InvalidArgument(format!("unknown tool call id '{tool_call_id}'"))
        })?;
        call.output = Some(output);
        self.push_part(MessagePart::ToolResult(ToolResultPart {
            tool_call_id: tool_call_id.to_string(),
            content,
            state: ToolResultState::Complete,
            error: None,
        }));
        Ok(())
    }

    /// Record that a client-side tool failed.
    pub fn add_tool_error(&mut self, tool_call_id: &str, error: impl Into<String>) -> Result<()> {
        if self.message.tool_call(tool_call_id).is_none() {
            return Err(ChunkwiseError::InvalidArgument(format!(
                "unknown tool call id '{tool_call_id}'"
            )));
        }
        self.push_part(MessagePart::ToolResult(ToolResultPart {
            tool_call_id: tool_call_id.to_string(),
            content: String::new(),
            state: ToolResultState::Error,
            error: Some(error.into()),
        }));
        Ok(())
    }

    /// Push a non-text part; later text starts a new segment.
    fn push_part(&mut self, part: MessagePart) {
        if !matches!(part, MessagePart::Text { .. } | MessagePart::Thinking { .. }) {
            self.text_part = None;
            self.text_offset = self.text_seen;
        }
        self.message.parts.push(part);
    }

    fn ensure_tool_call(&mut self, id: &str, name: &str) -> Option<&mut ToolCallPart> {
        if self.message.tool_call(id).is_none() {
            self.push_part(MessagePart::ToolCall(ToolCallPart::new(id, name)));
        }
        self.message.tool_call_mut(id)
    }

    fn update_arguments(&mut self, id: &str, name: &str, arguments: &str, state: ToolCallState) {
        let input = self.json_parser.parse(arguments);
        if let Some(call) = self.ensure_tool_call(id, name) {
            call.arguments = arguments.to_string();
            if input.is_some() {
                call.input = input;
            }
            call.advance(state);
        }
    }
}

impl StreamHandlers for MessageBuilder {
    fn on_text_update(&mut self, content: &str) {
        let segment = content.get(self.text_offset..).unwrap_or_default();
        self.text_seen = content.len();
        if segment.is_empty() {
            return;
        }
        match self.text_part.and_then(|i| self.message.parts.get_mut(i)) {
            Some(MessagePart::Text { content }) => {
                segment.clone_into(content);
            }
            _ => {
                self.message.parts.push(MessagePart::Text {
                    content: segment.to_string(),
                });
                self.text_part = Some(self.message.parts.len() - 1);
            }
        }
    }

    fn on_thinking_update(&mut self, content: &str) {
        let existing = self.message.parts.iter_mut().find_map(|part| match part {
            MessagePart::Thinking { content } => Some(content),
            _ => None,
        });
        match existing {
            Some(thinking) => content.clone_into(thinking),
            None => self.message.parts.push(MessagePart::Thinking {
                content: content.to_string(),
            }),
        }
    }

    fn on_tool_call_start(&mut self, _index: u32, id: &str, name: &str) {
        self.ensure_tool_call(id, name);
    }

    fn on_tool_call_complete(&mut self, _index: u32, id: &str, name: &str, arguments: &str) {
        self.update_arguments(id, name, arguments, ToolCallState::InputComplete);
    }

    fn on_tool_call_state_change(
        &mut self,
        _index: u32,
        id: &str,
        name: &str,
        state: ToolInputState,
        arguments: &str,
    ) {
        self.update_arguments(id, name, arguments, state.into());
    }

    fn on_tool_input_available(&mut self, tool_call_id: &str, tool_name: &str, input: &Value) {
        if let Some(call) = self.ensure_tool_call(tool_call_id, tool_name) {
            call.input = Some(input.clone());
            call.advance(ToolCallState::InputComplete);
        }
    }

    fn on_approval_requested(
        &mut self,
        tool_call_id: &str,
        tool_name: &str,
        input: &Value,
        approval_id: &str,
    ) {
        if let Some(call) = self.ensure_tool_call(tool_call_id, tool_name) {
            if !input.is_null() {
                call.input = Some(input.clone());
            }
            call.approval = Some(Approval {
                id: approval_id.to_string(),
                needs_approval: true,
                approved: None,
            });
            call.advance(ToolCallState::ApprovalRequested);
        }
    }

    fn on_tool_result(&mut self, tool_call_id: &str, content: &str) {
        match self.message.tool_call_mut(tool_call_id) {
            Some(call) => {
                let output = serde_json::from_str(content)
                    .unwrap_or_else(|_| Value::String(content.to_string()));
                call.output = Some(output);
            }
            None => debug!(tool_call_id, "tool result for unknown tool call"),
        }
        self.push_part(MessagePart::ToolResult(ToolResultPart {
            tool_call_id: tool_call_id.to_string(),
            content: content.to_string(),
            state: ToolResultState::Complete,
            error: None,
        }));
    }

    fn on_error(&mut self, error: &ChunkwiseError) {
        self.error = Some(error.to_string());
    }

    fn on_stream_end(&mut self, _content: &str, _tool_calls: Option<&[ToolCall]>) {
        // The next run reports text from scratch into a new segment.
        self.text_part = None;
        self.text_offset = 0;
        self.text_seen = 0;
        self.finished = true;
    }
}
