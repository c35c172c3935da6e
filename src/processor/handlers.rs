//! Lifecycle handlers notified while a stream is processed.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::error::ChunkwiseError;
use crate::types::ToolCall;

/// Input progress of a tool call, as reported by
/// [`StreamHandlers::on_tool_call_state_change`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ToolInputState {
    /// Seen, no argument fragment yet.
    AwaitingInput,
    InputStreaming,
    InputComplete,
}

/// Receiver of processing events.
///
/// Every method defaults to a no-op, so implementors only override what they
/// need. Calls arrive in chunk order, and `on_stream_end` is always the last
/// call of a run.
pub trait StreamHandlers {
    /// Full cumulative text so far, never a delta.
    fn on_text_update(&mut self, _content: &str) {}

    /// Full cumulative reasoning text so far.
    fn on_thinking_update(&mut self, _content: &str) {}

    fn on_tool_call_start(&mut self, _index: u32, _id: &str, _name: &str) {}

    /// One arguments fragment, not the cumulative arguments.
    fn on_tool_call_delta(&mut self, _index: u32, _fragment: &str) {}

    /// Fires once per tool call, when something else arrives after it.
    ///
    /// `arguments` is a snapshot at that moment. Fragments can still arrive
    /// for a completed call (interleaved parallel calls do this); each one
    /// is reported through `on_tool_call_delta` and then
    /// `on_tool_call_state_change` with `InputComplete` and the extended
    /// arguments. The latest state change, and the `tool_calls` passed to
    /// `on_stream_end`, carry the final arguments.
    fn on_tool_call_complete(&mut self, _index: u32, _id: &str, _name: &str, _arguments: &str) {}

    fn on_tool_call_state_change(
        &mut self,
        _index: u32,
        _id: &str,
        _name: &str,
        _state: ToolInputState,
        _arguments: &str,
    ) {
    }

    fn on_tool_input_available(&mut self, _tool_call_id: &str, _tool_name: &str, _input: &Value) {}

    fn on_approval_requested(
        &mut self,
        _tool_call_id: &str,
        _tool_name: &str,
        _input: &Value,
        _approval_id: &str,
    ) {
    }

    fn on_tool_result(&mut self, _tool_call_id: &str, _content: &str) {}

    /// The run is failing; `on_stream_end` follows with the partial state.
    fn on_error(&mut self, _error: &ChunkwiseError) {}

    fn on_stream_end(&mut self, _content: &str, _tool_calls: Option<&[ToolCall]>) {}
}

impl StreamHandlers for () {}

impl<H: StreamHandlers + ?Sized> StreamHandlers for &mut H {
    fn on_text_update(&mut self, content: &str) {
        (**self).on_text_update(content)
    }

    fn on_thinking_update(&mut self, content: &str) {
        (**self).on_thinking_update(content)
    }

    fn on_tool_call_start(&mut self, index: u32, id: &str, name: &str) {
        (**self).on_tool_call_start(index, id, name)
    }

    fn on_tool_call_delta(&mut self, index: u32, fragment: &str) {
        (**self).on_tool_call_delta(index, fragment)
    }

    fn on_tool_call_complete(&mut self, index: u32, id: &str, name: &str, arguments: &str) {
        (**self).on_tool_call_complete(index, id, name, arguments)
    }

    fn on_tool_call_state_change(
        &mut self,
        index: u32,
        id: &str,
        name: &str,
        state: ToolInputState,
        arguments: &str,
    ) {
        (**self).on_tool_call_state_change(index, id, name, state, arguments)
    }

    fn on_tool_input_available(&mut self, tool_call_id: &str, tool_name: &str, input: &Value) {
        (**self).on_tool_input_available(tool_call_id, tool_name, input)
    }

    fn on_approval_requested(
        &mut self,
        tool_call_id: &str,
        tool_name: &str,
        input: &Value,
        approval_id: &str,
    ) {
        (**self).on_approval_requested(tool_call_id, tool_name, input, approval_id)
    }

    fn on_tool_result(&mut self, tool_call_id: &str, content: &str) {
        (**self).on_tool_result(tool_call_id, content)
    }

    fn on_error(&mut self, error: &ChunkwiseError) {
        (**self).on_error(error)
    }

    fn on_stream_end(&mut self, content: &str, tool_calls: Option<&[ToolCall]>) {
        (**self).on_stream_end(content, tool_calls)
    }
}

type TextFn = Box<dyn FnMut(&str) + Send>;
type ToolStartFn = Box<dyn FnMut(u32, &str, &str) + Send>;
type ToolDeltaFn = Box<dyn FnMut(u32, &str) + Send>;
type ToolCompleteFn = Box<dyn FnMut(u32, &str, &str, &str) + Send>;
type ToolStateFn = Box<dyn FnMut(u32, &str, &str, ToolInputState, &str) + Send>;
type ToolInputFn = Box<dyn FnMut(&str, &str, &Value) + Send>;
type ApprovalFn = Box<dyn FnMut(&str, &str, &Value, &str) + Send>;
type ToolResultFn = Box<dyn FnMut(&str, &str) + Send>;
type ErrorFn = Box<dyn FnMut(&ChunkwiseError) + Send>;
type StreamEndFn = Box<dyn FnMut(&str, Option<&[ToolCall]>) + Send>;

/// Handlers backed by optional closures.
///
/// ```
/// use chunkwise::processor::CallbackHandlers;
///
/// let handlers = CallbackHandlers::new()
///     .with_text_update(|text| println!("{text}"))
///     .with_stream_end(|text, calls| {
///         println!("done: {} chars, {} tool calls", text.len(), calls.map_or(0, |c| c.len()))
///     });
/// # let _ = handlers;
/// ```
#[derive(Default)]
pub struct CallbackHandlers {
    text_update: Option<TextFn>,
    thinking_update: Option<TextFn>,
    tool_call_start: Option<ToolStartFn>,
    tool_call_delta: Option<ToolDeltaFn>,
    tool_call_complete: Option<ToolCompleteFn>,
    tool_call_state_change: Option<ToolStateFn>,
    tool_input_available: Option<ToolInputFn>,
    approval_requested: Option<ApprovalFn>,
    tool_result: Option<ToolResultFn>,
    error: Option<ErrorFn>,
    stream_end: Option<StreamEndFn>,
}

impl CallbackHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text_update(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.text_update = Some(Box::new(f));
        self
    }

    pub fn with_thinking_update(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.thinking_update = Some(Box::new(f));
        self
    }

    pub fn with_tool_call_start(mut self, f: impl FnMut(u32, &str, &str) + Send + 'static) -> Self {
        self.tool_call_start = Some(Box::new(f));
        self
    }

    pub fn with_tool_call_delta(mut self, f: impl FnMut(u32, &str) + Send + 'static) -> Self {
        self.tool_call_delta = Some(Box::new(f));
        self
    }

    pub fn with_tool_call_complete(
        mut self,
        f: impl FnMut(u32, &str, &str, &str) + Send + 'static,
    ) -> Self {
        self.tool_call_complete = Some(Box::new(f));
        self
    }

    pub fn with_tool_call_state_change(
        mut self,
        f: impl FnMut(u32, &str, &str, ToolInputState, &str) + Send + 'static,
    ) -> Self {
        self.tool_call_state_change = Some(Box::new(f));
        self
    }

    pub fn with_tool_input_available(
        mut self,
        f: impl FnMut(&str, &str, &Value) + Send + 'static,
    ) -> Self {
        self.tool_input_available = Some(Box::new(f));
        self
    }

    pub fn with_approval_requested(
        mut self,
        f: impl FnMut(&str, &str, &Value, &str) + Send + 'static,
    ) -> Self {
        self.approval_requested = Some(Box::new(f));
        self
    }

    pub fn with_tool_result(mut self, f: impl FnMut(&str, &str) + Send + 'static) -> Self {
        self.tool_result = Some(Box::new(f));
        self
    }

    pub fn with_error(mut self, f: impl FnMut(&ChunkwiseError) + Send + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }

    pub fn with_stream_end(
        mut self,
        f: impl FnMut(&str, Option<&[ToolCall]>) + Send + 'static,
    ) -> Self {
        self.stream_end = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for CallbackHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackHandlers")
            .field("text_update", &self.text_update.is_some())
            .field("tool_call_start", &self.tool_call_start.is_some())
            .field("tool_call_complete", &self.tool_call_complete.is_some())
            .field("stream_end", &self.stream_end.is_some())
            .finish_non_exhaustive()
    }
}

impl StreamHandlers for CallbackHandlers {
    fn on_text_update(&mut self, content: &str) {
        if let Some(f) = self.text_update.as_mut() {
            f(content);
        }
    }

    fn on_thinking_update(&mut self, content: &str) {
        if let Some(f) = self.thinking_update.as_mut() {
            f(content);
        }
    }

    fn on_tool_call_start(&mut self, index: u32, id: &str, name: &str) {
        if let Some(f) = self.tool_call_start.as_mut() {
            f(index, id, name);
        }
    }

    fn on_tool_call_delta(&mut self, index: u32, fragment: &str) {
        if let Some(f) = self.tool_call_delta.as_mut() {
            f(index, fragment);
        }
    }

    fn on_tool_call_complete(&mut self, index: u32, id: &str, name: &str, arguments: &str) {
        if let Some(f) = self.tool_call_complete.as_mut() {
            f(index, id, name, arguments);
        }
    }

    fn on_tool_call_state_change(
        &mut self,
        index: u32,
        id: &str,
        name: &str,
        state: ToolInputState,
        arguments: &str,
    ) {
        if let Some(f) = self.tool_call_state_change.as_mut() {
            f(index, id, name, state, arguments);
        }
    }

    fn on_tool_input_available(&mut self, tool_call_id: &str, tool_name: &str, input: &Value) {
        if let Some(f) = self.tool_input_available.as_mut() {
            f(tool_call_id, tool_name, input);
        }
    }

    fn on_approval_requested(
        &mut self,
        tool_call_id: &str,
        tool_name: &str,
        input: &Value,
        approval_id: &str,
    ) {
        if let Some(f) = self.approval_requested.as_mut() {
            f(tool_call_id, tool_name, input, approval_id);
        }
    }

    fn on_tool_result(&mut self, tool_call_id: &str, content: &str) {
        if let Some(f) = self.tool_result.as_mut() {
            f(tool_call_id, content);
        }
    }

    fn on_error(&mut self, error: &ChunkwiseError) {
        if let Some(f) = self.error.as_mut() {
            f(error);
        }
    }

    fn on_stream_end(&mut self, content: &str, tool_calls: Option<&[ToolCall]>) {
        if let Some(f) = self.stream_end.as_mut() {
            f(content, tool_calls);
        }
    }
}
