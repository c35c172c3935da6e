//! Shared test helpers and a recording handler.

#![allow(dead_code)]

use futures::Stream;
use serde_json::Value;

use chunkwise::error::{ChunkwiseError, Result};
use chunkwise::processor::{StreamHandlers, ToolInputState};
use chunkwise::types::{StreamChunk, ToolCall};

/// One handler invocation, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Text(String),
    Thinking(String),
    Start(u32, String, String),
    Delta(u32, String),
    Complete(u32, String, String, String),
    State(u32, String, ToolInputState, String),
    InputAvailable(String, String, Value),
    ApprovalRequested(String, String),
    ToolResult(String, String),
    Error(String),
    /// Final text and number of tool calls (`None` when there were none).
    End(String, Option<usize>),
}

/// Handler that records every call.
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<Event>,
}

impl Recorder {
    pub fn texts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn starts(&self) -> Vec<(u32, &str, &str)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Start(index, id, name) => Some((*index, id.as_str(), name.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn completes(&self) -> Vec<(u32, &str, &str, &str)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Complete(index, id, name, args) => {
                    Some((*index, id.as_str(), name.as_str(), args.as_str()))
                }
                _ => None,
            })
            .collect()
    }

    /// Position of the first event matching `pred`.
    pub fn position(&self, pred: impl Fn(&Event) -> bool) -> Option<usize> {
        self.events.iter().position(pred)
    }
}

impl StreamHandlers for Recorder {
    fn on_text_update(&mut self, content: &str) {
        self.events.push(Event::Text(content.to_string()));
    }

    fn on_thinking_update(&mut self, content: &str) {
        self.events.push(Event::Thinking(content.to_string()));
    }

    fn on_tool_call_start(&mut self, index: u32, id: &str, name: &str) {
        self.events
            .push(Event::Start(index, id.to_string(), name.to_string()));
    }

    fn on_tool_call_delta(&mut self, index: u32, fragment: &str) {
        self.events.push(Event::Delta(index, fragment.to_string()));
    }

    fn on_tool_call_complete(&mut self, index: u32, id: &str, name: &str, arguments: &str) {
        self.events.push(Event::Complete(
            index,
            id.to_string(),
            name.to_string(),
            arguments.to_string(),
        ));
    }

    fn on_tool_call_state_change(
        &mut self,
        index: u32,
        id: &str,
        _name: &str,
        state: ToolInputState,
        arguments: &str,
    ) {
        self.events.push(Event::State(
            index,
            id.to_string(),
            state,
            arguments.to_string(),
        ));
    }

    fn on_tool_input_available(&mut self, tool_call_id: &str, tool_name: &str, input: &Value) {
        self.events.push(Event::InputAvailable(
            tool_call_id.to_string(),
            tool_name.to_string(),
            input.clone(),
        ));
    }

    fn on_approval_requested(
        &mut self,
        tool_call_id: &str,
        _tool_name: &str,
        _input: &Value,
        approval_id: &str,
    ) {
        self.events.push(Event::ApprovalRequested(
            tool_call_id.to_string(),
            approval_id.to_string(),
        ));
    }

    fn on_tool_result(&mut self, tool_call_id: &str, content: &str) {
        self.events
            .push(Event::ToolResult(tool_call_id.to_string(), content.to_string()));
    }

    fn on_error(&mut self, error: &ChunkwiseError) {
        self.events.push(Event::Error(error.to_string()));
    }

    fn on_stream_end(&mut self, content: &str, tool_calls: Option<&[ToolCall]>) {
        self.events
            .push(Event::End(content.to_string(), tool_calls.map(<[ToolCall]>::len)));
    }
}

/// Infallible chunk stream.
pub fn chunks(
    items: impl IntoIterator<Item = StreamChunk>,
) -> impl Stream<Item = Result<StreamChunk>> {
    futures::stream::iter(items.into_iter().map(Ok).collect::<Vec<_>>())
}

/// Text chunks carrying only `content`, the shape older adapters emit.
pub fn content_chunks(parts: &[&str]) -> Vec<StreamChunk> {
    parts.iter().map(|p| StreamChunk::content(*p)).collect()
}

/// Load a JSON-lines fixture from `tests/fixtures`.
pub fn fixture(name: &str) -> Vec<StreamChunk> {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    let raw = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("reading {}: {e}", path.display()));
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("fixture chunk"))
        .collect()
}
