//! Stream processor: folds a chunk stream into text and tool calls.
//!
//! ```
//! use chunkwise::processor::{CallbackHandlers, StreamProcessor};
//! use chunkwise::strategy::PunctuationStrategy;
//! use chunkwise::types::StreamChunk;
//!
//! # async fn example() -> chunkwise::error::Result<()> {
//! let chunks = futures::stream::iter(
//!     [StreamChunk::text_delta("Hi"), StreamChunk::text_delta(" there.")].map(Ok),
//! );
//! let handlers = CallbackHandlers::new().with_text_update(|text| println!("{text}"));
//! let mut processor = StreamProcessor::with_handlers(handlers).chunk_strategy(PunctuationStrategy);
//! let result = processor.process(chunks).await?;
//! assert_eq!(result.content, "Hi there.");
//! # Ok(())
//! # }
//! ```

mod handlers;
mod text;
mod tool_calls;

pub use handlers::{CallbackHandlers, StreamHandlers, ToolInputState};
pub use tool_calls::{ToolCallEntry, ToolCallEvent, ToolCallStatus, ToolCallTracker};

use futures::{Stream, StreamExt};
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::config::ProcessorConfig;
use crate::error::{ChunkwiseError, Result};
use crate::strategy::{ChunkStrategy, ImmediateStrategy};
use crate::types::{FinishReason, ProcessorResult, StreamChunk, Usage};

use text::TextBuffer;

/// Processes chunk streams with one strategy and one set of handlers.
///
/// All per-run state is created inside [`process`](Self::process), so a
/// processor can be reused for consecutive streams. Concurrent streams need
/// one processor each.
pub struct StreamProcessor<H = ()> {
    strategy: Box<dyn ChunkStrategy>,
    handlers: H,
}

impl StreamProcessor<()> {
    /// Immediate strategy, no handlers.
    pub fn new() -> Self {
        Self::with_handlers(())
    }
}

impl Default for StreamProcessor<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> std::fmt::Debug for StreamProcessor<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamProcessor").finish_non_exhaustive()
    }
}

impl<H: StreamHandlers> StreamProcessor<H> {
    /// Immediate strategy with the given handlers.
    pub fn with_handlers(handlers: H) -> Self {
        Self {
            strategy: Box::new(ImmediateStrategy),
            handlers,
        }
    }

    /// Build a processor whose strategy comes from configuration.
    pub fn from_config(config: &ProcessorConfig, handlers: H) -> Self {
        Self {
            strategy: config.strategy.build(),
            handlers,
        }
    }

    /// Replace the chunk strategy.
    pub fn chunk_strategy(mut self, strategy: impl ChunkStrategy + 'static) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    pub fn handlers(&self) -> &H {
        &self.handlers
    }

    pub fn handlers_mut(&mut self) -> &mut H {
        &mut self.handlers
    }

    pub fn into_handlers(self) -> H {
        self.handlers
    }

    /// Consume `chunks` to exhaustion and return the aggregated result.
    ///
    /// An `error` chunk or an `Err` item stops the run. The open tool call
    /// and any unflushed text are finalized first, then `on_error` and
    /// `on_stream_end` fire with the partial state before the error is
    /// returned.
    pub async fn process<S>(&mut self, chunks: S) -> Result<ProcessorResult>
    where
        S: Stream<Item = Result<StreamChunk>>,
    {
        self.strategy.reset();
        let mut run = Run::new(self.strategy.as_mut(), &mut self.handlers);
        let mut chunks = std::pin::pin!(chunks);

        let failure = loop {
            let next = match run.strategy.deadline() {
                Some(at) => tokio::select! {
                    biased;
                    item = chunks.next() => Some(item),
                    _ = tokio::time::sleep_until(at) => None,
                },
                None => Some(chunks.next().await),
            };

            match next {
                None => run.deadline_elapsed(),
                Some(None) => break None,
                Some(Some(Ok(chunk))) => {
                    if let Err(err) = run.apply(chunk) {
                        break Some(err);
                    }
                }
                Some(Some(Err(err))) => break Some(err),
            }
        };

        run.finish(failure)
    }
}

/// Accumulator for a single run.
struct Run<'a, H: StreamHandlers> {
    strategy: &'a mut dyn ChunkStrategy,
    handlers: &'a mut H,
    text: TextBuffer,
    thinking: TextBuffer,
    tools: ToolCallTracker,
    /// Text appended since the last `on_text_update`.
    pending_text: bool,
    finish_reason: Option<FinishReason>,
    usage: Option<Usage>,
    chunks_seen: usize,
}

impl<'a, H: StreamHandlers> Run<'a, H> {
    fn new(strategy: &'a mut dyn ChunkStrategy, handlers: &'a mut H) -> Self {
        Self {
            strategy,
            handlers,
            text: TextBuffer::default(),
            thinking: TextBuffer::default(),
            tools: ToolCallTracker::new(),
            pending_text: false,
            finish_reason: None,
            usage: None,
            chunks_seen: 0,
        }
    }

    fn apply(&mut self, chunk: StreamChunk) -> Result<()> {
        self.chunks_seen += 1;
        trace!(kind = chunk.kind(), "chunk");

        match chunk {
            StreamChunk::Content(c) => {
                self.complete_open_tool_call();
                self.push_text(c.delta.as_deref(), c.content.as_deref());
            }
            StreamChunk::Thinking(c) => {
                let start = self.thinking.apply(c.delta.as_deref(), c.content.as_deref());
                if start < self.thinking.as_str().len() {
                    self.handlers.on_thinking_update(self.thinking.as_str());
                }
            }
            StreamChunk::ToolCall(c) => {
                for event in self.tools.apply(&c) {
                    self.dispatch(event);
                }
            }
            StreamChunk::ToolInputAvailable(c) => {
                self.complete_open_tool_call();
                self.flush_pending_text();
                self.handlers
                    .on_tool_input_available(&c.tool_call_id, &c.tool_name, &c.input);
            }
            StreamChunk::ApprovalRequested(c) => {
                self.complete_open_tool_call();
                self.flush_pending_text();
                self.handlers.on_approval_requested(
                    &c.tool_call_id,
                    &c.tool_name,
                    &c.input,
                    &c.approval.id,
                );
            }
            StreamChunk::ToolResult(c) => {
                self.end_tool_turn();
                self.flush_pending_text();
                self.handlers.on_tool_result(&c.tool_call_id, &c.content);
            }
            StreamChunk::Done(c) => {
                self.end_tool_turn();
                self.flush_pending_text();
                if c.finish_reason.is_some() {
                    self.finish_reason = c.finish_reason;
                }
                if let Some(usage) = &c.usage {
                    self.usage.get_or_insert_with(Usage::default).merge(usage);
                }
            }
            StreamChunk::Error(c) => {
                return Err(ChunkwiseError::Upstream {
                    message: c.error.message,
                    code: c.error.code,
                });
            }
        }
        Ok(())
    }

    fn push_text(&mut self, delta: Option<&str>, content: Option<&str>) {
        let start = self.text.apply(delta, content);
        let text = self.text.as_str();
        if start == text.len() {
            return;
        }
        self.pending_text = true;
        if self.strategy.should_emit(&text[start..], text) {
            self.pending_text = false;
            self.handlers.on_text_update(text);
        }
    }

    fn deadline_elapsed(&mut self) {
        if self.strategy.on_deadline(Instant::now()) {
            self.flush_pending_text();
        }
    }

    fn flush_pending_text(&mut self) {
        if self.pending_text {
            self.pending_text = false;
            self.handlers.on_text_update(self.text.as_str());
        }
    }

    fn complete_open_tool_call(&mut self) {
        if let Some(event) = self.tools.complete_open() {
            self.dispatch(event);
        }
    }

    // Indices are released at turn boundaries, so a reused index is a new call.
    fn end_tool_turn(&mut self) {
        if let Some(event) = self.tools.end_turn() {
            self.dispatch(event);
        }
    }

    fn dispatch(&mut self, event: ToolCallEvent) {
        match event {
            ToolCallEvent::Started { index, id, name } => {
                // Text held back by the strategy precedes the call.
                self.flush_pending_text();
                debug!(index, id = %id, name = %name, "tool call started");
                self.handlers.on_tool_call_start(index, &id, &name);
                self.handlers.on_tool_call_state_change(
                    index,
                    &id,
                    &name,
                    ToolInputState::AwaitingInput,
                    "",
                );
            }
            ToolCallEvent::Delta { index, fragment } => {
                self.handlers.on_tool_call_delta(index, &fragment);
                if let Some(entry) = self.tools.current(index) {
                    // A late fragment re-reports the completed call with its
                    // extended arguments.
                    let state = match entry.status {
                        ToolCallStatus::Completed => ToolInputState::InputComplete,
                        _ => ToolInputState::InputStreaming,
                    };
                    self.handlers.on_tool_call_state_change(
                        index,
                        &entry.id,
                        &entry.name,
                        state,
                        &entry.arguments,
                    );
                }
            }
            ToolCallEvent::Completed {
                index,
                id,
                name,
                arguments,
            } => {
                debug!(index, id = %id, name = %name, bytes = arguments.len(), "tool call complete");
                self.handlers
                    .on_tool_call_complete(index, &id, &name, &arguments);
                self.handlers.on_tool_call_state_change(
                    index,
                    &id,
                    &name,
                    ToolInputState::InputComplete,
                    &arguments,
                );
            }
        }
    }

    fn finish(mut self, failure: Option<ChunkwiseError>) -> Result<ProcessorResult> {
        self.complete_open_tool_call();
        if self.pending_text {
            trace!("flushing text held back by the chunk strategy");
        }
        self.flush_pending_text();
        // Drop any pending deadline so nothing can fire after the run.
        self.strategy.reset();

        let result = ProcessorResult {
            thinking: (!self.thinking.is_empty()).then(|| self.thinking.into_string()),
            content: self.text.into_string(),
            tool_calls: self.tools.into_tool_calls(),
            finish_reason: self.finish_reason,
            usage: self.usage,
        };

        if let Some(err) = &failure {
            warn!(error = %err, chunks = self.chunks_seen, "stream ended with error");
            self.handlers.on_error(err);
        }
        self.handlers
            .on_stream_end(&result.content, result.tool_calls.as_deref());

        debug!(
            chunks = self.chunks_seen,
            chars = result.content.len(),
            tool_calls = result.tool_calls.as_ref().map_or(0, Vec::len),
            "stream processed"
        );

        match failure {
            Some(err) => Err(err),
            None => Ok(result),
        }
    }
}

/// Accumulate only the text of a chunk stream.
pub async fn collect_text<S>(chunks: S) -> Result<String>
where
    S: Stream<Item = Result<StreamChunk>>,
{
    let result = StreamProcessor::new().process(chunks).await?;
    Ok(result.content)
}
