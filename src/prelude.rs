//! Convenience re-exports for common use.

pub use crate::config::{ProcessorConfig, StrategyConfig};
pub use crate::error::{ChunkwiseError, Result};
pub use crate::message::{MessageBuilder, MessagePart, ToolCallState, UiMessage};
pub use crate::parser::{parse_chunk_stream, JsonChunkParser, StreamParser};
pub use crate::processor::{collect_text, CallbackHandlers, StreamHandlers, StreamProcessor};
pub use crate::strategy::{
    BatchStrategy, ChunkStrategy, CompositeStrategy, DebounceStrategy, ImmediateStrategy,
    PunctuationStrategy, WordBoundaryStrategy,
};
pub use crate::types::{FinishReason, ProcessorResult, StreamChunk, ToolCall, Usage};
