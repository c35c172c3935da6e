//! Chunkwise: incremental aggregation of streamed model output.
//!
//! A provider adapter yields [`StreamChunk`](types::StreamChunk)s; a
//! [`StreamProcessor`](processor::StreamProcessor) folds them into the
//! assistant's text and tool calls, notifying [`StreamHandlers`](processor::StreamHandlers)
//! as they grow. A [`ChunkStrategy`](strategy::ChunkStrategy) decides how
//! often text updates reach the handlers.
//!
//! # Quick Start
//!
//! ```
//! use chunkwise::prelude::*;
//!
//! # async fn example() -> chunkwise::error::Result<()> {
//! let chunks = futures::stream::iter(
//!     [
//!         StreamChunk::text_delta("Hello"),
//!         StreamChunk::text_delta(" world."),
//!         StreamChunk::done(Some(FinishReason::Stop)),
//!     ]
//!     .map(Ok),
//! );
//! let mut processor = StreamProcessor::new().chunk_strategy(PunctuationStrategy);
//! let result = processor.process(chunks).await?;
//! assert_eq!(result.content, "Hello world.");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod message;
pub mod parser;
pub mod prelude;
pub mod processor;
pub mod strategy;
pub mod types;
pub mod util;
