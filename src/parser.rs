//! Turning raw JSON payloads into [`StreamChunk`]s.
//!
//! Transports (SSE, HTTP streaming, RPC) hand over one JSON document per
//! chunk. Framing is the transport's job; this module starts at the payload.

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use tracing::debug;

use crate::error::Result;
use crate::types::StreamChunk;

/// Decodes one raw payload into a chunk.
pub trait StreamParser: Send {
    /// `Ok(None)` skips the payload (keep-alives, blank lines).
    fn parse(&mut self, raw: &str) -> Result<Option<StreamChunk>>;
}

/// Parses payloads with serde, skipping blank ones.
///
/// In lenient mode payloads that do not decode (unknown chunk kinds from a
/// newer server, stray comments) are skipped instead of failing the stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonChunkParser {
    lenient: bool,
}

impl JsonChunkParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lenient() -> Self {
        Self { lenient: true }
    }
}

impl StreamParser for JsonChunkParser {
    fn parse(&mut self, raw: &str) -> Result<Option<StreamChunk>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        match serde_json::from_str(raw) {
            Ok(chunk) => Ok(Some(chunk)),
            Err(e) if self.lenient => {
                debug!(error = %e, payload = %raw, "skipping undecodable chunk");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Decode a stream of raw payloads. Decoding errors end the stream after
/// being yielded, like upstream errors.
pub fn parse_chunk_stream<S, T, P>(raw: S, mut parser: P) -> BoxStream<'static, Result<StreamChunk>>
where
    S: Stream<Item = Result<T>> + Send + 'static,
    T: AsRef<str> + Send + 'static,
    P: StreamParser + 'static,
{
    let parsed = async_stream::stream! {
        let mut inner = std::pin::pin!(raw);
        while let Some(item) = inner.next().await {
            match item.and_then(|payload| parser.parse(payload.as_ref())) {
                Ok(Some(chunk)) => yield Ok(chunk),
                Ok(None) => {}
                Err(e) => {
                    yield Err(e);
                    break;
                }
            }
        }
    };
    Box::pin(parsed)
}
