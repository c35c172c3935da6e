//! Tests for decoding raw payload streams.

use futures::StreamExt;
use pretty_assertions::assert_eq;

use chunkwise::error::{ChunkwiseError, Result};
use chunkwise::parser::{parse_chunk_stream, JsonChunkParser, StreamParser};
use chunkwise::processor::StreamProcessor;
use chunkwise::types::StreamChunk;

fn fixture_lines(name: &str) -> Vec<String> {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn raw_payloads_feed_the_processor() {
    let raw = futures::stream::iter(
        fixture_lines("openai_reused_index.jsonl")
            .into_iter()
            .map(Ok::<_, ChunkwiseError>),
    );
    let result = StreamProcessor::new()
        .process(parse_chunk_stream(raw, JsonChunkParser::new()))
        .await
        .unwrap();

    assert_eq!(result.tool_calls.map(|c| c.len()), Some(2));
    assert_eq!(
        result.content,
        "Complete! If you need anything else, feel free to ask."
    );
}

#[tokio::test]
async fn lenient_parser_skips_unknown_kinds() {
    let raw = futures::stream::iter(
        [
            r#"{"type":"content","delta":"a"}"#,
            r#"{"type":"heartbeat"}"#,
            "",
            r#"{"type":"text","content":"b"}"#,
        ]
        .map(|s| Ok::<_, ChunkwiseError>(s)),
    );
    let chunks: Vec<StreamChunk> = parse_chunk_stream(raw, JsonChunkParser::lenient())
        .map(|item| item.unwrap())
        .collect()
        .await;

    assert_eq!(
        chunks,
        vec![StreamChunk::text_delta("a"), StreamChunk::content("b")]
    );
}

#[tokio::test]
async fn decode_failure_surfaces_through_the_processor() {
    let raw = futures::stream::iter(
        [r#"{"type":"content","delta":"ok"}"#, "{broken"].map(|s| Ok::<_, ChunkwiseError>(s)),
    );
    let err = StreamProcessor::new()
        .process(parse_chunk_stream(raw, JsonChunkParser::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, ChunkwiseError::Serialization(_)));
}

/// Parser for `data: {...}` lines, as a server-sent-events transport yields.
struct SseDataParser;

impl StreamParser for SseDataParser {
    fn parse(&mut self, raw: &str) -> Result<Option<StreamChunk>> {
        match raw.strip_prefix("data:").map(str::trim) {
            Some("[DONE]") | None => Ok(None),
            Some(json) => JsonChunkParser::new().parse(json),
        }
    }
}

#[tokio::test]
async fn custom_parsers_plug_into_the_adapter() {
    let raw = futures::stream::iter(
        [
            ": keep-alive",
            r#"data: {"type":"content","delta":"Hi"}"#,
            "data: [DONE]",
        ]
        .map(|s| Ok::<_, ChunkwiseError>(s)),
    );
    let text = chunkwise::processor::collect_text(parse_chunk_stream(raw, SseDataParser))
        .await
        .unwrap();
    assert_eq!(text, "Hi");
}
