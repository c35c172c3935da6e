//! Lenient parsing of incomplete JSON.
//!
//! Tool arguments arrive as fragments of one JSON document. UIs want to show
//! what is known so far, so a truncated document is repaired (open strings,
//! arrays and objects closed) before it is parsed.

use jsonrepair::{repair_json, Options};
use serde_json::Value;
use tracing::trace;

/// Parses (possibly incomplete) JSON text into a value.
pub trait JsonParser: Send + Sync {
    fn parse(&self, text: &str) -> Option<Value>;
}

/// Default [`JsonParser`]: strict parse first, repair on failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialJsonParser;

impl JsonParser for PartialJsonParser {
    fn parse(&self, text: &str) -> Option<Value> {
        parse_partial_json(text)
    }
}

/// Parse a complete or truncated JSON document.
///
/// Returns `None` for blank input and for input the repair pass cannot turn
/// into JSON.
///
/// ```
/// use chunkwise::util::partial_json::parse_partial_json;
/// use serde_json::json;
///
/// assert_eq!(parse_partial_json(r#"{"city":"Par"#), Some(json!({"city": "Par"})));
/// assert_eq!(parse_partial_json(r#"{"a":[1,2"#), Some(json!({"a": [1, 2]})));
/// ```
pub fn parse_partial_json(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }
    match repair_json(text, &Options::default()) {
        Ok(repaired) => match serde_json::from_str(&repaired) {
            Ok(value) => Some(value),
            Err(err) => {
                trace!(%err, repaired, "repaired arguments still unparsable");
                None
            }
        },
        Err(err) => {
            trace!(%err, "arguments could not be repaired");
            None
        }
    }
}
