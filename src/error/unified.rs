//! Error classification.

/// Broad error category for routing handling logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The provider stream reported a failure or ended abnormally.
    Upstream,
    /// A chunk or config document could not be (de)serialized.
    Serialization,
    Configuration,
    Io,
    /// The caller passed something the API cannot act on.
    InvalidInput,
}
