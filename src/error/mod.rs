//! Error types for chunkwise.

pub mod unified;

pub use unified::ErrorCategory;

use thiserror::Error;

/// Primary error type for all chunkwise operations.
#[derive(Error, Debug)]
pub enum ChunkwiseError {
    #[error("Upstream stream error: {message}")]
    Upstream {
        message: String,
        code: Option<String>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl ChunkwiseError {
    /// Create an upstream error without a provider code.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
            code: None,
        }
    }

    /// Create an upstream error carrying the provider's error code.
    pub fn upstream_with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Upstream { .. } => ErrorCategory::Upstream,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Io(_) => ErrorCategory::Io,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::InvalidArgument(_) | Self::InvalidState(_) => ErrorCategory::InvalidInput,
        }
    }

    /// Whether re-running the same stream could plausibly succeed.
    ///
    /// Only upstream and IO failures qualify; retrying is left to the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Upstream | ErrorCategory::Io)
    }
}

impl From<toml::de::Error> for ChunkwiseError {
    fn from(err: toml::de::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ChunkwiseError>;
