//! Configuration (layered: code > env > config file).
//!
//! A strategy can be described declaratively, so applications can tune UI
//! update cadence without recompiling:
//!
//! ```toml
//! [strategy]
//! kind = "composite"
//! strategies = [{ kind = "punctuation" }, { kind = "batch", size = 20 }]
//! ```
//!
//! or through `CHUNKWISE_STRATEGY=punctuation+batch:20`.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{ChunkwiseError, Result};
use crate::strategy::{
    BatchStrategy, ChunkStrategy, CompositeStrategy, DebounceStrategy, ImmediateStrategy,
    PunctuationStrategy, WordBoundaryStrategy,
};

/// Environment variable holding a strategy string such as `batch:20`.
pub const STRATEGY_ENV: &str = "CHUNKWISE_STRATEGY";

/// Processor settings.
#[derive(Debug, Clone, Default, PartialEq, Builder, Serialize, Deserialize)]
pub struct ProcessorConfig {
    #[serde(default)]
    #[builder(default)]
    pub strategy: StrategyConfig,
}

/// Serializable description of a [`ChunkStrategy`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    #[default]
    Immediate,
    Punctuation,
    Batch {
        size: usize,
    },
    WordBoundary,
    Debounce {
        delay_ms: u64,
    },
    Composite {
        strategies: Vec<StrategyConfig>,
    },
}

/// Strategy names accepted in strategy strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum StrategyKind {
    Immediate,
    Punctuation,
    Batch,
    WordBoundary,
    Debounce,
}

impl StrategyConfig {
    /// Instantiate a fresh strategy.
    pub fn build(&self) -> Box<dyn ChunkStrategy> {
        match self {
            Self::Immediate => Box::new(ImmediateStrategy),
            Self::Punctuation => Box::new(PunctuationStrategy),
            Self::Batch { size } => Box::new(BatchStrategy::new(*size)),
            Self::WordBoundary => Box::new(WordBoundaryStrategy),
            Self::Debounce { delay_ms } => {
                Box::new(DebounceStrategy::new(Duration::from_millis(*delay_ms)))
            }
            Self::Composite { strategies } => Box::new(CompositeStrategy::new(
                strategies.iter().map(StrategyConfig::build).collect(),
            )),
        }
    }

    fn parse_single(term: &str) -> Result<Self> {
        let (name, arg) = match term.split_once(':') {
            Some((name, arg)) => (name.trim(), Some(arg.trim())),
            None => (term.trim(), None),
        };
        let kind = StrategyKind::from_str(name)
            .map_err(|_| ChunkwiseError::Configuration(format!("unknown strategy '{name}'")))?;

        let number = |what: &str| -> Result<u64> {
            let arg = arg.ok_or_else(|| {
                ChunkwiseError::Configuration(format!("strategy '{kind}' needs a {what}"))
            })?;
            arg.parse().map_err(|_| {
                ChunkwiseError::Configuration(format!("invalid {what} '{arg}' for strategy '{kind}'"))
            })
        };

        let config = match kind {
            StrategyKind::Immediate => Self::Immediate,
            StrategyKind::Punctuation => Self::Punctuation,
            StrategyKind::WordBoundary => Self::WordBoundary,
            StrategyKind::Batch => Self::Batch {
                size: number("size")? as usize,
            },
            StrategyKind::Debounce => Self::Debounce {
                delay_ms: number("delay in milliseconds")?,
            },
        };

        let takes_arg = matches!(kind, StrategyKind::Batch | StrategyKind::Debounce);
        if arg.is_some() && !takes_arg {
            return Err(ChunkwiseError::Configuration(format!(
                "strategy '{kind}' takes no argument"
            )));
        }
        Ok(config)
    }
}

impl FromStr for StrategyConfig {
    type Err = ChunkwiseError;

    /// Parse `name[:arg]` terms joined by `+`, e.g. `punctuation+batch:20`.
    fn from_str(s: &str) -> Result<Self> {
        let parts = s
            .split('+')
            .filter(|part| !part.trim().is_empty())
            .map(Self::parse_single)
            .collect::<Result<Vec<_>>>()?;

        match parts.len() {
            0 => Err(ChunkwiseError::Configuration(
                "empty strategy string".to_string(),
            )),
            1 => Ok(parts.into_iter().next().unwrap_or_default()),
            _ => Ok(Self::Composite { strategies: parts }),
        }
    }
}

impl ProcessorConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// Load from environment variables (`CHUNKWISE_STRATEGY`), reading `.env`
    /// if present. Unset variables leave the defaults in place.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Overlay environment variables on top of this config.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(raw) = std::env::var(STRATEGY_ENV) {
            self.strategy = raw.parse()?;
        }
        Ok(())
    }
}
