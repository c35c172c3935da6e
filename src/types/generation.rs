//! Generation outcome enums.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Why a provider turn finished.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    Error,
    /// Any provider-specific reason not covered above.
    #[serde(other)]
    Other,
}
