//! Completed tool-call records.

use serde::{Deserialize, Serialize};

/// Kind of tool call. Only function calls are produced by streaming providers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolCallType {
    #[default]
    Function,
}

/// Function name and its complete, unparsed JSON arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

/// A tool call reassembled from streamed fragments.
///
/// `function.arguments` is exactly the concatenation of every fragment seen
/// for the call; it is not validated as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default)]
    pub call_type: ToolCallType,
    pub function: FunctionCall,
}

impl ToolCall {
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            call_type: ToolCallType::Function,
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    /// Parse the accumulated arguments as JSON.
    pub fn parse_arguments(&self) -> crate::error::Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.function.arguments)?)
    }
}
