//! Core types for chunkwise.

pub mod chunk;
pub mod generation;
pub mod results;
pub mod tool_call;
pub mod usage;

pub use chunk::*;
pub use generation::*;
pub use results::*;
pub use tool_call::*;
pub use usage::*;
