//! Message types.
//!
//! - [`chat`]: conversation history entries sent to the model
//! - [`delta`]: incremental slices of a streamed completion

pub mod chat;
pub mod delta;

pub use chat::{ChatMessage, Role};
pub use delta::{FinishReason, ParsedChunk, ToolCallFragment};
