//! # sketchflow-streaming
//!
//! Streaming building blocks for sketchflow.
//!
//! ## Core Concepts
//!
//! - **[`SseDecoder`]** / **[`SseDecodeStream`]**: turn raw SSE bytes into
//!   JSON payloads, tolerating arbitrary chunk boundaries
//! - **[`ToolCallAccumulator`]**: fold parsed chunks into text, tool name and
//!   argument text until the finish signal
//! - **[`StreamEvent`]**: the events handed to a renderer
//!
//! ## Example
//!
//! ```rust
//! use sketchflow_core::{FinishReason, ParsedChunk};
//! use sketchflow_streaming::{SseDecoder, StreamEvent, ToolCallAccumulator};
//!
//! let mut decoder = SseDecoder::new();
//! let payloads = decoder
//!     .feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\n\ndata: [DONE]\n\n")
//!     .unwrap();
//! assert_eq!(payloads.len(), 1);
//!
//! let mut acc = ToolCallAccumulator::new();
//! let thinking = acc.push(ParsedChunk::text("hi")).map(StreamEvent::thinking);
//! acc.push(ParsedChunk::finish(FinishReason::Stop));
//!
//! assert_eq!(thinking, Some(StreamEvent::thinking("hi")));
//! assert!(acc.is_finished());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod accumulator;
pub mod error;
pub mod events;
pub mod sse;

// Re-exports
pub use accumulator::ToolCallAccumulator;
pub use error::{StreamError, StreamResult};
pub use events::StreamEvent;
pub use sse::{encode_data, SseDecodeStream, SseDecoder, DONE_SENTINEL};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        SseDecodeStream, SseDecoder, StreamError, StreamEvent, StreamResult, ToolCallAccumulator,
    };
}
