//! # sketchflow
//!
//! Turn natural-language drawing requests into canvas elements, streamed from
//! any OpenAI-compatible chat completions endpoint through a `draw_elements`
//! tool call.
//!
//! ## Quick Start
//!
//! ```ignore
//! use sketchflow::prelude::*;
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let agent = DrawAgent::new(ChatConfig::from_env()?)?;
//!     let mut canvas = MemoryCanvas::new();
//!
//!     let mut events = agent.stream(DrawRequest::new("a login flowchart"))?;
//!     while let Some(event) = events.next().await {
//!         render_event(&mut canvas, &event);
//!     }
//!     println!("{} elements drawn", canvas.elements().len());
//!     Ok(())
//! }
//! ```
//!
//! ## How a request flows
//!
//! 1. The transport opens a streaming POST to `{base_url}/chat/completions`.
//! 2. The SSE decoder turns body bytes into JSON payloads, across any chunk
//!    boundaries.
//! 3. The accumulator forwards text as `thinking` events and collects the
//!    tool call.
//! 4. At the finish signal the tool arguments are parsed, or JSON is
//!    recovered from the model's prose.
//! 5. Exactly one `elements`, `text_only` or `error` event follows, then
//!    `done`.
//!
//! ## Feature Flags
//!
//! | Feature | Description | Default |
//! |---------|-------------|--------|
//! | `server` | Axum HTTP endpoints and the `sketchflow-server` binary | ❌ |
//!
//! ## Architecture
//!
//! - [`sketchflow_core`] - Messages, element specs, configuration
//! - [`sketchflow_streaming`] - SSE decoding, accumulation, output events
//! - [`sketchflow_output`] - Tool-argument parsing and JSON repair
//! - [`sketchflow_models`] - Transport and OpenAI-compatible client
//! - [`sketchflow_retries`] - Retry policy for opening streams
//! - [`sketchflow_agent`] - The request driver

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "server")]
#[cfg_attr(docsrs, doc(cfg(feature = "server")))]
pub mod server;

pub use sketchflow_agent as agent;
pub use sketchflow_core as core;
pub use sketchflow_models as models;
pub use sketchflow_output as output;
pub use sketchflow_retries as retries;
pub use sketchflow_streaming as streaming;

pub use sketchflow_agent::{
    render_event, AgentError, AgentResult, Canvas, DrawAgent, DrawAgentBuilder, DrawRequest,
    DrawStream, MemoryCanvas,
};
pub use sketchflow_core::{
    ChatConfig, ChatConfigOverrides, ChatMessage, DrawElementSpec, ElementType, Role,
};
pub use sketchflow_models::{HttpTransport, ModelError, OpenAIChatClient, Transport};
pub use sketchflow_retries::RetryConfig;
pub use sketchflow_streaming::StreamEvent;

#[cfg(feature = "server")]
pub use server::{ChatServer, ServerError};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        render_event, AgentError, Canvas, ChatConfig, ChatMessage, DrawAgent, DrawElementSpec,
        DrawRequest, DrawStream, ElementType, MemoryCanvas, RetryConfig, StreamEvent,
    };
}
