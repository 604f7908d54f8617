//! # sketchflow-models
//!
//! Talking to OpenAI-compatible chat completion endpoints.
//!
//! ## Core Concepts
//!
//! - **[`Transport`]**: opens one request and streams the response body;
//!   [`HttpTransport`] is the `reqwest` implementation, [`MockTransport`]
//!   replays scripted bodies
//! - **[`OpenAIChatClient`]**: builds the drawing request (forced or `auto`
//!   tool choice), opens the stream and reduces it to parsed chunks
//! - **[`draw_tool`]**: the `draw_elements` function definition
//!
//! ## Example
//!
//! ```rust,ignore
//! use sketchflow_core::{ChatConfig, ChatMessage};
//! use sketchflow_models::OpenAIChatClient;
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenAIChatClient::new(ChatConfig::from_env()?)?;
//!     let mut chunks = client.stream(&[ChatMessage::user("Draw a box")]).await?;
//!     while let Some(chunk) = chunks.next().await {
//!         println!("{:?}", chunk?);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod mock;
pub mod openai;
pub mod tool;
pub mod transport;

// Re-exports
pub use error::{ModelError, ModelResult};
pub use mock::{MockReply, MockTransport};
pub use openai::{
    chunk_stream, parse_chunk, upstream_error_message, ChunkStream, OpenAIChatClient,
};
pub use tool::{draw_tool, draw_tool_parameters, DRAW_TOOL_NAME};
pub use transport::{ByteStream, HttpTransport, Transport, TransportConfig, TransportRequest};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        ModelError, ModelResult, OpenAIChatClient, Transport, TransportConfig, DRAW_TOOL_NAME,
    };
}
