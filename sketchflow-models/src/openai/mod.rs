//! OpenAI-compatible chat completions.
//!
//! - [`OpenAIChatClient`]: builds drawing requests, opens the stream, probes
//!   connectivity
//! - [`parse_chunk`] / [`chunk_stream`]: reduce streamed payloads to
//!   [`ParsedChunk`](sketchflow_core::ParsedChunk)s
//!
//! Any server speaking the `/chat/completions` dialect works: OpenAI, Azure
//! deployments behind a compatible gateway, DeepSeek, Moonshot, Zhipu, local
//! Ollama.

pub mod chat;
pub mod stream;
pub mod types;

// Re-exports
pub use chat::{upstream_error_message, OpenAIChatClient, PROBE_MAX_TOKENS};
pub use stream::{chunk_stream, in_stream_error, parse_chunk, ChunkStream};
pub use types::{
    ChatCompletionChunk, ChatCompletionRequest, ChatMessage, ChatTool, FunctionDefinition,
    OpenAIError, ToolChoiceValue,
};
