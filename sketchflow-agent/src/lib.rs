//! # sketchflow-agent
//!
//! Drives one drawing request from prompt to events.
//!
//! - **[`DrawAgent`]**: builds the upstream messages and spawns a
//!   [`DrawStream`] per request
//! - **[`DrawPipeline`]** / **[`run_pipeline`]**: fold parsed chunks, pick the
//!   tool-call or free-text path at the finish signal, and always end with
//!   one terminal event followed by `Done`
//! - **[`Canvas`]**: where `Elements` results end up
//!
//! # Example
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use sketchflow_agent::{DrawAgent, DrawRequest};
//! use sketchflow_core::ChatConfig;
//!
//! let agent = DrawAgent::new(ChatConfig::from_env()?)?;
//! let mut events = agent.stream(DrawRequest::new("a flowchart with three steps"))?;
//! while let Some(event) = events.next().await {
//!     println!("{event}");
//! }
//! ```
//!
//! # Custom Setup
//!
//! ```rust,ignore
//! use sketchflow_agent::agent;
//! use sketchflow_retries::RetryConfig;
//!
//! let agent = agent(config)
//!     .system_prompt("Only draw rectangles.")
//!     .retry(RetryConfig::for_api())
//!     .build()?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod agent;
pub mod builder;
pub mod canvas;
pub mod errors;
pub mod instructions;
pub mod pipeline;
pub mod request;
pub mod stream;

// Re-exports
pub use agent::DrawAgent;
pub use builder::{agent, DrawAgentBuilder};
pub use canvas::{render_event, Canvas, MemoryCanvas};
pub use errors::{AgentError, AgentResult};
pub use instructions::{user_message, SYSTEM_PROMPT};
pub use pipeline::{run_pipeline, Disconnected, DrawPipeline, EventSink};
pub use request::DrawRequest;
pub use stream::{DrawStream, GENERIC_FAILURE};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        agent, AgentError, AgentResult, Canvas, DrawAgent, DrawRequest, DrawStream, MemoryCanvas,
    };
}
