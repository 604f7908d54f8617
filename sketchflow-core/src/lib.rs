//! # sketchflow-core
//!
//! Core types shared by every sketchflow crate.
//!
//! - **Messages**: conversation history sent upstream ([`ChatMessage`])
//! - **Deltas**: the per-payload view of a streamed completion ([`ParsedChunk`])
//! - **Elements**: the abstract shapes a model asks us to draw ([`DrawElementSpec`])
//!   and what the editor already shows ([`CanvasElement`])
//! - **Settings**: endpoint configuration and provider presets ([`ChatConfig`])
//!
//! ## Example
//!
//! ```rust
//! use sketchflow_core::{ChatMessage, DrawElementSpec, ElementType};
//!
//! let history = vec![
//!     ChatMessage::user("draw a box"),
//!     ChatMessage::assistant("done"),
//! ];
//! assert_eq!(history.len(), 2);
//!
//! let spec: DrawElementSpec = serde_json::from_str(
//!     r#"{"type":"rectangle","x":100,"y":100,"width":150,"height":80}"#,
//! ).unwrap();
//! assert_eq!(spec.element_type, ElementType::Rectangle);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod elements;
pub mod errors;
pub mod format;
pub mod messages;
pub mod presets;
pub mod settings;

pub use elements::{
    deserialize_canvas_elements, CanvasElement, DrawElementSpec, ElementType, Point, DEFAULT_ORIGIN,
};
pub use errors::{CoreError, Result};
pub use format::describe_canvas;
pub use messages::{ChatMessage, FinishReason, ParsedChunk, Role, ToolCallFragment};
pub use presets::{find_preset, ProviderPreset, PROVIDER_PRESETS};
pub use settings::{ChatConfig, ChatConfigOverrides};

/// Prelude module for common imports.
pub mod prelude {
    pub use crate::elements::{CanvasElement, DrawElementSpec, ElementType, Point};
    pub use crate::errors::{CoreError, Result};
    pub use crate::messages::{ChatMessage, FinishReason, ParsedChunk, Role, ToolCallFragment};
    pub use crate::settings::{ChatConfig, ChatConfigOverrides};
}
