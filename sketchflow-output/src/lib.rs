//! # sketchflow-output
//!
//! Turning a finished completion into something drawable.
//!
//! ## Core Concepts
//!
//! - **[`DrawingPayload`]**: validated `elements` + `explanation`
//! - **[`finalize_tool_call`]**: the structured `draw_elements` path
//! - **[`extract_from_text`]**: the prose fallback, with JSON extraction and
//!   repair
//! - **[`JsonRepairer`]**: an ordered chain of [`RepairRule`]s
//!
//! ## Example
//!
//! ```rust
//! use sketchflow_output::{extract_from_text, DrawOutcome, JsonRepairer};
//!
//! // Unquoted key and trailing comma, as some models write it.
//! let text = "Done: {\"elements\": [{ type\": \"text\", \"x\": 10, \"y\": 10,}]}";
//! let outcome = extract_from_text(text, JsonRepairer::standard()).unwrap();
//! assert_eq!(outcome.element_count(), 1);
//! assert!(matches!(outcome, DrawOutcome::Elements { .. }));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod drawing;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod repair;

pub use drawing::{default_explanation, DrawingPayload};
pub use error::{OutputError, OutputResult};
pub use extract::{extract_json_candidate, CandidateSource};
pub use fallback::{extract_from_text, finalize_tool_call, DrawOutcome};
pub use repair::{repair_json, JsonRepairer, RepairRule, KNOWN_FIELDS};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        extract_from_text, finalize_tool_call, DrawOutcome, DrawingPayload, JsonRepairer,
        OutputError, OutputResult, RepairRule,
    };
}
