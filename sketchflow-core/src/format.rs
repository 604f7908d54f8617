//! Plain-text canvas descriptions for model prompts.
//!
//! The model never sees the canvas itself; it gets a short numbered list of
//! what is already drawn so new shapes can be placed around it.
//!
//! # Example
//!
//! ```rust
//! use sketchflow_core::{describe_canvas, CanvasElement, DrawElementSpec, ElementType};
//!
//! let canvas = vec![CanvasElement::from(
//!     DrawElementSpec::new(ElementType::Rectangle, 100.0, 100.0)
//!         .with_size(150.0, 80.0)
//!         .with_text("Start"),
//! )];
//!
//! let text = describe_canvas(&canvas);
//! assert!(text.contains(r#"1. rectangle "Start" at (100, 100) size 150x80"#));
//! ```

use std::fmt::Write;

use crate::elements::CanvasElement;

/// Text used when nothing is drawn yet.
pub const EMPTY_CANVAS: &str = "The canvas is currently empty.";

/// Fill colour that is not worth mentioning.
const TRANSPARENT: &str = "transparent";

/// Describe the current canvas contents, one numbered line per element.
///
/// Positions and sizes are rounded to whole pixels, with a missing position
/// read as `0`. Size is only listed when both dimensions are present and
/// non-zero.
#[must_use]
pub fn describe_canvas(elements: &[CanvasElement]) -> String {
    if elements.is_empty() {
        return EMPTY_CANVAS.to_string();
    }

    let mut output = format!(
        "The canvas currently has {} element{}:",
        elements.len(),
        if elements.len() == 1 { "" } else { "s" }
    );
    for (i, element) in elements.iter().enumerate() {
        output.push('\n');
        describe_element(i + 1, element, &mut output);
    }
    output
}

fn describe_element(index: usize, el: &CanvasElement, output: &mut String) {
    // Writing into a String cannot fail.
    let _ = write!(output, "{index}. {}", el.element_type);
    if let Some(text) = el.text.as_deref().filter(|t| !t.is_empty()) {
        let _ = write!(output, " \"{text}\"");
    }
    let _ = write!(
        output,
        " at ({}, {})",
        round(el.x.unwrap_or_default()),
        round(el.y.unwrap_or_default())
    );
    if let (Some(w), Some(h)) = (el.width, el.height) {
        if w != 0.0 && h != 0.0 {
            let _ = write!(output, " size {}x{}", round(w), round(h));
        }
    }
    if let Some(bg) = el
        .background_color
        .as_deref()
        .filter(|c| !c.is_empty() && *c != TRANSPARENT)
    {
        let _ = write!(output, " background {bg}");
    }
}

fn round(value: f64) -> i64 {
    value.round() as i64
}
