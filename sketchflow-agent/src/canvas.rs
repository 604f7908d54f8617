//! Rendering sinks for drawing results.

use sketchflow_core::DrawElementSpec;
use sketchflow_streaming::StreamEvent;

/// Something that can hold drawn elements.
pub trait Canvas {
    /// Elements currently on the canvas.
    fn elements(&self) -> &[DrawElementSpec];

    /// Add elements to the canvas.
    fn apply(&mut self, elements: Vec<DrawElementSpec>);

    /// Remove everything.
    fn clear(&mut self);
}

/// A canvas that keeps elements in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryCanvas {
    elements: Vec<DrawElementSpec>,
}

impl MemoryCanvas {
    /// Create an empty canvas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Canvas for MemoryCanvas {
    fn elements(&self) -> &[DrawElementSpec] {
        &self.elements
    }

    fn apply(&mut self, elements: Vec<DrawElementSpec>) {
        self.elements.extend(elements);
    }

    fn clear(&mut self) {
        self.elements.clear();
    }
}

/// Apply one event to `canvas`.
///
/// Returns the number of elements added.
pub fn render_event<C: Canvas + ?Sized>(canvas: &mut C, event: &StreamEvent) -> usize {
    match event {
        StreamEvent::Elements { elements, .. } => {
            canvas.apply(elements.clone());
            elements.len()
        }
        StreamEvent::Thinking { .. }
        | StreamEvent::TextOnly { .. }
        | StreamEvent::Error { .. }
        | StreamEvent::Done => 0,
    }
}
