//! Folding parsed chunks into one request's accumulation state.
//!
//! The accumulator holds the model's free text, the latched tool-call name
//! and the concatenated argument text. It stops taking input at the first
//! finish signal.

use sketchflow_core::{FinishReason, ParsedChunk, ToolCallFragment};

/// Accumulation state for a single streamed completion.
#[derive(Debug, Clone, Default)]
pub struct ToolCallAccumulator {
    text: String,
    tool_call_id: Option<String>,
    tool_name: Option<String>,
    arguments: String,
    finish_reason: Option<FinishReason>,
    chunks: usize,
}

impl ToolCallAccumulator {
    /// Create a new empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one chunk into the state.
    ///
    /// Returns the chunk's text delta when non-empty, so the caller can
    /// forward it as a thinking event. Chunks arriving after the finish
    /// signal are ignored.
    pub fn push(&mut self, chunk: ParsedChunk) -> Option<String> {
        if self.is_finished() {
            tracing::debug!("Ignoring chunk after finish signal");
            return None;
        }
        self.chunks += 1;

        let thinking = chunk.content.filter(|c| !c.is_empty());
        if let Some(text) = &thinking {
            self.text.push_str(text);
        }

        if let Some(fragment) = chunk.tool_call {
            self.push_fragment(fragment);
        }

        if let Some(reason) = chunk.finish_reason {
            let resolved = reason.resolve(self.has_tool_call());
            tracing::debug!(
                raw = %reason,
                resolved = %resolved,
                chunks = self.chunks,
                "Finish signal received"
            );
            self.finish_reason = Some(resolved);
        }

        thinking
    }

    fn push_fragment(&mut self, fragment: ToolCallFragment) {
        if !fragment.id.is_empty() {
            match &self.tool_call_id {
                None => self.tool_call_id = Some(fragment.id),
                Some(id) if *id == fragment.id => {}
                Some(id) => {
                    tracing::debug!(
                        latched = %id,
                        ignored = %fragment.id,
                        "Ignoring fragment of a second tool call"
                    );
                    return;
                }
            }
        }

        if !fragment.name.is_empty() {
            self.tool_name = Some(fragment.name);
        }
        if !fragment.arguments_delta.is_empty() {
            self.arguments.push_str(&fragment.arguments_delta);
        }
    }

    /// Everything the model said as free text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The latched tool name.
    #[must_use]
    pub fn tool_name(&self) -> Option<&str> {
        self.tool_name.as_deref()
    }

    /// The latched tool-call ID.
    #[must_use]
    pub fn tool_call_id(&self) -> Option<&str> {
        self.tool_call_id.as_deref()
    }

    /// Concatenated argument text.
    #[must_use]
    pub fn arguments(&self) -> &str {
        &self.arguments
    }

    /// Check if a tool name has been observed.
    #[must_use]
    pub fn has_tool_call(&self) -> bool {
        self.tool_name.is_some()
    }

    /// The resolved finish signal, if any.
    #[must_use]
    pub fn finish_reason(&self) -> Option<&FinishReason> {
        self.finish_reason.as_ref()
    }

    /// Check if the finish signal has been observed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finish_reason.is_some()
    }

    /// Number of chunks folded so far.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }
}
