//! Incremental slices of a streamed completion.
//!
//! A streamed chat completion arrives as many small JSON payloads. Each one
//! is reduced to a [`ParsedChunk`] carrying whichever of text, tool-call
//! fragment and finish reason it contained.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One incremental slice of a tool call.
///
/// Fragments sharing an identity are concatenated in arrival order to
/// rebuild the full argument text. Providers usually send `id` and `name`
/// only on the first fragment, so both may be empty on later ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallFragment {
    /// Provider-assigned call ID (empty when omitted).
    #[serde(default)]
    pub id: String,
    /// Function name (empty when omitted).
    #[serde(default)]
    pub name: String,
    /// Slice of the JSON argument text.
    #[serde(default, alias = "arguments")]
    pub arguments_delta: String,
}

impl ToolCallFragment {
    /// Create a fragment.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments_delta: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments_delta: arguments_delta.into(),
        }
    }

    /// Create a fragment that only carries argument text.
    pub fn arguments(arguments_delta: impl Into<String>) -> Self {
        Self {
            arguments_delta: arguments_delta.into(),
            ..Default::default()
        }
    }

    /// Check whether every field is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.name.is_empty() && self.arguments_delta.is_empty()
    }
}

/// Why the model stopped generating.
///
/// The vocabulary is open: anything other than `tool_calls` and `stop` is
/// kept verbatim in [`FinishReason::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FinishReason {
    /// Model wants the tool call executed.
    ToolCalls,
    /// Natural end of response.
    Stop,
    /// Any other provider-specific reason.
    Other(String),
}

impl FinishReason {
    /// Parse a raw finish reason. Empty strings are not a finish signal.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "" => None,
            "tool_calls" => Some(Self::ToolCalls),
            "stop" => Some(Self::Stop),
            other => Some(Self::Other(other.to_string())),
        }
    }

    /// Fold the reason onto the two recognised terminal values.
    ///
    /// Unknown reasons count as `ToolCalls` when a tool call was
    /// accumulated, else as `Stop`.
    #[must_use]
    pub fn resolve(&self, has_tool_call: bool) -> Self {
        match self {
            Self::Other(_) if has_tool_call => Self::ToolCalls,
            Self::Other(_) => Self::Stop,
            known => known.clone(),
        }
    }

    /// Wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ToolCalls => "tool_calls",
            Self::Stop => "stop",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The useful content of one decoded stream payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedChunk {
    /// Free-running text delta.
    pub content: Option<String>,
    /// First tool-call slot of the payload.
    pub tool_call: Option<ToolCallFragment>,
    /// Terminal signal.
    pub finish_reason: Option<FinishReason>,
}

impl ParsedChunk {
    /// Chunk carrying only text.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// Chunk carrying only a tool-call fragment.
    pub fn tool_call(fragment: ToolCallFragment) -> Self {
        Self {
            tool_call: Some(fragment),
            ..Default::default()
        }
    }

    /// Chunk carrying only a finish reason.
    pub fn finish(reason: FinishReason) -> Self {
        Self {
            finish_reason: Some(reason),
            ..Default::default()
        }
    }

    /// Check whether the chunk carries nothing worth dispatching.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.as_deref().map_or(true, str::is_empty)
            && self.tool_call.as_ref().map_or(true, ToolCallFragment::is_empty)
            && self.finish_reason.is_none()
    }
}
