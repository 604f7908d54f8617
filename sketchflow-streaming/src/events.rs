//! Events emitted to the rendering consumer.

use serde::{Deserialize, Serialize};
use sketchflow_core::DrawElementSpec;
use std::fmt;

use crate::error::StreamResult;
use crate::sse::encode_data;

/// Events produced for one drawing request.
///
/// Any number of [`Thinking`](Self::Thinking) events come first, then
/// exactly one terminal event ([`Elements`](Self::Elements),
/// [`TextOnly`](Self::TextOnly) or [`Error`](Self::Error)), then
/// [`Done`](Self::Done).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Free-running model text, forwarded as it arrives.
    Thinking {
        /// The text delta.
        text: String,
    },

    /// Structured drawing result.
    Elements {
        /// Shapes to draw.
        elements: Vec<DrawElementSpec>,
        /// Short description of the drawing.
        explanation: String,
        /// Message body for the chat transcript.
        #[serde(rename = "renderedMessage")]
        rendered_message: String,
    },

    /// The model answered in prose with nothing to draw.
    TextOnly {
        /// Everything the model said.
        text: String,
    },

    /// The request failed.
    Error {
        /// User-facing message.
        message: String,
    },

    /// End of the event sequence.
    Done,
}

impl StreamEvent {
    /// Create a thinking event.
    pub fn thinking(text: impl Into<String>) -> Self {
        Self::Thinking { text: text.into() }
    }

    /// Create a text-only event.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self::TextOnly { text: text.into() }
    }

    /// Create an error event.
    pub fn error(message: impl fmt::Display) -> Self {
        Self::Error {
            message: message.to_string(),
        }
    }

    /// Check if this event carries the request's result.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Elements { .. } | Self::TextOnly { .. } | Self::Error { .. }
        )
    }

    /// Check if this is the final event.
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Wire discriminator.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Thinking { .. } => "thinking",
            Self::Elements { .. } => "elements",
            Self::TextOnly { .. } => "text_only",
            Self::Error { .. } => "error",
            Self::Done => "done",
        }
    }

    /// Encode as one SSE record.
    pub fn to_sse(&self) -> StreamResult<String> {
        encode_data(self)
    }
}

impl fmt::Display for StreamEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thinking { text } => write!(f, "thinking: {text}"),
            Self::Elements { elements, .. } => write!(f, "elements: {}", elements.len()),
            Self::TextOnly { text } => write!(f, "text: {text}"),
            Self::Error { message } => write!(f, "error: {message}"),
            Self::Done => f.write_str("done"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sketchflow_core::ElementType;

    #[test]
    fn test_wire_format() {
        let event = StreamEvent::Elements {
            elements: vec![DrawElementSpec::new(ElementType::Ellipse, 1.0, 2.0)],
            explanation: "one circle".into(),
            rendered_message: "one circle".into(),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "type": "elements",
                "elements": [{"type": "ellipse", "x": 1.0, "y": 2.0}],
                "explanation": "one circle",
                "renderedMessage": "one circle"
            })
        );

        assert_eq!(
            serde_json::to_value(StreamEvent::text_only("hi")).unwrap(),
            json!({"type": "text_only", "text": "hi"})
        );
        assert_eq!(
            serde_json::to_value(StreamEvent::Done).unwrap(),
            json!({"type": "done"})
        );
    }

    #[test]
    fn test_to_sse() {
        assert_eq!(
            StreamEvent::error("boom").to_sse().unwrap(),
            "data: {\"type\":\"error\",\"message\":\"boom\"}\n\n"
        );
    }

    #[test]
    fn test_classification() {
        assert!(!StreamEvent::thinking("x").is_terminal());
        assert!(StreamEvent::text_only("x").is_terminal());
        assert!(StreamEvent::error("x").is_terminal());
        assert!(!StreamEvent::Done.is_terminal());
        assert!(StreamEvent::Done.is_done());
        assert_eq!(StreamEvent::text_only("x").event_type(), "text_only");
    }

    #[test]
    fn test_deserialize_thinking() {
        let event: StreamEvent =
            serde_json::from_str(r#"{"type":"thinking","text":"Drawing "}"#).unwrap();
        assert_eq!(event, StreamEvent::thinking("Drawing "));
    }
}
