//! Turning accumulated model output into a drawing outcome.
//!
//! Two paths exist. A proper `draw_elements` call goes through
//! [`finalize_tool_call`]. When the model answered in prose instead,
//! [`extract_from_text`] looks for an embedded JSON object and repairs it if
//! it does not parse as-is.

use serde_json::Value as JsonValue;
use sketchflow_core::DrawElementSpec;

use crate::drawing::DrawingPayload;
use crate::error::{OutputError, OutputResult};
use crate::extract::extract_json_candidate;
use crate::repair::JsonRepairer;

/// Result of finalizing one completion.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOutcome {
    /// Something to draw.
    Elements {
        /// Shapes to draw.
        elements: Vec<DrawElementSpec>,
        /// Short description.
        explanation: String,
        /// Transcript message body.
        rendered_message: String,
    },
    /// Nothing to draw; the model's text as-is.
    TextOnly(String),
}

impl DrawOutcome {
    /// Number of elements, zero for text.
    #[must_use]
    pub fn element_count(&self) -> usize {
        match self {
            Self::Elements { elements, .. } => elements.len(),
            Self::TextOnly(_) => 0,
        }
    }
}

/// Finalize a structured tool call from its complete argument text.
pub fn finalize_tool_call(arguments: &str, thinking: &str) -> OutputResult<DrawOutcome> {
    let payload = DrawingPayload::from_tool_arguments(arguments).map_err(|e| {
        tracing::warn!(arguments = %preview(arguments), "Tool arguments are not valid JSON");
        e
    })?;

    let rendered_message = payload.render_message(thinking)?;
    Ok(DrawOutcome::Elements {
        explanation: payload.explanation_or_default(),
        elements: payload.elements,
        rendered_message,
    })
}

/// Recover a drawing from a prose answer.
///
/// Without a JSON candidate, or when the candidate has no `elements` array,
/// the outcome is the text itself.
pub fn extract_from_text(text: &str, repairer: &JsonRepairer) -> OutputResult<DrawOutcome> {
    let Some((candidate, source)) = extract_json_candidate(text) else {
        return Ok(DrawOutcome::TextOnly(text.to_string()));
    };
    tracing::debug!(?source, "Found JSON candidate in model text");

    let value = parse_with_repair(candidate, repairer)?;

    match DrawingPayload::from_value_strict(&value) {
        Some(payload) => {
            let explanation = payload.explanation_or_default();
            Ok(DrawOutcome::Elements {
                elements: payload.elements,
                rendered_message: explanation.clone(),
                explanation,
            })
        }
        None => {
            tracing::debug!("JSON candidate has no elements array");
            Ok(DrawOutcome::TextOnly(text.to_string()))
        }
    }
}

fn parse_with_repair(candidate: &str, repairer: &JsonRepairer) -> OutputResult<JsonValue> {
    if let Ok(value) = serde_json::from_str(candidate) {
        return Ok(value);
    }

    let repaired = repairer.repair(candidate);
    serde_json::from_str(&repaired).map_err(|e| {
        tracing::warn!(
            error = %e,
            repaired = %preview(&repaired),
            "JSON still invalid after repair"
        );
        OutputError::MalformedJson(e)
    })
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(300) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sketchflow_core::ElementType;

    fn repairer() -> &'static JsonRepairer {
        JsonRepairer::standard()
    }

    #[test]
    fn test_tool_call_outcome() {
        let outcome = finalize_tool_call(
            r#"{"elements":[{"type":"rectangle","x":100,"y":100,"width":150,"height":80}],"explanation":"one box"}"#,
            "Drawing a box",
        )
        .unwrap();

        match outcome {
            DrawOutcome::Elements {
                elements,
                explanation,
                rendered_message,
            } => {
                assert_eq!(elements.len(), 1);
                assert_eq!(explanation, "one box");
                assert!(rendered_message.starts_with("Drawing a box\n\n```json\n"));
                assert!(rendered_message.ends_with("\n```"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_tool_call_keeps_every_element() {
        let outcome = finalize_tool_call(
            r#"{"elements":[{"type":"rectangle","x":100},{"type":"circle","x":1,"y":2},{"type":"text","x":"10","y":20,"text":"a"}]}"#,
            "",
        )
        .unwrap();

        assert_eq!(outcome.element_count(), 3);
        match outcome {
            DrawOutcome::Elements {
                elements,
                explanation,
                ..
            } => {
                assert_eq!((elements[0].x, elements[0].y), (100.0, 100.0));
                assert_eq!(elements[1].element_type, ElementType::Rectangle);
                assert_eq!(elements[2].x, 10.0);
                assert_eq!(explanation, "drew 3 elements");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_tool_call_bad_arguments() {
        let err = finalize_tool_call(r#"{"elements": [oops"#, "").unwrap_err();
        assert!(matches!(err, OutputError::ToolArguments(_)));
    }

    #[test]
    fn test_fenced_json_in_text() {
        let text = "Here is ```json\n{\"elements\":[],\"explanation\":\"empty\"}\n```";
        let outcome = extract_from_text(text, repairer()).unwrap();
        assert_eq!(
            outcome,
            DrawOutcome::Elements {
                elements: Vec::new(),
                explanation: "empty".into(),
                rendered_message: "empty".into(),
            }
        );
    }

    #[test]
    fn test_plain_prose_is_text_only() {
        let text = "I can only describe shapes, not draw them.";
        assert_eq!(
            extract_from_text(text, repairer()).unwrap(),
            DrawOutcome::TextOnly(text.into())
        );
    }

    #[test]
    fn test_json_without_elements_is_text_only() {
        let text = "Result: {\"shapes\": 3}";
        assert_eq!(
            extract_from_text(text, repairer()).unwrap(),
            DrawOutcome::TextOnly(text.into())
        );
    }

    #[test]
    fn test_repaired_brace_span() {
        let text = "Sure! {\"elements\": [{ type\": \"ellipse\", \"x\": 100 y\": 100,}],}";
        let outcome = extract_from_text(text, repairer()).unwrap();
        match outcome {
            DrawOutcome::Elements {
                elements,
                explanation,
                rendered_message,
            } => {
                assert_eq!(elements.len(), 1);
                assert_eq!(elements[0].element_type, ElementType::Ellipse);
                assert_eq!(explanation, "drew 1 elements");
                assert_eq!(rendered_message, explanation);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_unrepairable_json() {
        let text = "{\"elements\": [{\"type\": \"rectangle\" \"x\" 1 2 3}";
        let err = extract_from_text(text, repairer()).unwrap_err();
        assert_eq!(err.to_string(), "malformed JSON, please retry");
    }

    #[test]
    fn test_element_count() {
        assert_eq!(DrawOutcome::TextOnly("x".into()).element_count(), 0);
    }
}
