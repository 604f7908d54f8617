//! Drawing payloads and their transcript rendering.

use serde::Serialize;
use serde_json::Value as JsonValue;
use sketchflow_core::DrawElementSpec;

use crate::error::{OutputError, OutputResult};

/// The arguments of a drawing request, after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingPayload {
    /// Valid elements, in model order.
    pub elements: Vec<DrawElementSpec>,
    /// Explanation as the model gave it.
    pub explanation: Option<String>,
}

impl DrawingPayload {
    /// Build a payload from a parsed object.
    ///
    /// A missing or non-array `elements` yields an empty list. Elements are
    /// read leniently; only entries without a usable `type` are skipped.
    #[must_use]
    pub fn from_value(value: &JsonValue) -> Self {
        let elements = value
            .get("elements")
            .and_then(JsonValue::as_array)
            .map(|items| parse_elements(items))
            .unwrap_or_default();
        let explanation = value
            .get("explanation")
            .and_then(JsonValue::as_str)
            .map(str::to_string);
        Self {
            elements,
            explanation,
        }
    }

    /// Build a payload only if the object has an `elements` array.
    #[must_use]
    pub fn from_value_strict(value: &JsonValue) -> Option<Self> {
        value
            .get("elements")
            .filter(|e| e.is_array())
            .map(|_| Self::from_value(value))
    }

    /// Parse complete tool-call argument text.
    pub fn from_tool_arguments(arguments: &str) -> OutputResult<Self> {
        let value: JsonValue =
            serde_json::from_str(arguments).map_err(OutputError::ToolArguments)?;
        Ok(Self::from_value(&value))
    }

    /// The explanation, or `drew {N} elements` when absent or empty.
    #[must_use]
    pub fn explanation_or_default(&self) -> String {
        match self.explanation.as_deref() {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => default_explanation(self.elements.len()),
        }
    }

    /// Transcript message for a tool-call result.
    ///
    /// The lead-in is `thinking` verbatim when non-empty, else the model's
    /// own explanation. A fenced JSON block of the elements and explanation
    /// follows, or stands alone when there is no lead-in.
    pub fn render_message(&self, thinking: &str) -> OutputResult<String> {
        let explanation = self.explanation_or_default();
        let json = serde_json::to_string_pretty(&RenderedPayload {
            elements: &self.elements,
            explanation: &explanation,
        })?;
        let fence = format!("```json\n{json}\n```");

        let lead = Some(thinking)
            .filter(|t| !t.is_empty())
            .or_else(|| self.explanation.as_deref().filter(|e| !e.is_empty()));

        Ok(match lead {
            Some(lead) => format!("{lead}\n\n{fence}"),
            None => fence,
        })
    }
}

/// `drew {count} elements`.
#[must_use]
pub fn default_explanation(count: usize) -> String {
    format!("drew {count} elements")
}

#[derive(Serialize)]
struct RenderedPayload<'a> {
    elements: &'a [DrawElementSpec],
    explanation: &'a str,
}

fn parse_elements(items: &[JsonValue]) -> Vec<DrawElementSpec> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match DrawElementSpec::from_value(item) {
            Ok(spec) => Some(spec),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping element without a usable type");
                None
            }
        })
        .collect()
}
