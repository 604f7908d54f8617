//! Abstract drawing element specs.
//!
//! A [`DrawElementSpec`] is the shape description a model emits through the
//! `draw_elements` tool. Converting it into a concrete canvas element is the
//! renderer's job; this module only validates and normalises it.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

/// A 2D point, `[x, y]`.
pub type Point = [f64; 2];

/// Kind of shape to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Rectangle.
    Rectangle,
    /// Ellipse or circle.
    Ellipse,
    /// Diamond.
    Diamond,
    /// Free text label.
    Text,
    /// Arrow along `points`.
    Arrow,
    /// Line along `points`.
    Line,
}

impl ElementType {
    /// All element types, in schema order.
    pub const ALL: [ElementType; 6] = [
        Self::Rectangle,
        Self::Ellipse,
        Self::Diamond,
        Self::Text,
        Self::Arrow,
        Self::Line,
    ];

    /// Wire name of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
            Self::Diamond => "diamond",
            Self::Text => "text",
            Self::Arrow => "arrow",
            Self::Line => "line",
        }
    }

    /// Whether the shape is described by `points` rather than a box.
    #[must_use]
    pub fn is_linear(&self) -> bool {
        matches!(self, Self::Arrow | Self::Line)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated drawing element.
///
/// `x`/`y` are always present after deserialization. For arrows and lines
/// with no explicit origin, the origin is the top-left corner of the point
/// cloud and the points are rebased to be relative to it. Other shapes fall
/// back to [`DEFAULT_ORIGIN`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawElement")]
pub struct DrawElementSpec {
    /// Kind of shape.
    #[serde(rename = "type")]
    pub element_type: ElementType,
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width, for box-like shapes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Height, for box-like shapes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Label or text content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Stroke colour, e.g. `#1971c2`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    /// Fill colour, e.g. `transparent`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Vertices of an arrow or line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<Point>>,
}

impl DrawElementSpec {
    /// Create an element at a position.
    pub fn new(element_type: ElementType, x: f64, y: f64) -> Self {
        Self {
            element_type,
            x,
            y,
            width: None,
            height: None,
            text: None,
            stroke_color: None,
            background_color: None,
            points: None,
        }
    }

    /// Set the size.
    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the text label.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the stroke colour.
    #[must_use]
    pub fn with_stroke_color(mut self, color: impl Into<String>) -> Self {
        self.stroke_color = Some(color.into());
        self
    }

    /// Set the fill colour.
    #[must_use]
    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    /// Set the points.
    #[must_use]
    pub fn with_points(mut self, points: Vec<Point>) -> Self {
        self.points = Some(points);
        self
    }

    /// Validate a raw JSON value as an element.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, CoreError> {
        Ok(Self::deserialize(value)?)
    }
}

/// Origin used when the model leaves out `x` or `y`.
pub const DEFAULT_ORIGIN: f64 = 100.0;

impl FromStr for ElementType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| CoreError::invalid_element(format!("unknown element type `{name}`")))
    }
}

/// Wire shape before origin inference.
///
/// Only `type` is required. Unreadable optional fields are dropped rather
/// than failing the whole element.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawElement {
    #[serde(rename = "type")]
    element_type: String,
    #[serde(default, deserialize_with = "lenient::number")]
    x: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    y: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    width: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    height: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    text: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    stroke_color: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    background_color: Option<String>,
    #[serde(default, deserialize_with = "lenient::points")]
    points: Option<Vec<Point>>,
}

impl From<RawElement> for DrawElementSpec {
    /// Unknown types draw as rectangles. A missing origin is inferred from
    /// `points` for arrows and lines, else defaults to [`DEFAULT_ORIGIN`].
    fn from(raw: RawElement) -> Self {
        let element_type = raw
            .element_type
            .parse()
            .unwrap_or(ElementType::Rectangle);
        let mut points = raw.points;

        let (x, y) = match (raw.x, raw.y) {
            (Some(x), Some(y)) => (x, y),
            (x, y) => match points.as_mut().filter(|p| !p.is_empty()) {
                Some(pts) if element_type.is_linear() => {
                    let min_x = pts.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
                    let min_y = pts.iter().map(|p| p[1]).fold(f64::INFINITY, f64::min);
                    for p in pts.iter_mut() {
                        p[0] -= min_x;
                        p[1] -= min_y;
                    }
                    (min_x, min_y)
                }
                _ => (x.unwrap_or(DEFAULT_ORIGIN), y.unwrap_or(DEFAULT_ORIGIN)),
            },
        };

        Self {
            element_type,
            x,
            y,
            width: raw.width,
            height: raw.height,
            text: raw.text,
            stroke_color: raw.stroke_color,
            background_color: raw.background_color,
            points,
        }
    }
}

/// An element already on the canvas, as the client reports it.
///
/// Canvas state comes from the editor, not the model, so any element type
/// is accepted and every geometric field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasElement {
    /// Editor element type, e.g. `rectangle` or `freedraw`.
    #[serde(rename = "type")]
    pub element_type: String,
    /// Left edge.
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub x: Option<f64>,
    /// Top edge.
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub y: Option<f64>,
    /// Width.
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub width: Option<f64>,
    /// Height.
    #[serde(
        default,
        deserialize_with = "lenient::number",
        skip_serializing_if = "Option::is_none"
    )]
    pub height: Option<f64>,
    /// Text content.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub text: Option<String>,
    /// Fill colour.
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub background_color: Option<String>,
}

impl CanvasElement {
    /// Create an element of any type at a position.
    pub fn new(element_type: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            element_type: element_type.into(),
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }
}

impl From<&DrawElementSpec> for CanvasElement {
    fn from(spec: &DrawElementSpec) -> Self {
        Self {
            element_type: spec.element_type.as_str().to_string(),
            x: Some(spec.x),
            y: Some(spec.y),
            width: spec.width,
            height: spec.height,
            text: spec.text.clone(),
            background_color: spec.background_color.clone(),
        }
    }
}

impl From<DrawElementSpec> for CanvasElement {
    fn from(spec: DrawElementSpec) -> Self {
        Self::from(&spec)
    }
}

/// Deserialize a canvas element list, skipping entries that are not
/// elements at all. `null` reads as an empty canvas.
pub fn deserialize_canvas_elements<'de, D>(
    deserializer: D,
) -> Result<Vec<CanvasElement>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<JsonValue>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(items
        .into_iter()
        .filter_map(|item| CanvasElement::deserialize(item).ok())
        .collect())
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::Point;

    fn as_number(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    pub(super) fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(as_number(&Value::deserialize(d)?))
    }

    pub(super) fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    /// Points with fewer than two numeric coordinates are dropped; extra
    /// coordinates are ignored.
    pub(super) fn points<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Vec<Point>>, D::Error> {
        let Value::Array(items) = Value::deserialize(d)? else {
            return Ok(None);
        };
        let points: Vec<Point> = items
            .iter()
            .filter_map(|item| match item.as_array()?.as_slice() {
                [x, y, ..] => Some([as_number(x)?, as_number(y)?]),
                _ => None,
            })
            .collect();
        Ok(Some(points))
    }
}
