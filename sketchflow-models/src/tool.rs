//! The `draw_elements` function-calling tool.

use serde_json::{json, Value as JsonValue};
use sketchflow_core::ElementType;

use crate::openai::types::ChatTool;

/// Name the model must call to draw.
pub const DRAW_TOOL_NAME: &str = "draw_elements";

const DRAW_TOOL_DESCRIPTION: &str = "Draw shapes on the canvas. Call this whenever the user \
asks to draw, sketch, or add shapes.";

/// JSON schema of the tool arguments.
#[must_use]
pub fn draw_tool_parameters() -> JsonValue {
    let types: Vec<&str> = ElementType::ALL.iter().map(ElementType::as_str).collect();
    json!({
        "type": "object",
        "properties": {
            "elements": {
                "type": "array",
                "description": "Elements to draw",
                "items": {
                    "type": "object",
                    "properties": {
                        "type": {
                            "type": "string",
                            "enum": types,
                            "description": "Shape kind: rectangle, ellipse (also circles), diamond, text, arrow, line"
                        },
                        "x": {"type": "number", "description": "X of the top-left corner"},
                        "y": {"type": "number", "description": "Y of the top-left corner"},
                        "width": {"type": "number", "description": "Width (rectangle, ellipse, diamond)"},
                        "height": {"type": "number", "description": "Height (rectangle, ellipse, diamond)"},
                        "text": {
                            "type": "string",
                            "description": "Text content (required for text, optional label for shapes)"
                        },
                        "strokeColor": {
                            "type": "string",
                            "description": "Stroke colour, e.g. #1e1e1e (black), #e03131 (red), #2f9e44 (green), #1971c2 (blue)"
                        },
                        "backgroundColor": {
                            "type": "string",
                            "description": "Fill colour, e.g. transparent, #ffc9c9 (light red), #b2f2bb (light green), #a5d8ff (light blue)"
                        },
                        "points": {
                            "type": "array",
                            "description": "Arrow or line points as [[x1,y1], [x2,y2], ...]",
                            "items": {"type": "array", "items": {"type": "number"}}
                        }
                    },
                    "required": ["type", "x", "y"]
                }
            },
            "explanation": {
                "type": "string",
                "description": "Short description of what was drawn"
            }
        },
        "required": ["elements"]
    })
}

/// The tool definition sent with every drawing request.
#[must_use]
pub fn draw_tool() -> ChatTool {
    ChatTool::function(DRAW_TOOL_NAME, DRAW_TOOL_DESCRIPTION, draw_tool_parameters())
}
