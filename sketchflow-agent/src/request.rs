//! One drawing request and the messages it turns into.

use serde::{Deserialize, Serialize};
use sketchflow_core::{deserialize_canvas_elements, CanvasElement, ChatMessage};

use crate::instructions::user_message;

/// What the user asked for, with the context needed to answer it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawRequest {
    /// The drawing description.
    pub prompt: String,
    /// Earlier turns, oldest first.
    #[serde(default, alias = "messages")]
    pub history: Vec<ChatMessage>,
    /// Elements already on the canvas. Entries that are not elements are
    /// dropped.
    #[serde(default, deserialize_with = "deserialize_canvas_elements")]
    pub current_elements: Vec<CanvasElement>,
}

impl DrawRequest {
    /// Create a request with no history and an empty canvas.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Set the conversation history.
    #[must_use]
    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    /// Set the current canvas contents.
    #[must_use]
    pub fn with_elements<E: Into<CanvasElement>>(
        mut self,
        elements: impl IntoIterator<Item = E>,
    ) -> Self {
        self.current_elements = elements.into_iter().map(Into::into).collect();
        self
    }

    /// Whether there is anything to draw.
    #[must_use]
    pub fn has_prompt(&self) -> bool {
        !self.prompt.trim().is_empty()
    }

    /// Upstream message list: system prompt, history, then the user turn.
    #[must_use]
    pub fn to_messages(&self, system_prompt: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(ChatMessage::system(system_prompt));
        messages.extend(self.history.iter().cloned());
        messages.push(ChatMessage::user(user_message(
            &self.prompt,
            &self.current_elements,
        )));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sketchflow_core::{DrawElementSpec, ElementType, Role};

    #[test]
    fn test_message_order() {
        let request = DrawRequest::new("a circle").with_history(vec![
            ChatMessage::user("a box"),
            ChatMessage::assistant("drew a box"),
        ]);
        let messages = request.to_messages("sys");

        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(messages[0].content, "sys");
        assert_eq!(messages[3].content, "a circle");
    }

    #[test]
    fn test_canvas_goes_into_user_turn() {
        let request = DrawRequest::new("more")
            .with_elements(vec![DrawElementSpec::new(ElementType::Ellipse, 0.0, 0.0)]);
        let messages = request.to_messages("sys");
        assert_eq!(messages.len(), 2);
        assert!(messages[1].content.starts_with("Current canvas state:"));
    }

    #[test]
    fn test_deserialize_wire_names() {
        let request: DrawRequest = serde_json::from_str(
            r#"{
                "prompt": "flowchart",
                "messages": [{"role": "user", "content": "hi"}],
                "currentElements": [{"type": "text", "x": 1, "y": 2, "text": "A"}]
            }"#,
        )
        .unwrap();
        assert_eq!(request.history, vec![ChatMessage::user("hi")]);
        assert_eq!(request.current_elements.len(), 1);
        assert_eq!(request.current_elements[0].text.as_deref(), Some("A"));
        assert!(request.has_prompt());
        assert!(!DrawRequest::new("  ").has_prompt());
    }

    #[test]
    fn test_editor_elements_survive() {
        let request: DrawRequest = serde_json::from_str(
            r#"{
                "prompt": "label it",
                "currentElements": [
                    {"type": "freedraw", "x": 3, "y": 4, "points": [[0, 0], [5, 5]]},
                    {"type": "image", "x": 10, "y": 10, "width": 64, "height": 64},
                    "not an element"
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(request.current_elements.len(), 2);

        let messages = request.to_messages("sys");
        assert!(messages[1].content.contains("1. freedraw at (3, 4)"));
        assert!(messages[1].content.contains("2. image at (10, 10) size 64x64"));
    }
}
