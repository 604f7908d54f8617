//! OpenAI chat completions wire types.
//!
//! Only the subset the drawing pipeline sends and reads. Response types are
//! lenient: OpenAI-compatible providers omit fields freely, so everything
//! that is not needed defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sketchflow_core::{ChatMessage as CoreMessage, ToolCallFragment};

// ============================================================================
// Request Types
// ============================================================================

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Model to use.
    pub model: String,
    /// Messages in the conversation.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    /// Tool definitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ChatTool>>,
    /// Tool choice strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoiceValue>,
    /// Whether to stream the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl ChatCompletionRequest {
    /// Create a new request.
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
            tools: None,
            tool_choice: None,
            stream: None,
        }
    }
}

/// Chat message as sent upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message author.
    pub role: String,
    /// Message content.
    #[serde(default)]
    pub content: Option<String>,
    /// Tool calls made by the assistant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// ID of the tool call being responded to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    /// Create a message with text content.
    pub fn text(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

impl From<&CoreMessage> for ChatMessage {
    fn from(message: &CoreMessage) -> Self {
        let tool_calls = message
            .tool_calls
            .as_ref()
            .filter(|calls| !calls.is_empty())
            .map(|calls| calls.iter().map(ToolCall::from).collect());
        // Assistant turns that only call tools carry null content.
        let content = if message.content.is_empty() && tool_calls.is_some() {
            None
        } else {
            Some(message.content.clone())
        };
        Self {
            role: message.role.as_str().to_string(),
            content,
            tool_calls,
            tool_call_id: message.tool_call_id.clone(),
        }
    }
}

/// Tool definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTool {
    /// Tool type (always "function").
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function definition.
    pub function: FunctionDefinition,
}

impl ChatTool {
    /// Create a function tool.
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: JsonValue,
    ) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// Function definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Function name.
    pub name: String,
    /// Function description.
    pub description: String,
    /// Parameter schema.
    pub parameters: JsonValue,
}

/// Tool call in a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool call ID.
    pub id: String,
    /// Tool type.
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function call details.
    pub function: FunctionCall,
}

impl From<&ToolCallFragment> for ToolCall {
    fn from(fragment: &ToolCallFragment) -> Self {
        Self {
            id: fragment.id.clone(),
            tool_type: "function".to_string(),
            function: FunctionCall {
                name: fragment.name.clone(),
                arguments: fragment.arguments_delta.clone(),
            },
        }
    }
}

/// Function call details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Function name.
    pub name: String,
    /// Arguments as JSON string.
    pub arguments: String,
}

/// Tool choice value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolChoiceValue {
    /// String choice (auto, none, required).
    String(String),
    /// Specific tool choice.
    Specific {
        /// Tool type.
        #[serde(rename = "type")]
        tool_type: String,
        /// Function to call.
        function: FunctionName,
    },
}

impl ToolChoiceValue {
    /// Auto mode.
    pub fn auto() -> Self {
        Self::String("auto".to_string())
    }

    /// Force a specific function.
    pub fn function(name: impl Into<String>) -> Self {
        Self::Specific {
            tool_type: "function".to_string(),
            function: FunctionName { name: name.into() },
        }
    }

    /// Check for auto mode.
    #[must_use]
    pub fn is_auto(&self) -> bool {
        matches!(self, Self::String(s) if s == "auto")
    }
}

/// Function name for tool choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionName {
    /// The function name.
    pub name: String,
}

// ============================================================================
// Streaming Types
// ============================================================================

/// Chat completion chunk (streaming).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChatCompletionChunk {
    /// Response ID.
    pub id: Option<String>,
    /// Model used.
    pub model: Option<String>,
    /// Response choices.
    pub choices: Vec<ChunkChoice>,
}

/// Chunk choice.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChunkChoice {
    /// Choice index.
    pub index: u32,
    /// Delta content.
    pub delta: ChunkDelta,
    /// Finish reason.
    pub finish_reason: Option<String>,
}

/// Chunk delta.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChunkDelta {
    /// Role (usually only in first chunk).
    pub role: Option<String>,
    /// Text content delta.
    pub content: Option<String>,
    /// Tool calls delta.
    pub tool_calls: Option<Vec<ChunkToolCall>>,
}

/// Chunk tool call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChunkToolCall {
    /// Index of this tool call.
    pub index: u32,
    /// Tool call ID (only in first chunk for this tool).
    pub id: Option<String>,
    /// Tool type.
    #[serde(rename = "type")]
    pub tool_type: Option<String>,
    /// Function call delta.
    pub function: Option<ChunkFunction>,
}

/// Chunk function.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChunkFunction {
    /// Function name (only in first chunk).
    pub name: Option<String>,
    /// Arguments delta.
    pub arguments: Option<String>,
}

// ============================================================================
// Error Types
// ============================================================================

/// OpenAI API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIError {
    /// Error details.
    pub error: OpenAIErrorBody,
}

/// OpenAI error body.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIErrorBody {
    /// Error message.
    pub message: String,
    /// Error type.
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    /// Error code.
    #[serde(default)]
    pub code: Option<JsonValue>,
}

impl OpenAIError {
    /// Pull `error.message` out of a raw response body.
    #[must_use]
    pub fn message_from_body(body: &str) -> Option<String> {
        serde_json::from_str::<OpenAIError>(body)
            .ok()
            .map(|e| e.error.message)
            .filter(|m| !m.is_empty())
    }
}
