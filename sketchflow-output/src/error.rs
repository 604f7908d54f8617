//! Error types for drawing output parsing.

use thiserror::Error;

/// Error while turning model output into a drawing.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The tool-call argument text is not valid JSON.
    #[error("tool arguments parse failed")]
    ToolArguments(#[source] serde_json::Error),

    /// Text extracted from a prose answer stayed invalid after repair.
    #[error("malformed JSON, please retry")]
    MalformedJson(#[source] serde_json::Error),

    /// Rendering the transcript message failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A repair rule pattern did not compile.
    #[error("Invalid repair rule '{name}': {source}")]
    InvalidRule {
        /// Rule name.
        name: String,
        /// Compile error.
        #[source]
        source: regex::Error,
    },
}

impl OutputError {
    /// Check if a fresh attempt from the model may succeed.
    #[must_use]
    pub fn is_model_fault(&self) -> bool {
        matches!(self, Self::ToolArguments(_) | Self::MalformedJson(_))
    }
}

/// Result type for output operations.
pub type OutputResult<T> = Result<T, OutputError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn json_err() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("{").unwrap_err()
    }

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(
            OutputError::ToolArguments(json_err()).to_string(),
            "tool arguments parse failed"
        );
        assert_eq!(
            OutputError::MalformedJson(json_err()).to_string(),
            "malformed JSON, please retry"
        );
    }

    #[test]
    fn test_is_model_fault() {
        assert!(OutputError::MalformedJson(json_err()).is_model_fault());
        assert!(!OutputError::Serialization(json_err()).is_model_fault());
    }
}
