//! Agent builder pattern.
//!
//! The builder provides a fluent interface for configuring a [`DrawAgent`].

use sketchflow_core::ChatConfig;
use sketchflow_models::{OpenAIChatClient, Transport};
use sketchflow_output::JsonRepairer;
use sketchflow_retries::RetryConfig;
use std::sync::Arc;

use crate::agent::DrawAgent;
use crate::errors::AgentResult;
use crate::instructions::SYSTEM_PROMPT;

/// Builder for creating drawing agents.
pub struct DrawAgentBuilder {
    config: ChatConfig,
    transport: Option<Arc<dyn Transport>>,
    system_prompt: String,
    retry: RetryConfig,
    repairer: Option<JsonRepairer>,
}

impl DrawAgentBuilder {
    /// Start from an endpoint configuration.
    pub fn new(config: ChatConfig) -> Self {
        Self {
            config,
            transport: None,
            system_prompt: SYSTEM_PROMPT.to_string(),
            retry: RetryConfig::no_retry(),
            repairer: None,
        }
    }

    /// Use this transport instead of building an HTTP one.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replace the built-in system prompt.
    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Retry policy for opening the upstream stream.
    ///
    /// Defaults to no retries.
    #[must_use]
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Repair rules for JSON found in free text.
    #[must_use]
    pub fn repairer(mut self, repairer: JsonRepairer) -> Self {
        self.repairer = Some(repairer);
        self
    }

    /// Build the agent.
    ///
    /// Fails when the endpoint configuration is incomplete.
    pub fn build(self) -> AgentResult<DrawAgent> {
        let client = match self.transport {
            Some(transport) => OpenAIChatClient::with_transport(self.config, transport)?,
            None => OpenAIChatClient::new(self.config)?,
        };
        let repairer = self
            .repairer
            .unwrap_or_else(|| JsonRepairer::standard().clone());

        Ok(DrawAgent::from_parts(
            client,
            self.retry,
            self.system_prompt,
            Arc::new(repairer),
        ))
    }
}

/// Create a builder for a drawing agent.
pub fn agent(config: ChatConfig) -> DrawAgentBuilder {
    DrawAgentBuilder::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AgentError;
    use sketchflow_models::MockTransport;

    #[test]
    fn test_build_defaults() {
        let agent = agent(ChatConfig::new("sk-test"))
            .transport(Arc::new(MockTransport::new()))
            .build()
            .unwrap();
        assert_eq!(agent.system_prompt(), SYSTEM_PROMPT);
        assert_eq!(agent.retry_config().max_attempts(), 1);
    }

    #[test]
    fn test_build_overrides() {
        let agent = agent(ChatConfig::new("sk-test"))
            .transport(Arc::new(MockTransport::new()))
            .system_prompt("Draw only circles.")
            .retry(RetryConfig::for_api())
            .build()
            .unwrap();
        assert_eq!(agent.system_prompt(), "Draw only circles.");
        assert_eq!(agent.retry_config().max_attempts(), 3);
    }

    #[test]
    fn test_build_rejects_missing_key() {
        let err = agent(ChatConfig::default()).build().unwrap_err();
        assert!(matches!(err, AgentError::Model(_)));
    }
}
