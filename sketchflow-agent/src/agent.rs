//! The drawing agent.
//!
//! [`DrawAgent`] turns a [`DrawRequest`] into upstream messages, opens the
//! completion stream and hands back a [`DrawStream`] of events.

use futures::StreamExt;
use sketchflow_core::ChatConfig;
use sketchflow_models::{OpenAIChatClient, Transport};
use sketchflow_output::JsonRepairer;
use sketchflow_retries::RetryConfig;
use sketchflow_streaming::StreamEvent;
use std::sync::Arc;

use crate::builder::DrawAgentBuilder;
use crate::errors::{AgentError, AgentResult};
use crate::pipeline::DrawPipeline;
use crate::request::DrawRequest;
use crate::stream::DrawStream;

/// Drawing agent bound to one endpoint.
///
/// Cheap to clone. Every request gets its own accumulation state, so one
/// agent can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct DrawAgent {
    client: OpenAIChatClient,
    retry: RetryConfig,
    system_prompt: String,
    repairer: Arc<JsonRepairer>,
}

impl DrawAgent {
    /// Create an agent with default settings over HTTP.
    pub fn new(config: ChatConfig) -> AgentResult<Self> {
        DrawAgentBuilder::new(config).build()
    }

    /// Create an agent over an existing transport.
    pub fn with_transport(config: ChatConfig, transport: Arc<dyn Transport>) -> AgentResult<Self> {
        DrawAgentBuilder::new(config).transport(transport).build()
    }

    /// Start building an agent.
    pub fn builder(config: ChatConfig) -> DrawAgentBuilder {
        DrawAgentBuilder::new(config)
    }

    pub(crate) fn from_parts(
        client: OpenAIChatClient,
        retry: RetryConfig,
        system_prompt: String,
        repairer: Arc<JsonRepairer>,
    ) -> Self {
        Self {
            client,
            retry,
            system_prompt,
            repairer,
        }
    }

    /// The upstream client.
    #[must_use]
    pub fn client(&self) -> &OpenAIChatClient {
        &self.client
    }

    /// System prompt sent first on every request.
    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Retry policy for opening the upstream stream.
    #[must_use]
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Start a drawing request.
    ///
    /// Only an empty prompt fails here; everything after that is reported
    /// through the returned stream. Must be called inside a Tokio runtime.
    pub fn stream(&self, request: DrawRequest) -> AgentResult<DrawStream> {
        if !request.has_prompt() {
            return Err(AgentError::EmptyPrompt);
        }
        let messages = request.to_messages(&self.system_prompt);
        tracing::debug!(
            history = request.history.len(),
            canvas = request.current_elements.len(),
            "Starting drawing request"
        );

        Ok(DrawStream::spawn(
            self.client.clone(),
            self.retry.clone(),
            messages,
            DrawPipeline::new(Arc::clone(&self.repairer)),
        ))
    }

    /// Run a drawing request to completion and collect its events.
    pub async fn run(&self, request: DrawRequest) -> AgentResult<Vec<StreamEvent>> {
        Ok(self.stream(request)?.collect().await)
    }

    /// Check that the endpoint accepts our credentials and model.
    pub async fn test_connection(&self) -> AgentResult<()> {
        Ok(self.client.test_connection().await?)
    }
}
