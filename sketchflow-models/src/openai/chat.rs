//! OpenAI-compatible chat completions client.

use futures::TryStreamExt;
use sketchflow_core::{ChatConfig, ChatMessage as CoreMessage};
use std::fmt;
use std::sync::Arc;

use super::stream::{chunk_stream, ChunkStream};
use super::types::*;
use crate::error::{ModelError, ModelResult};
use crate::tool::{draw_tool, DRAW_TOOL_NAME};
use crate::transport::{HttpTransport, Transport, TransportConfig, TransportRequest};

/// Token cap for the connection probe.
pub const PROBE_MAX_TOKENS: u64 = 5;

/// Client for one configured OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct OpenAIChatClient {
    config: ChatConfig,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for OpenAIChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIChatClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OpenAIChatClient {
    /// Create a client with its own HTTP transport.
    ///
    /// Fails when the configuration is incomplete.
    pub fn new(config: ChatConfig) -> ModelResult<Self> {
        config.validate()?;
        let transport = HttpTransport::new(TransportConfig::from(&config))?;
        Ok(Self {
            config,
            transport: Arc::new(transport),
        })
    }

    /// Create a client over an existing transport.
    pub fn with_transport(config: ChatConfig, transport: Arc<dyn Transport>) -> ModelResult<Self> {
        config.validate()?;
        Ok(Self { config, transport })
    }

    /// The endpoint configuration.
    #[must_use]
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Tool choice for this endpoint.
    ///
    /// Local Ollama does not support forcing a function, so it gets `auto`.
    #[must_use]
    pub fn tool_choice(&self) -> ToolChoiceValue {
        if self.config.is_local_ollama() {
            ToolChoiceValue::auto()
        } else {
            ToolChoiceValue::function(DRAW_TOOL_NAME)
        }
    }

    /// Build the streaming drawing request for `messages`.
    #[must_use]
    pub fn build_request(&self, messages: &[CoreMessage]) -> ChatCompletionRequest {
        let mut request = ChatCompletionRequest::new(
            self.config.model.clone(),
            messages.iter().map(ChatMessage::from).collect(),
        );
        request.temperature = Some(self.config.temperature);
        request.stream = Some(true);
        request.tools = Some(vec![draw_tool()]);
        request.tool_choice = Some(self.tool_choice());
        request
    }

    fn transport_request<T: serde::Serialize>(&self, body: &T) -> ModelResult<TransportRequest> {
        TransportRequest::post(self.config.completions_url())
            .bearer(&self.config.api_key)
            .json(body)
    }

    /// Open a streamed drawing completion.
    ///
    /// A non-success status fails here, before any chunk is produced.
    pub async fn stream(&self, messages: &[CoreMessage]) -> ModelResult<ChunkStream> {
        let body = self.build_request(messages);
        tracing::debug!(
            model = %self.config.model,
            messages = messages.len(),
            auto_tool_choice = body.tool_choice.as_ref().is_some_and(ToolChoiceValue::is_auto),
            "Requesting drawing completion"
        );
        let request = self.transport_request(&body)?;
        let bytes = self.transport.open(request).await?;
        Ok(chunk_stream(bytes))
    }

    /// Send a tiny non-streaming completion to check credentials and model.
    pub async fn test_connection(&self) -> ModelResult<()> {
        let mut body = ChatCompletionRequest::new(
            self.config.model.clone(),
            vec![ChatMessage::text("user", "Hi")],
        );
        body.max_tokens = Some(PROBE_MAX_TOKENS);

        let request = self.transport_request(&body)?;
        let response = self.transport.open(request).await?;
        // Drain so the connection is reused and mid-body failures surface.
        response.try_for_each(|_| futures::future::ok(())).await?;
        tracing::info!(model = %self.config.model, "Connection test succeeded");
        Ok(())
    }
}

/// Human-readable message for a failed upstream call.
///
/// Prefers the OpenAI-style `error.message`, then the raw body, then
/// `HTTP {status}`.
#[must_use]
pub fn upstream_error_message(status: u16, body: &str) -> String {
    OpenAIError::message_from_body(body)
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| format!("HTTP {status}"))
}
