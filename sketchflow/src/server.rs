//! HTTP server for drawing requests.
//!
//! This module provides an Axum-based HTTP server exposing the chat and
//! connection-test endpoints. It is only available when the `server` feature
//! is enabled.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use sketchflow_agent::{DrawAgent, DrawRequest, GENERIC_FAILURE};
use sketchflow_core::{
    deserialize_canvas_elements, CanvasElement, ChatConfig, ChatConfigOverrides, ChatMessage,
};
use sketchflow_models::{upstream_error_message, ModelError, OpenAIChatClient, Transport};
use sketchflow_retries::RetryConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

const MISSING_PROMPT: &str = "please provide a drawing description";
const MISSING_API_KEY: &str = "please configure the API key";
const MISSING_FIELDS: &str = "missing required configuration fields";
const CONNECTION_FAILED: &str = "connection failed, please check the configuration";

/// Error body returned by the endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// User-facing message.
    pub error: String,
}

impl ErrorResponse {
    /// Create an error body.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn reject(status: StatusCode, message: impl Into<String>) -> HandlerError {
    (status, Json(ErrorResponse::new(message)))
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatRequestBody {
    /// Drawing description.
    pub prompt: String,
    /// Per-request endpoint overrides.
    pub config: Option<ChatConfigOverrides>,
    /// Earlier turns.
    pub messages: Vec<ChatMessage>,
    /// Elements already on the canvas, of any editor type.
    #[serde(deserialize_with = "deserialize_canvas_elements")]
    pub current_elements: Vec<CanvasElement>,
}

/// Body of `POST /api/test-connection`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestConnectionBody {
    /// API key to try.
    pub api_key: String,
    /// Base URL to try.
    pub base_url: String,
    /// Model to try.
    pub model: String,
}

/// Server error types.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Could not bind the listener.
    #[error("Failed to bind to address: {0}")]
    Bind(String),
    /// The server stopped with an error.
    #[error("Server error: {0}")]
    Serve(String),
}

/// Shared state for the HTTP handlers.
struct ServerState {
    defaults: ChatConfig,
    retry: RetryConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl ServerState {
    fn agent(&self, config: ChatConfig) -> Result<DrawAgent, sketchflow_agent::AgentError> {
        let builder = DrawAgent::builder(config).retry(self.retry.clone());
        match &self.transport {
            Some(transport) => builder.transport(Arc::clone(transport)).build(),
            None => builder.build(),
        }
    }

    fn client(&self, config: ChatConfig) -> Result<OpenAIChatClient, ModelError> {
        match &self.transport {
            Some(transport) => OpenAIChatClient::with_transport(config, Arc::clone(transport)),
            None => OpenAIChatClient::new(config),
        }
    }
}

/// HTTP front end for drawing requests.
pub struct ChatServer {
    state: ServerState,
}

impl ChatServer {
    /// Create a server whose requests start from `defaults`.
    ///
    /// Clients may override key, base URL, model and temperature per request.
    pub fn new(defaults: ChatConfig) -> Self {
        Self {
            state: ServerState {
                defaults,
                retry: RetryConfig::no_retry(),
                transport: None,
            },
        }
    }

    /// Retry policy for opening upstream streams.
    #[must_use]
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.state.retry = retry;
        self
    }

    /// Send upstream requests through this transport.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.state.transport = Some(transport);
        self
    }

    /// Create an Axum router for the endpoints.
    pub fn router(self) -> Router {
        Router::new()
            .route("/api/chat", post(chat))
            .route("/api/test-connection", post(test_connection))
            .route("/health", get(health_check))
            .with_state(Arc::new(self.state))
    }

    /// Start serving on the given address until Ctrl-C.
    pub async fn serve(self, addr: impl Into<SocketAddr>) -> Result<(), ServerError> {
        let addr = addr.into();
        let router = self.router();

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(e.to_string()))?;
        info!(%addr, "Listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

// Handler implementations

/// POST /api/chat - Stream a drawing as server-sent events
async fn chat(
    State(state): State<Arc<ServerState>>,
    body: Result<Json<ChatRequestBody>, JsonRejection>,
) -> Result<Response, HandlerError> {
    let Json(body) = body.map_err(|e| reject(StatusCode::BAD_REQUEST, e.body_text()))?;

    if body.prompt.trim().is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, MISSING_PROMPT));
    }
    let config = state
        .defaults
        .merge(&body.config.unwrap_or_default());
    if config.api_key.trim().is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, MISSING_API_KEY));
    }

    let request = DrawRequest {
        prompt: body.prompt,
        history: body.messages,
        current_elements: body.current_elements,
    };
    let events = state
        .agent(config)
        .and_then(|agent| agent.stream(request))
        .map_err(|e| {
            warn!(error = %e, "Could not start drawing request");
            reject(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE)
        })?;

    let body = Body::from_stream(events.map(|event| event.to_sse()));
    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        body,
    )
        .into_response())
}

/// POST /api/test-connection - Probe an endpoint with a tiny completion
async fn test_connection(
    State(state): State<Arc<ServerState>>,
    body: Result<Json<TestConnectionBody>, JsonRejection>,
) -> Result<Json<serde_json::Value>, HandlerError> {
    let Json(body) = body.map_err(|e| reject(StatusCode::BAD_REQUEST, e.body_text()))?;

    if [&body.api_key, &body.base_url, &body.model]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        return Err(reject(StatusCode::BAD_REQUEST, MISSING_FIELDS));
    }

    let mut config = state.defaults.clone();
    config.api_key = body.api_key;
    config.base_url = body.base_url;
    config.model = body.model;

    let outcome = match state.client(config) {
        Ok(client) => client.test_connection().await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => Ok(Json(serde_json::json!({ "success": true }))),
        Err(ModelError::Http { status, body, .. }) => {
            let code = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            Err(reject(code, upstream_error_message(status, &body)))
        }
        Err(e) => {
            warn!(error = %e, "Connection test failed");
            Err(reject(StatusCode::INTERNAL_SERVER_ERROR, CONNECTION_FAILED))
        }
    }
}

/// GET /health - Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "sketchflow"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use sketchflow_models::MockTransport;
    use sketchflow_streaming::StreamEvent;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn router(transport: &MockTransport) -> Router {
        ChatServer::new(ChatConfig::default())
            .transport(Arc::new(transport.clone()))
            .router()
    }

    async fn post_json(router: Router, uri: &str, body: Value) -> Response {
        router
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_chat_streams_events() {
        let transport = MockTransport::new().with_sse([
            "data: {\"choices\":[{\"delta\":{\"content\":\"no shapes here\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
            "data: [DONE]\n\n",
        ]);
        let response = post_json(
            router(&transport),
            "/api/chat",
            json!({"prompt": "a box", "config": {"apiKey": "sk-test", "model": "m1"}}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache");

        let expected = [
            StreamEvent::thinking("no shapes here"),
            StreamEvent::text_only("no shapes here"),
            StreamEvent::Done,
        ]
        .iter()
        .map(|e| e.to_sse().unwrap())
        .collect::<String>();
        assert_eq!(body_text(response).await, expected);

        let sent: Value = serde_json::from_slice(&transport.recorded_requests()[0].body).unwrap();
        assert_eq!(sent["model"], "m1");
    }

    #[tokio::test]
    async fn test_chat_requires_prompt() {
        let transport = MockTransport::new();
        let response = post_json(
            router(&transport),
            "/api/chat",
            json!({"config": {"apiKey": "sk-test"}}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({"error": MISSING_PROMPT}));
    }

    #[tokio::test]
    async fn test_chat_requires_api_key() {
        let transport = MockTransport::new();
        let response = post_json(router(&transport), "/api/chat", json!({"prompt": "a box"})).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({"error": MISSING_API_KEY}));
        assert!(transport.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_chat_uses_server_key() {
        let transport = MockTransport::new().with_sse(["data: [DONE]\n\n"]);
        let router = ChatServer::new(ChatConfig::new("sk-server"))
            .transport(Arc::new(transport.clone()))
            .router();
        let response = post_json(router, "/api/chat", json!({"prompt": "a box"})).await;

        assert_eq!(response.status(), StatusCode::OK);
        body_text(response).await;
        let auth = transport.recorded_requests()[0]
            .headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("authorization"))
            .map(|(_, value)| value.clone());
        assert_eq!(auth.as_deref(), Some("Bearer sk-server"));
    }

    #[tokio::test]
    async fn test_chat_accepts_editor_canvas_elements() {
        let transport = MockTransport::new().with_sse(["data: [DONE]\n\n"]);
        let response = post_json(
            router(&transport),
            "/api/chat",
            json!({
                "prompt": "label the sketch",
                "config": {"apiKey": "sk-test"},
                "currentElements": [
                    {"type": "rectangle", "x": 100, "y": 100, "width": 150, "height": 80},
                    {"type": "freedraw", "x": 3, "y": 4, "points": [[0, 0], [5, 5]]}
                ]
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        body_text(response).await;
        let sent: Value = serde_json::from_slice(&transport.recorded_requests()[0].body).unwrap();
        let user_turn = sent["messages"][1]["content"].as_str().unwrap();
        assert!(user_turn.contains("1. rectangle at (100, 100) size 150x80"));
        assert!(user_turn.contains("2. freedraw at (3, 4)"));
    }

    #[tokio::test]
    async fn test_connection_requires_fields() {
        let transport = MockTransport::new();
        let response = post_json(
            router(&transport),
            "/api/test-connection",
            json!({"apiKey": "sk", "baseUrl": "", "model": "m"}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({"error": MISSING_FIELDS}));
    }

    #[tokio::test]
    async fn test_connection_success_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .expect(1)
            .mount(&server)
            .await;

        let router = ChatServer::new(ChatConfig::default()).router();
        let response = post_json(
            router,
            "/api/test-connection",
            json!({"apiKey": "sk", "baseUrl": format!("{}/v1", server.uri()), "model": "m"}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"success": true}));
    }

    #[tokio::test]
    async fn test_connection_forwards_upstream_status() {
        let transport = MockTransport::new()
            .with_status(401, r#"{"error":{"message":"Incorrect API key provided"}}"#);
        let response = post_json(
            router(&transport),
            "/api/test-connection",
            json!({"apiKey": "sk", "baseUrl": "https://example.test/v1", "model": "m"}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Incorrect API key provided"})
        );
    }

    #[tokio::test]
    async fn test_connection_failure_is_500() {
        let transport = MockTransport::new().with_connection_error("refused");
        let response = post_json(
            router(&transport),
            "/api/test-connection",
            json!({"apiKey": "sk", "baseUrl": "https://example.test/v1", "model": "m"}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({"error": CONNECTION_FAILED}));
    }

    #[tokio::test]
    async fn test_health() {
        let response = ChatServer::new(ChatConfig::default())
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");
    }
}
