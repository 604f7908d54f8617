//! HTTP transport.
//!
//! A [`Transport`] opens one request and hands back the response body as a
//! lazily-consumed byte stream. Non-success statuses fail before any chunk is
//! yielded, with the body fully drained into the error. Nothing here retries.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Method};
use serde::Serialize;
use std::time::Duration;

use crate::error::{ModelError, ModelResult};

/// A response body being streamed.
pub type ByteStream = BoxStream<'static, ModelResult<Bytes>>;

/// One outgoing request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute target URL.
    pub url: String,
    /// Headers, in order.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: Bytes,
}

impl TransportRequest {
    /// Start a POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add `Authorization: Bearer {token}`.
    #[must_use]
    pub fn bearer(self, token: &str) -> Self {
        self.header(AUTHORIZATION.as_str(), format!("Bearer {token}"))
    }

    /// Set a JSON body and its content type.
    pub fn json<T: Serialize>(self, body: &T) -> ModelResult<Self> {
        let bytes = serde_json::to_vec(body)?;
        let mut req = self.header(CONTENT_TYPE.as_str(), "application/json");
        req.body = Bytes::from(bytes);
        Ok(req)
    }

    fn header_map(&self) -> ModelResult<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ModelError::configuration(format!("invalid header name: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ModelError::configuration(format!("invalid header value: {e}")))?;
            map.append(name, value);
        }
        Ok(map)
    }
}

/// Opens requests and streams their bodies.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return the body stream on success.
    ///
    /// Dropping the returned stream closes the connection.
    async fn open(&self, request: TransportRequest) -> ModelResult<ByteStream>;
}

/// Connection settings for [`HttpTransport`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportConfig {
    /// Skip TLS certificate validation.
    ///
    /// Only for trusted networks with intercepting proxies or self-signed
    /// certificates.
    pub accept_invalid_certs: bool,
    /// Whole-request timeout, body included.
    pub timeout: Option<Duration>,
    /// Connect timeout.
    pub connect_timeout: Option<Duration>,
}

impl TransportConfig {
    /// Create default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow invalid certificates.
    #[must_use]
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connect timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }
}

impl From<&sketchflow_core::ChatConfig> for TransportConfig {
    fn from(config: &sketchflow_core::ChatConfig) -> Self {
        Self {
            accept_invalid_certs: config.accept_invalid_certs,
            timeout: config.timeout,
            connect_timeout: None,
        }
    }
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: TransportConfig,
}

impl HttpTransport {
    /// Build a transport with its own connection pool.
    pub fn new(config: TransportConfig) -> ModelResult<Self> {
        let mut builder = Client::builder().danger_accept_invalid_certs(config.accept_invalid_certs);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if config.accept_invalid_certs {
            tracing::warn!("TLS certificate validation disabled for this transport");
        }
        let client = builder.build()?;
        Ok(Self { client, config })
    }

    /// Settings this transport was built with.
    #[must_use]
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn open(&self, request: TransportRequest) -> ModelResult<ByteStream> {
        let headers = request.header_map()?;
        tracing::debug!(method = %request.method, url = %request.url, "Opening upstream request");

        let response = self
            .client
            .request(request.method, &request.url)
            .headers(headers)
            .body(request.body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let body = error_body(status.as_u16(), response.text().await);
            tracing::warn!(status = status.as_u16(), "Upstream returned an error status");
            return Err(ModelError::Http {
                status: status.as_u16(),
                body,
                retry_after,
            });
        }

        Ok(response.bytes_stream().map_err(ModelError::from).boxed())
    }
}

/// Body of an error response, or a marker when it could not be read.
fn error_body<E: std::fmt::Display>(status: u16, read: Result<String, E>) -> String {
    read.unwrap_or_else(|e| {
        tracing::warn!(status, error = %e, "Failed to read upstream error body");
        format!("<unreadable body: {e}>")
    })
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
