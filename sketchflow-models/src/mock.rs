//! Scripted transport for testing.
//!
//! [`MockTransport`] answers each [`Transport::open`] with the next queued
//! [`MockReply`] and records the requests it saw. It also counts how many
//! response bodies were dropped, so callers can check that abandoning a
//! stream closes it.
//!
//! ```rust
//! use sketchflow_models::MockTransport;
//!
//! let transport = MockTransport::new()
//!     .with_sse(["data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\n\n"])
//!     .with_status(401, "{\"error\":{\"message\":\"bad key\"}}");
//! assert_eq!(transport.remaining(), 2);
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, StreamExt};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{ModelError, ModelResult};
use crate::transport::{ByteStream, Transport, TransportRequest};

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Success, with these body chunks.
    Chunks(Vec<Bytes>),
    /// Success; yields the chunks and then never ends.
    Hang(Vec<Bytes>),
    /// Success; yields the chunks and then fails with a connection error.
    Broken(Vec<Bytes>, String),
    /// Non-success status with a body.
    Status {
        /// HTTP status.
        status: u16,
        /// Response body.
        body: String,
    },
    /// Connection failure before any response.
    ConnectionError(String),
}

/// A [`Transport`] that replays scripted replies in order.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
    closed: Arc<AtomicUsize>,
}

impl MockTransport {
    /// Create a transport with no replies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply.
    #[must_use]
    pub fn with_reply(self, reply: MockReply) -> Self {
        lock(&self.replies).push_back(reply);
        self
    }

    /// Queue a successful body delivered as the given chunks.
    #[must_use]
    pub fn with_sse<I, B>(self, chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        self.with_reply(MockReply::Chunks(chunks.into_iter().map(Into::into).collect()))
    }

    /// Queue a non-success status.
    #[must_use]
    pub fn with_status(self, status: u16, body: impl Into<String>) -> Self {
        self.with_reply(MockReply::Status {
            status,
            body: body.into(),
        })
    }

    /// Queue a connection failure.
    #[must_use]
    pub fn with_connection_error(self, message: impl Into<String>) -> Self {
        self.with_reply(MockReply::ConnectionError(message.into()))
    }

    /// Requests seen so far.
    #[must_use]
    pub fn recorded_requests(&self) -> Vec<TransportRequest> {
        lock(&self.requests).clone()
    }

    /// Number of replies not yet used.
    #[must_use]
    pub fn remaining(&self) -> usize {
        lock(&self.replies).len()
    }

    /// Number of response bodies dropped so far.
    #[must_use]
    pub fn closed_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn open(&self, request: TransportRequest) -> ModelResult<ByteStream> {
        lock(&self.requests).push(request);
        let reply = lock(&self.replies)
            .pop_front()
            .ok_or_else(|| ModelError::Other(anyhow::anyhow!("no scripted reply left")))?;

        let body: ByteStream = match reply {
            MockReply::Status { status, body } => {
                return Err(ModelError::http(status, body));
            }
            MockReply::ConnectionError(message) => return Err(ModelError::Connection(message)),
            MockReply::Chunks(chunks) => stream::iter(chunks.into_iter().map(Ok)).boxed(),
            MockReply::Hang(chunks) => stream::iter(chunks.into_iter().map(Ok))
                .chain(stream::pending())
                .boxed(),
            MockReply::Broken(chunks, message) => stream::iter(chunks.into_iter().map(Ok))
                .chain(stream::once(async move { Err(ModelError::Connection(message)) }))
                .boxed(),
        };

        let guard = CloseGuard(self.closed.clone());
        Ok(body
            .map(move |item| {
                let _held = &guard;
                item
            })
            .boxed())
    }
}

#[derive(Debug)]
struct CloseGuard(Arc<AtomicUsize>);

impl Drop for CloseGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
