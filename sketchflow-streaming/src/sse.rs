//! Server-Sent Events (SSE) frame decoding.
//!
//! Upstream completions arrive as `data: {json}` lines. The decoder buffers
//! raw bytes across network chunks, so a record split anywhere (including
//! inside a multi-byte UTF-8 sequence) decodes the same as one delivered
//! whole.

use crate::error::{StreamError, StreamResult};
use bytes::Bytes;
use futures::{ready, Stream};
use pin_project_lite::pin_project;
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Largest line the decoder will buffer.
pub const MAX_LINE_SIZE: usize = 10 * 1024 * 1024;

/// Payload that marks the end of an OpenAI-style stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Incremental decoder from raw SSE bytes to JSON payloads.
#[derive(Debug)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    max_line_size: usize,
    done: bool,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SseDecoder {
    /// Create a new decoder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            max_line_size: MAX_LINE_SIZE,
            done: false,
        }
    }

    /// Override the maximum buffered line size.
    #[must_use]
    pub fn with_max_line_size(mut self, limit: usize) -> Self {
        self.max_line_size = limit;
        self
    }

    /// Feed bytes and return every payload completed by them.
    pub fn feed(&mut self, bytes: &[u8]) -> StreamResult<Vec<Value>> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(value) = self.decode_line(&line) {
                payloads.push(value);
            }
        }

        if self.buffer.len() > self.max_line_size {
            self.buffer.clear();
            return Err(StreamError::BufferOverflow {
                limit: self.max_line_size,
            });
        }

        Ok(payloads)
    }

    /// Flush a trailing line that was never newline-terminated.
    pub fn finish(&mut self) -> Option<Value> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        self.decode_line(&line)
    }

    /// Whether the `[DONE]` sentinel has been seen.
    #[must_use]
    pub fn saw_done(&self) -> bool {
        self.done
    }

    /// Bytes waiting for a line terminator.
    #[must_use]
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }

    fn decode_line(&mut self, raw: &[u8]) -> Option<Value> {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim_end_matches(['\n', '\r']);

        let payload = match line.strip_prefix("data:") {
            Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
            None => {
                if !line.is_empty() {
                    tracing::trace!(line = %line, "Skipping non-data SSE line");
                }
                return None;
            }
        };

        if payload.trim() == DONE_SENTINEL {
            self.done = true;
            return None;
        }
        if payload.trim().is_empty() {
            return None;
        }

        match serde_json::from_str(payload) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(
                    error = %e,
                    payload = %truncate(payload, 120),
                    "Discarding SSE payload that is not JSON"
                );
                None
            }
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

pin_project! {
    /// Stream adapter that decodes JSON payloads from a byte stream.
    ///
    /// Dropping the adapter drops the inner stream, which closes the
    /// underlying connection.
    pub struct SseDecodeStream<S> {
        #[pin]
        inner: S,
        decoder: SseDecoder,
        pending: VecDeque<Value>,
        finished: bool,
    }
}

impl<S> SseDecodeStream<S> {
    /// Create a new decoding stream.
    pub fn new(inner: S) -> Self {
        Self::with_decoder(inner, SseDecoder::new())
    }

    /// Create a decoding stream with a configured decoder.
    pub fn with_decoder(inner: S, decoder: SseDecoder) -> Self {
        Self {
            inner,
            decoder,
            pending: VecDeque::new(),
            finished: false,
        }
    }
}

impl<S, E> Stream for SseDecodeStream<S>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: From<StreamError>,
{
    type Item = Result<Value, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(value) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(value)));
            }
            if *this.finished {
                return Poll::Ready(None);
            }

            match ready!(this.inner.as_mut().poll_next(cx)) {
                Some(Ok(bytes)) => match this.decoder.feed(&bytes) {
                    Ok(values) => this.pending.extend(values),
                    Err(e) => {
                        *this.finished = true;
                        return Poll::Ready(Some(Err(e.into())));
                    }
                },
                Some(Err(e)) => return Poll::Ready(Some(Err(e))),
                None => {
                    *this.finished = true;
                    this.pending.extend(this.decoder.finish());
                }
            }
        }
    }
}

/// Encode a value as one SSE record: `data: {json}\n\n`.
pub fn encode_data<T: Serialize>(value: &T) -> StreamResult<String> {
    Ok(format!("data: {}\n\n", serde_json::to_string(value)?))
}
