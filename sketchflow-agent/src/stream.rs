//! Streaming execution of one drawing request.
//!
//! A [`DrawStream`] spawns a task that opens the upstream stream, runs the
//! pipeline and sends events through a channel. Dropping the stream aborts
//! the task, which drops the upstream body and closes the connection.

use futures::{FutureExt, Stream};
use sketchflow_core::ChatMessage;
use sketchflow_models::OpenAIChatClient;
use sketchflow_retries::{with_retry_state, RetryConfig};
use sketchflow_streaming::StreamEvent;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::pipeline::{run_pipeline, Disconnected, DrawPipeline, EventSink};

/// Capacity of the event channel between the task and the consumer.
const EVENT_BUFFER: usize = 64;

/// Message sent when the request fails in an unexpected way.
pub const GENERIC_FAILURE: &str = "failed to generate, please retry later";

/// Event sequence of one drawing request.
///
/// Yields any number of `Thinking` events, exactly one terminal event and
/// then `Done`.
#[derive(Debug)]
pub struct DrawStream {
    rx: mpsc::Receiver<StreamEvent>,
    task: JoinHandle<()>,
}

impl DrawStream {
    /// Spawn the request task. Must be called inside a Tokio runtime.
    pub(crate) fn spawn(
        client: OpenAIChatClient,
        retry: RetryConfig,
        messages: Vec<ChatMessage>,
        pipeline: DrawPipeline,
    ) -> Self {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        let task = tokio::spawn(async move {
            let mut sink = EventSink::new(tx);
            info!(
                model = %client.config().model,
                messages = messages.len(),
                "DrawStream: task started"
            );

            let run = AssertUnwindSafe(drive(&client, &retry, &messages, pipeline, &mut sink))
                .catch_unwind()
                .await;

            match run {
                Ok(Ok(())) => debug!("DrawStream: task finished"),
                Ok(Err(Disconnected)) => debug!("DrawStream: consumer went away"),
                Err(panic) => {
                    error!(panic = %panic_message(&*panic), "DrawStream: task panicked");
                    let _ = sink.close(StreamEvent::error(GENERIC_FAILURE)).await;
                }
            }
        });

        Self { rx, task }
    }
}

async fn drive(
    client: &OpenAIChatClient,
    retry: &RetryConfig,
    messages: &[ChatMessage],
    pipeline: DrawPipeline,
    sink: &mut EventSink,
) -> Result<(), Disconnected> {
    let (opened, state) = with_retry_state(retry, || client.stream(messages)).await;
    match opened {
        Ok(chunks) => run_pipeline(chunks, pipeline, sink).await,
        Err(e) => {
            warn!(attempts = state.attempt, error = %e, "Could not open upstream stream");
            sink.close(StreamEvent::error(e)).await
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

impl Drop for DrawStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl Stream for DrawStream {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx).poll_recv(cx)
    }
}
