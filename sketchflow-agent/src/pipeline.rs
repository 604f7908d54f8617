//! Turning a chunk stream into the event sequence of one request.
//!
//! [`DrawPipeline`] holds the per-request state: it forwards text deltas as
//! thinking events while accumulating, and picks the finalization path once
//! the stream is finished. [`run_pipeline`] drives it over a chunk stream and
//! guarantees the sequence ends with exactly one terminal event and `Done`.

use futures::{Stream, StreamExt};
use sketchflow_core::ParsedChunk;
use sketchflow_models::{ModelResult, DRAW_TOOL_NAME};
use sketchflow_output::{extract_from_text, finalize_tool_call, DrawOutcome, JsonRepairer, OutputResult};
use sketchflow_streaming::{StreamEvent, ToolCallAccumulator};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Per-request accumulation and finalization.
#[derive(Debug, Clone)]
pub struct DrawPipeline {
    accumulator: ToolCallAccumulator,
    repairer: Arc<JsonRepairer>,
}

impl Default for DrawPipeline {
    fn default() -> Self {
        Self::new(Arc::new(JsonRepairer::standard().clone()))
    }
}

impl DrawPipeline {
    /// Create a pipeline using `repairer` for the free-text path.
    #[must_use]
    pub fn new(repairer: Arc<JsonRepairer>) -> Self {
        Self {
            accumulator: ToolCallAccumulator::new(),
            repairer,
        }
    }

    /// Fold one chunk in, returning a thinking event for its text.
    pub fn push(&mut self, chunk: ParsedChunk) -> Option<StreamEvent> {
        self.accumulator.push(chunk).map(StreamEvent::thinking)
    }

    /// Whether the finish signal has been seen.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.accumulator.is_finished()
    }

    /// Accumulated state so far.
    #[must_use]
    pub fn accumulator(&self) -> &ToolCallAccumulator {
        &self.accumulator
    }

    /// Produce the terminal event from what was accumulated.
    ///
    /// A `draw_elements` call with arguments is parsed strictly. Text with no
    /// tool call goes through JSON extraction and repair. Anything else is
    /// passed on as text.
    #[must_use]
    pub fn finalize(&self) -> StreamEvent {
        let acc = &self.accumulator;
        let text = acc.text();

        match acc.tool_name() {
            Some(DRAW_TOOL_NAME) if !acc.arguments().is_empty() => {
                debug!(
                    argument_bytes = acc.arguments().len(),
                    "Finalizing draw_elements call"
                );
                outcome_event(finalize_tool_call(acc.arguments(), text))
            }
            None if !text.is_empty() => {
                debug!(text_bytes = text.len(), "Finalizing from model text");
                outcome_event(extract_from_text(text, &self.repairer))
            }
            name => {
                debug!(tool = ?name, "Nothing to finalize, passing text on");
                StreamEvent::text_only(text)
            }
        }
    }
}

fn outcome_event(result: OutputResult<DrawOutcome>) -> StreamEvent {
    match result {
        Ok(DrawOutcome::Elements {
            elements,
            explanation,
            rendered_message,
        }) => StreamEvent::Elements {
            elements,
            explanation,
            rendered_message,
        },
        Ok(DrawOutcome::TextOnly(text)) => StreamEvent::text_only(text),
        Err(e) => {
            warn!(error = %e, "Finalization failed");
            StreamEvent::error(e)
        }
    }
}

/// The consumer went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disconnected;

/// Sending side of a request's event sequence.
///
/// Remembers whether a terminal event went out, so [`close`](Self::close)
/// never produces a second one.
#[derive(Debug)]
pub struct EventSink {
    tx: mpsc::Sender<StreamEvent>,
    terminal_sent: bool,
}

impl EventSink {
    /// Wrap a channel sender.
    #[must_use]
    pub fn new(tx: mpsc::Sender<StreamEvent>) -> Self {
        Self {
            tx,
            terminal_sent: false,
        }
    }

    /// Whether a terminal event has been delivered.
    #[must_use]
    pub fn terminal_sent(&self) -> bool {
        self.terminal_sent
    }

    /// Deliver one event.
    pub async fn send(&mut self, event: StreamEvent) -> Result<(), Disconnected> {
        let terminal = event.is_terminal();
        self.tx.send(event).await.map_err(|_| Disconnected)?;
        self.terminal_sent |= terminal;
        Ok(())
    }

    /// Deliver `terminal` unless one already went out, then `Done`.
    pub async fn close(&mut self, terminal: StreamEvent) -> Result<(), Disconnected> {
        if !self.terminal_sent {
            self.send(terminal).await?;
        }
        self.send(StreamEvent::Done).await
    }
}

/// Drive `chunks` through `pipeline`, sending every event to `sink`.
///
/// Reading stops at the finish signal, so the rest of the body is dropped
/// unread. A chunk error ends the request with an `Error` event. The stream
/// ending without a finish signal is treated as a text answer.
pub async fn run_pipeline<S>(
    mut chunks: S,
    mut pipeline: DrawPipeline,
    sink: &mut EventSink,
) -> Result<(), Disconnected>
where
    S: Stream<Item = ModelResult<ParsedChunk>> + Unpin,
{
    while let Some(item) = chunks.next().await {
        let chunk = match item {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!(error = %e, "Upstream stream failed");
                return sink.close(StreamEvent::error(e)).await;
            }
        };

        if let Some(thinking) = pipeline.push(chunk) {
            sink.send(thinking).await?;
        }
        if pipeline.is_finished() {
            break;
        }
    }
    drop(chunks);

    if !pipeline.is_finished() {
        debug!(
            chunks = pipeline.accumulator().chunk_count(),
            "Stream ended without a finish signal"
        );
        return sink
            .close(StreamEvent::text_only(pipeline.accumulator().text()))
            .await;
    }

    sink.close(pipeline.finalize()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use pretty_assertions::assert_eq;
    use sketchflow_core::{DrawElementSpec, ElementType, FinishReason, ToolCallFragment};
    use sketchflow_models::ModelError;

    fn draw_call(arguments: &str) -> ParsedChunk {
        ParsedChunk::tool_call(ToolCallFragment::new("call_1", DRAW_TOOL_NAME, arguments))
    }

    async fn collect(chunks: Vec<ModelResult<ParsedChunk>>) -> Vec<StreamEvent> {
        let (tx, mut rx) = mpsc::channel(64);
        let mut sink = EventSink::new(tx);
        run_pipeline(stream::iter(chunks), DrawPipeline::default(), &mut sink)
            .await
            .unwrap();
        drop(sink);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_tool_call_path() {
        let events = collect(vec![
            Ok(ParsedChunk::text("Sure. ")),
            Ok(draw_call(r#"{"elements":[{"type":"diamond","x":1,"y":2}]"#)),
            Ok(draw_call(r#","explanation":"a diamond"}"#)),
            Ok(ParsedChunk::finish(FinishReason::ToolCalls)),
        ])
        .await;

        assert_eq!(events.len(), 3);
        assert_eq!(events[0], StreamEvent::thinking("Sure. "));
        match &events[1] {
            StreamEvent::Elements {
                elements,
                explanation,
                ..
            } => {
                assert_eq!(elements, &vec![DrawElementSpec::new(ElementType::Diamond, 1.0, 2.0)]);
                assert_eq!(explanation, "a diamond");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(events[2], StreamEvent::Done);
    }

    #[tokio::test]
    async fn test_invalid_arguments_give_error_only() {
        let events = collect(vec![
            Ok(draw_call(r#"{"elements":[{"type":"#)),
            Ok(ParsedChunk::finish(FinishReason::ToolCalls)),
        ])
        .await;

        assert_eq!(
            events,
            vec![
                StreamEvent::error("tool arguments parse failed"),
                StreamEvent::Done
            ]
        );
    }

    #[tokio::test]
    async fn test_other_tool_passes_text_on() {
        let events = collect(vec![
            Ok(ParsedChunk::text("hmm")),
            Ok(ParsedChunk::tool_call(ToolCallFragment::new(
                "call_9",
                "web_search",
                "{}",
            ))),
            Ok(ParsedChunk::finish(FinishReason::ToolCalls)),
        ])
        .await;

        assert_eq!(
            events,
            vec![
                StreamEvent::thinking("hmm"),
                StreamEvent::text_only("hmm"),
                StreamEvent::Done
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_end_without_finish() {
        let events = collect(vec![Ok(ParsedChunk::text("partial"))]).await;
        assert_eq!(
            events,
            vec![
                StreamEvent::thinking("partial"),
                StreamEvent::text_only("partial"),
                StreamEvent::Done
            ]
        );

        let events = collect(vec![]).await;
        assert_eq!(events, vec![StreamEvent::text_only(""), StreamEvent::Done]);
    }

    #[tokio::test]
    async fn test_chunk_error_mid_stream() {
        let events = collect(vec![
            Ok(ParsedChunk::text("Drawing")),
            Err(ModelError::Connection("reset by peer".into())),
            Ok(ParsedChunk::finish(FinishReason::Stop)),
        ])
        .await;

        assert_eq!(
            events,
            vec![
                StreamEvent::thinking("Drawing"),
                StreamEvent::error("Connection error: reset by peer"),
                StreamEvent::Done
            ]
        );
    }

    #[tokio::test]
    async fn test_chunks_after_finish_are_not_read() {
        let events = collect(vec![
            Ok(ParsedChunk::text("plain words")),
            Ok(ParsedChunk::finish(FinishReason::Stop)),
            Ok(ParsedChunk::text("late")),
        ])
        .await;

        assert_eq!(
            events,
            vec![
                StreamEvent::thinking("plain words"),
                StreamEvent::text_only("plain words"),
                StreamEvent::Done
            ]
        );
    }

    #[tokio::test]
    async fn test_close_never_sends_second_terminal() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut sink = EventSink::new(tx);
        sink.send(StreamEvent::text_only("x")).await.unwrap();
        assert!(sink.terminal_sent());
        sink.close(StreamEvent::error("late")).await.unwrap();
        drop(sink);

        assert_eq!(rx.recv().await, Some(StreamEvent::text_only("x")));
        assert_eq!(rx.recv().await, Some(StreamEvent::Done));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_disconnected_consumer_stops_pipeline() {
        let (tx, rx) = mpsc::channel(8);
        drop(rx);
        let mut sink = EventSink::new(tx);
        let result = run_pipeline(
            stream::iter(vec![Ok(ParsedChunk::text("hi"))]),
            DrawPipeline::default(),
            &mut sink,
        )
        .await;
        assert_eq!(result, Err(Disconnected));
    }
}
