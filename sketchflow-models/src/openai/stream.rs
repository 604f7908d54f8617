//! Chat completion chunk interpretation.
//!
//! Decoded SSE payloads are reduced to [`ParsedChunk`]s. Only the first
//! choice and the first tool-call slot of each payload are read; parallel
//! tool calls are not supported.

use futures::stream::BoxStream;
use futures::{future, StreamExt};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use sketchflow_core::{FinishReason, ParsedChunk, ToolCallFragment};
use sketchflow_streaming::SseDecodeStream;

use super::types::{ChatCompletionChunk, ChunkToolCall, OpenAIError};
use crate::error::{ModelError, ModelResult};
use crate::transport::ByteStream;

/// Parsed chunks of one streamed completion.
pub type ChunkStream = BoxStream<'static, ModelResult<ParsedChunk>>;

/// Reduce one decoded payload to a [`ParsedChunk`].
///
/// Returns `None` for payloads that carry nothing: role-only deltas, usage
/// reports, keep-alives, and anything not shaped like a completion chunk.
#[must_use]
pub fn parse_chunk(payload: &JsonValue) -> Option<ParsedChunk> {
    let chunk = match ChatCompletionChunk::deserialize(payload) {
        Ok(chunk) => chunk,
        Err(_) => {
            tracing::debug!("Ignoring payload that is not a completion chunk");
            return None;
        }
    };
    let choice = chunk.choices.into_iter().next()?;

    let content = choice.delta.content.filter(|c| !c.is_empty());
    let tool_call = choice
        .delta
        .tool_calls
        .and_then(|calls| calls.into_iter().next())
        .map(fragment_from)
        .filter(|f| !f.is_empty());
    let finish_reason = choice.finish_reason.as_deref().and_then(FinishReason::parse);

    let parsed = ParsedChunk {
        content,
        tool_call,
        finish_reason,
    };
    (!parsed.is_empty()).then_some(parsed)
}

/// Upstream error reported inside the stream, as some providers do instead
/// of failing the HTTP status.
#[must_use]
pub fn in_stream_error(payload: &JsonValue) -> Option<ModelError> {
    payload.get("error").filter(|e| !e.is_null())?;
    let message = OpenAIError::message_from_body(&payload.to_string())
        .unwrap_or_else(|| payload["error"].to_string());
    Some(ModelError::invalid_response(format!("upstream error: {message}")))
}

/// Decode a response body into parsed chunks.
///
/// Payloads that parse to nothing are skipped. Dropping the returned stream
/// drops the body and with it the connection.
pub fn chunk_stream(body: ByteStream) -> ChunkStream {
    SseDecodeStream::new(body)
        .filter_map(|item| {
            future::ready(match item {
                Ok(payload) => match in_stream_error(&payload) {
                    Some(err) => Some(Err(err)),
                    None => parse_chunk(&payload).map(Ok),
                },
                Err(e) => Some(Err(e)),
            })
        })
        .boxed()
}

fn fragment_from(call: ChunkToolCall) -> ToolCallFragment {
    let (name, arguments) = call
        .function
        .map(|f| (f.name.unwrap_or_default(), f.arguments.unwrap_or_default()))
        .unwrap_or_default();
    ToolCallFragment::new(call.id.unwrap_or_default(), name, arguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::{stream, TryStreamExt};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_content_delta() {
        let chunk = parse_chunk(&json!({"choices": [{"delta": {"content": "Drawing "}}]}));
        assert_eq!(chunk, Some(ParsedChunk::text("Drawing ")));
    }

    #[test]
    fn test_tool_call_delta() {
        let chunk = parse_chunk(&json!({
            "choices": [{
                "index": 0,
                "delta": {"tool_calls": [{
                    "index": 0,
                    "id": "call_abc",
                    "type": "function",
                    "function": {"name": "draw_elements", "arguments": ""}
                }]}
            }]
        }));
        assert_eq!(
            chunk,
            Some(ParsedChunk::tool_call(ToolCallFragment::new(
                "call_abc",
                "draw_elements",
                ""
            )))
        );
    }

    #[test]
    fn test_only_first_tool_call_slot() {
        let chunk = parse_chunk(&json!({
            "choices": [{"delta": {"tool_calls": [
                {"index": 0, "function": {"arguments": "{\"a\""}},
                {"index": 1, "function": {"arguments": "ignored"}}
            ]}}]
        }))
        .unwrap();
        assert_eq!(chunk.tool_call, Some(ToolCallFragment::arguments("{\"a\"")));
    }

    #[rstest]
    #[case("tool_calls", FinishReason::ToolCalls)]
    #[case("stop", FinishReason::Stop)]
    #[case("length", FinishReason::Other("length".into()))]
    fn test_finish_reason(#[case] raw: &str, #[case] expected: FinishReason) {
        let chunk =
            parse_chunk(&json!({"choices": [{"delta": {}, "finish_reason": raw}]})).unwrap();
        assert_eq!(chunk.finish_reason, Some(expected));
    }

    #[rstest]
    #[case(json!({"choices": [{"delta": {"role": "assistant", "content": ""}}]}))]
    #[case(json!({"choices": []}))]
    #[case(json!({"usage": {"total_tokens": 3}, "choices": []}))]
    #[case(json!({"choices": "nope"}))]
    #[case(json!([1, 2, 3]))]
    #[case(json!({"choices": [{"delta": {}, "finish_reason": ""}]}))]
    fn test_empty_payloads(#[case] payload: JsonValue) {
        assert_eq!(parse_chunk(&payload), None);
    }

    #[test]
    fn test_in_stream_error() {
        let err = in_stream_error(&json!({"error": {"message": "overloaded", "type": "server_error"}}))
            .unwrap();
        assert_eq!(err.to_string(), "Invalid response: upstream error: overloaded");
        assert!(in_stream_error(&json!({"choices": []})).is_none());
    }

    #[test]
    fn test_null_error_field_is_not_an_error() {
        let payload = json!({"error": null, "choices": [{"delta": {"content": "hi"}}]});
        assert!(in_stream_error(&payload).is_none());
        assert_eq!(parse_chunk(&payload), Some(ParsedChunk::text("hi")));
    }

    #[tokio::test]
    async fn test_chunk_stream() {
        let body: ByteStream = stream::iter(vec![
            Ok(Bytes::from_static(b"data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n")),
            Ok(Bytes::from_static(b": keep-alive\n\ndata: {\"choices\":[{\"delta\":{\"con")),
            Ok(Bytes::from_static(b"tent\":\"hi\"}}]}\n\ndata: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n")),
            Ok(Bytes::from_static(b"data: [DONE]\n\n")),
        ])
        .boxed();

        let chunks: Vec<ParsedChunk> = chunk_stream(body).try_collect().await.unwrap();
        assert_eq!(
            chunks,
            vec![
                ParsedChunk::text("hi"),
                ParsedChunk::finish(FinishReason::Stop),
            ]
        );
    }

    #[tokio::test]
    async fn test_chunk_stream_surfaces_in_stream_error() {
        let body: ByteStream = stream::iter(vec![Ok(Bytes::from_static(
            b"data: {\"error\":{\"message\":\"quota exceeded\"}}\n\n",
        ))])
        .boxed();

        let results: Vec<_> = chunk_stream(body).collect().await;
        assert_eq!(results.len(), 1);
        assert!(matches!(&results[0], Err(ModelError::InvalidResponse(m)) if m.contains("quota exceeded")));
    }
}
