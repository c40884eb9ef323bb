//! Server-Sent Events (SSE) parser for Gemini responses

use bytes::Bytes;
use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;

use crate::llm::core::error::LlmError;

use super::types::GenerateContentResponse;

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// Parse a stream of bytes as Gemini SSE events
///
/// Only `data:` lines carry payloads; `event:`, `id:` and comments are
/// ignored. Lines are assembled from raw bytes so a multi-byte character
/// split across two network chunks decodes correctly.
pub fn parse_sse_stream(
    byte_stream: ByteStream,
) -> Pin<Box<dyn Stream<Item = Result<GenerateContentResponse, LlmError>> + Send>> {
    let mut buffer: Vec<u8> = Vec::new();

    let event_stream = byte_stream.flat_map(move |chunk_result| {
        let chunk = match chunk_result {
            Ok(bytes) => bytes,
            Err(e) => {
                return futures::stream::iter(vec![Err(LlmError::StreamError(e.to_string()))]);
            }
        };

        buffer.extend_from_slice(&chunk);

        let mut events = Vec::new();
        while let Some(newline_pos) = buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = buffer.drain(..=newline_pos).collect();
            let line = match std::str::from_utf8(&raw) {
                Ok(line) => line.trim(),
                Err(e) => {
                    events.push(Err(LlmError::StreamError(format!(
                        "Invalid UTF-8 in stream: {}",
                        e
                    ))));
                    continue;
                }
            };

            if let Some(data) = line.strip_prefix("data:") {
                events.push(parse_data(data.trim_start()));
            }
        }

        futures::stream::iter(events)
    });

    Box::pin(event_stream)
}

fn parse_data(data: &str) -> Result<GenerateContentResponse, LlmError> {
    serde_json::from_str::<GenerateContentResponse>(data).map_err(|e| {
        LlmError::SerializationError(format!("Failed to parse SSE data: {}. Data: {}", e, data))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn chunks(parts: Vec<&'static [u8]>) -> ByteStream {
        Box::pin(stream::iter(
            parts.into_iter().map(|p| Ok(Bytes::from_static(p))),
        ))
    }

    fn first_text(response: &GenerateContentResponse) -> &str {
        response.candidates[0].content.parts[0]
            .text
            .as_deref()
            .unwrap()
    }

    #[tokio::test]
    async fn test_parse_single_event() {
        let mut sse = parse_sse_stream(chunks(vec![
            &b"data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"Asthma\"}]}}]}\r\n\r\n"[..],
        ]));

        let response = sse.next().await.unwrap().unwrap();
        assert_eq!(first_text(&response), "Asthma");
        assert!(sse.next().await.is_none());
    }

    #[tokio::test]
    async fn test_parse_line_split_across_chunks() {
        let mut sse = parse_sse_stream(chunks(vec![
            &b"data: {\"candidates\":[{\"content\":{\"role\":\"mo"[..],
            &b"del\",\"parts\":[{\"text\":\"Diabetes\"}]}}]}\n"[..],
        ]));

        let response = sse.next().await.unwrap().unwrap();
        assert_eq!(first_text(&response), "Diabetes");
    }

    #[tokio::test]
    async fn test_parse_multibyte_char_split_across_chunks() {
        // "é" is 0xC3 0xA9
        let mut sse = parse_sse_stream(chunks(vec![
            &b"data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Cr\xC3"[..],
            &b"\xA9pitus\"}]}}]}\n"[..],
        ]));

        let response = sse.next().await.unwrap().unwrap();
        assert_eq!(first_text(&response), "Crépitus");
    }

    #[tokio::test]
    async fn test_ignores_non_data_lines() {
        let mut sse = parse_sse_stream(chunks(vec![
            &b": keep-alive\nevent: message\ndata:{\"candidates\":[]}\n"[..],
        ]));

        let response = sse.next().await.unwrap().unwrap();
        assert!(response.candidates.is_empty());
        assert!(sse.next().await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_json_yields_error() {
        let mut sse = parse_sse_stream(chunks(vec![&b"data: {not json}\n"[..]]));
        let result = sse.next().await.unwrap();
        assert!(matches!(result, Err(LlmError::SerializationError(_))));
    }
}
