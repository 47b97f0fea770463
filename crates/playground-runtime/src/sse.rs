//! Incremental Server-Sent Events decoding for streamed completions.
//!
//! SSE format: `data: {"choices":[{"delta":{"content":"hi"}}]}\n\n`,
//! terminated by `data: [DONE]`. Network reads split the body at arbitrary
//! byte offsets, so [`SseDecoder`] buffers until it has whole lines.

use bytes::BytesMut;
use playground_core::{EngineChunk, EngineError, GenerationUsage};

use crate::wire::{ChunkBody, Timings, UsageBody};

/// One decoded SSE event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// Payload of a `data:` line.
    Data(String),
    /// The `[DONE]` terminator.
    Done,
}

/// Line-buffering SSE decoder.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: BytesMut,
}

impl SseDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw body bytes and return every event completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.buf.extend_from_slice(bytes);
        let mut events = Vec::new();
        while let Some(line_end) = find_newline(&self.buf) {
            let line = self.buf.split_to(line_end);
            if let Some(event) = decode_line(&String::from_utf8_lossy(&line)) {
                events.push(event);
            }
        }
        events
    }

    /// Flush a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Option<SseEvent> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = self.buf.split();
        decode_line(&String::from_utf8_lossy(&rest))
    }
}

fn find_newline(buf: &BytesMut) -> Option<usize> {
    buf.iter().position(|&b| b == b'\n').map(|pos| pos + 1)
}

fn decode_line(line: &str) -> Option<SseEvent> {
    let trimmed = line.trim();
    // Blank separators, comments and non-data fields carry nothing for us.
    let data = trimmed.strip_prefix("data:")?.trim();
    if data.is_empty() {
        return None;
    }
    if data == "[DONE]" {
        Some(SseEvent::Done)
    } else {
        Some(SseEvent::Data(data.to_string()))
    }
}

/// Parse one `data:` payload into an engine chunk.
///
/// # Errors
///
/// Returns [`EngineError::Decode`] for malformed JSON and
/// [`EngineError::Request`] when the server streams an error object.
pub fn parse_chunk(data: &str) -> Result<EngineChunk, EngineError> {
    let body: ChunkBody =
        serde_json::from_str(data).map_err(|e| EngineError::Decode(e.to_string()))?;

    if let Some(error) = body.error {
        return Err(EngineError::Request(error.message));
    }

    let delta = body
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content);
    let usage = body
        .usage
        .map(|usage| to_usage(usage, body.timings.as_ref()));

    Ok(EngineChunk { delta, usage })
}

fn to_usage(usage: UsageBody, timings: Option<&Timings>) -> GenerationUsage {
    let extra = usage.extra.unwrap_or_default();
    let prefill = extra
        .prefill_tokens_per_s
        .or_else(|| timings.and_then(|t| t.prompt_per_second))
        .unwrap_or(0.0);
    let decode = extra
        .decode_tokens_per_s
        .or_else(|| timings.and_then(|t| t.predicted_per_second))
        .unwrap_or(0.0);
    GenerationUsage::from_raw(usage.prompt_tokens, usage.completion_tokens, prefill, decode)
}
