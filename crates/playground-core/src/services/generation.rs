//! Generation session: one streamed completion for one assistant turn.
//!
//! [`generate`] turns the engine's chunk stream into [`GenerationEvent`]s:
//! zero or more `Update`s carrying the accumulated text, then exactly one
//! terminal `Finished` or `Errored`. Failures never escape as panics or
//! `Err`s; they become the terminal event.

use std::pin::pin;

use async_stream::stream;
use futures_util::{Stream, StreamExt};
use tracing::debug;

use crate::domain::{GenerationUsage, Message};
use crate::errors::SessionError;
use crate::events::GenerationEvent;
use crate::ports::InferenceEngine;

/// Drive one streamed completion over `conversation`.
///
/// The engine is borrowed only for the lifetime of the returned stream.
/// The text accumulated from deltas is for live display; the `Finished`
/// message is the engine's own record, fetched after the stream ends.
///
/// A stream that ends without ever carrying a usage record yields
/// [`SessionError::UsageUnavailable`] instead of zeroed statistics.
pub fn generate<'a>(
    engine: Option<&'a dyn InferenceEngine>,
    conversation: &'a [Message],
) -> impl Stream<Item = GenerationEvent> + Send + 'a {
    stream! {
        let Some(engine) = engine else {
            yield GenerationEvent::Errored(SessionError::EngineNotReady);
            return;
        };
        if conversation.is_empty() {
            yield GenerationEvent::Errored(SessionError::EmptyConversation);
            return;
        }

        let mut chunks = match engine.stream_completion(conversation).await {
            Ok(chunks) => chunks,
            Err(e) => {
                yield GenerationEvent::Errored(SessionError::StreamFailure(e.to_string()));
                return;
            }
        };

        let mut buffer = String::new();
        let mut usage: Option<GenerationUsage> = None;
        let mut received = 0usize;

        while let Some(item) = chunks.next().await {
            let chunk = match item {
                Ok(chunk) => chunk,
                Err(e) => {
                    debug!(chunks = received, error = %e, "Completion stream failed");
                    yield GenerationEvent::Errored(SessionError::StreamFailure(e.to_string()));
                    return;
                }
            };
            received += 1;
            if chunk.usage.is_some() {
                usage = chunk.usage;
            }
            if let Some(delta) = chunk.delta
                && !delta.is_empty()
            {
                buffer.push_str(&delta);
                yield GenerationEvent::Update(buffer.clone());
            }
        }
        drop(chunks);
        debug!(chunks = received, chars = buffer.len(), "Completion stream exhausted");

        let Some(usage) = usage else {
            yield GenerationEvent::Errored(SessionError::UsageUnavailable);
            return;
        };

        match engine.fetch_last_full_message().await {
            Ok(message) => yield GenerationEvent::Finished { message, usage },
            Err(e) => yield GenerationEvent::Errored(SessionError::StreamFailure(e.to_string())),
        }
    }
}

/// Callback form of [`generate`].
///
/// `on_update` fires for every update in arrival order, then exactly one of
/// `on_finish` or `on_error` fires.
pub async fn generate_with_callbacks<U, F, E>(
    engine: Option<&dyn InferenceEngine>,
    conversation: &[Message],
    mut on_update: U,
    on_finish: F,
    on_error: E,
) where
    U: FnMut(&str),
    F: FnOnce(String, GenerationUsage),
    E: FnOnce(SessionError),
{
    let mut events = pin!(generate(engine, conversation));
    while let Some(event) = events.next().await {
        match event {
            GenerationEvent::Update(text) => on_update(&text),
            GenerationEvent::Finished { message, usage } => {
                on_finish(message, usage);
                return;
            }
            GenerationEvent::Errored(e) => {
                on_error(e);
                return;
            }
        }
    }
}
