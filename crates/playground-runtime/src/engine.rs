//! HTTP engine handle for an OpenAI-compatible inference server.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, stream};
use playground_core::{
    EngineChunk, EngineError, EngineStream, InferenceEngine, Message, ProgressSink, SamplingConfig,
};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::EngineEndpoint;
use crate::sse::{SseDecoder, SseEvent, parse_chunk};
use crate::wire::{ChatRequest, ModelList, StreamOptions};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Query `GET /v1/models` and return the model identifiers in server order.
pub(crate) async fn fetch_model_ids(
    client: &Client,
    endpoint: &EngineEndpoint,
) -> Result<Vec<String>, EngineError> {
    let response = client
        .get(endpoint.models_url())
        .send()
        .await
        .map_err(|e| EngineError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(EngineError::Request(format!("{status}: {body}")));
    }

    let list: ModelList = response
        .json()
        .await
        .map_err(|e| EngineError::Decode(e.to_string()))?;
    Ok(list.data.into_iter().map(|entry| entry.id).collect())
}

#[derive(Debug, Clone)]
struct LoadedModel {
    model_id: String,
    sampling: SamplingConfig,
}

/// Engine handle backed by a remote (usually local-host) inference server.
///
/// `reload` only selects the model; the server owns the weights. The text
/// of each completed stream is recorded so `fetch_last_full_message` can
/// answer independently of what the caller accumulated.
#[derive(Debug)]
pub struct HttpEngine {
    client: Client,
    endpoint: EngineEndpoint,
    loaded: Mutex<Option<LoadedModel>>,
    last_message: Arc<Mutex<Option<String>>>,
}

impl HttpEngine {
    pub fn new(client: Client, endpoint: EngineEndpoint) -> Self {
        Self {
            client,
            endpoint,
            loaded: Mutex::new(None),
            last_message: Arc::new(Mutex::new(None)),
        }
    }

    pub const fn endpoint(&self) -> &EngineEndpoint {
        &self.endpoint
    }

    /// The selected model, if `reload` has succeeded.
    pub fn model_id(&self) -> Option<String> {
        lock(&self.loaded).as_ref().map(|m| m.model_id.clone())
    }
}

#[async_trait]
impl InferenceEngine for HttpEngine {
    async fn reload(
        &self,
        model_id: &str,
        sampling: SamplingConfig,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<(), EngineError> {
        *lock(&self.loaded) = None;
        progress.report(&format!("Contacting engine at {}", self.endpoint));

        let available = fetch_model_ids(&self.client, &self.endpoint).await?;
        if !available.iter().any(|id| id == model_id) {
            warn!(model_id = %model_id, available = available.len(), "Model not served by engine");
            return Err(EngineError::ModelNotFound(model_id.to_string()));
        }

        progress.report(&format!("Model {model_id} is available"));
        *lock(&self.loaded) = Some(LoadedModel {
            model_id: model_id.to_string(),
            sampling,
        });
        *lock(&self.last_message) = None;
        info!(model_id = %model_id, endpoint = %self.endpoint, "Engine model selected");
        Ok(())
    }

    async fn stream_completion(&self, messages: &[Message]) -> Result<EngineStream, EngineError> {
        let loaded = lock(&self.loaded)
            .clone()
            .ok_or_else(|| EngineError::Internal("no model loaded".to_string()))?;
        *lock(&self.last_message) = None;

        let request = ChatRequest {
            model: &loaded.model_id,
            messages,
            stream: true,
            stream_options: StreamOptions {
                include_usage: true,
            },
            temperature: loaded.sampling.temperature,
            top_p: loaded.sampling.top_p,
        };

        debug!(
            model_id = %loaded.model_id,
            messages = messages.len(),
            "Requesting streamed completion"
        );
        let response = self
            .client
            .post(self.endpoint.chat_completions_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Request(format!("{status}: {body}")));
        }

        let bytes = response
            .bytes_stream()
            .map(|item| item.map_err(|e| EngineError::Request(e.to_string())))
            .boxed();
        Ok(completion_stream(bytes, Arc::clone(&self.last_message)))
    }

    async fn fetch_last_full_message(&self) -> Result<String, EngineError> {
        lock(&self.last_message)
            .clone()
            .ok_or_else(|| EngineError::Internal("no completed message".to_string()))
    }
}

/// State threaded through the `unfold` stream.
struct CompletionState {
    bytes: BoxStream<'static, Result<Bytes, EngineError>>,
    decoder: SseDecoder,
    pending: VecDeque<Result<EngineChunk, EngineError>>,
    text: String,
    record: Arc<Mutex<Option<String>>>,
    done: bool,
}

impl CompletionState {
    fn accept(&mut self, event: SseEvent) {
        if self.done {
            return;
        }
        match event {
            SseEvent::Done => self.complete(),
            SseEvent::Data(data) => {
                let parsed = parse_chunk(&data);
                match &parsed {
                    Ok(chunk) => {
                        if let Some(delta) = &chunk.delta {
                            self.text.push_str(delta);
                        }
                    }
                    Err(_) => self.done = true,
                }
                self.pending.push_back(parsed);
            }
        }
    }

    /// Record the full text; later bytes are ignored.
    fn complete(&mut self) {
        if !self.done {
            *lock(&self.record) = Some(std::mem::take(&mut self.text));
            self.done = true;
        }
    }
}

/// Turn an SSE body into engine chunks, recording the full text in `record`
/// once the server signals the end of the stream.
pub(crate) fn completion_stream(
    bytes: BoxStream<'static, Result<Bytes, EngineError>>,
    record: Arc<Mutex<Option<String>>>,
) -> EngineStream {
    let state = CompletionState {
        bytes,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        text: String::new(),
        record,
        done: false,
    };

    Box::pin(stream::unfold(state, |mut st| async move {
        loop {
            if let Some(item) = st.pending.pop_front() {
                return Some((item, st));
            }
            if st.done {
                return None;
            }
            match st.bytes.next().await {
                Some(Ok(chunk)) => {
                    for event in st.decoder.push(&chunk) {
                        st.accept(event);
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Completion body failed");
                    st.done = true;
                    return Some((Err(e), st));
                }
                None => {
                    if let Some(event) = st.decoder.finish() {
                        st.accept(event);
                    }
                    // A body that ends without [DONE] still completed.
                    st.complete();
                }
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use playground_core::GenerationUsage;

    fn body(parts: &'static [&'static str]) -> BoxStream<'static, Result<Bytes, EngineError>> {
        stream::iter(parts.iter().map(|p| Ok(Bytes::from_static(p.as_bytes())))).boxed()
    }

    #[tokio::test]
    async fn test_stream_records_full_text_on_done() {
        let record = Arc::new(Mutex::new(None));
        let chunks: Vec<_> = completion_stream(
            body(&[
                "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
                "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\ndata: {\"choices\":[],",
                "\"usage\":{\"prompt_tokens\":3,\"completion_tokens\":2}}\n\n",
                "data: [DONE]\n\n",
            ]),
            Arc::clone(&record),
        )
        .collect()
        .await;

        assert_eq!(chunks.len(), 3);
        assert_eq!(
            chunks[2],
            Ok(EngineChunk::usage(GenerationUsage::from_raw(3, 2, 0.0, 0.0)))
        );
        assert_eq!(record.lock().unwrap().as_deref(), Some("Hello"));
    }

    #[tokio::test]
    async fn test_decode_error_ends_stream_without_record() {
        let record = Arc::new(Mutex::new(None));
        let chunks: Vec<_> = completion_stream(
            body(&["data: {broken\n\n", "data: {\"choices\":[]}\n\n"]),
            Arc::clone(&record),
        )
        .collect()
        .await;

        assert_eq!(chunks.len(), 1);
        assert!(matches!(chunks[0], Err(EngineError::Decode(_))));
        assert!(record.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_body_without_done_still_completes() {
        let record = Arc::new(Mutex::new(None));
        let chunks: Vec<_> = completion_stream(
            body(&["data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}"]),
            Arc::clone(&record),
        )
        .collect()
        .await;

        assert_eq!(chunks, vec![Ok(EngineChunk::delta("ok"))]);
        assert_eq!(record.lock().unwrap().as_deref(), Some("ok"));
    }
}
