//! Inference engine port.
//!
//! The engine itself (weights, tokenization, compute) is an external
//! collaborator. This port is the whole surface the core consumes from it:
//! create a handle, load a model into it, stream a completion, and read back
//! the engine's own record of the last assistant message.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::Stream;
use thiserror::Error;

use crate::domain::{GenerationUsage, Message, SamplingConfig};

/// Errors reported by an engine implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The engine does not know the requested model.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Loading the model failed (bad weights, out of memory, ...).
    #[error("Load failed: {0}")]
    Load(String),

    /// The request to the engine failed.
    #[error("Request failed: {0}")]
    Request(String),

    /// The engine answered with something that could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Internal engine error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// One increment of a streamed completion.
///
/// A chunk may carry a text delta, a usage record, both or neither.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineChunk {
    pub delta: Option<String>,
    pub usage: Option<GenerationUsage>,
}

impl EngineChunk {
    /// Chunk carrying only a text delta.
    #[must_use]
    pub fn delta(text: impl Into<String>) -> Self {
        Self {
            delta: Some(text.into()),
            usage: None,
        }
    }

    /// Chunk carrying only a usage record.
    #[must_use]
    pub const fn usage(usage: GenerationUsage) -> Self {
        Self {
            delta: None,
            usage: Some(usage),
        }
    }
}

/// Lazy, finite stream of completion chunks.
pub type EngineStream = Pin<Box<dyn Stream<Item = Result<EngineChunk, EngineError>> + Send>>;

/// Receiver of free-text load progress.
///
/// Progress text is engine-defined and carries no structure.
pub trait ProgressSink: Send + Sync {
    fn report(&self, text: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, text: &str) {
        self(text);
    }
}

/// Sink that drops every progress report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn report(&self, _text: &str) {}
}

/// A single inference engine handle.
///
/// A handle serves one model at a time; `reload` replaces it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Load `model_id` with the given sampling parameters.
    ///
    /// Progress text is delivered to `progress` while loading.
    ///
    /// # Errors
    ///
    /// Returns an engine-defined error for an unknown model or when resources
    /// run out.
    async fn reload(
        &self,
        model_id: &str,
        sampling: SamplingConfig,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<(), EngineError>;

    /// Start a streamed completion over `messages`, requesting usage.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be started. Failures while
    /// streaming are delivered as stream items.
    async fn stream_completion(&self, messages: &[Message]) -> Result<EngineStream, EngineError>;

    /// The engine's record of the last completed assistant message.
    ///
    /// # Errors
    ///
    /// Returns an error if no message is available or the engine fails.
    async fn fetch_last_full_message(&self) -> Result<String, EngineError>;
}

/// Creates engine handles and reports the model catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EngineFactory: Send + Sync {
    /// Create a fresh engine handle with no model loaded.
    fn create_engine(&self) -> Arc<dyn InferenceEngine>;

    /// The flat list of model identifiers the engine can load.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be queried.
    async fn list_available_models(&self) -> Result<Vec<String>, EngineError>;
}
