//! Session-level error taxonomy.
//!
//! Every variant is recoverable: a failed load leaves the lifecycle in
//! `Failed` and can be retried, a failed generation leaves the conversation
//! as it was after the user message and clears the generating flag.

use thiserror::Error;

/// Progress text shown after a failed load.
pub const LOAD_FAILED_TEXT: &str = "Error loading model. Please try again.";

/// Errors surfaced by the lifecycle controller, the generation session and
/// the chat session aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A load is already in flight for this session.
    #[error("A model is already loading")]
    AlreadyLoading,

    /// The engine rejected the model or ran out of resources while loading.
    #[error("Failed to load model: {0}")]
    EngineLoadFailure(String),

    /// No ready engine handle is available.
    #[error("Engine is not ready")]
    EngineNotReady,

    /// The stream finished without ever carrying a usage record.
    #[error("Usage data not available")]
    UsageUnavailable,

    /// The engine failed while streaming or fetching the final message.
    #[error("Stream failed: {0}")]
    StreamFailure(String),

    /// A generation was requested for an empty conversation.
    #[error("Conversation is empty")]
    EmptyConversation,

    /// A reload was requested while a generation is in flight.
    #[error("Cannot reload while a response is being generated")]
    GenerationInProgress,

    /// The chat session was closed.
    #[error("Session is closed")]
    SessionClosed,
}

impl SessionError {
    /// Returns true if retrying the same operation later may succeed
    /// without the user changing anything.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::AlreadyLoading | Self::GenerationInProgress | Self::StreamFailure(_)
        )
    }

    /// Text suitable for the load-progress line of the UI.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EngineLoadFailure(_) => LOAD_FAILED_TEXT.to_string(),
            other => other.to_string(),
        }
    }
}
