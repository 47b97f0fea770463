//! Chat session aggregate.
//!
//! Composes the lifecycle controller and the generation session around one
//! conversation. Every user-visible change is published as a
//! [`ChatSessionState`] snapshot on a `watch` channel: a slow consumer may
//! miss intermediate snapshots but never sees them out of order.

use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::StreamExt;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::catalog::{ModelFamily, resolve_family};
use crate::domain::{
    EngineLifecycleState, GenerationUsage, Message, MessageRole, SamplingConfig,
};
use crate::errors::{LOAD_FAILED_TEXT, SessionError};
use crate::events::{GenerationEvent, LifecycleEvents};
use crate::ports::{EngineFactory, ProgressSink};

use super::generation::generate;
use super::lifecycle::EngineLifecycle;

/// Starter prompts offered on an empty conversation.
pub const EXAMPLE_PROMPTS: [&str; 4] = [
    "Show me the code for a simple web app",
    "Implement fib(n) in Python",
    "What is refraction?",
    "Explain thermal conductivity",
];

/// Status text while a load is starting.
pub const LOADING_TEXT: &str = "Loading...";

/// Status text after a successful load.
pub const LOADED_TEXT: &str = "Model loaded successfully";

/// Read-only snapshot of a chat session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSessionState {
    pub conversation: Vec<Message>,
    pub lifecycle: EngineLifecycleState,
    pub is_generating: bool,
    /// Usage of the last finished generation; all zeros before the first.
    pub last_usage: GenerationUsage,
    /// Latest load progress or result text.
    pub status_text: String,
}

impl ChatSessionState {
    /// The trailing assistant message, if the conversation ends with one.
    #[must_use]
    pub fn trailing_reply(&self) -> Option<&str> {
        self.conversation
            .last()
            .filter(|message| message.role == MessageRole::Assistant)
            .map(|message| message.content.as_str())
    }
}

/// Why a submission was refused without being queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No model is ready.
    NotReady,
    /// A generation is already in flight.
    Busy,
    /// The text is empty after trimming.
    EmptyMessage,
    /// The session was closed.
    Closed,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::NotReady => "no model is loaded",
            Self::Busy => "a response is still being generated",
            Self::EmptyMessage => "message is empty",
            Self::Closed => "session is closed",
        };
        f.write_str(text)
    }
}

/// Result of [`ChatSession::submit_user_message`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Nothing changed.
    Rejected(RejectReason),
    /// The assistant reply is in the conversation.
    Finished(GenerationUsage),
    /// The generation failed; the conversation ends with the user message.
    Failed(SessionError),
    /// The session was closed while generating; remaining events were dropped.
    Abandoned,
}

struct Shared {
    snapshot: watch::Sender<ChatSessionState>,
    closed: AtomicBool,
}

impl Shared {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn set_status(&self, text: impl Into<String>) {
        let text = text.into();
        self.snapshot.send_modify(|state| state.status_text = text);
    }

    /// Replace everything after `base` with a single assistant message.
    fn show_reply(&self, base: &[Message], text: String) {
        self.snapshot.send_modify(|state| {
            state.conversation.clear();
            state.conversation.extend_from_slice(base);
            state.conversation.push(Message::assistant(text));
        });
    }

    fn finish(&self, base: &[Message], message: String, usage: GenerationUsage) {
        self.snapshot.send_modify(|state| {
            state.conversation.clear();
            state.conversation.extend_from_slice(base);
            state.conversation.push(Message::assistant(message));
            state.last_usage = usage;
            state.is_generating = false;
        });
    }

    /// Drop any partial reply and clear the generating flag.
    fn rollback(&self, base: &[Message]) {
        self.snapshot.send_modify(|state| {
            state.conversation.clear();
            state.conversation.extend_from_slice(base);
            state.is_generating = false;
        });
    }
}

impl LifecycleEvents for Shared {
    fn transitioned(&self, lifecycle: &EngineLifecycleState) {
        if self.is_closed() {
            return;
        }
        self.snapshot.send_modify(|state| {
            state.lifecycle = lifecycle.clone();
            match lifecycle {
                EngineLifecycleState::Loading { progress } if !progress.is_empty() => {
                    state.status_text.clone_from(progress);
                }
                // Also covers a load future dropped before it resolved.
                EngineLifecycleState::Failed { .. } => {
                    LOAD_FAILED_TEXT.clone_into(&mut state.status_text);
                }
                _ => {}
            }
        });
    }
}

/// Rolls the conversation back if a generation future is dropped early.
struct InFlight<'a> {
    shared: &'a Shared,
    base: Vec<Message>,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed && !self.shared.is_closed() {
            debug!("Generation dropped before its terminal event");
            self.shared.rollback(&self.base);
        }
    }
}

/// The chat session aggregate.
///
/// All mutations go through this type; presentation reads
/// [`ChatSession::state`] or subscribes with [`ChatSession::snapshots`].
pub struct ChatSession {
    lifecycle: EngineLifecycle,
    shared: Arc<Shared>,
}

impl ChatSession {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        let (snapshot, _) = watch::channel(ChatSessionState::default());
        let shared = Arc::new(Shared {
            snapshot,
            closed: AtomicBool::new(false),
        });
        let events: Arc<dyn LifecycleEvents> = Arc::clone(&shared) as Arc<dyn LifecycleEvents>;
        let lifecycle = EngineLifecycle::with_events(factory, events);
        Self { lifecycle, shared }
    }

    /// Current snapshot.
    pub fn state(&self) -> ChatSessionState {
        self.shared.snapshot.borrow().clone()
    }

    /// Subscribe to snapshots. The receiver starts at the current one.
    pub fn snapshots(&self) -> watch::Receiver<ChatSessionState> {
        self.shared.snapshot.subscribe()
    }

    pub const fn lifecycle(&self) -> &EngineLifecycle {
        &self.lifecycle
    }

    /// Family of the loaded model, if any.
    pub fn selected_family(&self) -> Option<ModelFamily> {
        self.lifecycle.model_id().as_deref().and_then(resolve_family)
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Load `model_id`, replacing any loaded model.
    ///
    /// Progress text lands in the snapshot's `status_text` and is also
    /// forwarded to `progress`.
    ///
    /// # Errors
    ///
    /// - [`SessionError::SessionClosed`] after [`ChatSession::close`]
    /// - [`SessionError::GenerationInProgress`] while a reply is generating
    /// - [`SessionError::AlreadyLoading`] while another load is in flight
    /// - [`SessionError::EngineLoadFailure`] when the engine rejects the model
    pub async fn load(
        &self,
        model_id: &str,
        sampling: SamplingConfig,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<(), SessionError> {
        if self.is_closed() {
            return Err(SessionError::SessionClosed);
        }
        if self.shared.snapshot.borrow().is_generating {
            warn!(model_id = %model_id, "Reload refused while generating");
            return Err(SessionError::GenerationInProgress);
        }
        if self.lifecycle.state().is_loading() {
            return Err(SessionError::AlreadyLoading);
        }

        self.shared.set_status(LOADING_TEXT);
        match self.lifecycle.load(model_id, sampling, progress).await {
            Ok(()) => {
                self.shared.set_status(LOADED_TEXT);
                Ok(())
            }
            Err(SessionError::AlreadyLoading) => Err(SessionError::AlreadyLoading),
            Err(e) => {
                self.shared.set_status(e.user_message());
                Err(e)
            }
        }
    }

    /// Append a user message and generate the assistant reply.
    ///
    /// Rejected, never queued, when no model is ready, when a generation is
    /// in flight, or when `text` is blank. While generating, each update
    /// replaces the trailing assistant message; on failure the conversation
    /// is left ending with the user message.
    pub async fn submit_user_message(&self, text: &str) -> SubmitOutcome {
        if self.is_closed() {
            return SubmitOutcome::Rejected(RejectReason::Closed);
        }
        let handle = self.lifecycle.current_handle();

        let mut rejected = None;
        let mut base = Vec::new();
        self.shared.snapshot.send_if_modified(|state| {
            rejected = if handle.is_none() {
                Some(RejectReason::NotReady)
            } else if state.is_generating {
                Some(RejectReason::Busy)
            } else if text.trim().is_empty() {
                Some(RejectReason::EmptyMessage)
            } else {
                None
            };
            if rejected.is_some() {
                return false;
            }
            state.conversation.push(Message::user(text));
            state.is_generating = true;
            base.clone_from(&state.conversation);
            true
        });
        if let Some(reason) = rejected {
            debug!(reason = %reason, "Submission rejected");
            return SubmitOutcome::Rejected(reason);
        }
        let Some(engine) = handle else {
            return SubmitOutcome::Rejected(RejectReason::NotReady);
        };

        info!(messages = base.len(), "Starting generation");
        let mut in_flight = InFlight {
            shared: &self.shared,
            base: base.clone(),
            armed: true,
        };

        let mut events = pin!(generate(Some(engine.as_ref()), &base));
        while let Some(event) = events.next().await {
            if self.is_closed() {
                in_flight.armed = false;
                debug!("Dropping generation events after close");
                return SubmitOutcome::Abandoned;
            }
            match event {
                GenerationEvent::Update(text) => self.shared.show_reply(&base, text),
                GenerationEvent::Finished { message, usage } => {
                    in_flight.armed = false;
                    self.shared.finish(&base, message, usage);
                    info!(
                        prompt_tokens = usage.prompt_tokens,
                        completion_tokens = usage.completion_tokens,
                        "Generation finished"
                    );
                    return SubmitOutcome::Finished(usage);
                }
                GenerationEvent::Errored(e) => {
                    in_flight.armed = false;
                    error!(error = %e, "Generation failed");
                    self.shared.rollback(&base);
                    return SubmitOutcome::Failed(e);
                }
            }
        }
        SubmitOutcome::Abandoned
    }

    /// Empty the conversation. Lifecycle and last usage are untouched.
    pub fn clear(&self) {
        if self.is_closed() {
            return;
        }
        self.shared.snapshot.send_if_modified(|state| {
            if state.conversation.is_empty() {
                return false;
            }
            state.conversation.clear();
            true
        });
    }

    /// Tear the session down.
    ///
    /// Later submissions are rejected and events of a generation still in
    /// flight are dropped.
    pub fn close(&self) {
        if !self.shared.closed.swap(true, Ordering::SeqCst) {
            info!("Chat session closed");
        }
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("lifecycle", &self.lifecycle)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
