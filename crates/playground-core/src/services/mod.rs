//! Session services.
//!
//! - `lifecycle` - Engine lifecycle controller (single engine handle)
//! - `generation` - One streamed completion as a sequence of events
//! - `chat_session` - The chat session aggregate composing both

mod chat_session;
mod generation;
mod lifecycle;

pub use chat_session::{
    ChatSession, ChatSessionState, EXAMPLE_PROMPTS, LOADED_TEXT, LOADING_TEXT, RejectReason,
    SubmitOutcome,
};
pub use generation::{generate, generate_with_callbacks};
pub use lifecycle::EngineLifecycle;
