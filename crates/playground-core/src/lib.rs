//! Session and catalog engine for the playground chat client.
//!
//! The crate orchestrates a local inference engine without implementing one:
//!
//! - [`catalog`] turns the engine's flat model list into a browsable
//!   family → base model → variant hierarchy
//! - [`services::EngineLifecycle`] loads models into the single engine handle
//! - [`services::generate`] drives one streamed completion
//! - [`services::ChatSession`] composes them around a conversation
//!
//! Engines plug in through the traits in [`ports`].
#![deny(unused_crate_dependencies)]

pub mod catalog;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod services;
pub mod settings;

pub use catalog::{CatalogView, ModelFamily, ModelGroup, ParsedModelName};
pub use domain::{
    EngineLifecycleState, GenerationUsage, Message, MessageRole, SamplingConfig,
};
pub use errors::SessionError;
pub use events::{GenerationEvent, LifecycleEvents, NoopLifecycleEvents};
pub use ports::{
    EngineChunk, EngineError, EngineFactory, EngineStream, InferenceEngine, NoopProgress,
    ProgressSink,
};
pub use services::{ChatSession, ChatSessionState, EngineLifecycle, RejectReason, SubmitOutcome};
pub use settings::{DEFAULT_ENGINE_URL, Settings, SettingsError, SettingsUpdate, validate_settings};

// Only exercised by the integration tests.
#[cfg(test)]
use tokio_test as _;
