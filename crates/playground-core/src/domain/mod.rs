//! Core domain types.
//!
//! These types represent the pure domain model, independent of any
//! engine or presentation concerns.
//!
//! # Structure
//!
//! - `chat` - Conversation messages and roles
//! - `inference` - Sampling configuration passed to the engine on load
//! - `lifecycle` - Engine lifecycle state
//! - `usage` - Token usage statistics

pub mod chat;
pub mod inference;
pub mod lifecycle;
pub mod usage;

pub use chat::{Message, MessageRole};
pub use inference::{DEFAULT_TEMPERATURE, DEFAULT_TOP_P, SamplingConfig};
pub use lifecycle::EngineLifecycleState;
pub use usage::{DisplayUsage, GenerationUsage};
