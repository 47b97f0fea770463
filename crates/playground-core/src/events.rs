//! Events emitted by the lifecycle controller and the generation session.

use crate::domain::{EngineLifecycleState, GenerationUsage};
use crate::errors::SessionError;

/// Port for observing engine lifecycle transitions.
///
/// # Design
///
/// - **Object-safe**: held as `Arc<dyn LifecycleEvents>`
/// - **Fire-and-forget**: implementations handle their own errors
/// - Called outside of any internal lock, so implementations may read the
///   controller's state back
///
/// # Example
///
/// ```rust
/// use playground_core::domain::EngineLifecycleState;
/// use playground_core::events::LifecycleEvents;
///
/// struct LoggingEvents;
///
/// impl LifecycleEvents for LoggingEvents {
///     fn transitioned(&self, state: &EngineLifecycleState) {
///         println!("engine is now {state}");
///     }
/// }
/// ```
pub trait LifecycleEvents: Send + Sync {
    /// Called after every state change, including progress updates while
    /// loading.
    fn transitioned(&self, state: &EngineLifecycleState);
}

/// No-op implementation of `LifecycleEvents`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLifecycleEvents;

impl LifecycleEvents for NoopLifecycleEvents {
    fn transitioned(&self, _state: &EngineLifecycleState) {}
}

/// One event of a generation session.
///
/// A session yields zero or more `Update`s followed by exactly one terminal
/// event, `Finished` or `Errored`.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEvent {
    /// Full text accumulated so far. Each update supersedes the previous one.
    Update(String),
    /// The engine's final message and the usage of this generation.
    Finished {
        message: String,
        usage: GenerationUsage,
    },
    /// The generation failed.
    Errored(SessionError),
}

impl GenerationEvent {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Update(_))
    }
}
