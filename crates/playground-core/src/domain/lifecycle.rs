//! Engine lifecycle state.

use serde::{Deserialize, Serialize};

/// Status of the inference engine owned by a session.
///
/// ```text
///   Unloaded → Loading → Ready | Failed
///                 ▲               │
///                 └── (reload) ───┘
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EngineLifecycleState {
    /// No engine handle exists yet.
    #[default]
    Unloaded,

    /// A load is in flight. `progress` is the latest engine-defined text.
    Loading { progress: String },

    /// The engine holds `model_id` and accepts completions.
    Ready {
        #[serde(rename = "modelId")]
        model_id: String,
    },

    /// The last load failed.
    Failed { reason: String },
}

impl EngineLifecycleState {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// The loaded model, if the engine is ready.
    #[must_use]
    pub fn model_id(&self) -> Option<&str> {
        match self {
            Self::Ready { model_id } => Some(model_id),
            _ => None,
        }
    }

    /// Short machine-friendly name of the current state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unloaded => "unloaded",
            Self::Loading { .. } => "loading",
            Self::Ready { .. } => "ready",
            Self::Failed { .. } => "failed",
        }
    }
}

impl std::fmt::Display for EngineLifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unloaded => write!(f, "unloaded"),
            Self::Loading { progress } if progress.is_empty() => write!(f, "loading"),
            Self::Loading { progress } => write!(f, "loading: {progress}"),
            Self::Ready { model_id } => write!(f, "ready: {model_id}"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}
