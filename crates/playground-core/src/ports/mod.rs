//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core expects from infrastructure.
//! They use only domain types and contain no transport details.

pub mod engine;

pub use engine::{
    EngineChunk, EngineError, EngineFactory, EngineStream, InferenceEngine, NoopProgress,
    ProgressSink,
};

#[cfg(test)]
pub use engine::{MockEngineFactory, MockInferenceEngine};
