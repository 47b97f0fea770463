//! HTTP adapter for the playground's inference engine port.
//!
//! Talks to any OpenAI-compatible server (llama-server, MLC's
//! `mlc_llm serve`, vLLM) over `GET /v1/models` and streamed
//! `POST /v1/chat/completions`.
#![deny(unused_crate_dependencies)]

mod config;
mod engine;
mod factory;
pub mod sse;
mod wire;

pub use config::{DEFAULT_CONNECT_TIMEOUT, EndpointError, EngineEndpoint};
pub use engine::HttpEngine;
pub use factory::HttpEngineFactory;
pub use sse::{SseDecoder, SseEvent, parse_chunk};

// Only exercised by the integration tests.
#[cfg(test)]
use axum as _;
