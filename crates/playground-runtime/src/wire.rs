//! OpenAI-compatible wire types.
//!
//! Only the fields the adapter reads or writes are modeled; everything else
//! the server sends is ignored.

use playground_core::Message;
use serde::{Deserialize, Serialize};

/// `POST /v1/chat/completions` request body.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub stream: bool,
    pub stream_options: StreamOptions,
    pub temperature: f32,
    pub top_p: f32,
}

#[derive(Debug, Serialize)]
pub struct StreamOptions {
    pub include_usage: bool,
}

/// `GET /v1/models` response body.
#[derive(Debug, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ModelEntry {
    pub id: String,
}

/// One `data:` payload of a streamed completion.
#[derive(Debug, Default, Deserialize)]
pub struct ChunkBody {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    pub usage: Option<UsageBody>,
    /// llama-server reports throughput here on the final chunk.
    pub timings: Option<Timings>,
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
pub struct Delta {
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UsageBody {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    /// MLC-style throughput extension.
    pub extra: Option<UsageExtra>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UsageExtra {
    pub prefill_tokens_per_s: Option<f64>,
    pub decode_tokens_per_s: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Timings {
    pub prompt_per_second: Option<f64>,
    pub predicted_per_second: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
}
