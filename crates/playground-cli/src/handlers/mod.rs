//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<(), CliError>`
//! - Thin wrappers that parse CLI input, call the core session or catalog,
//!   and format output for the terminal

pub mod chat;
pub mod models;
