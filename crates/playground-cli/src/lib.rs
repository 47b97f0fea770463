//! Terminal chat playground.
//!
//! Browse the engine's model catalog, load a model with live progress and
//! chat with streamed replies. The binary in `main.rs` is the composition
//! root; everything testable lives here.
#![deny(unused_crate_dependencies)]

// Used by the main.rs binary
use anyhow as _;
use dotenvy as _;
use tracing_subscriber as _;

// Only exercised by the integration tests.
#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use futures_util as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;
pub mod repl;
pub mod utils;

pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
