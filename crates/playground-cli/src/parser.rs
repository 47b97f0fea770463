//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Chat with models served by a local inference engine.
#[derive(Parser)]
#[command(name = "playground")]
#[command(about = "Browse and chat with models served by a local inference engine")]
#[command(version)]
pub struct Cli {
    /// Base URL of the OpenAI-compatible inference server
    #[arg(long = "engine-url", env = "PLAYGROUND_ENGINE_URL", global = true)]
    pub engine_url: Option<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
