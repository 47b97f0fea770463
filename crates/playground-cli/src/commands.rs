//! Subcommands of the playground CLI.

use clap::Subcommand;
use playground_core::ModelFamily;

#[derive(Subcommand)]
pub enum Commands {
    /// List the engine's models grouped by base model
    Models {
        /// Only show models whose name or variants contain this text
        #[arg(short, long)]
        search: Option<String>,
        /// Only show these families (repeatable)
        #[arg(short, long)]
        family: Vec<ModelFamily>,
    },

    /// Load a model and start an interactive chat
    Chat {
        /// Model identifier to load (defaults to the first catalog entry)
        #[arg(short, long, env = "PLAYGROUND_MODEL")]
        model: Option<String>,
        /// Sampling temperature (0.0 - 2.0)
        #[arg(long, env = "PLAYGROUND_TEMPERATURE")]
        temperature: Option<f32>,
        /// Nucleus sampling threshold (0.0 - 1.0]
        #[arg(long = "top-p", env = "PLAYGROUND_TOP_P")]
        top_p: Option<f32>,
        /// Do not print the statistics panel after each reply
        #[arg(long)]
        no_stats: bool,
    },
}
