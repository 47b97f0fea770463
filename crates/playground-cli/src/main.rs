//! CLI entry point - the composition root.
//!
//! Wires flags and environment into a [`CliContext`] via bootstrap and
//! dispatches to the handlers.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use playground_cli::handlers::chat::ChatArgs;
use playground_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(engine_url: Option<String>, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Models { search, family } => {
            let ctx = bootstrap(&CliConfig {
                engine_url,
                ..CliConfig::default()
            })?;
            handlers::models::execute(&ctx, search.as_deref(), &family).await
        }
        Commands::Chat {
            model,
            temperature,
            top_p,
            no_stats,
        } => {
            let ctx = bootstrap(&CliConfig {
                engine_url,
                default_model: model,
                temperature,
                top_p,
            })?;
            handlers::chat::execute(
                &ctx,
                ChatArgs {
                    show_stats: !no_stats,
                },
            )
            .await
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env values feed the clap `env` fallbacks, so load them first
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    if let Err(e) = run(cli.engine_url, command).await {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
    Ok(())
}
