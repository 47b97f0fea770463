//! Chat command handler.
//!
//! Loads a model into a fresh session, then runs the REPL until `/quit`
//! or end of input.

use std::io::{self, Write};
use std::pin::pin;
use std::sync::Arc;

use playground_core::catalog::toggle_family;
use playground_core::services::EXAMPLE_PROMPTS;
use playground_core::{
    CatalogView, ChatSession, ModelFamily, ProgressSink, RejectReason, SamplingConfig, SessionError,
    SubmitOutcome,
};
use tracing::{debug, warn};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::models::catalog_lines;
use crate::presentation::{ReplyPrinter, format_chips, print_stats};
use crate::repl::{HELP_TEXT, ReplInput, parse_input};
use crate::utils::LineReader;

const PROMPT: &str = "> ";

/// Arguments for the chat command.
#[derive(Debug, Clone, Copy)]
pub struct ChatArgs {
    /// Print the statistics panel after each reply.
    pub show_stats: bool,
}

/// Execute the chat command.
pub async fn execute(ctx: &CliContext, args: ChatArgs) -> Result<(), CliError> {
    let catalog = ctx.catalog().await?;
    let view = CatalogView::build(catalog.as_slice());
    let model = ctx
        .settings()
        .effective_default_model(&catalog)
        .map(str::to_string)
        .ok_or_else(|| CliError::Engine(format!("{} serves no models", ctx.endpoint())))?;
    let sampling = ctx.settings().sampling();

    let session = ctx.session();
    load_model(&session, &model, sampling).await;
    println!("Type a message, or /help for commands.");

    let mut families: Vec<ModelFamily> = Vec::new();
    let mut reader = LineReader::spawn()?;
    let mut stdout = io::stdout();
    while let Some(line) = reader.read_line(PROMPT).await? {
        let input = match parse_input(&line) {
            Ok(ReplInput::Quit) => break,
            Ok(input) => input,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        match input {
            ReplInput::Message(text) => {
                send(&session, &text, args.show_stats, &mut stdout).await?;
            }
            ReplInput::Example(index) => {
                let prompt = EXAMPLE_PROMPTS[index];
                println!("{PROMPT}{prompt}");
                send(&session, prompt, args.show_stats, &mut stdout).await?;
            }
            ReplInput::Clear => {
                session.clear();
                println!("Conversation cleared.");
            }
            ReplInput::Stats => print_stats(&session.state().last_usage),
            ReplInput::Examples => {
                for (i, prompt) in EXAMPLE_PROMPTS.iter().enumerate() {
                    println!("  {}. {prompt}", i + 1);
                }
            }
            ReplInput::Load(id) => {
                if !view.contains(&id) {
                    warn!(model_id = %id, "Model is not in the engine catalog");
                }
                load_model(&session, &id, sampling).await;
            }
            ReplInput::Models(term) => {
                for line in catalog_lines(&view, term.as_deref().unwrap_or_default(), &families) {
                    println!("{line}");
                }
            }
            ReplInput::Family(family) => {
                toggle_family(&mut families, family);
                println!("{}", format_chips(view.families_by_popularity(), &families));
            }
            ReplInput::Help => println!("{HELP_TEXT}"),
            ReplInput::Quit => break,
        }
    }

    session.close();
    Ok(())
}

/// Load `model_id`, printing engine progress as it arrives.
///
/// A failed load is reported, not returned: the user can retry with `/load`.
async fn load_model(session: &ChatSession, model_id: &str, sampling: SamplingConfig) {
    println!("Loading {model_id}...");
    let progress: Arc<dyn ProgressSink> = Arc::new(|text: &str| println!("  {text}"));

    match session.load(model_id, sampling, progress).await {
        Ok(()) => {
            let family = session
                .selected_family()
                .map_or("no family", |family| family.label());
            println!("{} [{family}]", session.state().status_text);
        }
        Err(e) => {
            println!("{}", e.user_message());
            if let SessionError::EngineLoadFailure(reason) = &e {
                println!("  {reason}");
            }
        }
    }
}

async fn send<W: Write>(
    session: &ChatSession,
    text: &str,
    show_stats: bool,
    out: &mut W,
) -> Result<(), CliError> {
    match submit_streaming(session, text, out).await? {
        SubmitOutcome::Finished(usage) => {
            if show_stats {
                print_stats(&usage);
            }
        }
        SubmitOutcome::Rejected(RejectReason::EmptyMessage) => {}
        SubmitOutcome::Rejected(RejectReason::NotReady) => {
            println!("No model is loaded. Use /load ID to load one.");
        }
        SubmitOutcome::Rejected(reason) => println!("{reason}"),
        SubmitOutcome::Failed(e) => println!("Error: {e}"),
        SubmitOutcome::Abandoned => debug!("Reply abandoned"),
    }
    Ok(())
}

/// Submit `text` and write the reply to `out` as it streams in.
///
/// Every snapshot carries the whole reply so far; only the new suffix is
/// written. The final message, which may differ from the streamed text,
/// is written last, followed by a newline.
pub async fn submit_streaming<W: Write>(
    session: &ChatSession,
    text: &str,
    out: &mut W,
) -> io::Result<SubmitOutcome> {
    let mut snapshots = session.snapshots();
    snapshots.borrow_and_update();
    let mut printer = ReplyPrinter::new();

    let mut submit = pin!(session.submit_user_message(text));
    let outcome = loop {
        tokio::select! {
            outcome = &mut submit => break outcome,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break submit.as_mut().await;
                }
                let reply = snapshots
                    .borrow_and_update()
                    .trailing_reply()
                    .map(str::to_string);
                if let Some(chunk) = reply.and_then(|reply| printer.advance(&reply)) {
                    write!(out, "{chunk}")?;
                    out.flush()?;
                }
            }
        }
    };

    if let SubmitOutcome::Finished(_) = outcome {
        let state = session.state();
        if let Some(chunk) = state.trailing_reply().and_then(|reply| printer.advance(reply)) {
            write!(out, "{chunk}")?;
        }
    }
    if !printer.printed().is_empty() {
        writeln!(out)?;
    }
    out.flush()?;
    Ok(outcome)
}
