//! Chat REPL input parsing.
//!
//! Lines starting with `/` are commands; anything else is a message.

use playground_core::ModelFamily;
use playground_core::catalog::UnknownFamily;
use playground_core::services::EXAMPLE_PROMPTS;
use thiserror::Error;

pub const HELP_TEXT: &str = "\
Commands:
  /clear          Start a new conversation
  /stats          Show statistics of the last reply
  /examples       List example prompts
  /example N      Send example prompt N
  /load ID        Load another model
  /models [TERM]  List models, optionally filtered
  /family NAME    Toggle a family filter for /models
  /help           Show this help
  /quit           Leave the chat";

/// One parsed REPL line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    /// Text to submit as a user message, unmodified.
    Message(String),
    Clear,
    Stats,
    Examples,
    /// Zero-based index into the example prompts.
    Example(usize),
    Load(String),
    Models(Option<String>),
    /// Toggle a family chip.
    Family(ModelFamily),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplParseError {
    #[error("Unknown command: /{0} (try /help)")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    MissingArgument(&'static str),

    #[error("Example must be a number between 1 and {max}, got {got}")]
    InvalidExample { got: String, max: usize },

    #[error(transparent)]
    Family(#[from] UnknownFamily),
}

/// Parse one line read from the editor.
///
/// # Errors
///
/// Returns an error for unknown commands and malformed arguments.
pub fn parse_input(line: &str) -> Result<ReplInput, ReplParseError> {
    let Some(command) = line.trim_start().strip_prefix('/') else {
        return Ok(ReplInput::Message(line.to_string()));
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, Some(rest.trim()).filter(|rest| !rest.is_empty())),
        None => (command.trim_end(), None),
    };

    match name {
        "clear" => Ok(ReplInput::Clear),
        "stats" => Ok(ReplInput::Stats),
        "examples" => Ok(ReplInput::Examples),
        "example" => {
            let arg = arg.ok_or(ReplParseError::MissingArgument("/example N"))?;
            parse_example_index(arg).map(ReplInput::Example)
        }
        "load" => arg
            .map(|id| ReplInput::Load(id.to_string()))
            .ok_or(ReplParseError::MissingArgument("/load ID")),
        "models" => Ok(ReplInput::Models(arg.map(str::to_string))),
        "family" => {
            let arg = arg.ok_or(ReplParseError::MissingArgument("/family NAME"))?;
            Ok(ReplInput::Family(arg.parse()?))
        }
        "help" | "?" => Ok(ReplInput::Help),
        "quit" | "exit" | "q" => Ok(ReplInput::Quit),
        other => Err(ReplParseError::UnknownCommand(other.to_string())),
    }
}

fn parse_example_index(arg: &str) -> Result<usize, ReplParseError> {
    let max = EXAMPLE_PROMPTS.len();
    arg.parse::<usize>()
        .ok()
        .filter(|n| (1..=max).contains(n))
        .map(|n| n - 1)
        .ok_or_else(|| ReplParseError::InvalidExample {
            got: arg.to_string(),
            max,
        })
}
