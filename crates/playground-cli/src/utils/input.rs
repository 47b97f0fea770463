//! Line editing for the chat REPL.
//!
//! The editor blocks on the terminal, so it lives on its own thread and
//! reads a line only when asked. Nothing is prompted while a reply streams.

use std::sync::mpsc;
use std::thread;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc as async_mpsc;

use crate::error::CliError;

type ReadResult = Result<String, ReadlineError>;

/// Handle to the editor thread.
///
/// Dropping it stops the thread once its current read returns.
pub struct LineReader {
    prompts: mpsc::Sender<String>,
    lines: async_mpsc::UnboundedReceiver<ReadResult>,
}

impl LineReader {
    /// Start the editor thread.
    pub fn spawn() -> Result<Self, CliError> {
        let (prompt_tx, prompt_rx) = mpsc::channel::<String>();
        let (line_tx, line_rx) = async_mpsc::unbounded_channel();

        thread::Builder::new()
            .name("line-editor".to_string())
            .spawn(move || {
                let mut editor = match DefaultEditor::new() {
                    Ok(editor) => editor,
                    Err(e) => {
                        let _ = line_tx.send(Err(e));
                        return;
                    }
                };
                while let Ok(prompt) = prompt_rx.recv() {
                    let result = editor.readline(&prompt);
                    if let Ok(line) = &result
                        && !line.trim().is_empty()
                    {
                        let _ = editor.add_history_entry(line.as_str());
                    }
                    if line_tx.send(result).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            prompts: prompt_tx,
            lines: line_rx,
        })
    }

    /// Read one line. `None` on Ctrl-C, Ctrl-D or a closed terminal.
    pub async fn read_line(&mut self, prompt: &str) -> Result<Option<String>, CliError> {
        self.prompts
            .send(prompt.to_string())
            .map_err(|_| CliError::Io("line editor stopped".to_string()))?;
        match self.lines.recv().await {
            Some(Ok(line)) => Ok(Some(line)),
            Some(Err(ReadlineError::Interrupted | ReadlineError::Eof)) | None => Ok(None),
            Some(Err(e)) => Err(e.into()),
        }
    }
}
