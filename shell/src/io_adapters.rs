//! Sources of command lines for the interpreter loop.

use crate::history::HistoryStore;
use crate::tokenizer::truncate_line;
use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{BufRead, Write};

/// Something the interpreter can pull command lines from.
pub trait LineSource {
    /// Show `prompt` if there is one, then read the next line.
    ///
    /// Returns `Ok(None)` at end of input. A returned line is raw bytes, may
    /// still carry its terminator and is already cut down to the line buffer
    /// size.
    fn next_line(&mut self, prompt: Option<&str>) -> Result<Option<Vec<u8>>>;
}

/// Line source over any buffered reader: a script file, piped standard
/// input, or an in-memory buffer.
pub struct ReaderSource<R, W> {
    reader: R,
    prompt_out: W,
}

impl<R: BufRead, W: Write> ReaderSource<R, W> {
    /// `prompt_out` receives the prompt, if the session shows one.
    pub fn new(reader: R, prompt_out: W) -> Self {
        Self { reader, prompt_out }
    }
}

impl<R: BufRead, W: Write> LineSource for ReaderSource<R, W> {
    fn next_line(&mut self, prompt: Option<&str>) -> Result<Option<Vec<u8>>> {
        if let Some(prompt) = prompt {
            write!(self.prompt_out, "{}", prompt).context("failed to write prompt")?;
            self.prompt_out.flush().context("failed to write prompt")?;
        }

        let mut line = Vec::new();
        let read = self
            .reader
            .read_until(b'\n', &mut line)
            .context("failed to read input")?;
        if read == 0 {
            return Ok(None);
        }

        truncate_line(&mut line);
        Ok(Some(line))
    }
}

/// Line source backed by a line editor on a terminal.
///
/// Previously recorded commands are available for recall with the arrow
/// keys. This recall list lives in memory only; the durable log is written by
/// the interpreter through [`HistoryStore`].
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    pub fn new(history: &HistoryStore) -> Result<Self> {
        let mut editor = DefaultEditor::new().context("failed to set up line editor")?;
        match history.list() {
            Ok(lines) => {
                for line in lines {
                    editor.add_history_entry(line.to_string_lossy())?;
                }
            }
            Err(e) => log::warn!("could not preload history: {}", e),
        }
        Ok(Self { editor })
    }
}

impl LineSource for EditorSource {
    fn next_line(&mut self, prompt: Option<&str>) -> Result<Option<Vec<u8>>> {
        match self.editor.readline(prompt.unwrap_or("")) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                let mut line = line.into_bytes();
                truncate_line(&mut line);
                Ok(Some(line))
            }
            // No signal semantics: an interrupted read is just an empty line.
            Err(ReadlineError::Interrupted) => Ok(Some(Vec::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err).context("failed to read input"),
        }
    }
}
