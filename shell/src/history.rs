use crate::error::{ShellError, ShellResult};
use crate::tokenizer::bytes_to_os;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the history log inside the user's home directory.
pub const HISTORY_FILE_NAME: &str = ".pish_history";

/// Append-only, newline-delimited log of executed command lines.
///
/// The file is opened for every operation and closed right after, so the log
/// is always up to date on disk and nothing is held open between commands.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.pish_history`, when the home directory of the current user is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(HISTORY_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `line` byte for byte to the log, followed by a newline.
    pub fn record(&self, line: &[u8]) -> ShellResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(ShellError::History)?;
        let mut entry = Vec::with_capacity(line.len() + 1);
        entry.extend_from_slice(line);
        entry.push(b'\n');
        file.write_all(&entry).map_err(ShellError::History)?;
        log::trace!("recorded {} bytes to {}", line.len(), self.path.display());
        Ok(())
    }

    /// All recorded lines, oldest first.
    ///
    /// A log that cannot be opened, including one that was never written, is
    /// an error so that `history` can report it.
    pub fn list(&self) -> ShellResult<Vec<OsString>> {
        let bytes = fs::read(&self.path).map_err(ShellError::History)?;
        let mut lines: Vec<&[u8]> = bytes.split(|&b| b == b'\n').collect();
        if lines.last().is_some_and(|last| last.is_empty()) {
            lines.pop();
        }
        Ok(lines.into_iter().map(bytes_to_os).collect())
    }
}
