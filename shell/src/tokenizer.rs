//! Splitting of raw input lines into argument lists.
//!
//! The grammar is deliberately flat: words are separated by runs of spaces or
//! tabs, and there is no quoting, escaping or expansion of any kind. Lines are
//! handled as raw bytes so that words reach programs exactly as they were typed.

use std::ffi::{OsStr, OsString};

/// Maximum number of argument slots, including the terminating slot reserved
/// for the program invocation. At most `MAX_ARGC - 1` tokens are kept.
pub const MAX_ARGC: usize = 64;

/// Size of the line buffer, including the line terminator.
pub const MAX_LINE: usize = 1024;

/// Returns `true` for the bytes that separate tokens.
pub fn is_separator(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

/// Returns `true` when the line has nothing but separators in it.
pub fn is_blank(line: &[u8]) -> bool {
    line.iter().copied().all(is_separator)
}

/// Removes a trailing `\n` (and a `\r` right before it) from `line`.
pub fn strip_terminator(line: &[u8]) -> &[u8] {
    match line.strip_suffix(b"\n") {
        Some(rest) => rest.strip_suffix(b"\r").unwrap_or(rest),
        None => line,
    }
}

/// Cuts `line` down to what fits into the line buffer.
///
/// Anything past `MAX_LINE - 1` bytes is discarded.
pub fn truncate_line(line: &mut Vec<u8>) {
    let limit = MAX_LINE - 1;
    if line.len() > limit {
        log::debug!("input line truncated from {} to {} bytes", line.len(), limit);
        line.truncate(limit);
    }
}

/// Converts raw line bytes into an OS string without altering them.
#[cfg(unix)]
pub fn bytes_to_os(bytes: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStrExt;
    OsStr::from_bytes(bytes).to_owned()
}

/// Converts raw line bytes into an OS string. Outside Unix, OS strings cannot
/// hold arbitrary bytes, so invalid UTF-8 is replaced.
#[cfg(not(unix))]
pub fn bytes_to_os(bytes: &[u8]) -> OsString {
    OsString::from(String::from_utf8_lossy(bytes).into_owned())
}

/// A single command line broken into words.
///
/// The first word is the command name. The list never contains empty words
/// and never holds more than [`ParsedCommand::CAPACITY`] words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCommand {
    args: Vec<OsString>,
}

impl ParsedCommand {
    /// Number of words a command can carry; extra words are dropped.
    pub const CAPACITY: usize = MAX_ARGC - 1;

    /// All words, command name included.
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Number of words, command name included.
    pub fn argc(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// The command name, if there is one.
    pub fn name(&self) -> Option<&OsStr> {
        self.args.first().map(OsString::as_os_str)
    }
}

/// Tokenize a line whose terminator has already been stripped.
pub fn tokenize(line: &[u8]) -> ParsedCommand {
    let mut words = line
        .split(|&byte| is_separator(byte))
        .filter(|word| !word.is_empty());
    let args: Vec<OsString> = words
        .by_ref()
        .take(ParsedCommand::CAPACITY)
        .map(bytes_to_os)
        .collect();

    let dropped = words.count();
    if dropped > 0 {
        log::debug!("dropped {} arguments past the limit of {}", dropped, ParsedCommand::CAPACITY);
    }

    ParsedCommand { args }
}
