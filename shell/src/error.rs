use crate::command::{ExitCode, Outcome};
use std::io;
use thiserror::Error;

/// Exit code reported for a program that could not be started in the child.
pub const EXEC_FAILURE: ExitCode = 1;

/// Failures of a single command. None of them stop the interpreter loop.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("cd: {dir}: {source}")]
    ChangeDir { dir: String, source: io::Error },

    #[error("fork: {program}: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("{program}: {source}")]
    Exec { program: String, source: io::Error },

    #[error("history: {0}")]
    History(#[source] io::Error),
}

impl ShellError {
    /// The outcome a command ends with after failing with this error.
    pub fn outcome(&self) -> Outcome {
        match self {
            ShellError::Usage(_) => Outcome::UsageError,
            ShellError::Spawn { .. } => Outcome::SpawnError,
            ShellError::Exec { .. } => Outcome::External(EXEC_FAILURE),
            ShellError::ChangeDir { .. } | ShellError::History(_) => Outcome::Builtin,
        }
    }
}

pub type ShellResult<T> = Result<T, ShellError>;
