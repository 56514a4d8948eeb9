use crate::error::ShellResult;
use crate::session::Session;
use std::ffi::OsString;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// How the execution of one command ended.
///
/// Outcomes are only used to decide whether the loop goes on; none of them
/// is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A builtin ran, successfully or with a reported error.
    Builtin,
    /// An external program ran to completion with this exit code.
    External(ExitCode),
    /// A builtin was invoked with the wrong number of arguments.
    UsageError,
    /// No child process could be created.
    SpawnError,
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    /// Executes the command. Diagnostics the command wants to show go to
    /// `stderr`; failures that end the command are returned as errors.
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
        session: &mut Session,
    ) -> ShellResult<Outcome>;
}

/// Factory that tries to create a command from its argument list.
///
/// Returns `None` when the factory doesn't recognize the command name, which is
/// always `args[0]`.
pub trait CommandFactory {
    fn try_create(&self, args: &[OsString]) -> Option<Box<dyn ExecutableCommand>>;
}
