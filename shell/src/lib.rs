//! A tiny line-oriented command interpreter.
//!
//! Commands are read one line at a time from a terminal or a script file, split
//! on whitespace, and either handled by one of the builtins (`exit`, `cd`,
//! `history`) or run as an external program that inherits the interpreter's
//! standard streams. The interpreter waits for every program to finish before
//! reading the next line.
//!
//! The main entry point is [`Interpreter`], driven by a [`LineSource`] and
//! configured through a [`Session`].

mod builtin;
pub mod command;
pub mod error;
mod external;
pub mod history;
mod interpreter;
pub mod io_adapters;
pub mod session;
pub mod tokenizer;

pub use command::{ExitCode, Outcome};
pub use error::ShellError;
pub use external::find_command_path;
pub use history::HistoryStore;
pub use interpreter::{Interpreter, PROMPT};
pub use io_adapters::{EditorSource, LineSource, ReaderSource};
pub use session::{Session, SessionMode};
