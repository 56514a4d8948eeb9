use crate::command::{CommandFactory, Outcome};
use crate::io_adapters::LineSource;
use crate::session::Session;
use crate::tokenizer::{self, ParsedCommand};
use anyhow::Result;
use std::io::{self, Write};

/// Prompt shown before each read in interactive sessions.
pub const PROMPT: &str = "\u{25b6}  ";

/// Factory allows creating instances of ExecutableCommand.
///
/// Only support commands defined in this crate — builtins and ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A line-oriented command interpreter.
///
/// The interpreter owns a [`Session`] and a list of [`CommandFactory`] objects
/// that are queried in order for each command. See [`Interpreter::new`] for the
/// factories included out of the box.
///
/// Example
/// ```
/// use pish::{HistoryStore, Interpreter, Session, SessionMode};
/// use std::io::Cursor;
///
/// let history = HistoryStore::new(std::env::temp_dir().join("pish_doc_history"));
/// let mut sh = Interpreter::new(Session::new(SessionMode::Batch, history));
/// let mut source = pish::ReaderSource::new(Cursor::new("true\nexit\n"), std::io::sink());
/// sh.run(&mut source).unwrap();
/// assert!(sh.session().should_exit);
/// ```
pub struct Interpreter {
    session: Session,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create an interpreter with the default set of commands:
    /// - built-ins: `exit`, `cd`, `history`
    /// - external command launcher, tried last
    pub fn new(session: Session) -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::with_commands(
            session,
            vec![
                Box::new(Factory::<Exit>::default()),
                Box::new(Factory::<Cd>::default()),
                Box::new(Factory::<History>::default()),
                Box::new(Factory::<ExternalCommand>::default()),
            ],
        )
    }

    /// Create an interpreter with a custom set of command factories.
    pub fn with_commands(session: Session, commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self { session, commands }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Read and execute commands until end of input or `exit`.
    pub fn run(&mut self, source: &mut dyn LineSource) -> Result<()> {
        self.run_with_output(source, &mut io::stdout(), &mut io::stderr())
    }

    /// Like [`Interpreter::run`], with builtin output and diagnostics written
    /// to the given streams. External programs always inherit the process's
    /// own standard streams.
    pub fn run_with_output(
        &mut self,
        source: &mut dyn LineSource,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<()> {
        let mode = self.session.mode();
        log::debug!("session started in {:?} mode", mode);

        while !self.session.should_exit {
            let prompt = mode.shows_prompt().then_some(PROMPT);
            let Some(raw) = source.next_line(prompt)? else {
                log::debug!("end of input");
                break;
            };

            let line = tokenizer::strip_terminator(&raw);
            if tokenizer::is_blank(line) {
                continue;
            }

            let parsed = tokenizer::tokenize(line);

            if mode.records_history() {
                if let Err(e) = self.session.history().record(line) {
                    report(stderr, &e);
                }
            }

            if parsed.is_empty() {
                continue;
            }

            self.execute(&parsed, stdout, stderr);
        }

        Ok(())
    }

    /// Dispatch one parsed command: builtins first, then external programs.
    ///
    /// Failures are reported on `stderr` and turned into an [`Outcome`]; this
    /// never fails itself, so the loop always goes on.
    pub fn execute(
        &mut self,
        parsed: &ParsedCommand,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Outcome {
        let args = parsed.args();
        let Some(cmd) = self
            .commands
            .iter()
            .find_map(|factory| factory.try_create(args))
        else {
            return Outcome::Builtin;
        };

        // Builtin output must not interleave with a child writing to the
        // same terminal.
        if let Err(e) = stdout.flush() {
            log::warn!("flushing output failed: {}", e);
        }
        match cmd.execute(stdout, stderr, &mut self.session) {
            Ok(outcome) => outcome,
            Err(e) => {
                report(stderr, &e);
                e.outcome()
            }
        }
    }
}

fn report(stderr: &mut dyn Write, err: &dyn std::error::Error) {
    log::debug!("command failed: {:?}", err);
    if writeln!(stderr, "pish: {}", err).is_err() {
        log::error!("pish: {}", err);
    }
}
