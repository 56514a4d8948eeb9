use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use pish::{EditorSource, HistoryStore, Interpreter, LineSource, ReaderSource, Session, SessionMode};
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(FromArgs, Debug)]
/// Run commands typed at the prompt, or read them from a script file.
struct Args {
    #[argh(positional)]
    /// file to read commands from; standard input when omitted.
    script: Option<PathBuf>,

    #[argh(option)]
    /// history log to use instead of ~/.pish_history.
    history: Option<PathBuf>,
}

fn history_store(args: &Args) -> HistoryStore {
    let path = args
        .history
        .clone()
        .or_else(HistoryStore::default_path)
        .unwrap_or_else(|| {
            log::warn!("home directory unknown, keeping history in the current directory");
            PathBuf::from(pish::history::HISTORY_FILE_NAME)
        });
    log::debug!("history log: {}", path.display());
    HistoryStore::new(path)
}

fn run(args: Args) -> Result<()> {
    let history = history_store(&args);

    match &args.script {
        Some(script) => {
            let file = File::open(script)
                .with_context(|| format!("open {}", script.display()))?;
            let mut source = ReaderSource::new(BufReader::new(file), io::sink());
            Interpreter::new(Session::new(SessionMode::Batch, history)).run(&mut source)
        }
        None => {
            let mut source: Box<dyn LineSource> = if io::stdin().is_terminal() {
                Box::new(EditorSource::new(&history)?)
            } else {
                Box::new(ReaderSource::new(io::stdin().lock(), io::stdout()))
            };
            Interpreter::new(Session::new(SessionMode::Interactive, history)).run(source.as_mut())
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let mut argv = Vec::new();
    for arg in std::env::args_os() {
        match arg.into_string() {
            Ok(arg) => argv.push(arg),
            Err(arg) => {
                eprintln!("pish: invalid utf8 in argument: {}", arg.to_string_lossy());
                return ExitCode::FAILURE;
            }
        }
    }
    let (cmd, rest) = match argv.split_first() {
        Some((cmd, rest)) => (cmd.as_str(), rest),
        None => ("pish", &[][..]),
    };
    let rest: Vec<&str> = rest.iter().map(String::as_str).collect();

    let args = match Args::from_args(&[cmd], &rest) {
        Ok(args) => args,
        Err(EarlyExit { output, status }) => {
            return match status {
                Ok(()) => {
                    println!("{}", output);
                    ExitCode::SUCCESS
                }
                Err(()) => {
                    eprintln!("{}", output);
                    ExitCode::FAILURE
                }
            };
        }
    };
    log::debug!("{:?}", args);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pish: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
