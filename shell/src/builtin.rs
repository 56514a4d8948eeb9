use crate::command::{CommandFactory, ExecutableCommand, Outcome};
use crate::error::{ShellError, ShellResult};
use crate::interpreter::Factory;
use crate::session::Session;
use std::env;
use std::ffi::{OsStr, OsString};
use std::io::Write;

/// Built-in commands known to the shell at compile time.
///
/// Builtins run in-process without spawning a child. Each one accepts exactly
/// [`BuiltinCommand::arity`] words; any other count is a usage error and the
/// builtin is not run at all.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "exit" or "cd".
    fn name() -> &'static str;

    /// Required number of words, command name included.
    fn arity() -> usize;

    /// Synopsis printed on a usage error.
    fn usage() -> &'static str;

    /// Builds the command from a word list of exactly `arity()` words.
    fn from_args(args: &[OsString]) -> Self;

    fn execute(self, stdout: &mut dyn Write, session: &mut Session) -> ShellResult<()>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        session: &mut Session,
    ) -> ShellResult<Outcome> {
        <T as BuiltinCommand>::execute(*self, stdout, session)?;
        Ok(Outcome::Builtin)
    }
}

/// Stand-in for a builtin called with the wrong number of arguments.
struct InvalidArgs {
    usage: &'static str,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        _stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        _session: &mut Session,
    ) -> ShellResult<Outcome> {
        Err(ShellError::Usage(self.usage))
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, args: &[OsString]) -> Option<Box<dyn ExecutableCommand>> {
        if args.first().map(OsString::as_os_str) != Some(OsStr::new(T::name())) {
            return None;
        }
        if args.len() == T::arity() {
            Some(Box::new(T::from_args(args)))
        } else {
            log::debug!(
                "{}: expected {} words, got {}",
                T::name(),
                T::arity(),
                args.len()
            );
            Some(Box::new(InvalidArgs { usage: T::usage() }))
        }
    }
}

/// Leave the shell with a success status.
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn arity() -> usize {
        1
    }

    fn usage() -> &'static str {
        "exit"
    }

    fn from_args(_args: &[OsString]) -> Self {
        Exit
    }

    fn execute(self, _stdout: &mut dyn Write, session: &mut Session) -> ShellResult<()> {
        session.should_exit = true;
        Ok(())
    }
}

/// Change the working directory of the shell process.
pub struct Cd {
    pub target: OsString,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn arity() -> usize {
        2
    }

    fn usage() -> &'static str {
        "cd <dir>"
    }

    fn from_args(args: &[OsString]) -> Self {
        Cd {
            target: args[1].clone(),
        }
    }

    fn execute(self, _stdout: &mut dyn Write, _session: &mut Session) -> ShellResult<()> {
        env::set_current_dir(&self.target).map_err(|source| ShellError::ChangeDir {
            dir: self.target.to_string_lossy().into_owned(),
            source,
        })?;
        log::debug!("working directory is now {:?}", self.target);
        Ok(())
    }
}

/// Print every recorded command line with its 1-based index.
pub struct History;

impl BuiltinCommand for History {
    fn name() -> &'static str {
        "history"
    }

    fn arity() -> usize {
        1
    }

    fn usage() -> &'static str {
        "history"
    }

    fn from_args(_args: &[OsString]) -> Self {
        History
    }

    fn execute(self, stdout: &mut dyn Write, session: &mut Session) -> ShellResult<()> {
        for (index, line) in session.history().list()?.iter().enumerate() {
            let mut entry = format!("{} ", index + 1).into_bytes();
            entry.extend_from_slice(line.as_encoded_bytes());
            entry.push(b'\n');
            stdout.write_all(&entry).map_err(ShellError::History)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::history::HistoryStore;
    use crate::session::SessionMode;
    use std::env as stdenv;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, MutexGuard, OnceLock};
    use std::time::{SystemTime, UNIX_EPOCH};

    pub(crate) fn lock_current_dir() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn make_unique_temp_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let p = stdenv::temp_dir().join(format!("pish_{}_{}_{}", tag, std::process::id(), nanos));
        fs::create_dir_all(&p).expect("failed to create temp dir");
        p
    }

    fn words(line: &str) -> Vec<OsString> {
        line.split_whitespace().map(OsString::from).collect()
    }

    fn session_in(dir: &std::path::Path) -> Session {
        Session::new(SessionMode::Interactive, HistoryStore::new(dir.join("history")))
    }

    fn run(line: &str, session: &mut Session) -> (ShellResult<Outcome>, String) {
        let factories: Vec<Box<dyn CommandFactory>> = vec![
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<History>::default()),
        ];
        let args = words(line);
        let cmd = factories
            .iter()
            .find_map(|factory| factory.try_create(&args))
            .expect("not a builtin");
        let mut out = Vec::new();
        let res = cmd.execute(&mut out, &mut io::sink(), session);
        (res, String::from_utf8(out).unwrap())
    }

    #[test]
    fn unknown_names_are_not_claimed() {
        let factory = Factory::<Cd>::default();
        assert!(factory.try_create(&words("ls -l")).is_none());
        assert!(factory.try_create(&words("CD /tmp")).is_none());
        assert!(factory.try_create(&[]).is_none());
    }

    #[test]
    fn exit_sets_the_flag() {
        let dir = make_unique_temp_dir("exit");
        let mut session = session_in(&dir);

        let (res, _) = run("exit", &mut session);
        assert_eq!(res.unwrap(), Outcome::Builtin);
        assert!(session.should_exit);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn exit_with_arguments_is_a_usage_error() {
        let dir = make_unique_temp_dir("exit_usage");
        let mut session = session_in(&dir);

        let (res, _) = run("exit 0", &mut session);
        let err = res.unwrap_err();
        assert!(matches!(err, ShellError::Usage("exit")));
        assert_eq!(err.outcome(), Outcome::UsageError);
        assert!(!session.should_exit);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_cd_to_absolute_path() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir("cd");
        let canonical_temp = fs::canonicalize(&temp).expect("canonicalize failed");
        let orig = stdenv::current_dir().unwrap();
        let mut session = session_in(&temp);

        let cmd = Cd {
            target: canonical_temp.clone().into_os_string(),
        };
        let res = BuiltinCommand::execute(cmd, &mut io::sink(), &mut session);

        assert!(res.is_ok());
        let new_cwd = fs::canonicalize(stdenv::current_dir().unwrap()).unwrap();
        assert_eq!(new_cwd, canonical_temp);

        stdenv::set_current_dir(orig).expect("failed to restore cwd");
        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn test_cd_nonexistent_path_errors() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir("cd_missing");
        let orig = stdenv::current_dir().unwrap();
        let mut session = session_in(&temp);

        let (res, _) = run("cd /definitely/not/a/real/path", &mut session);

        let err = res.unwrap_err();
        assert!(matches!(err, ShellError::ChangeDir { .. }));
        assert_eq!(err.outcome(), Outcome::Builtin);
        assert_eq!(stdenv::current_dir().unwrap(), orig);

        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn cd_arity_is_checked_before_changing_directory() {
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir("cd_usage");
        let orig = stdenv::current_dir().unwrap();
        let mut session = session_in(&temp);

        for line in ["cd", "cd / /tmp"] {
            let (res, _) = run(line, &mut session);
            assert!(matches!(res, Err(ShellError::Usage("cd <dir>"))));
            assert_eq!(stdenv::current_dir().unwrap(), orig);
        }
        assert!(!session.history().path().exists());

        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn history_lists_with_one_based_indices() {
        let dir = make_unique_temp_dir("history");
        let mut session = session_in(&dir);
        session.history().record(b"echo one").unwrap();
        session.history().record(b"ls\t-l").unwrap();

        let (res, out) = run("history", &mut session);
        assert_eq!(res.unwrap(), Outcome::Builtin);
        assert_eq!(out, "1 echo one\n2 ls\t-l\n");

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn history_reports_a_missing_log() {
        let dir = make_unique_temp_dir("history_missing");
        let mut session = session_in(&dir);

        let (res, out) = run("history", &mut session);
        let err = res.unwrap_err();
        assert!(matches!(err, ShellError::History(_)));
        assert_eq!(err.outcome(), Outcome::Builtin);
        assert!(out.is_empty());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    #[cfg(unix)]
    fn cd_accepts_non_utf8_directory_names() {
        use std::os::unix::ffi::OsStrExt;
        let _lock = lock_current_dir();
        let temp = make_unique_temp_dir("cd_bytes");
        let target = fs::canonicalize(&temp).unwrap().join(OsStr::from_bytes(b"caf\xe9"));
        fs::create_dir(&target).expect("create non-utf8 dir");
        let orig = stdenv::current_dir().unwrap();
        let mut session = session_in(&temp);

        let cmd = Cd {
            target: target.clone().into_os_string(),
        };
        let res = BuiltinCommand::execute(cmd, &mut io::sink(), &mut session);
        let now = stdenv::current_dir().unwrap();
        stdenv::set_current_dir(&orig).expect("failed to restore cwd");

        assert!(res.is_ok());
        assert_eq!(now, target);
        let _ = fs::remove_dir_all(&temp);
    }

    #[test]
    fn history_with_arguments_is_a_usage_error() {
        let dir = make_unique_temp_dir("history_usage");
        let mut session = session_in(&dir);
        session.history().record(b"echo one").unwrap();

        let (res, out) = run("history 5", &mut session);
        assert!(matches!(res, Err(ShellError::Usage("history"))));
        assert!(out.is_empty());
        assert_eq!(session.history().list().unwrap(), ["echo one"]);

        let _ = fs::remove_dir_all(dir);
    }
}
