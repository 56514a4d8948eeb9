use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Outcome};
use crate::error::{ShellError, ShellResult};
use crate::interpreter::Factory;
use crate::session::Session;
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

/// Search path used when `PATH` is not set, as `execvp` does.
pub const DEFAULT_SEARCH_PATH: &str = "/bin:/usr/bin";

/// Command that is not a builtin: a program looked up and run as a child.
pub struct ExternalCommand {
    name: OsString,
    args: Vec<OsString>,
}

impl ExternalCommand {
    pub fn new(name: OsString, args: Vec<OsString>) -> Self {
        Self { name, args }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    /// Claims every non-empty argument list; whether the program exists is
    /// only found out when it is started.
    fn try_create(&self, args: &[OsString]) -> Option<Box<dyn ExecutableCommand>> {
        let (name, rest) = args.split_first()?;
        Some(Box::new(ExternalCommand::new(name.clone(), rest.to_vec())))
    }
}

/// The directories to search for a bare command name, given the value of `PATH`.
fn search_paths(path_var: Option<OsString>) -> OsString {
    path_var.unwrap_or_else(|| OsString::from(DEFAULT_SEARCH_PATH))
}

impl ExecutableCommand for ExternalCommand {
    /// Runs the program with inherited standard streams and waits for it.
    ///
    /// Two failures are told apart:
    /// - the program cannot be found or started in the child (`Exec`), which
    ///   counts as a child that exited with [`crate::error::EXEC_FAILURE`];
    /// - no child can be created at all (`Spawn`).
    fn execute(
        self: Box<Self>,
        _stdout: &mut dyn Write,
        _stderr: &mut dyn Write,
        _session: &mut Session,
    ) -> ShellResult<Outcome> {
        let name = self.name.to_string_lossy();
        let search_paths = search_paths(std::env::var_os("PATH"));
        let program = find_command_path(&search_paths, Path::new(&self.name)).ok_or_else(|| {
            ShellError::Exec {
                program: name.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "command not found"),
            }
        })?;
        log::debug!("starting {} as {}", name, program.display());

        let mut cmd = std::process::Command::new(&*program);
        cmd.args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        set_arg0(&mut cmd, &self.name);

        let mut child = cmd.spawn().map_err(|source| classify_spawn_error(&name, source))?;

        // The exit status is only logged; the loop goes on either way.
        let code = match child.wait() {
            Ok(status) => exit_code(status),
            Err(e) => {
                log::warn!("waiting for {} failed: {}", name, e);
                -1
            }
        };
        log::debug!("{} exited with {}", name, code);
        Ok(Outcome::External(code))
    }
}

/// Splits spawn errors into "the program could not be run" and "no process
/// could be created".
fn classify_spawn_error(name: &str, source: io::Error) -> ShellError {
    match source.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => ShellError::Exec {
            program: name.to_owned(),
            source,
        },
        _ if is_exec_format_error(&source) => ShellError::Exec {
            program: name.to_owned(),
            source,
        },
        _ => ShellError::Spawn {
            program: name.to_owned(),
            source,
        },
    }
}

#[cfg(unix)]
fn is_exec_format_error(err: &io::Error) -> bool {
    // ENOEXEC
    err.raw_os_error() == Some(8)
}

#[cfg(not(unix))]
fn is_exec_format_error(_err: &io::Error) -> bool {
    false
}

#[cfg(unix)]
fn set_arg0(cmd: &mut std::process::Command, name: &OsStr) {
    use std::os::unix::process::CommandExt;
    cmd.arg0(name);
}

#[cfg(not(unix))]
fn set_arg0(_cmd: &mut std::process::Command, _name: &OsStr) {}

fn exit_code(exit_status: ExitStatus) -> ExitCode {
    match exit_status.code() {
        Some(x) => x,
        None => terminated_by_signal(exit_status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> ExitCode {
    -1
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it is an executable file.
/// - Relative with multiple components (e.g., `bin/sh`): returns it if it is an executable file.
/// - `./foo` on Unix or any `./`-prefixed path on other platforms: returns it if it is an
///   executable file.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first executable match.
/// - Empty path: returns `None`.
///
/// Returns either a borrowed reference to the provided `path` or an owned `PathBuf`
/// when the result is discovered via PATH lookup.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let search_in_current_dir = cfg!(not(unix)) || path.starts_with("./");
    if search_in_current_dir && is_executable(path) {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => None,
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(cmd))
        .find(|path| is_executable(path))
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if is_executable(path) { Some(path) } else { None }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
