use crate::history::HistoryStore;

/// Where commands come from, fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Commands are typed by a user: a prompt is shown and every
    /// non-blank line is recorded to the history log.
    Interactive,
    /// Commands are read from a script file: no prompt, no history.
    Batch,
}

impl SessionMode {
    pub fn shows_prompt(self) -> bool {
        self == SessionMode::Interactive
    }

    pub fn records_history(self) -> bool {
        self == SessionMode::Interactive
    }
}

/// State shared by every command of one interpreter run.
///
/// The session is built once at startup and threaded through each command
/// explicitly:
/// - `mode`: interactive or batch, never changed after construction.
/// - `history`: the log the loop records to and `history` reads from.
/// - `should_exit`: set by `exit`, checked by the loop before each read.
#[derive(Debug, Clone)]
pub struct Session {
    mode: SessionMode,
    history: HistoryStore,
    pub should_exit: bool,
}

impl Session {
    pub fn new(mode: SessionMode, history: HistoryStore) -> Self {
        Self {
            mode,
            history,
            should_exit: false,
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_interactive_sessions_prompt_and_record() {
        assert!(SessionMode::Interactive.shows_prompt());
        assert!(SessionMode::Interactive.records_history());
        assert!(!SessionMode::Batch.shows_prompt());
        assert!(!SessionMode::Batch.records_history());
    }

    #[test]
    fn new_session_is_running() {
        let session = Session::new(SessionMode::Batch, HistoryStore::new("h"));
        assert!(!session.should_exit);
        assert_eq!(session.mode(), SessionMode::Batch);
        assert_eq!(session.history().path(), std::path::Path::new("h"));
    }
}
