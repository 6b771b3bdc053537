//! Session state
//!
//! Tracks what happened during one session so it can be reported when it ends.

/// Why a session stopped reading requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The input stream was closed
    EndOfInput,
    /// The caller sent `quit` or `exit`
    Quit,
}

/// Per-session counters
#[derive(Debug, Default, Clone)]
pub struct SessionState {
    id: String,
    handled: usize,
    failed: usize,
    rejected: usize,
}

impl SessionState {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn record(&mut self, success: bool) {
        self.handled += 1;
        if !success {
            self.failed += 1;
        }
    }

    pub fn record_rejected(&mut self) {
        self.rejected += 1;
    }

    pub fn handled(&self) -> usize {
        self.handled
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }
}

/// Words that end a session instead of being parsed as a request
pub fn is_quit_command(line: &str) -> bool {
    line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit")
}
