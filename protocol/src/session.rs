//! Read-session semantics of the control channel.
//!
//! A reader sees the roster exactly once per open: the first read returns the
//! full rendering, every later read returns empty (EOF). A fresh session is
//! created per open.

use crate::render::render_roster;
use crate::Pid;

/// One open read session over the hidden roster.
#[derive(Debug, Default)]
pub struct RosterSession {
    drained: bool,
}

impl RosterSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the roster. Returns the rendered text on the first call and an
    /// empty string afterwards, regardless of how the roster changed in
    /// between.
    pub fn read(&mut self, pids: &[Pid]) -> String {
        if self.drained {
            return String::new();
        }
        self.drained = true;
        render_roster(pids)
    }
}
