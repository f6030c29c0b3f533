//! Control session: commands in, roster out.
//!
//! Mirrors a control-channel open/write*/read/close cycle: each input line is
//! one write, rejected commands leave the registry untouched, and the roster
//! is rendered once at the end of input.

use std::io::{BufRead, Write};

use anyhow::Result;
use log::warn;

use procveil_policy::{ProcessTable, Registry};
use procveil_protocol::{parse_command, RosterSession};

use crate::bridge;

pub fn run_session<R: BufRead, W: Write>(
    registry: &Registry,
    table: &dyn ProcessTable,
    input: R,
    mut output: W,
) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if let Err(err) = apply_line(registry, table, &line) {
            warn!("control command rejected: {}", err);
        }
    }

    let mut session = RosterSession::new();
    output.write_all(session.read(&registry.hidden().snapshot()).as_bytes())?;
    Ok(())
}

fn apply_line(registry: &Registry, table: &dyn ProcessTable, line: &str) -> Result<()> {
    let command = parse_command(line)?;
    bridge::apply(registry, table, command)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use procveil_policy::{HiddenSet, Pid};

    use super::*;

    struct NoTable;

    impl ProcessTable for NoTable {
        fn parent_of(&self, _pid: Pid) -> Option<Pid> {
            None
        }
    }

    fn session_output(input: &str) -> String {
        let registry = Registry::new(Arc::new(HiddenSet::new()));
        let mut output = Vec::new();
        run_session(&registry, &NoTable, input.as_bytes(), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_add_then_read_round_trip() {
        assert_eq!(session_output("add 1234\n"), "pid: 1234\n");
    }

    #[test]
    fn test_del_removes_from_roster() {
        assert_eq!(session_output("add 1234\ndel 1234\n"), "");
    }

    #[test]
    fn test_unknown_command_changes_nothing() {
        assert_eq!(session_output("add 10\nfrobnicate 20\n"), "pid: 10\n");
    }

    #[test]
    fn test_duplicate_add_reported_not_fatal() {
        assert_eq!(session_output("add 10\nadd 10\nadd 20\n"), "pid: 10\npid: 20\n");
    }

    #[test]
    fn test_blank_lines_ignored() {
        assert_eq!(session_output("\n\nadd 5\n\n"), "pid: 5\n");
    }

    #[test]
    fn test_roster_sorted_ascending() {
        assert_eq!(
            session_output("add 30\nadd 10\nadd 20\n"),
            "pid: 10\npid: 20\npid: 30\n"
        );
    }
}
