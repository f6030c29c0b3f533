//! Roster rendering for control-channel reads.

use crate::Pid;

/// Render the hidden roster as newline-delimited text, one `pid: <decimal>`
/// line per entry, in the order given.
pub fn render_roster(pids: &[Pid]) -> String {
    let mut out = String::with_capacity(pids.len() * 12);
    for pid in pids {
        out.push_str("pid: ");
        out.push_str(&pid.to_string());
        out.push('\n');
    }
    out
}
