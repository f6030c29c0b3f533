//! `/proc`-backed implementations of the host collaborator interfaces.

use std::fs;

use procveil_policy::{Pid, PidSuccessor, ProcessTable};

/// Snapshot of the live pid population, taken once from `/proc`.
pub struct ProcScan {
    /// Sorted ascending.
    pids: Vec<Pid>,
}

impl ProcScan {
    /// Snapshot `/proc`; non-numeric entries are skipped.
    pub fn snapshot() -> std::io::Result<Self> {
        let mut pids = Vec::new();
        for entry in fs::read_dir("/proc")? {
            let entry = entry?;
            if let Some(pid) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<Pid>().ok())
            {
                pids.push(pid);
            }
        }
        pids.sort_unstable();
        Ok(Self { pids })
    }

    pub fn from_pids(mut pids: Vec<Pid>) -> Self {
        pids.sort_unstable();
        pids.dedup();
        Self { pids }
    }

    pub fn len(&self) -> usize {
        self.pids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }
}

impl PidSuccessor for ProcScan {
    fn find_next(&self, cursor: Pid) -> Option<Pid> {
        let idx = self.pids.partition_point(|&pid| pid < cursor);
        self.pids.get(idx).copied()
    }
}

/// Parent lookup over `/proc/<pid>/stat`.
pub struct ProcTable;

impl ProcessTable for ProcTable {
    fn parent_of(&self, pid: Pid) -> Option<Pid> {
        let stat = fs::read_to_string(format!("/proc/{}/stat", pid)).ok()?;
        parse_ppid(&stat)
    }
}

/// Field 4 of `/proc/<pid>/stat`. The comm field can contain spaces and
/// parentheses, so fields are counted from the last `)`.
fn parse_ppid(stat: &str) -> Option<Pid> {
    let rest = &stat[stat.rfind(')')? + 1..];
    let mut fields = rest.split_ascii_whitespace();
    let _state = fields.next()?;
    fields.next()?.parse().ok()
}
