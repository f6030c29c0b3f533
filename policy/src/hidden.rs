//! The hidden-pid set.

use std::collections::HashSet;
use std::sync::RwLock;

use crate::error::{PolicyError, Result};
use crate::Pid;

/// Mutable registry of the pids an enumeration must skip.
///
/// Membership is the only property that matters; there are no duplicates and
/// no ordering. Readers (the interception path, on every enumeration call)
/// and writers (the control channel) run concurrently from independent
/// threads, so every operation takes the shared/exclusive lock for exactly
/// its own duration — never across a call into foreign code.
///
/// Shared by `Arc` between the control layer and the interception policy;
/// lifetime is bound to the embedding module, which drains it at teardown.
#[derive(Debug, Default)]
pub struct HiddenSet {
    inner: RwLock<HashSet<Pid>>,
}

impl HiddenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.read().contains(&pid)
    }

    /// Hide `pid`. Reports [`PolicyError::AlreadyHidden`] without touching
    /// the set if it is already a member.
    pub fn insert(&self, pid: Pid) -> Result<()> {
        if self.write().insert(pid) {
            Ok(())
        } else {
            Err(PolicyError::AlreadyHidden(pid))
        }
    }

    /// Unhide `pid`. Removing an absent pid is a no-op; deletion is
    /// idempotent by contract.
    pub fn remove(&self, pid: Pid) {
        self.write().remove(&pid);
    }

    /// Visit every currently hidden pid. The callback runs on a snapshot
    /// taken under the read lock, so it may freely call back into the set.
    pub fn for_each<F: FnMut(Pid)>(&self, mut f: F) {
        for pid in self.snapshot() {
            f(pid);
        }
    }

    /// Hidden pids in ascending order.
    pub fn snapshot(&self) -> Vec<Pid> {
        let mut pids: Vec<Pid> = self.read().iter().copied().collect();
        pids.sort_unstable();
        pids
    }

    /// Empty the set, releasing every entry. Used at teardown.
    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // The set stays usable after a panicking writer; poisoning is absorbed
    // so the interception path never unwinds.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashSet<Pid>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashSet<Pid>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}
