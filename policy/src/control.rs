//! Control operations over the hidden set.

use std::sync::Arc;

use log::{debug, info};

use crate::error::{PolicyError, Result};
use crate::hidden::HiddenSet;
use crate::Pid;

/// Process-table lookup consumed by [`Registry::add_with_parent`].
pub trait ProcessTable: Send + Sync {
    /// Parent pid of `pid`, or `None` if no such process exists.
    fn parent_of(&self, pid: Pid) -> Option<Pid>;
}

/// The mutation surface the control channel drives.
pub struct Registry {
    hidden: Arc<HiddenSet>,
}

impl Registry {
    pub fn new(hidden: Arc<HiddenSet>) -> Self {
        Self { hidden }
    }

    pub fn hidden(&self) -> &Arc<HiddenSet> {
        &self.hidden
    }

    /// Hide `pid`. Duplicate adds report [`PolicyError::AlreadyHidden`].
    pub fn add(&self, pid: Pid) -> Result<()> {
        self.hidden.insert(pid)?;
        info!("hiding pid {}", pid);
        Ok(())
    }

    /// Hide `pid`, then its parent.
    ///
    /// The child add commits first; if the parent lookup then fails, the
    /// caller sees [`PolicyError::ParentLookupFailed`] with the child still
    /// hidden — the partial effect is reported, never swallowed. A parent
    /// that is already hidden (including a pid that is its own parent)
    /// reports [`PolicyError::AlreadyHidden`] like any other duplicate add.
    pub fn add_with_parent(&self, pid: Pid, table: &dyn ProcessTable) -> Result<()> {
        self.add(pid)?;
        let parent = table
            .parent_of(pid)
            .ok_or(PolicyError::ParentLookupFailed(pid))?;
        self.add(parent)
    }

    /// Unhide `pid`. Always succeeds; deleting an absent pid is a no-op.
    pub fn delete(&self, pid: Pid) {
        self.hidden.remove(pid);
        debug!("unhiding pid {}", pid);
    }
}
