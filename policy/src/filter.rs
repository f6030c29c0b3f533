//! Hidden-aware successor search.

use std::sync::Arc;

use log::warn;

use crate::error::{PolicyError, Result};
use crate::hidden::HiddenSet;
use crate::Pid;

/// Size of the pid space, and therefore the retry budget of
/// [`VisibilityFilter::find_next_visible`]: the successor primitive is
/// strictly monotonic, so a search can step at most this many times.
pub const PID_SPACE_LIMIT: u32 = 4_194_304;

/// The enumeration primitive being filtered: "given a cursor, return the
/// smallest existing pid ≥ cursor". Implementations must be strictly
/// monotonic — for a fixed process population, a larger cursor never yields
/// a smaller result.
pub trait PidSuccessor: Send + Sync {
    fn find_next(&self, cursor: Pid) -> Option<Pid>;
}

/// Replacement for the successor primitive: skips hidden pids and restarts
/// the query past them.
///
/// Holds the *original*, unhooked primitive; every retry goes through it, so
/// the interception callback is never re-entered from inside itself.
pub struct VisibilityFilter {
    hidden: Arc<HiddenSet>,
    original: Arc<dyn PidSuccessor>,
    retry_budget: u32,
}

impl VisibilityFilter {
    pub fn new(hidden: Arc<HiddenSet>, original: Arc<dyn PidSuccessor>) -> Self {
        Self {
            hidden,
            original,
            retry_budget: PID_SPACE_LIMIT,
        }
    }

    /// Cap the skip-and-retry loop at `budget` steps instead of the full pid
    /// space.
    pub fn with_retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = budget;
        self
    }

    /// Smallest visible (existing, not hidden) pid ≥ `n`, or `None` when the
    /// search exhausts the pid space.
    ///
    /// Each skipped pid strictly increases the cursor, so with a monotonic
    /// primitive the loop terminates within the pid-space size. A host that
    /// violates monotonicity trips the retry budget and surfaces as
    /// [`PolicyError::SearchExhausted`] instead of looping forever.
    pub fn find_next_visible(&self, n: Pid) -> Result<Option<Pid>> {
        let mut cursor = n;
        for _ in 0..=self.retry_budget {
            let Some(pid) = self.original.find_next(cursor) else {
                return Ok(None);
            };
            if !self.hidden.contains(pid) {
                return Ok(Some(pid));
            }
            if pid == Pid::MAX {
                return Ok(None);
            }
            cursor = pid + 1;
        }
        warn!("successor search from {} exhausted its retry budget", n);
        Err(PolicyError::SearchExhausted { start: n })
    }
}
