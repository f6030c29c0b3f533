//! Visibility policy for process enumeration.
//!
//! This crate owns the hidden-pid registry and the logic that filters an
//! enumeration primitive through it: a [`HiddenSet`] of pids, the
//! [`VisibilityFilter`] that answers "next visible pid ≥ n", and the
//! [`Registry`] control operations the outside world mutates the set through.
//! The enumeration primitive and the process table are capability traits
//! ([`PidSuccessor`], [`ProcessTable`]), so the whole policy runs against
//! fixtures in tests and against live hosts in production.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use procveil_policy::{HiddenSet, PidSuccessor, VisibilityFilter, Pid};
//!
//! struct Space(Vec<Pid>);
//! impl PidSuccessor for Space {
//!     fn find_next(&self, cursor: Pid) -> Option<Pid> {
//!         self.0.iter().copied().find(|&p| p >= cursor)
//!     }
//! }
//!
//! let hidden = Arc::new(HiddenSet::new());
//! hidden.insert(2).unwrap();
//! hidden.insert(3).unwrap();
//!
//! let filter = VisibilityFilter::new(hidden, Arc::new(Space(vec![1, 2, 3, 4, 5])));
//! assert_eq!(filter.find_next_visible(2).unwrap(), Some(4));
//! assert_eq!(filter.find_next_visible(6).unwrap(), None);
//! ```

mod control;
mod error;
mod filter;
mod hidden;

#[cfg(test)]
mod tests;

pub use control::{ProcessTable, Registry};
pub use error::{PolicyError, Result};
pub use filter::{PidSuccessor, VisibilityFilter, PID_SPACE_LIMIT};
pub use hidden::HiddenSet;

pub use procveil_protocol::Pid;
