use thiserror::Error;

use crate::Pid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("pid {0} is already hidden")]
    AlreadyHidden(Pid),

    #[error("parent lookup failed for pid {0}")]
    ParentLookupFailed(Pid),

    #[error("successor search exhausted its retry budget (started at {start})")]
    SearchExhausted { start: Pid },
}

pub type Result<T> = std::result::Result<T, PolicyError>;
