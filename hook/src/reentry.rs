//! Thread-local re-entrancy guard.
//!
//! The replacement logic has to call through to the original function, and on
//! a live host that call lands on the very address the redirect watches. The
//! guard marks the current thread as "inside a call-through" so the redirect
//! callback sees [`CallOrigin::Internal`](crate::CallOrigin::Internal) and
//! lets the call pass, breaking the recursion.

use std::cell::Cell;

thread_local! {
    static IN_CALL_THROUGH: Cell<bool> = const { Cell::new(false) };
}

/// Whether the current thread is inside a call-through to an original
/// function.
pub fn in_call_through() -> bool {
    IN_CALL_THROUGH.with(|flag| flag.get())
}

fn set_in_call_through(val: bool) {
    IN_CALL_THROUGH.with(|flag| flag.set(val));
}

/// RAII guard marking the current thread as calling through.
/// Saves the current state and restores it on drop, so nesting is safe.
pub struct CallThroughGuard(bool);

impl CallThroughGuard {
    pub fn new() -> Self {
        let was = in_call_through();
        set_in_call_through(true);
        Self(was)
    }
}

impl Default for CallThroughGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CallThroughGuard {
    fn drop(&mut self) {
        set_in_call_through(self.0);
    }
}
