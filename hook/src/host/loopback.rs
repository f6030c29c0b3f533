//! In-process redirect facility.
//!
//! Addresses here are dispatch keys into a table of callables owned by the
//! embedding code; `route` answers "given a call arriving at this address,
//! where does execution continue?". This is the adapter the cli (and the
//! integration tests) run the engine against.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use log::debug;

use crate::host::{RedirectFacility, RedirectThunk};
use crate::types::{CallOrigin, HookError, Redirect};

#[derive(Debug, Default)]
pub struct LoopbackHost {
    filters: Mutex<HashSet<usize>>,
    thunks: Mutex<HashMap<usize, RedirectThunk>>,
}

impl LoopbackHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a call arriving at `address`. Returns the address execution
    /// continues at: the replacement for diverted calls, `address` itself
    /// for everything else.
    pub fn route(&self, address: usize, origin: CallOrigin) -> usize {
        if !self.filters.lock().unwrap().contains(&address) {
            return address;
        }
        let thunk = match self.thunks.lock().unwrap().get(&address) {
            Some(thunk) => *thunk,
            None => return address,
        };
        match thunk.route(origin) {
            Redirect::Passthrough => address,
            Redirect::Divert(replacement) => replacement,
        }
    }
}

impl RedirectFacility for LoopbackHost {
    fn set_filter(&self, address: usize) -> Result<(), HookError> {
        if !self.filters.lock().unwrap().insert(address) {
            return Err(HookError::FilterRejected);
        }
        debug!("filter set on {:#x}", address);
        Ok(())
    }

    fn clear_filter(&self, address: usize) -> Result<(), HookError> {
        if !self.filters.lock().unwrap().remove(&address) {
            return Err(HookError::FilterRejected);
        }
        debug!("filter cleared on {:#x}", address);
        Ok(())
    }

    fn register(&self, address: usize, thunk: RedirectThunk) -> Result<(), HookError> {
        // Registration without a filter would make the thunk a blanket
        // interceptor; refuse it.
        if !self.filters.lock().unwrap().contains(&address) {
            return Err(HookError::RegisterRejected);
        }
        let mut thunks = self.thunks.lock().unwrap();
        if thunks.contains_key(&address) {
            return Err(HookError::RegisterRejected);
        }
        thunks.insert(address, thunk);
        Ok(())
    }

    fn unregister(&self, address: usize) -> Result<(), HookError> {
        if self.thunks.lock().unwrap().remove(&address).is_none() {
            return Err(HookError::RegisterRejected);
        }
        Ok(())
    }
}
