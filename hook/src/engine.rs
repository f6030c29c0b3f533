//! Hook lifecycle: resolve a symbol, install the redirect, tear it down.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};

use crate::host::{RedirectFacility, RedirectThunk};
use crate::resolver::SymbolResolver;
use crate::types::HookError;

/// Slot that publishes the original function's address once the symbol is
/// resolved, so the replacement logic can call through to it.
#[derive(Debug, Default)]
pub struct OriginalSlot(AtomicUsize);

impl OriginalSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The original address, or `None` before resolution.
    pub fn address(&self) -> Option<usize> {
        match self.0.load(Ordering::Acquire) {
            0 => None,
            addr => Some(addr),
        }
    }

    fn store(&self, address: usize) {
        self.0.store(address, Ordering::Release);
    }
}

/// Lifecycle state of a [`HookRecord`]. The lifecycle is one-shot: there is
/// no path back out of `Uninstalled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookState {
    Uninitialized,
    Resolved,
    Installed,
    Uninstalled,
}

/// One interception: a target symbol, a replacement handle, and the slot the
/// original address is published through.
///
/// A record has a single owner (the init/exit sequence of the embedding
/// module); the engine takes it by `&mut`, which is what makes the
/// install/uninstall pair race-free.
pub struct HookRecord {
    symbol: String,
    replacement: usize,
    original: Arc<OriginalSlot>,
    resolved: Option<usize>,
    state: HookState,
}

impl HookRecord {
    pub fn new(symbol: impl Into<String>, replacement: usize, original: Arc<OriginalSlot>) -> Self {
        Self {
            symbol: symbol.into(),
            replacement,
            original,
            resolved: None,
            state: HookState::Uninitialized,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn state(&self) -> HookState {
        self.state
    }

    pub fn resolved_address(&self) -> Option<usize> {
        self.resolved
    }

    /// True only between a successful install and the uninstall.
    pub fn is_active(&self) -> bool {
        self.state == HookState::Installed
    }
}

/// Drives hook records through their lifecycle against a resolver and a
/// host redirect facility.
pub struct HookEngine {
    resolver: Arc<dyn SymbolResolver>,
    facility: Arc<dyn RedirectFacility>,
    /// Addresses currently claimed by an installed record. One interception
    /// per address; no stacking.
    claimed: Mutex<HashSet<usize>>,
}

impl HookEngine {
    pub fn new(resolver: Arc<dyn SymbolResolver>, facility: Arc<dyn RedirectFacility>) -> Self {
        Self {
            resolver,
            facility,
            claimed: Mutex::new(HashSet::new()),
        }
    }

    /// Resolve the record's symbol and publish the address through its
    /// original-holder slot.
    pub fn resolve(&self, record: &mut HookRecord) -> Result<usize, HookError> {
        match record.state {
            HookState::Uninitialized => {}
            HookState::Uninstalled => return Err(HookError::LifecycleComplete),
            _ => return Err(HookError::AlreadyResolved),
        }

        let Some(address) = self.resolver.lookup(&record.symbol) else {
            warn!("unresolved symbol: {}", record.symbol);
            return Err(HookError::UnresolvedSymbol);
        };

        record.resolved = Some(address);
        record.original.store(address);
        record.state = HookState::Resolved;
        debug!("resolved {} at {:#x}", record.symbol, address);
        Ok(address)
    }

    /// Install the redirect: claim the address, set the per-address filter,
    /// then register the thunk. A failed registration rolls the filter back;
    /// a failed install leaves no state behind.
    pub fn install(&self, record: &mut HookRecord) -> Result<(), HookError> {
        match record.state {
            HookState::Resolved => {}
            HookState::Installed => return Err(HookError::AlreadyInstalled),
            HookState::Uninstalled => return Err(HookError::LifecycleComplete),
            HookState::Uninitialized => return Err(HookError::NotResolved),
        }
        let address = record.resolved.ok_or(HookError::NotResolved)?;

        if !self.claimed.lock().unwrap().insert(address) {
            warn!("address {:#x} already hooked", address);
            return Err(HookError::AlreadyInstalled);
        }

        if let Err(err) = self.facility.set_filter(address) {
            self.claimed.lock().unwrap().remove(&address);
            warn!("address filter rejected for {}: {:?}", record.symbol, err);
            return Err(err);
        }

        if let Err(err) = self
            .facility
            .register(address, RedirectThunk::new(record.replacement))
        {
            // Roll the filter back: a failed install must not leave partial state.
            if let Err(rollback) = self.facility.clear_filter(address) {
                warn!(
                    "filter rollback failed for {}: {:?}",
                    record.symbol, rollback
                );
            }
            self.claimed.lock().unwrap().remove(&address);
            warn!(
                "redirect registration rejected for {}: {:?}",
                record.symbol, err
            );
            return Err(err);
        }

        record.state = HookState::Installed;
        info!("hooked {} at {:#x}", record.symbol, address);
        Ok(())
    }

    /// Tear the redirect down. Both deregistration steps are attempted even
    /// if the first fails; facility errors are logged, never propagated,
    /// because teardown cannot be aborted. The record always leaves as
    /// `Uninstalled`.
    pub fn uninstall(&self, record: &mut HookRecord) -> Result<(), HookError> {
        match record.state {
            HookState::Installed => {}
            HookState::Uninstalled => return Err(HookError::LifecycleComplete),
            _ => return Err(HookError::NotInstalled),
        }
        let address = match record.resolved {
            Some(address) => address,
            None => {
                record.state = HookState::Uninstalled;
                return Err(HookError::NotInstalled);
            }
        };

        if let Err(err) = self.facility.unregister(address) {
            warn!("unregister failed for {}: {:?}", record.symbol, err);
        }
        if let Err(err) = self.facility.clear_filter(address) {
            warn!("filter clear failed for {}: {:?}", record.symbol, err);
        }
        self.claimed.lock().unwrap().remove(&address);

        record.state = HookState::Uninstalled;
        debug!("unhooked {}", record.symbol);
        Ok(())
    }
}
