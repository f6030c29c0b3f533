//! Assembly of the filter stack.
//!
//! `FilterRuntime` plays the role the module init/exit sequence plays on a
//! live host: publish the enumeration primitive in a symbol table, resolve
//! and install the hook, dispatch every enumeration call through the host,
//! and on teardown unhook and drain the hidden set.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use log::warn;

use procveil_hook::{
    CallOrigin, CallThroughGuard, HookEngine, HookRecord, LoopbackHost, OriginalSlot,
    RedirectFacility, StaticSymbolTable,
};
use procveil_policy::{HiddenSet, Pid, PidSuccessor, VisibilityFilter};

/// Dispatch keys for the loopback host's function table.
const ORIGINAL_KEY: usize = 0x1000;
const REPLACEMENT_KEY: usize = 0x2000;

/// Address-keyed callables: what the loopback host routes into.
type FunctionTable = Arc<Mutex<HashMap<usize, Arc<dyn PidSuccessor>>>>;

/// Call-through to the original primitive.
///
/// Re-enters the host at the address saved in the original-holder slot, under
/// the call-through guard, so the redirect sees an internal origin and lets
/// the call pass.
struct CallThrough {
    host: Arc<LoopbackHost>,
    functions: FunctionTable,
    original: Arc<OriginalSlot>,
}

impl PidSuccessor for CallThrough {
    fn find_next(&self, cursor: Pid) -> Option<Pid> {
        let _guard = CallThroughGuard::new();
        let address = self.original.address()?;
        let target = self.host.route(address, CallOrigin::current());
        let function = self.functions.lock().unwrap().get(&target).cloned()?;
        function.find_next(cursor)
    }
}

/// The replacement installed over the enumeration symbol. A tripped retry
/// budget is logged and degrades to "absent" rather than taking the caller
/// down.
struct FilteredSuccessor {
    filter: VisibilityFilter,
}

impl PidSuccessor for FilteredSuccessor {
    fn find_next(&self, cursor: Pid) -> Option<Pid> {
        match self.filter.find_next_visible(cursor) {
            Ok(next) => next,
            Err(err) => {
                warn!("{}", err);
                None
            }
        }
    }
}

pub struct FilterRuntime {
    host: Arc<LoopbackHost>,
    engine: HookEngine,
    record: HookRecord,
    functions: FunctionTable,
    hidden: Arc<HiddenSet>,
    entry: usize,
}

impl FilterRuntime {
    /// Wire the stack and install the hook. Fails closed: a resolve or
    /// install error aborts before anything goes live.
    pub fn install(
        symbol: &str,
        base: Arc<dyn PidSuccessor>,
        hidden: Arc<HiddenSet>,
        retry_budget: u32,
    ) -> Result<Self> {
        let host = Arc::new(LoopbackHost::new());
        let functions: FunctionTable = Arc::new(Mutex::new(HashMap::new()));
        functions.lock().unwrap().insert(ORIGINAL_KEY, base);

        let symbols = StaticSymbolTable::new();
        symbols.define(symbol, ORIGINAL_KEY);

        let original = Arc::new(OriginalSlot::new());
        let call_through = CallThrough {
            host: Arc::clone(&host),
            functions: Arc::clone(&functions),
            original: Arc::clone(&original),
        };
        let filter = VisibilityFilter::new(Arc::clone(&hidden), Arc::new(call_through))
            .with_retry_budget(retry_budget);
        functions
            .lock()
            .unwrap()
            .insert(REPLACEMENT_KEY, Arc::new(FilteredSuccessor { filter }));

        let facility: Arc<dyn RedirectFacility> = Arc::clone(&host) as Arc<dyn RedirectFacility>;
        let engine = HookEngine::new(Arc::new(symbols), facility);
        let mut record = HookRecord::new(symbol, REPLACEMENT_KEY, original);
        let entry = engine
            .resolve(&mut record)
            .map_err(|err| anyhow!("cannot resolve {}: {:?}", symbol, err))?;
        engine
            .install(&mut record)
            .map_err(|err| anyhow!("cannot hook {}: {:?}", symbol, err))?;

        Ok(Self {
            host,
            engine,
            record,
            functions,
            hidden,
            entry,
        })
    }

    /// The enumeration entry point external callers use. Routes through the
    /// host exactly like a call arriving at the hooked symbol.
    pub fn find_ge_pid(&self, cursor: Pid) -> Option<Pid> {
        let target = self.host.route(self.entry, CallOrigin::current());
        let function = self.functions.lock().unwrap().get(&target).cloned()?;
        function.find_next(cursor)
    }

    /// Every visible pid from `start` upward.
    pub fn visible_from(&self, start: Pid) -> Vec<Pid> {
        let mut pids = Vec::new();
        let mut cursor = start;
        while let Some(pid) = self.find_ge_pid(cursor) {
            pids.push(pid);
            if pid == Pid::MAX {
                break;
            }
            cursor = pid + 1;
        }
        pids
    }

    pub fn hidden(&self) -> &Arc<HiddenSet> {
        &self.hidden
    }
}

impl Drop for FilterRuntime {
    fn drop(&mut self) {
        if self.record.is_active() {
            if let Err(err) = self.engine.uninstall(&mut self.record) {
                warn!("unhook failed for {}: {:?}", self.record.symbol(), err);
            }
        }
        // Outstanding hidden entries must not outlive the module.
        self.hidden.clear();
        // The replacement's call-through references this table; clearing it
        // breaks the Arc cycle.
        self.functions.lock().unwrap().clear();
    }
}
