//! Symbol resolution.
//!
//! The engine never looks up addresses itself; it asks a [`SymbolResolver`].
//! [`DlSymbolResolver`] queries the dynamic loader of the running process;
//! [`StaticSymbolTable`] is an in-memory table for loopback hosts and tests.

use std::collections::HashMap;
use std::sync::Mutex;

#[cfg(unix)]
use log::debug;

/// Looks up the current runtime address of a symbol.
pub trait SymbolResolver: Send + Sync {
    /// Address of `name`, or `None` if the host cannot locate it (absent,
    /// stripped, or renamed).
    fn lookup(&self, name: &str) -> Option<usize>;
}

/// In-memory symbol table. Addresses are whatever handles the surrounding
/// host uses as dispatch keys.
#[derive(Debug, Default)]
pub struct StaticSymbolTable {
    entries: Mutex<HashMap<String, usize>>,
}

impl StaticSymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `address`, replacing any previous binding.
    pub fn define(&self, name: &str, address: usize) {
        self.entries
            .lock()
            .unwrap()
            .insert(name.to_string(), address);
    }
}

impl SymbolResolver for StaticSymbolTable {
    fn lookup(&self, name: &str) -> Option<usize> {
        self.entries.lock().unwrap().get(name).copied()
    }
}

/// Resolver backed by the dynamic loader: global export lookup across every
/// object loaded into the current process.
#[cfg(unix)]
#[derive(Debug, Default)]
pub struct DlSymbolResolver;

#[cfg(unix)]
impl DlSymbolResolver {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl SymbolResolver for DlSymbolResolver {
    fn lookup(&self, name: &str) -> Option<usize> {
        let cname = std::ffi::CString::new(name).ok()?;
        let addr = unsafe { libc::dlsym(libc::RTLD_DEFAULT, cname.as_ptr()) };
        if addr.is_null() {
            debug!("dlsym found no global export for {}", name);
            None
        } else {
            Some(addr as usize)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_table_lookup() {
        let table = StaticSymbolTable::new();
        table.define("find_ge_pid", 0x1000);
        assert_eq!(table.lookup("find_ge_pid"), Some(0x1000));
        assert_eq!(table.lookup("find_get_pid"), None);
    }

    #[test]
    fn test_static_table_redefine_wins() {
        let table = StaticSymbolTable::new();
        table.define("sym", 1);
        table.define("sym", 2);
        assert_eq!(table.lookup("sym"), Some(2));
    }

    #[cfg(unix)]
    #[test]
    fn test_dl_resolver_finds_libc_export() {
        let resolver = DlSymbolResolver::new();
        let addr = resolver.lookup("malloc");
        assert!(addr.is_some(), "malloc should resolve in any unix process");
        assert_ne!(addr.unwrap(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_dl_resolver_misses_unknown_symbol() {
        let resolver = DlSymbolResolver::new();
        assert_eq!(resolver.lookup("procveil_no_such_symbol_xyz"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_dl_resolver_rejects_interior_nul() {
        let resolver = DlSymbolResolver::new();
        assert_eq!(resolver.lookup("mal\0loc"), None);
    }
}
