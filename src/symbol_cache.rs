//! Process-wide cache of resolved frame symbols.
//!
//! Resolving an instruction address against debug info is by far the most
//! expensive step of call-site capture. A given call site always returns to
//! the same addresses, so each address is resolved once and its demangled
//! symbols are reused by every later capture, from any thread.
//!
//! # Thread Safety
//!
//! Lookups take a shared read lock. A miss resolves the address without
//! holding any lock and then inserts under the write lock; two threads racing
//! on the same miss resolve it twice and store identical values.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::RwLock;

/// One function found at an address, with the source position the address
/// maps to inside that function when debug info provides it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    name: String,
    file: Option<PathBuf>,
    line: Option<u32>,
}

impl Symbol {
    /// Demangled path without the trailing hash (`crate::module::function`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn line(&self) -> Option<u32> {
        self.line
    }
}

/// Symbols found at one address, innermost inlined function first.
pub type Symbols = Arc<[Symbol]>;

lazy_static! {
    static ref SYMBOLS: RwLock<HashMap<usize, Symbols>> = RwLock::new(HashMap::new());
}

/// Returns the symbols at `ip`, resolving on first use.
///
/// An address without symbol information yields an empty slice, which is
/// cached as well so that it is not looked up again. Without debug info a
/// symbol still has a name but no file or line.
///
/// # Examples
///
/// ```
/// # use elastic_logger::symbol_cache::{resolve, cached_addresses};
/// let mut ip = 0usize;
/// backtrace::trace(|frame| {
///     ip = frame.ip() as usize;
///     false
/// });
/// let first = resolve(ip);
/// let second = resolve(ip);
/// assert_eq!(first, second);
/// assert!(cached_addresses() >= 1);
/// ```
pub fn resolve(ip: usize) -> Symbols {
    if let Some(symbols) = SYMBOLS.read().get(&ip) {
        return symbols.clone();
    }

    let mut symbols = Vec::new();
    backtrace::resolve(ip as *mut std::ffi::c_void, |symbol| {
        if let Some(name) = symbol.name() {
            symbols.push(Symbol {
                name: format!("{:#}", name),
                file: symbol.filename().map(Path::to_path_buf),
                line: symbol.lineno(),
            });
        }
    });
    let symbols: Symbols = symbols.into();

    SYMBOLS.write().entry(ip).or_insert(symbols).clone()
}

/// Number of addresses currently cached.
pub fn cached_addresses() -> usize {
    SYMBOLS.read().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[inline(never)]
    fn current_ip() -> usize {
        let mut ip = 0;
        backtrace::trace(|frame| {
            let symbols = resolve(frame.ip() as usize);
            if symbols.iter().any(|symbol| symbol.name().ends_with("current_ip")) {
                ip = frame.ip() as usize;
                return false;
            }
            true
        });
        ip
    }

    #[test]
    fn test_resolves_own_frame() {
        let ip = current_ip();
        assert_ne!(ip, 0, "frame of current_ip should be found");
        let symbols = resolve(ip);
        assert!(symbols
            .iter()
            .any(|symbol| symbol.name().contains("symbol_cache::tests::current_ip")));
    }

    #[test]
    fn test_source_file_when_debug_info_present() {
        let symbols = resolve(current_ip());
        let own = symbols
            .iter()
            .find(|symbol| symbol.name().ends_with("current_ip"))
            .unwrap();
        if let Some(file) = own.file() {
            assert!(file.ends_with("src/symbol_cache.rs"), "unexpected file {:?}", file);
            assert!(own.line().is_some());
        }
    }

    #[test]
    fn test_repeated_lookup_shares_entry() {
        let ip = current_ip();
        let first = resolve(ip);
        let second = resolve(ip);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_unknown_address_is_empty() {
        assert!(resolve(1).is_empty());
    }
}
