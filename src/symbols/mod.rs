//! Address to symbol-name resolution.
//!
//! Only a name is produced, never a source location. Resolution must not
//! fail: an address with no known symbol gets a hex placeholder.

use crate::utils::config::SYMBOL_NAME_MAX;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resolves return addresses to human-readable names.
///
/// Implementations must be safe for concurrent lookups.
pub trait SymbolResolver: Send + Sync {
    /// Name for `address`, at most `SYMBOL_NAME_MAX` bytes
    fn resolve(&self, address: u32) -> String;
}

impl<F> SymbolResolver for F
where
    F: Fn(u32) -> String + Send + Sync,
{
    fn resolve(&self, address: u32) -> String {
        bounded_name(&self(address))
    }
}

/// Placeholder name for an address with no symbol
pub fn placeholder(address: u32) -> String {
    format!("0x{address:08x}")
}

/// Clamp a name to `SYMBOL_NAME_MAX` bytes on a char boundary
pub fn bounded_name(name: &str) -> String {
    if name.len() <= SYMBOL_NAME_MAX {
        return name.to_string();
    }

    let mut end = SYMBOL_NAME_MAX;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

/// One named code range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub address: u32,
    pub name: String,

    /// Length in bytes; without it the symbol runs up to the next one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

impl Symbol {
    pub fn new(address: u32, name: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
            size: None,
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    fn contains(&self, address: u32) -> bool {
        match self.size {
            Some(size) => u64::from(address) < u64::from(self.address) + u64::from(size),
            None => true,
        }
    }
}

/// Symbol table searched by start address
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    by_start: BTreeMap<u32, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol, replacing any previous one at the same address
    pub fn insert(&mut self, symbol: Symbol) {
        self.by_start.insert(symbol.address, symbol);
    }

    /// Symbol whose range contains `address`
    pub fn lookup(&self, address: u32) -> Option<&Symbol> {
        self.by_start
            .range(..=address)
            .next_back()
            .map(|(_, symbol)| symbol)
            .filter(|symbol| symbol.contains(address))
    }

    pub fn len(&self) -> usize {
        self.by_start.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_start.is_empty()
    }
}

impl FromIterator<Symbol> for SymbolTable {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        let mut table = Self::new();
        for symbol in iter {
            table.insert(symbol);
        }
        table
    }
}

impl SymbolResolver for SymbolTable {
    fn resolve(&self, address: u32) -> String {
        match self.lookup(address) {
            Some(symbol) if !symbol.name.is_empty() => bounded_name(&symbol.name),
            _ => placeholder(address),
        }
    }
}
