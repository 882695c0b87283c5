//! The set of entries discovered in one extraction run.

use crate::entry::{ApiEntry, EntryKind};
use crate::error::SurfaceError;
use apisurf_common::SymbolHash;
use std::collections::{BTreeSet, HashMap};

/// Accumulates the headers, functions and variables found in the current run.
///
/// After every successful [`register`](Self::register), each symbol name maps
/// to exactly one signature and no two symbol names share a [`SymbolHash`].
/// Headers are never exported by hash, so only symbols take part in those
/// checks.
#[derive(Debug, Default)]
pub struct SymbolRegistry {
    headers: BTreeSet<ApiEntry>,
    functions: BTreeSet<ApiEntry>,
    variables: BTreeSet<ApiEntry>,
    /// Name that produced each hash.
    names_by_hash: HashMap<SymbolHash, String>,
    /// The registered symbol for each name.
    symbols_by_name: HashMap<String, ApiEntry>,
}

impl SymbolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entry.
    ///
    /// Registering an identical entry again is a no-op. A symbol whose name
    /// hashes like a different registered name fails with
    /// [`SurfaceError::HashCollision`]; a second signature for a registered
    /// name fails with [`SurfaceError::Redeclaration`]. A failed registration
    /// leaves the registry unchanged.
    pub fn register(&mut self, entry: ApiEntry) -> Result<(), SurfaceError> {
        if self.set(entry.kind()).contains(&entry) {
            tracing::trace!(entry = %entry, "already registered");
            return Ok(());
        }

        if entry.kind() != EntryKind::Header {
            let name = entry.name();
            let hash = entry.symbol_hash();
            if let Some(first) = self.names_by_hash.get(&hash) {
                if first != name {
                    return Err(SurfaceError::HashCollision {
                        hash,
                        first: first.clone(),
                        second: name.to_string(),
                    });
                }
            }
            if let Some(previous) = self.symbols_by_name.get(name) {
                return Err(SurfaceError::Redeclaration {
                    name: name.to_string(),
                    previous: previous.to_string(),
                    current: entry.to_string(),
                });
            }
            self.names_by_hash.insert(hash, name.to_string());
            self.symbols_by_name.insert(name.to_string(), entry.clone());
        }

        tracing::debug!(kind = %entry.kind(), entry = %entry, "registered");
        self.set_mut(entry.kind()).insert(entry);
        Ok(())
    }

    /// The headers registered in this run.
    pub fn headers(&self) -> &BTreeSet<ApiEntry> {
        &self.headers
    }

    /// The functions registered in this run.
    pub fn functions(&self) -> &BTreeSet<ApiEntry> {
        &self.functions
    }

    /// The variables registered in this run.
    pub fn variables(&self) -> &BTreeSet<ApiEntry> {
        &self.variables
    }

    /// The entries of one category.
    pub fn set(&self, kind: EntryKind) -> &BTreeSet<ApiEntry> {
        match kind {
            EntryKind::Header => &self.headers,
            EntryKind::Function => &self.functions,
            EntryKind::Variable => &self.variables,
        }
    }

    fn set_mut(&mut self, kind: EntryKind) -> &mut BTreeSet<ApiEntry> {
        match kind {
            EntryKind::Header => &mut self.headers,
            EntryKind::Function => &mut self.functions,
            EntryKind::Variable => &mut self.variables,
        }
    }

    /// Total number of registered entries.
    pub fn len(&self) -> usize {
        self.headers.len() + self.functions.len() + self.variables.len()
    }

    /// Returns `true` if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
