//! The downstream export view of a buildable cache.
//!
//! SDK packaging needs the enabled header names; the firmware's export table
//! needs every enabled symbol with its name hash; both embed the version.

use crate::cache::VersionedCache;
use crate::error::CacheError;
use apisurf_common::{InternalError, SdkVersion, SymbolHash};
use apisurf_surface::{ApiEntry, EntryKind};
use serde::Serialize;
use std::fmt::Write;

/// One exported function or variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedSymbol {
    /// Function or variable.
    pub kind: EntryKind,
    /// The symbol name.
    pub name: String,
    /// The loader's identifier for `name`.
    pub hash: SymbolHash,
    /// Return type for functions, type for variables.
    #[serde(rename = "type")]
    pub ty: String,
    /// Parameter list for functions, empty for variables.
    pub params: String,
}

/// Everything downstream generators consume from one SDK revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportManifest {
    /// The SDK version.
    pub version: SdkVersion,
    /// Enabled header names, sorted.
    pub headers: Vec<String>,
    /// Enabled functions and variables, sorted by name.
    pub symbols: Vec<ExportedSymbol>,
}

impl ExportManifest {
    /// Builds the manifest. Fails with [`CacheError::NotBuildable`] unless
    /// the cache is buildable.
    pub fn from_cache(cache: &VersionedCache) -> Result<Self, CacheError> {
        if !cache.is_buildable() {
            return Err(CacheError::NotBuildable {
                reasons: cache.blockers(),
            });
        }

        let headers = cache
            .enabled_headers()
            .into_iter()
            .map(|e| e.name().to_string())
            .collect();

        let mut symbols = cache
            .enabled_functions()
            .into_iter()
            .chain(cache.enabled_variables())
            .map(exported)
            .collect::<Result<Vec<_>, _>>()?;
        symbols.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Self {
            version: cache.version(),
            headers,
            symbols,
        })
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, CacheError> {
        serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })
    }

    /// A plain listing: the version, then headers, then symbols with hashes.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "version {}", self.version);
        for header in &self.headers {
            let _ = writeln!(out, "header {header}");
        }
        for sym in &self.symbols {
            let _ = match sym.kind {
                EntryKind::Function => writeln!(
                    out,
                    "{} function {} {}({})",
                    sym.hash, sym.ty, sym.name, sym.params
                ),
                _ => writeln!(out, "{} variable {} {}", sym.hash, sym.ty, sym.name),
            };
        }
        out
    }
}

fn exported(entry: &ApiEntry) -> Result<ExportedSymbol, CacheError> {
    let hash = entry.symbol_hash();
    match entry {
        ApiEntry::Function {
            name,
            return_type,
            params,
        } => Ok(ExportedSymbol {
            kind: EntryKind::Function,
            name: name.clone(),
            hash,
            ty: return_type.clone(),
            params: params.clone(),
        }),
        ApiEntry::Variable { name, ty } => Ok(ExportedSymbol {
            kind: EntryKind::Variable,
            name: name.clone(),
            hash,
            ty: ty.clone(),
            params: String::new(),
        }),
        ApiEntry::Header { name } => {
            Err(InternalError::new(format!("header '{name}' found among symbols")).into())
        }
    }
}
