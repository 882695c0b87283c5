//! API surface entries.

use apisurf_common::SymbolHash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of an [`ApiEntry`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum EntryKind {
    /// A public header file.
    Header,
    /// An exported function.
    Function,
    /// An exported variable.
    Variable,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Header => write!(f, "Header"),
            EntryKind::Function => write!(f, "Function"),
            EntryKind::Variable => write!(f, "Variable"),
        }
    }
}

/// One element of the exported API surface.
///
/// Equality covers every field, so a function whose signature changed is a
/// different entry from its previous form. Header entries carry only a name.
/// The derived ordering sorts by kind, then by name.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum ApiEntry {
    /// A public header file, by its SDK-relative path.
    Header {
        /// The header path, e.g. `furi/core/thread.h`.
        name: String,
    },
    /// An exported function.
    Function {
        /// The symbol name.
        name: String,
        /// The canonical return type.
        return_type: String,
        /// The canonical, comma-joined parameter types.
        params: String,
    },
    /// An exported variable.
    Variable {
        /// The symbol name.
        name: String,
        /// The canonical type.
        ty: String,
    },
}

impl ApiEntry {
    /// Creates a header entry.
    pub fn header(name: impl Into<String>) -> Self {
        ApiEntry::Header { name: name.into() }
    }

    /// Creates a function entry.
    pub fn function(
        name: impl Into<String>,
        return_type: impl Into<String>,
        params: impl Into<String>,
    ) -> Self {
        ApiEntry::Function {
            name: name.into(),
            return_type: return_type.into(),
            params: params.into(),
        }
    }

    /// Creates a variable entry.
    pub fn variable(name: impl Into<String>, ty: impl Into<String>) -> Self {
        ApiEntry::Variable {
            name: name.into(),
            ty: ty.into(),
        }
    }

    /// Returns the entry's name.
    pub fn name(&self) -> &str {
        match self {
            ApiEntry::Header { name }
            | ApiEntry::Function { name, .. }
            | ApiEntry::Variable { name, .. } => name,
        }
    }

    /// Returns the entry's category.
    pub fn kind(&self) -> EntryKind {
        match self {
            ApiEntry::Header { .. } => EntryKind::Header,
            ApiEntry::Function { .. } => EntryKind::Function,
            ApiEntry::Variable { .. } => EntryKind::Variable,
        }
    }

    /// Returns the loader's identifier for this entry's name.
    pub fn symbol_hash(&self) -> SymbolHash {
        SymbolHash::of(self.name())
    }
}

impl fmt::Display for ApiEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiEntry::Header { name } => write!(f, "{name}"),
            ApiEntry::Function {
                name,
                return_type,
                params,
            } => write!(f, "{return_type} {name}({params})"),
            ApiEntry::Variable { name, ty } => write!(f, "{ty} {name}"),
        }
    }
}
