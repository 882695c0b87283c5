//! The persisted row format.
//!
//! The cache file is a JSON array with exactly one row object per line, so
//! version-control diffs of the surface stay one line per entry:
//!
//! ```text
//! [
//! {"kind":"Version","status":"+","name":"1.4","type":"","params":""},
//! {"kind":"Function","status":"?","name":"furi_delay_ms","type":"void","params":"uint32_t"}
//! ]
//! ```

use crate::error::CacheError;
use apisurf_surface::{ApiEntry, EntryKind};
use serde::{Deserialize, Serialize};

/// What a row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowKind {
    /// The SDK version; always the first row.
    Version,
    /// A public header.
    Header,
    /// An exported function.
    Function,
    /// An exported variable.
    Variable,
}

impl From<EntryKind> for RowKind {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Header => RowKind::Header,
            EntryKind::Function => RowKind::Function,
            EntryKind::Variable => RowKind::Variable,
        }
    }
}

/// The review status of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowStatus {
    /// Part of the live surface.
    #[serde(rename = "+")]
    Live,
    /// Retired; its name stays reserved.
    #[serde(rename = "-")]
    Disabled,
    /// Added by a recent run and not yet reviewed.
    #[serde(rename = "?")]
    Pending,
}

/// One line of the cache file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Row {
    /// What the row records.
    pub kind: RowKind,
    /// The review status.
    pub status: RowStatus,
    /// The entry name, or `major.minor` for the version row.
    pub name: String,
    /// Return type for functions, type for variables, empty otherwise.
    #[serde(rename = "type")]
    pub ty: String,
    /// Parameter list for functions, empty otherwise.
    pub params: String,
}

impl Row {
    /// Builds the row for an entry.
    pub fn from_entry(entry: &ApiEntry, status: RowStatus) -> Self {
        let (ty, params) = match entry {
            ApiEntry::Header { .. } => (String::new(), String::new()),
            ApiEntry::Function {
                return_type,
                params,
                ..
            } => (return_type.clone(), params.clone()),
            ApiEntry::Variable { ty, .. } => (ty.clone(), String::new()),
        };
        Row {
            kind: entry.kind().into(),
            status,
            name: entry.name().to_string(),
            ty,
            params,
        }
    }

    /// Converts the row back to an entry. Returns `None` for the version row.
    pub fn to_entry(&self) -> Option<ApiEntry> {
        match self.kind {
            RowKind::Version => None,
            RowKind::Header => Some(ApiEntry::header(&self.name)),
            RowKind::Function => Some(ApiEntry::function(&self.name, &self.ty, &self.params)),
            RowKind::Variable => Some(ApiEntry::variable(&self.name, &self.ty)),
        }
    }
}

/// Serializes rows as a JSON array with one row per line.
pub fn write_rows(rows: &[Row]) -> Result<String, CacheError> {
    let lines = rows
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
    if lines.is_empty() {
        return Ok("[\n]\n".to_string());
    }
    Ok(format!("[\n{}\n]\n", lines.join(",\n")))
}

/// Parses the rows of a cache file. Errors carry only the reason; the caller
/// attaches the path.
pub fn read_rows(text: &str) -> Result<Vec<Row>, String> {
    serde_json::from_str(text).map_err(|e| e.to_string())
}
