//! A loaded header with line-start indexing for line/column lookup.

use crate::span::FileId;
use std::path::PathBuf;

/// A header loaded into an extraction run.
pub struct SourceFile {
    /// The identifier of this file within its [`SourceDb`](crate::SourceDb).
    pub id: FileId,
    /// The SDK-relative header name, e.g. `furi/core/thread.h`.
    pub name: String,
    /// Where the text was read from (the name itself for in-memory sources).
    pub path: PathBuf,
    /// The full text of the header.
    pub content: String,
    line_starts: Vec<u32>,
}

impl SourceFile {
    /// Creates a new `SourceFile`, indexing its line starts.
    pub fn new(id: FileId, name: String, path: PathBuf, content: String) -> Self {
        let line_starts = std::iter::once(0)
            .chain(
                content
                    .bytes()
                    .enumerate()
                    .filter(|&(_, b)| b == b'\n')
                    .map(|(i, _)| (i + 1) as u32),
            )
            .collect();
        Self {
            id,
            name,
            path,
            content,
            line_starts,
        }
    }

    /// Converts a byte offset into 1-indexed (line, column) coordinates.
    pub fn line_col(&self, byte_offset: u32) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&byte_offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line_idx).copied().unwrap_or(0);
        ((line_idx as u32) + 1, byte_offset - line_start + 1)
    }

    /// Returns the full text of the line containing `byte_offset`, without
    /// its terminator.
    pub fn line_text(&self, byte_offset: u32) -> &str {
        let offset = (byte_offset as usize).min(self.content.len());
        let start = self.content[..offset].rfind('\n').map_or(0, |i| i + 1);
        let end = self.content[offset..]
            .find('\n')
            .map_or(self.content.len(), |i| offset + i);
        self.content[start..end].trim_end_matches('\r')
    }

    /// Returns the text between two byte offsets.
    pub fn snippet(&self, start: u32, end: u32) -> &str {
        self.content
            .get(start as usize..end as usize)
            .unwrap_or_default()
    }
}
