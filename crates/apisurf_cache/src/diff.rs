//! The diff and version-bump engine.
//!
//! Compares a fresh extraction against the cache, moves entries between the
//! status sets, and decides how the SDK version changes.

use crate::cache::VersionedCache;
use apisurf_common::{SdkVersion, VersionBump};
use apisurf_surface::{ApiEntry, EntryKind, SymbolRegistry};
use std::collections::BTreeSet;
use std::fmt;

const CATEGORIES: [EntryKind; 3] = [EntryKind::Header, EntryKind::Function, EntryKind::Variable];

/// Added and removed entries of one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryDiff {
    /// Entries present in the extraction but not in the cache.
    pub added: Vec<ApiEntry>,
    /// Entries present in the cache but not in the extraction.
    pub removed: Vec<ApiEntry>,
}

impl CategoryDiff {
    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// The outcome of [`VersionedCache::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffReport {
    /// Header changes.
    pub headers: CategoryDiff,
    /// Function changes.
    pub functions: CategoryDiff,
    /// Variable changes.
    pub variables: CategoryDiff,
    /// The bump this diff applied.
    pub bump: VersionBump,
    /// Version before the diff.
    pub old_version: SdkVersion,
    /// Version after the diff.
    pub new_version: SdkVersion,
    /// Every entry awaiting review after the diff, sorted by name.
    pub pending: Vec<ApiEntry>,
}

impl DiffReport {
    /// The changes of one category.
    pub fn category(&self, kind: EntryKind) -> &CategoryDiff {
        match kind {
            EntryKind::Header => &self.headers,
            EntryKind::Function => &self.functions,
            EntryKind::Variable => &self.variables,
        }
    }

    fn category_mut(&mut self, kind: EntryKind) -> &mut CategoryDiff {
        match kind {
            EntryKind::Header => &mut self.headers,
            EntryKind::Function => &mut self.functions,
            EntryKind::Variable => &mut self.variables,
        }
    }

    /// Returns `true` if no category changed.
    pub fn is_unchanged(&self) -> bool {
        CATEGORIES.iter().all(|k| self.category(*k).is_empty())
    }
}

impl fmt::Display for DiffReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for kind in CATEGORIES {
            let diff = self.category(kind);
            let kind = kind.to_string();
            for entry in &diff.added {
                writeln!(f, "  + {kind:<8} {entry}")?;
            }
            for entry in &diff.removed {
                writeln!(f, "  - {kind:<8} {entry}")?;
            }
        }
        if self.bump.is_pending() {
            writeln!(
                f,
                "  {} bump: {} -> {}",
                self.bump, self.old_version, self.new_version
            )?;
        } else {
            writeln!(f, "  version {} unchanged", self.new_version)?;
        }
        Ok(())
    }
}

impl VersionedCache {
    /// Diffs a fresh extraction into the cache and bumps the version.
    ///
    /// Additions go live as pending review and require a minor bump. Removing
    /// a live entry requires a major bump; removing a retired or unreviewed
    /// one does not. At most one bump is applied per call.
    pub fn apply(&mut self, fresh: &SymbolRegistry) -> DiffReport {
        let old_version = self.version;
        let mut bump = VersionBump::None;
        let mut report = DiffReport {
            headers: CategoryDiff::default(),
            functions: CategoryDiff::default(),
            variables: CategoryDiff::default(),
            bump,
            old_version,
            new_version: old_version,
            pending: Vec::new(),
        };

        for kind in CATEGORIES {
            let diff = self.diff_category(fresh.set(kind), kind, &mut bump);
            *report.category_mut(kind) = diff;
        }

        self.bump.raise(bump);
        self.version = self.version.bumped(bump);
        report.bump = bump;
        report.new_version = self.version;

        let mut pending: Vec<ApiEntry> = self.pending.iter().cloned().collect();
        pending.sort_by(|a, b| a.name().cmp(b.name()));
        report.pending = pending;

        if bump.is_pending() {
            tracing::info!(%bump, from = %old_version, to = %self.version, "version bumped");
        } else {
            tracing::info!(version = %self.version, "surface unchanged");
        }
        if self.loaded_dirty {
            tracing::warn!("cache was loaded with unreviewed entries");
        }
        for entry in &report.pending {
            tracing::warn!(kind = %entry.kind(), entry = %entry, "pending review");
        }
        report
    }

    fn diff_category(
        &mut self,
        fresh: &BTreeSet<ApiEntry>,
        kind: EntryKind,
        bump: &mut VersionBump,
    ) -> CategoryDiff {
        let known = self.known(kind);
        let added: Vec<ApiEntry> = fresh.difference(known).cloned().collect();
        let removed: Vec<ApiEntry> = known.difference(fresh).cloned().collect();

        for entry in &added {
            tracing::debug!(%kind, entry = %entry, "added");
            self.set_mut(kind).insert(entry.clone());
            self.pending.insert(entry.clone());
        }
        if !added.is_empty() {
            bump.raise(VersionBump::Minor);
        }

        for entry in &removed {
            self.set_mut(kind).remove(entry);
            let was_disabled = self.disabled.remove(entry);
            let was_pending = self.pending.remove(entry);
            if !was_disabled && !was_pending {
                tracing::debug!(%kind, entry = %entry, "live entry removed");
                bump.raise(VersionBump::Major);
            } else {
                tracing::debug!(%kind, entry = %entry, "unpublished entry removed");
            }
        }

        CategoryDiff { added, removed }
    }
}
