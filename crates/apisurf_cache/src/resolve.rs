//! Review resolution of pending entries.

use crate::cache::VersionedCache;
use crate::error::CacheError;
use apisurf_common::InternalError;
use apisurf_surface::ApiEntry;
use std::fmt;

/// What to do with a pending entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Keep it as part of the live surface.
    Accept,
    /// Retire it as a tombstone.
    Disable,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Accept => write!(f, "accepted"),
            Resolution::Disable => write!(f, "disabled"),
        }
    }
}

/// Which pending entries to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every pending entry.
    All,
    /// Pending entries with these names.
    Names(Vec<String>),
}

impl VersionedCache {
    /// Resolves pending entries and returns them, sorted by name.
    ///
    /// Every named entry must be pending; otherwise nothing is changed and
    /// [`CacheError::NotPending`] names the first offender.
    pub fn resolve(
        &mut self,
        selection: &Selection,
        resolution: Resolution,
    ) -> Result<Vec<ApiEntry>, CacheError> {
        let mut chosen: Vec<ApiEntry> = match selection {
            Selection::All => self.pending.iter().cloned().collect(),
            Selection::Names(names) => {
                let mut chosen = Vec::new();
                for name in names {
                    let before = chosen.len();
                    chosen.extend(self.pending.iter().filter(|e| e.name() == name).cloned());
                    if chosen.len() == before {
                        return Err(CacheError::NotPending { name: name.clone() });
                    }
                }
                chosen
            }
        };
        chosen.sort_by(|a, b| a.name().cmp(b.name()));
        chosen.dedup();

        for entry in &chosen {
            if !self.known(entry.kind()).contains(entry) {
                return Err(InternalError::new(format!(
                    "pending entry '{entry}' is not a known {}",
                    entry.kind()
                ))
                .into());
            }
        }

        for entry in &chosen {
            self.pending.remove(entry);
            if resolution == Resolution::Disable {
                self.disabled.insert(entry.clone());
            }
            tracing::info!(kind = %entry.kind(), entry = %entry, "{resolution}");
        }
        Ok(chosen)
    }

    /// Accepts pending entries as live.
    pub fn accept(&mut self, selection: &Selection) -> Result<Vec<ApiEntry>, CacheError> {
        self.resolve(selection, Resolution::Accept)
    }

    /// Retires pending entries.
    pub fn disable(&mut self, selection: &Selection) -> Result<Vec<ApiEntry>, CacheError> {
        self.resolve(selection, Resolution::Disable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apisurf_common::SdkVersion;

    fn dirty_cache(dir: &std::path::Path) -> VersionedCache {
        let path = dir.join("api_symbols.json");
        std::fs::write(
            &path,
            r#"[
{"kind":"Version","status":"?","name":"1.5","type":"","params":""},
{"kind":"Function","status":"?","name":"furi_new","type":"void","params":"void"},
{"kind":"Variable","status":"?","name":"furi_count","type":"int","params":""}
]
"#,
        )
        .unwrap();
        VersionedCache::load(&path).unwrap()
    }

    #[test]
    fn accept_named_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = dirty_cache(dir.path());
        let accepted = cache
            .accept(&Selection::Names(vec!["furi_new".into()]))
            .unwrap();
        assert_eq!(accepted, vec![ApiEntry::function("furi_new", "void", "void")]);
        assert_eq!(cache.pending_review().len(), 1);
        assert!(cache.disabled().is_empty());
    }

    #[test]
    fn disable_all_then_reload_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = dirty_cache(dir.path());
        let disabled = cache.disable(&Selection::All).unwrap();
        assert_eq!(disabled.len(), 2);
        assert_eq!(disabled[0].name(), "furi_count");
        cache.save().unwrap();

        let cache = VersionedCache::load(cache.path()).unwrap();
        assert!(!cache.loaded_dirty());
        assert!(cache.is_buildable());
        assert_eq!(cache.disabled().len(), 2);
        assert_eq!(cache.version(), SdkVersion::new(1, 5));
        assert!(cache.enabled_functions().is_empty());
    }

    #[test]
    fn unknown_name_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = dirty_cache(dir.path());
        let err = cache
            .accept(&Selection::Names(vec!["furi_new".into(), "nope".into()]))
            .unwrap_err();
        assert!(matches!(err, CacheError::NotPending { ref name } if name == "nope"));
        assert_eq!(cache.pending_review().len(), 2);
    }

    #[test]
    fn selection_all_on_clean_cache_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api_symbols.json");
        let mut cache = VersionedCache::create(&path, SdkVersion::new(1, 0), false).unwrap();
        assert!(cache.accept(&Selection::All).unwrap().is_empty());
    }
}
