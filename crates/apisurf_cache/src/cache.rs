//! The persisted, historical record of the API surface.

use crate::error::CacheError;
use crate::row::{read_rows, write_rows, Row, RowKind, RowStatus};
use apisurf_common::{SdkVersion, VersionBump};
use apisurf_surface::{ApiEntry, EntryKind};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Every entry ever recorded, the current review state, and the SDK version.
///
/// Loaded once per run, updated in memory by [`apply`](Self::apply), and
/// rewritten wholesale by [`save`](Self::save).
#[derive(Debug)]
pub struct VersionedCache {
    pub(crate) path: PathBuf,
    pub(crate) version: SdkVersion,
    pub(crate) headers: BTreeSet<ApiEntry>,
    pub(crate) functions: BTreeSet<ApiEntry>,
    pub(crate) variables: BTreeSet<ApiEntry>,
    /// Retired entries, kept so their names stay reserved.
    pub(crate) disabled: BTreeSet<ApiEntry>,
    /// Entries added by a run and not yet reviewed.
    pub(crate) pending: BTreeSet<ApiEntry>,
    pub(crate) loaded_dirty: bool,
    pub(crate) bump: VersionBump,
    version_only: bool,
}

impl VersionedCache {
    fn empty(path: &Path, version: SdkVersion) -> Self {
        Self {
            path: path.to_path_buf(),
            version,
            headers: BTreeSet::new(),
            functions: BTreeSet::new(),
            variables: BTreeSet::new(),
            disabled: BTreeSet::new(),
            pending: BTreeSet::new(),
            loaded_dirty: false,
            bump: VersionBump::None,
            version_only: false,
        }
    }

    /// Writes a new, empty cache at `path` with the given version.
    ///
    /// Fails with [`CacheError::AlreadyExists`] if the file exists, unless
    /// `force` is set.
    pub fn create(path: &Path, version: SdkVersion, force: bool) -> Result<Self, CacheError> {
        if path.exists() && !force {
            return Err(CacheError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }
        let cache = Self::empty(path, version);
        cache.save()?;
        tracing::info!(path = %path.display(), %version, "initialized cache");
        Ok(cache)
    }

    /// Loads the full cache from `path`.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let rows = Self::read(path)?;
        let mut rows = rows.into_iter();
        let mut cache = Self::empty(path, SdkVersion::ZERO);

        let version_row = rows.next().ok_or_else(|| malformed(path, "missing version row"))?;
        cache.apply_version_row(path, &version_row)?;

        for row in rows {
            let Some(entry) = row.to_entry() else {
                return Err(malformed(path, "version row must appear exactly once, first"));
            };
            match row.status {
                RowStatus::Live => {}
                RowStatus::Disabled => {
                    cache.disabled.insert(entry.clone());
                }
                RowStatus::Pending => {
                    cache.pending.insert(entry.clone());
                    cache.loaded_dirty = true;
                }
            }
            cache.set_mut(entry.kind()).insert(entry);
        }

        tracing::info!(
            path = %path.display(),
            version = %cache.version,
            headers = cache.headers.len(),
            functions = cache.functions.len(),
            variables = cache.variables.len(),
            "loaded cache"
        );
        if cache.loaded_dirty {
            tracing::warn!(
                pending = cache.pending.len(),
                "cache was saved with unreviewed entries"
            );
        }
        Ok(cache)
    }

    /// Loads only the version row. The result refuses to [`save`](Self::save).
    ///
    /// Plugin builds need the SDK version but not the surface.
    pub fn load_version_only(path: &Path) -> Result<Self, CacheError> {
        let rows = Self::read(path)?;
        let version_row = rows
            .first()
            .ok_or_else(|| malformed(path, "missing version row"))?;
        let mut cache = Self::empty(path, SdkVersion::ZERO);
        cache.apply_version_row(path, version_row)?;
        cache.version_only = true;
        Ok(cache)
    }

    fn read(path: &Path) -> Result<Vec<Row>, CacheError> {
        if !path.exists() {
            return Err(CacheError::Missing {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        read_rows(&text).map_err(|reason| malformed(path, &reason))
    }

    fn apply_version_row(&mut self, path: &Path, row: &Row) -> Result<(), CacheError> {
        if row.kind != RowKind::Version {
            return Err(malformed(path, "first row must be the version row"));
        }
        self.version = row
            .name
            .parse()
            .map_err(|e: apisurf_common::ParseVersionError| malformed(path, &e.to_string()))?;
        match row.status {
            RowStatus::Live => {}
            RowStatus::Pending => self.loaded_dirty = true,
            RowStatus::Disabled => {
                return Err(malformed(path, "version row cannot be disabled"));
            }
        }
        Ok(())
    }

    /// Rewrites the whole cache file.
    ///
    /// Rows are written to a sibling temporary file that then replaces the
    /// cache, so a failed save leaves the previous file intact.
    pub fn save(&self) -> Result<(), CacheError> {
        if self.version_only {
            return Err(CacheError::VersionOnly);
        }
        let text = write_rows(&self.rows())?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        let tmp = temp_path(&self.path);
        std::fs::write(&tmp, text).map_err(|e| io_error(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, e))?;

        tracing::info!(
            path = %self.path.display(),
            version = %self.version,
            pending = self.pending.len(),
            "saved cache"
        );
        Ok(())
    }

    /// The rows of the cache file, in file order.
    pub fn rows(&self) -> Vec<Row> {
        let version_status = if self.pending.is_empty() {
            RowStatus::Live
        } else {
            RowStatus::Pending
        };
        let mut rows = vec![Row {
            kind: RowKind::Version,
            status: version_status,
            name: self.version.to_string(),
            ty: String::new(),
            params: String::new(),
        }];
        for set in [&self.headers, &self.functions, &self.variables] {
            rows.extend(set.iter().map(|entry| Row::from_entry(entry, self.status_of(entry))));
        }
        rows
    }

    fn status_of(&self, entry: &ApiEntry) -> RowStatus {
        if self.disabled.contains(entry) {
            RowStatus::Disabled
        } else if self.pending.contains(entry) {
            RowStatus::Pending
        } else {
            RowStatus::Live
        }
    }

    /// The cache file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current SDK version.
    pub fn version(&self) -> SdkVersion {
        self.version
    }

    /// The bump applied by the last [`apply`](Self::apply) in this process.
    pub fn bump(&self) -> VersionBump {
        self.bump
    }

    /// Whether the file was saved with unreviewed entries.
    pub fn loaded_dirty(&self) -> bool {
        self.loaded_dirty
    }

    /// Whether this cache came from [`load_version_only`](Self::load_version_only).
    pub fn is_version_only(&self) -> bool {
        self.version_only
    }

    /// Every recorded entry of one category, live or retired.
    pub fn known(&self, kind: EntryKind) -> &BTreeSet<ApiEntry> {
        match kind {
            EntryKind::Header => &self.headers,
            EntryKind::Function => &self.functions,
            EntryKind::Variable => &self.variables,
        }
    }

    pub(crate) fn set_mut(&mut self, kind: EntryKind) -> &mut BTreeSet<ApiEntry> {
        match kind {
            EntryKind::Header => &mut self.headers,
            EntryKind::Function => &mut self.functions,
            EntryKind::Variable => &mut self.variables,
        }
    }

    /// Retired entries.
    pub fn disabled(&self) -> &BTreeSet<ApiEntry> {
        &self.disabled
    }

    /// Entries awaiting review.
    pub fn pending_review(&self) -> &BTreeSet<ApiEntry> {
        &self.pending
    }

    /// Entries of one category that are not retired, sorted by name.
    pub fn enabled(&self, kind: EntryKind) -> Vec<&ApiEntry> {
        let mut entries: Vec<&ApiEntry> = self
            .known(kind)
            .iter()
            .filter(|e| !self.disabled.contains(*e))
            .collect();
        entries.sort_by(|a, b| a.name().cmp(b.name()));
        entries
    }

    /// Enabled headers, sorted by name.
    pub fn enabled_headers(&self) -> Vec<&ApiEntry> {
        self.enabled(EntryKind::Header)
    }

    /// Enabled functions, sorted by name.
    pub fn enabled_functions(&self) -> Vec<&ApiEntry> {
        self.enabled(EntryKind::Function)
    }

    /// Enabled variables, sorted by name.
    pub fn enabled_variables(&self) -> Vec<&ApiEntry> {
        self.enabled(EntryKind::Variable)
    }

    /// Returns `true` when firmware and SDK artifacts may be produced: the
    /// version is set, no bump is pending, the file was not saved dirty, and
    /// nothing awaits review.
    pub fn is_buildable(&self) -> bool {
        !self.version.is_sentinel()
            && !self.bump.is_pending()
            && !self.loaded_dirty
            && self.pending.is_empty()
    }

    /// Explains why [`is_buildable`](Self::is_buildable) is false. Empty when
    /// buildable.
    pub fn blockers(&self) -> Vec<String> {
        let mut reasons = Vec::new();
        if self.version.is_sentinel() {
            reasons.push(format!("version is the uninitialized {}", SdkVersion::ZERO));
        }
        if self.bump.is_pending() {
            reasons.push(format!("{} version bump to {} pending", self.bump, self.version));
        }
        if self.loaded_dirty {
            reasons.push("cache was saved with unreviewed entries".to_string());
        }
        if !self.pending.is_empty() {
            let names: Vec<&str> = self.pending.iter().map(ApiEntry::name).collect();
            reasons.push(format!(
                "{} entr{} pending review: {}",
                names.len(),
                if names.len() == 1 { "y" } else { "ies" },
                names.join(", ")
            ));
        }
        reasons
    }
}

fn malformed(path: &Path, reason: &str) -> CacheError {
    CacheError::Malformed {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn io_error(path: &Path, source: std::io::Error) -> CacheError {
    CacheError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, text: &str) -> PathBuf {
        let path = dir.join("api_symbols.json");
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = VersionedCache::load(&dir.path().join("none.json")).unwrap_err();
        assert!(matches!(err, CacheError::Missing { .. }));
    }

    #[test]
    fn create_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sdk/api_symbols.json");
        VersionedCache::create(&path, SdkVersion::new(1, 0), false).unwrap();
        let cache = VersionedCache::load(&path).unwrap();
        assert_eq!(cache.version(), SdkVersion::new(1, 0));
        assert!(cache.is_buildable());
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn create_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api_symbols.json");
        VersionedCache::create(&path, SdkVersion::new(1, 0), false).unwrap();
        let err = VersionedCache::create(&path, SdkVersion::new(2, 0), false).unwrap_err();
        assert!(matches!(err, CacheError::AlreadyExists { .. }));
        VersionedCache::create(&path, SdkVersion::new(2, 0), true).unwrap();
        assert_eq!(
            VersionedCache::load(&path).unwrap().version(),
            SdkVersion::new(2, 0)
        );
    }

    #[test]
    fn sentinel_version_is_not_buildable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api_symbols.json");
        let cache = VersionedCache::create(&path, SdkVersion::ZERO, false).unwrap();
        assert!(!cache.is_buildable());
        assert_eq!(cache.blockers().len(), 1);
    }

    #[test]
    fn statuses_load_into_sets() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            r#"[
{"kind":"Version","status":"?","name":"3.2","type":"","params":""},
{"kind":"Header","status":"+","name":"furi/furi.h","type":"","params":""},
{"kind":"Function","status":"-","name":"old_api","type":"void","params":"void"},
{"kind":"Function","status":"?","name":"new_api","type":"int","params":"int, ..."},
{"kind":"Variable","status":"+","name":"counter","type":"const int","params":""}
]
"#,
        );
        let cache = VersionedCache::load(&path).unwrap();
        assert_eq!(cache.version(), SdkVersion::new(3, 2));
        assert!(cache.loaded_dirty());
        assert_eq!(cache.known(EntryKind::Function).len(), 2);
        assert!(cache
            .disabled()
            .contains(&ApiEntry::function("old_api", "void", "void")));
        assert!(cache
            .pending_review()
            .contains(&ApiEntry::function("new_api", "int", "int, ...")));
        let enabled: Vec<&str> = cache.enabled_functions().iter().map(|e| e.name()).collect();
        assert_eq!(enabled, vec!["new_api"]);
        assert_eq!(cache.enabled_variables().len(), 1);
        assert!(!cache.is_buildable());
    }

    #[test]
    fn save_writes_rows_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api_symbols.json");
        let mut cache = VersionedCache::create(&path, SdkVersion::new(1, 4), false).unwrap();
        cache.variables.insert(ApiEntry::variable("b_var", "int"));
        cache.functions.insert(ApiEntry::function("z_fn", "void", "void"));
        cache.functions.insert(ApiEntry::function("a_fn", "void", "void"));
        cache.headers.insert(ApiEntry::header("m.h"));
        cache.save().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let names: Vec<String> = read_rows(&text)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["1.4", "m.h", "a_fn", "z_fn", "b_var"]);
        assert_eq!(text.lines().count(), 7);
    }

    #[test]
    fn version_only_refuses_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api_symbols.json");
        VersionedCache::create(&path, SdkVersion::new(7, 1), false).unwrap();
        let cache = VersionedCache::load_version_only(&path).unwrap();
        assert_eq!(cache.version(), SdkVersion::new(7, 1));
        assert!(cache.is_version_only());
        assert!(matches!(cache.save(), Err(CacheError::VersionOnly)));
    }

    #[test]
    fn malformed_files_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cases = [
            "not json",
            "[\n]\n",
            r#"[{"kind":"Header","status":"+","name":"a.h","type":"","params":""}]"#,
            r#"[{"kind":"Version","status":"+","name":"one.two","type":"","params":""}]"#,
            r#"[{"kind":"Version","status":"+","name":"1.0","type":"","params":""},
{"kind":"Version","status":"+","name":"1.1","type":"","params":""}]"#,
            r#"[{"kind":"Version","status":"-","name":"1.0","type":"","params":""}]"#,
        ];
        for text in cases {
            let path = write(dir.path(), text);
            let err = VersionedCache::load(&path).unwrap_err();
            assert!(
                matches!(err, CacheError::Malformed { .. }),
                "{text}: {err}"
            );
        }
    }

    #[test]
    fn blockers_explain_pending_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api_symbols.json");
        let mut cache = VersionedCache::create(&path, SdkVersion::new(1, 0), false).unwrap();
        cache.pending.insert(ApiEntry::variable("x", "int"));
        assert_eq!(
            cache.blockers(),
            vec!["1 entry pending review: x".to_string()]
        );
    }
}
