//! The versioned surface across successive runs, on disk.

use apisurf_cache::{ExportManifest, Selection, VersionedCache};
use apisurf_common::{SdkVersion, VersionBump};
use apisurf_conformance::SdkProject;
use apisurf_surface::{ApiEntry, EntryKind};

const THREAD_H: &str = "\
#pragma once
#include <stdint.h>
#ifdef __cplusplus
extern \"C\" {
#endif

typedef struct FuriThread FuriThread;
typedef int32_t (*FuriThreadCallback)(void* context);

FuriThread* furi_thread_alloc(void);
void furi_thread_free(FuriThread* thread);
void furi_thread_set_callback(FuriThread* thread, FuriThreadCallback callback);

static inline int furi_thread_is_valid(FuriThread* thread) {
    return thread != 0;
}

#ifdef __cplusplus
}
#endif
";

/// A project with `thread.h` recorded, reviewed and clean at 1.4.
fn clean_project() -> SdkProject {
    let mut project = SdkProject::new();
    project.write_header("furi/thread.h", THREAD_H);
    project.init(SdkVersion::new(1, 3)).unwrap();
    let cache = project.settle().unwrap();
    assert_eq!(cache.version(), SdkVersion::new(1, 4));
    assert!(cache.is_buildable());
    project
}

#[test]
fn first_run_records_everything_as_pending() {
    let mut project = SdkProject::new();
    project.write_header("furi/thread.h", THREAD_H);
    project.init(SdkVersion::new(1, 0)).unwrap();

    let outcome = project.update().unwrap();
    assert_eq!(outcome.report.headers.added.len(), 1);
    assert_eq!(outcome.report.functions.added.len(), 3);
    assert_eq!(outcome.report.bump, VersionBump::Minor);
    assert_eq!(outcome.cache.version(), SdkVersion::new(1, 1));
    assert_eq!(outcome.cache.pending_review().len(), 4);
    assert!(!outcome.cache.is_buildable());

    let reloaded = project.load().unwrap();
    assert!(reloaded.loaded_dirty());
    assert!(project.cache_text().contains(r#"{"kind":"Version","status":"?","name":"1.1""#));
}

#[test]
fn idempotent_on_unchanged_headers() {
    let project = clean_project();
    let before = project.cache_text();

    let outcome = project.update().unwrap();
    assert!(outcome.report.is_unchanged());
    assert_eq!(outcome.report.bump, VersionBump::None);
    assert_eq!(outcome.cache.version(), SdkVersion::new(1, 4));
    assert!(outcome.cache.is_buildable());
    assert_eq!(project.cache_text(), before);

    let again = project.update().unwrap();
    assert!(again.report.is_unchanged());
    assert_eq!(project.cache_text(), before);
}

#[test]
fn round_trip_preserves_state() {
    let mut project = clean_project();
    project.write_header("furi/extra.h", "extern int furi_extra;\nvoid furi_more(void);");
    let mut outcome = project.update().unwrap();
    outcome
        .cache
        .disable(&Selection::Names(vec!["furi_more".into()]))
        .unwrap();
    outcome.cache.save().unwrap();
    let saved = outcome.cache;

    let loaded = project.load().unwrap();
    assert_eq!(loaded.version(), saved.version());
    for kind in [EntryKind::Header, EntryKind::Function, EntryKind::Variable] {
        assert_eq!(loaded.known(kind), saved.known(kind));
    }
    assert_eq!(loaded.disabled(), saved.disabled());
    assert_eq!(loaded.pending_review(), saved.pending_review());

    loaded.save().unwrap();
    let text = project.cache_text();
    VersionedCache::load(&project.cache_path()).unwrap().save().unwrap();
    assert_eq!(project.cache_text(), text);
}

#[test]
fn removing_live_function_bumps_major() {
    let mut project = clean_project();
    project.write_header(
        "furi/thread.h",
        &THREAD_H.replace("void furi_thread_free(FuriThread* thread);\n", ""),
    );

    let outcome = project.update().unwrap();
    let foo = ApiEntry::function("furi_thread_free", "void", "FuriThread*");
    assert_eq!(outcome.report.functions.removed, vec![foo.clone()]);
    assert_eq!(outcome.cache.version(), SdkVersion::new(2, 0));
    assert!(!outcome.cache.known(EntryKind::Function).contains(&foo));
    assert!(!outcome.cache.is_buildable());
    assert!(ExportManifest::from_cache(&outcome.cache).is_err());
}

#[test]
fn adding_extern_variable_bumps_minor() {
    let mut project = clean_project();
    project.write_header(
        "furi/thread.h",
        &format!("{THREAD_H}\nextern const uint32_t furi_thread_stack_max;\n"),
    );

    let outcome = project.update().unwrap();
    let var = ApiEntry::variable("furi_thread_stack_max", "const uint32_t");
    assert_eq!(outcome.report.variables.added, vec![var.clone()]);
    assert_eq!(outcome.cache.version(), SdkVersion::new(1, 5));
    assert!(outcome.cache.pending_review().contains(&var));
    assert!(!outcome.cache.is_buildable());
}

#[test]
fn removing_disabled_entry_is_stable() {
    let mut project = clean_project();
    project.write_header("furi/old.h", "void furi_legacy(void);");
    let mut outcome = project.update().unwrap();
    outcome.cache.disable(&Selection::All).unwrap();
    outcome.cache.save().unwrap();
    let version = outcome.cache.version();

    project.remove_header("furi/old.h");
    // the header itself was disabled along with the function
    let outcome = project.update().unwrap();
    assert_eq!(outcome.report.bump, VersionBump::None);
    assert_eq!(outcome.cache.version(), version);
    let legacy = ApiEntry::function("furi_legacy", "void", "void");
    assert!(!outcome.cache.known(EntryKind::Function).contains(&legacy));
    assert!(!outcome.cache.disabled().contains(&legacy));
    assert!(outcome.cache.is_buildable());
}

#[test]
fn inline_and_static_definitions_are_not_exported() {
    let project = clean_project();
    let cache = project.load().unwrap();
    let names: Vec<&str> = cache
        .enabled_functions()
        .iter()
        .map(|e| e.name())
        .collect();
    assert_eq!(
        names,
        vec!["furi_thread_alloc", "furi_thread_free", "furi_thread_set_callback"]
    );
}

#[test]
fn review_then_export() {
    let mut project = clean_project();
    project.write_header("furi/log.h", "void furi_log(const char* fmt, ...);");
    let mut outcome = project.update().unwrap();
    assert!(ExportManifest::from_cache(&outcome.cache).is_err());

    outcome.cache.accept(&Selection::All).unwrap();
    outcome.cache.save().unwrap();
    let cache = project.load().unwrap();
    assert!(cache.is_buildable());

    let manifest = ExportManifest::from_cache(&cache).unwrap();
    assert_eq!(manifest.version, SdkVersion::new(1, 5));
    assert_eq!(manifest.headers, vec!["furi/log.h", "furi/thread.h"]);
    assert_eq!(manifest.symbols.len(), 4);
    assert_eq!(manifest.symbols[0].name, "furi_log");
    assert_eq!(manifest.symbols[0].params, "const char*, ...");
}

#[test]
fn ignored_macros_are_decoration() {
    let mut project = SdkProject::new();
    project
        .ignore_macro("FURI_NORETURN")
        .write_header("furi/check.h", "FURI_NORETURN void furi_crash(const char* message);");
    project.init(SdkVersion::new(1, 0)).unwrap();
    let outcome = project.update().unwrap();
    assert!(outcome
        .cache
        .known(EntryKind::Function)
        .contains(&ApiEntry::function("furi_crash", "void", "const char*")));
}

#[test]
fn version_only_load_reads_dirty_cache() {
    let mut project = SdkProject::new();
    project.write_header("a.h", "void a(void);");
    project.init(SdkVersion::new(6, 2)).unwrap();
    project.update().unwrap();
    let cache = VersionedCache::load_version_only(&project.cache_path()).unwrap();
    assert_eq!(cache.version(), SdkVersion::new(6, 3));
    assert!(cache.save().is_err());
}
