//! Fatal conditions abort the run and leave the cache file untouched.

use apisurf_cache::CacheError;
use apisurf_common::{SdkVersion, SymbolHash};
use apisurf_conformance::{extract_sources, PipelineError, SdkProject};
use apisurf_surface::SurfaceError;

fn initialized(headers: &[(&str, &str)]) -> SdkProject {
    let mut project = SdkProject::new();
    for (name, text) in headers {
        project.write_header(name, text);
    }
    project.init(SdkVersion::new(1, 0)).unwrap();
    project
}

#[test]
fn hash_collision_is_fatal() {
    assert_eq!(SymbolHash::of("foo_ab"), SymbolHash::of("foo_bA"));
    let project = initialized(&[("c.h", "void foo_ab(void);\nextern int foo_bA;\n")]);
    let before = project.cache_text();

    let err = project.update().err().unwrap();
    match err {
        PipelineError::Surface(SurfaceError::HashCollision { first, second, .. }) => {
            assert_eq!(first, "foo_ab");
            assert_eq!(second, "foo_bA");
        }
        other => panic!("expected collision, got {other}"),
    }
    assert_eq!(project.cache_text(), before);
    let cache = project.load().unwrap();
    assert!(cache.known(apisurf_surface::EntryKind::Function).is_empty());
    assert!(cache.known(apisurf_surface::EntryKind::Variable).is_empty());
}

#[test]
fn collision_across_headers_is_fatal() {
    let err = extract_sources(&[("a.h", "void foo_ab(void);"), ("b.h", "void foo_bA(void);")])
        .unwrap_err();
    assert!(matches!(err, SurfaceError::HashCollision { .. }));
}

#[test]
fn redeclaration_is_fatal() {
    let project = initialized(&[
        ("a.h", "void furi_delay_ms(uint32_t ms);"),
        ("b.h", "void furi_delay_ms(uint64_t ms);"),
    ]);
    let before = project.cache_text();
    let err = project.update().err().unwrap();
    assert!(matches!(
        err,
        PipelineError::Surface(SurfaceError::Redeclaration { .. })
    ));
    assert_eq!(project.cache_text(), before);
}

#[test]
fn identical_redeclaration_is_harmless() {
    let registry = extract_sources(&[
        ("a.h", "void furi_init(void);"),
        ("b.h", "#include \"a.h\"\nvoid furi_init(void);"),
    ])
    .unwrap();
    assert_eq!(registry.functions().len(), 1);
}

#[test]
fn parse_error_is_fatal() {
    let project = initialized(&[("bad.h", "void furi_init(void;\n")]);
    let before = project.cache_text();
    let err = project.update().err().unwrap();
    match err {
        PipelineError::Surface(SurfaceError::Parse { path, errors }) => {
            assert_eq!(path, "bad.h");
            assert!(!errors.is_empty());
        }
        other => panic!("expected parse error, got {other}"),
    }
    assert_eq!(project.cache_text(), before);
}

#[test]
fn unsupported_node_is_fatal() {
    let project = initialized(&[("ref.h", "extern int& furi_ref;\n")]);
    let before = project.cache_text();
    let err = project.update().err().unwrap();
    assert!(matches!(
        err,
        PipelineError::Surface(SurfaceError::UnsupportedNode { .. })
    ));
    assert_eq!(project.cache_text(), before);
}

#[test]
fn missing_cache_is_fatal() {
    let mut project = SdkProject::new();
    project.write_header("a.h", "void a(void);");
    let err = project.update().err().unwrap();
    assert!(matches!(err, PipelineError::Cache(CacheError::Missing { .. })));
    assert!(!project.cache_path().exists());
}

#[test]
fn malformed_cache_is_fatal() {
    let project = initialized(&[("a.h", "void a(void);")]);
    std::fs::write(project.cache_path(), "[\n{\"kind\":\"Header\"}\n]\n").unwrap();
    let err = project.update().err().unwrap();
    assert!(matches!(err, PipelineError::Cache(CacheError::Malformed { .. })));
}

#[test]
fn missing_header_is_fatal() {
    let mut project = initialized(&[("a.h", "void a(void);")]);
    project.write_header("b.h", "");
    std::fs::remove_file(project.path().join("include/b.h")).unwrap();
    let before = project.cache_text();
    let err = project.update().err().unwrap();
    assert!(matches!(err, PipelineError::Surface(SurfaceError::Io { .. })));
    assert_eq!(project.cache_text(), before);
}
