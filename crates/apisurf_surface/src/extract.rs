//! The extraction driver: headers in, populated [`SymbolRegistry`] out.

use crate::canonical::Canonicalizer;
use crate::entry::ApiEntry;
use crate::error::SurfaceError;
use crate::filter::{surface_decls, SurfaceDecl};
use crate::registry::SymbolRegistry;
use apisurf_common::Interner;
use apisurf_diagnostics::{DiagnosticRenderer, DiagnosticSink, Severity, TerminalRenderer};
use apisurf_source::{FileId, SourceDb};
use std::collections::HashSet;
use std::path::Path;

/// Parses headers one at a time and registers their surface.
///
/// The extractor owns all state of one run. Any error is fatal for the run:
/// callers drop the extractor and keep the previous cache.
pub struct Extractor {
    interner: Interner,
    source_db: SourceDb,
    ignore_macros: HashSet<String>,
    registry: SymbolRegistry,
    warnings: usize,
}

impl Extractor {
    /// Creates an extractor that treats `ignore_macros` as decoration.
    pub fn new(ignore_macros: HashSet<String>) -> Self {
        Self {
            interner: Interner::new(),
            source_db: SourceDb::new(),
            ignore_macros,
            registry: SymbolRegistry::new(),
            warnings: 0,
        }
    }

    /// Reads the header `name` from under `root` and registers it and its
    /// symbols.
    pub fn add_header_file(&mut self, root: &Path, name: &str) -> Result<(), SurfaceError> {
        let file_id = self
            .source_db
            .load_header(root, name)
            .map_err(|source| SurfaceError::Io {
                path: root.join(name),
                source,
            })?;
        self.process(file_id)
    }

    /// Registers a header given as text.
    pub fn add_header_source(
        &mut self,
        name: &str,
        content: impl Into<String>,
    ) -> Result<(), SurfaceError> {
        let file_id = self.source_db.add_source(name, content.into());
        self.process(file_id)
    }

    fn process(&mut self, file_id: FileId) -> Result<(), SurfaceError> {
        let sink = DiagnosticSink::new();
        let ast = apisurf_header_parser::parse_file(
            file_id,
            &self.source_db,
            &self.interner,
            &sink,
            &self.ignore_macros,
        );
        let file = self.source_db.get_file(file_id);
        let renderer = TerminalRenderer::new(false);
        let diagnostics = sink.take_all();

        if sink.has_errors() {
            let errors = diagnostics
                .iter()
                .filter(|d| d.severity == Severity::Error)
                .map(|d| renderer.render(d, &self.source_db))
                .collect();
            return Err(SurfaceError::Parse {
                path: file.name.clone(),
                errors,
            });
        }
        for diag in &diagnostics {
            tracing::debug!(
                header = %file.name,
                "{}",
                renderer.render(diag, &self.source_db).trim_end()
            );
        }
        self.warnings += diagnostics.len();

        let cx = Canonicalizer::new(&self.interner, &self.source_db);
        let decls = surface_decls(&ast.items);
        tracing::debug!(header = %file.name, symbols = decls.len(), "extracted header");

        self.registry.register(ApiEntry::header(file.name.clone()))?;
        for decl in decls {
            let entry = match decl {
                SurfaceDecl::Function(f) => ApiEntry::function(
                    cx.render(&f.name)?,
                    cx.render(&f.return_type)?,
                    cx.params(&f.params, f.variadic)?,
                ),
                SurfaceDecl::Variable(v) => {
                    ApiEntry::variable(cx.render(&v.name)?, cx.render(&v.ty)?)
                }
            };
            self.registry.register(entry)?;
        }
        Ok(())
    }

    /// Number of warnings reported so far.
    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    /// The registry accumulated so far.
    pub fn registry(&self) -> &SymbolRegistry {
        &self.registry
    }

    /// Ends the run and returns the registry.
    pub fn finish(self) -> SymbolRegistry {
        self.registry
    }
}

/// Extracts the surface of `headers`, each named relative to `root`.
pub fn extract_surface(
    root: &Path,
    headers: &[String],
    ignore_macros: &HashSet<String>,
) -> Result<SymbolRegistry, SurfaceError> {
    let mut extractor = Extractor::new(ignore_macros.clone());
    for header in headers {
        extractor.add_header_file(root, header)?;
    }
    let registry = extractor.finish();
    tracing::info!(
        headers = registry.headers().len(),
        functions = registry.functions().len(),
        variables = registry.variables().len(),
        "surface extracted"
    );
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(sources: &[(&str, &str)]) -> Result<SymbolRegistry, SurfaceError> {
        let mut ex = Extractor::new(HashSet::new());
        for (name, text) in sources {
            ex.add_header_source(name, *text)?;
        }
        Ok(ex.finish())
    }

    #[test]
    fn functions_variables_and_header() {
        let reg = extract(&[(
            "furi/core/thread.h",
            "typedef struct FuriThread FuriThread;\n\
             typedef int32_t (*FuriThreadCallback)(void* context);\n\
             FuriThread* furi_thread_alloc(void);\n\
             void furi_thread_set_callback(FuriThread* thread, FuriThreadCallback callback);\n\
             int furi_log(const char* fmt, ...);\n\
             extern const uint32_t furi_thread_stack_max;\n\
             static inline int helper(void) { return 1; }\n",
        )])
        .unwrap();

        assert!(reg.headers().contains(&ApiEntry::header("furi/core/thread.h")));
        assert!(reg
            .functions()
            .contains(&ApiEntry::function("furi_thread_alloc", "FuriThread*", "void")));
        assert!(reg.functions().contains(&ApiEntry::function(
            "furi_thread_set_callback",
            "void",
            "FuriThread*, FuriThreadCallback"
        )));
        assert!(reg
            .functions()
            .contains(&ApiEntry::function("furi_log", "int", "const char*, ...")));
        assert!(reg
            .variables()
            .contains(&ApiEntry::variable("furi_thread_stack_max", "const uint32_t")));
        assert_eq!(reg.functions().len(), 3);
    }

    #[test]
    fn repeated_inclusion_is_harmless() {
        let header = "void furi_init(void);";
        let reg = extract(&[("a.h", header), ("b.h", header)]).unwrap();
        assert_eq!(reg.functions().len(), 1);
        assert_eq!(reg.headers().len(), 2);
    }

    #[test]
    fn conflicting_prototypes_fail() {
        let err = extract(&[("a.h", "void f(int);"), ("b.h", "void f(long);")]).unwrap_err();
        assert!(matches!(err, SurfaceError::Redeclaration { .. }));
    }

    #[test]
    fn parse_errors_are_fatal() {
        let err = extract(&[("bad.h", "void f(int;\n")]).unwrap_err();
        match err {
            SurfaceError::Parse { path, errors } => {
                assert_eq!(path, "bad.h");
                assert!(!errors.is_empty());
                assert!(errors[0].contains("bad.h:1:"));
            }
            other => panic!("expected parse error, got {other}"),
        }
    }

    #[test]
    fn warnings_are_counted() {
        let mut ex = Extractor::new(HashSet::new());
        ex.add_header_source("t.h", "template <class T> T id(T v);\nvoid g(void);")
            .unwrap();
        assert_eq!(ex.warning_count(), 1);
        assert_eq!(ex.registry().functions().len(), 1);
    }

    #[test]
    fn missing_header_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_surface(dir.path(), &["nope.h".to_string()], &HashSet::new())
            .unwrap_err();
        assert!(matches!(err, SurfaceError::Io { .. }));
    }

    #[test]
    fn extract_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("furi")).unwrap();
        std::fs::write(
            dir.path().join("furi/furi.h"),
            "#pragma once\nFURI_WEAK void furi_init(void);\n",
        )
        .unwrap();
        let ignore: HashSet<String> = ["FURI_WEAK".to_string()].into_iter().collect();
        let reg = extract_surface(dir.path(), &["furi/furi.h".to_string()], &ignore).unwrap();
        assert!(reg
            .functions()
            .contains(&ApiEntry::function("furi_init", "void", "void")));
    }
}
