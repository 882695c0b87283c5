//! Hand-rolled recursive descent parser for public C/C++ SDK headers.
//!
//! This crate parses the declarations that appear in a firmware SDK's public
//! headers into a typed declaration tree with source spans on every node. It
//! does not preprocess: directives are kept as items and both branches of a
//! conditional are parsed. The main entry point is [`parse_file`].
//!
//! # Architecture
//!
//! - **Lexer** ([`lexer`]): Converts header text to tokens, skipping comments
//!   and line continuations and keeping each directive line as one token.
//! - **Parser** ([`parser`]): Recursive descent over items and declarators,
//!   with error recovery via poison nodes.
//! - **AST** ([`ast`]): Closed sum types for items and types, with serde support.

#![warn(missing_docs)]

/// Declaration tree node types.
pub mod ast;
mod decl;
/// Lexical analyzer for header text.
pub mod lexer;
/// Recursive descent parser with error recovery.
pub mod parser;
/// Token types for the header lexer.
pub mod token;

pub use ast::HeaderAst;
pub use token::{CToken, Token};

use apisurf_common::Interner;
use apisurf_diagnostics::DiagnosticSink;
use apisurf_source::{FileId, SourceDb};
use std::collections::HashSet;

/// Parses a header into a declaration tree.
///
/// Identifiers listed in `ignore_macros` are skipped wherever a decoration
/// may appear, together with a parenthesized argument list if one follows.
/// Errors are reported to the diagnostic sink and represented as `Error`
/// variants in the tree.
pub fn parse_file(
    file_id: FileId,
    source_db: &SourceDb,
    interner: &Interner,
    sink: &DiagnosticSink,
    ignore_macros: &HashSet<String>,
) -> HeaderAst {
    let file = source_db.get_file(file_id);
    let source = &file.content;
    let tokens = lexer::lex(source, file_id, sink);
    tracing::debug!(header = %file.name, tokens = tokens.len(), "parsing header");
    let mut parser = parser::HeaderParser::new(tokens, source, interner, sink, ignore_macros);
    parser.parse_header()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast::*;
    use apisurf_diagnostics::Severity;

    struct Parsed {
        ast: HeaderAst,
        interner: Interner,
        diagnostics: Vec<apisurf_diagnostics::Diagnostic>,
    }

    impl Parsed {
        fn name(&self, name: &QualifiedName) -> String {
            name.segments
                .iter()
                .map(|s| self.interner.resolve(*s))
                .collect::<Vec<_>>()
                .join("::")
        }

        fn errors(&self) -> Vec<&str> {
            self.diagnostics
                .iter()
                .filter(|d| d.severity == Severity::Error)
                .map(|d| d.message.as_str())
                .collect()
        }
    }

    fn parse_with(source: &str, ignore: &[&str]) -> Parsed {
        let mut db = SourceDb::new();
        let file_id = db.add_source("test.h", source.to_string());
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let ignore: HashSet<String> = ignore.iter().map(|s| s.to_string()).collect();
        let ast = parse_file(file_id, &db, &interner, &sink, &ignore);
        Parsed {
            ast,
            interner,
            diagnostics: sink.take_all(),
        }
    }

    fn parse_ok(source: &str) -> Parsed {
        let parsed = parse_with(source, &[]);
        assert!(
            parsed.errors().is_empty(),
            "unexpected errors: {:?}",
            parsed.errors()
        );
        parsed
    }

    fn only_function(parsed: &Parsed) -> &FunctionDecl {
        match parsed.ast.items.as_slice() {
            [Item::Function(f)] => f,
            other => panic!("expected one function, got {other:?}"),
        }
    }

    #[test]
    fn prototype_with_params() {
        let parsed = parse_ok("void furi_thread_set_name(FuriThread* thread, const char* name);");
        let f = only_function(&parsed);
        assert_eq!(parsed.name(&f.name), "furi_thread_set_name");
        assert_eq!(f.params.len(), 2);
        assert!(!f.has_body);
        assert!(!f.variadic);
        assert!(matches!(f.params[0].ty, TypeNode::Pointer { .. }));
        let Some(name) = f.params[1].name else {
            panic!("parameter name missing")
        };
        assert_eq!(parsed.interner.resolve(name), "name");
    }

    #[test]
    fn void_param_list_is_kept() {
        let parsed = parse_ok("int furi_kernel_lock(void);");
        let f = only_function(&parsed);
        assert_eq!(f.params.len(), 1);
        assert!(f.params[0].name.is_none());
    }

    #[test]
    fn variadic_function() {
        let parsed = parse_ok("void furi_log_print_format(int level, const char* tag, const char* format, ...);");
        let f = only_function(&parsed);
        assert!(f.variadic);
        assert_eq!(f.params.len(), 3);
    }

    #[test]
    fn inline_definition_has_body() {
        let parsed = parse_ok("static inline int twice(int x) { return x * 2; }\nint after;");
        let Item::Function(f) = &parsed.ast.items[0] else {
            panic!("expected function")
        };
        assert!(f.has_body);
        assert!(f.specifiers.is_inline);
        assert!(f.specifiers.is_static);
        assert!(matches!(parsed.ast.items[1], Item::Variable(_)));
    }

    #[test]
    fn extern_variables() {
        let parsed = parse_ok("extern const int a, b[4];");
        assert_eq!(parsed.ast.items.len(), 2);
        let Item::Variable(b) = &parsed.ast.items[1] else {
            panic!("expected variable")
        };
        assert!(b.specifiers.is_extern);
        assert!(matches!(b.ty, TypeNode::Array { .. }));
    }

    #[test]
    fn function_pointer_variable() {
        let parsed = parse_ok("extern int (*hook)(void);");
        let Item::Variable(v) = &parsed.ast.items[0] else {
            panic!("expected variable")
        };
        assert_eq!(parsed.name(&v.name), "hook");
        let TypeNode::Pointer { pointee, .. } = &v.ty else {
            panic!("expected pointer, got {:?}", v.ty)
        };
        assert!(matches!(**pointee, TypeNode::Function(_)));
    }

    #[test]
    fn multi_dimensional_array_nests_outer_first() {
        let parsed = parse_ok("extern int m[3][4];");
        let Item::Variable(v) = &parsed.ast.items[0] else {
            panic!("expected variable")
        };
        let TypeNode::Array { element, size } = &v.ty else {
            panic!("expected array")
        };
        assert_eq!(size.as_ref().map(|s| s.tokens[0].text.as_str()), Some("3"));
        let TypeNode::Array { size: inner, .. } = &**element else {
            panic!("expected nested array")
        };
        assert_eq!(inner.as_ref().map(|s| s.tokens[0].text.as_str()), Some("4"));
    }

    #[test]
    fn function_returning_function_pointer() {
        let parsed = parse_ok("void (*signal(int sig, void (*func)(int)))(int);");
        let f = only_function(&parsed);
        assert_eq!(parsed.name(&f.name), "signal");
        assert_eq!(f.params.len(), 2);
        let TypeNode::Pointer { pointee, .. } = &f.return_type else {
            panic!("expected pointer return")
        };
        assert!(matches!(**pointee, TypeNode::Function(_)));
    }

    #[test]
    fn typedefs_and_records() {
        let parsed = parse_ok(
            "typedef struct FuriThread FuriThread;\n\
             typedef struct { int a; } Anon;\n\
             typedef void (*FuriThreadCallback)(void* context);\n\
             struct Fwd;\n\
             union U { int a; float b; };",
        );
        let kinds: Vec<&str> = parsed
            .ast
            .items
            .iter()
            .map(|item| match item {
                Item::Typedef(_) => "typedef",
                Item::Record(_) => "record",
                Item::ForwardDecl(_) => "forward",
                _ => "other",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["typedef", "record", "typedef", "typedef", "forward", "record"]
        );
    }

    #[test]
    fn enum_enumerators() {
        let parsed = parse_ok("typedef enum { FuriOk = 0, FuriError = -1, } FuriStatus;");
        let Item::Enum(e) = &parsed.ast.items[0] else {
            panic!("expected enum")
        };
        let names: Vec<&str> = e
            .enumerators
            .iter()
            .map(|i| parsed.interner.resolve(*i))
            .collect();
        assert_eq!(names, vec!["FuriOk", "FuriError"]);
        assert!(matches!(parsed.ast.items[1], Item::Typedef(_)));
    }

    #[test]
    fn linkage_block_across_conditionals() {
        let parsed = parse_ok(
            "#pragma once\n\
             #include <stdint.h>\n\
             #ifdef __cplusplus\n\
             extern \"C\" {\n\
             #endif\n\
             void furi_init(void);\n\
             #ifdef __cplusplus\n\
             }\n\
             #endif\n",
        );
        let items = &parsed.ast.items;
        assert!(matches!(&items[0], Item::Pragma(p) if p.text == "once"));
        assert!(matches!(&items[1], Item::Include(i) if i.path == "stdint.h" && i.system));
        assert!(matches!(&items[2], Item::Directive(d) if d.keyword == "ifdef"));
        let Item::Linkage(block) = &items[3] else {
            panic!("expected linkage block, got {:?}", items[3])
        };
        assert_eq!(block.abi, "C");
        assert!(block
            .items
            .iter()
            .any(|i| matches!(i, Item::Function(_))));
        assert!(matches!(&items[4], Item::Directive(d) if d.keyword == "endif"));
    }

    #[test]
    fn single_declaration_linkage_is_extern() {
        let parsed = parse_ok("extern \"C\" int counter;");
        let Item::Linkage(block) = &parsed.ast.items[0] else {
            panic!("expected linkage")
        };
        let Item::Variable(v) = &block.items[0] else {
            panic!("expected variable")
        };
        assert!(v.specifiers.is_extern);
    }

    #[test]
    fn namespaces_and_using() {
        let parsed = parse_ok(
            "namespace furi::hal { int read(uint8_t* buf, size_t len); }\n\
             using Callback = void (*)(int);\n\
             using namespace furi;\n\
             using std::size_t;",
        );
        let Item::Namespace(ns) = &parsed.ast.items[0] else {
            panic!("expected namespace")
        };
        assert_eq!(ns.name.len(), 2);
        assert_eq!(ns.items.len(), 1);
        assert!(matches!(
            &parsed.ast.items[1],
            Item::Using(UsingDecl { kind: UsingKind::Alias { .. }, .. })
        ));
        assert!(matches!(
            &parsed.ast.items[2],
            Item::Using(UsingDecl { kind: UsingKind::Directive(_), .. })
        ));
        assert!(matches!(
            &parsed.ast.items[3],
            Item::Using(UsingDecl { kind: UsingKind::Declaration(_), .. })
        ));
    }

    #[test]
    fn define_records_macro_name() {
        let parsed = parse_ok("#define FURI_WAIT_FOREVER 0xFFFFFFFFU\n#define MAX(a, b) ((a) > (b) ? (a) : (b))\n");
        let names: Vec<&str> = parsed
            .ast
            .items
            .iter()
            .filter_map(|i| match i {
                Item::Define(d) => Some(parsed.interner.resolve(d.name)),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["FURI_WAIT_FOREVER", "MAX"]);
    }

    #[test]
    fn template_is_skipped_with_warning() {
        let parsed = parse_ok(
            "template <typename T, typename U = std::vector<T>>\n\
             class Box { T value; };\n\
             int after(void);",
        );
        assert!(matches!(parsed.ast.items[0], Item::Template(_)));
        assert!(matches!(parsed.ast.items[1], Item::Function(_)));
        assert!(parsed
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning));
    }

    #[test]
    fn attributes_and_ignored_macros() {
        let parsed = parse_with(
            "FURI_NORETURN void furi_crash(const char* message) __attribute__((noreturn));\n\
             void FURI_DEPRECATED(\"use v2\") old_api(void);\n\
             extern int __restrict counter __asm__(\"_counter\");",
            &["FURI_NORETURN", "FURI_DEPRECATED"],
        );
        assert!(parsed.errors().is_empty(), "{:?}", parsed.errors());
        let names: Vec<String> = parsed
            .ast
            .items
            .iter()
            .filter_map(|i| match i {
                Item::Function(f) => Some(parsed.name(&f.name)),
                Item::Variable(v) => Some(parsed.name(&v.name)),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["furi_crash", "old_api", "counter"]);
    }

    #[test]
    fn unknown_macro_is_an_error() {
        let parsed = parse_with("FURI_NORETURN void furi_crash(void);", &[]);
        assert!(!parsed.errors().is_empty());
    }

    #[test]
    fn unnamed_declaration_warns() {
        let parsed = parse_ok("FURI_DECLARE_THING(a, b);\nint after(void);");
        assert!(parsed
            .diagnostics
            .iter()
            .any(|d| d.message.contains("without a name")));
        assert!(matches!(parsed.ast.items.last(), Some(Item::Function(_))));
    }

    #[test]
    fn unbalanced_brace_is_an_error() {
        let parsed = parse_with("namespace x {\nint a(void);\n", &[]);
        assert!(!parsed.errors().is_empty());
    }

    #[test]
    fn missing_semicolon_recovers() {
        let parsed = parse_with("int a(void)\nint b(void);", &[]);
        assert!(!parsed.errors().is_empty());
    }

    #[test]
    fn cpp_method_trailers() {
        let parsed = parse_ok("int Foo::size() const noexcept;\nvoid bar(int x = 4);");
        let Item::Function(f) = &parsed.ast.items[0] else {
            panic!("expected function")
        };
        assert_eq!(parsed.name(&f.name), "Foo::size");
        let Item::Function(bar) = &parsed.ast.items[1] else {
            panic!("expected function")
        };
        assert!(bar.params[0].default.is_some());
    }

    #[test]
    fn ast_serializes() {
        let parsed = parse_ok("extern int x;");
        let json = serde_json::to_string(&parsed.ast).unwrap();
        assert!(json.contains("Variable"));
    }
}
