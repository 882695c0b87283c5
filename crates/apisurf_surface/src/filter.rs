//! Selection of the declarations that are separately linked symbols.

use apisurf_header_parser::ast::{FunctionDecl, Item, VariableDecl};

/// A declaration that belongs to the exported surface.
#[derive(Debug, Clone, Copy)]
pub enum SurfaceDecl<'a> {
    /// A function prototype.
    Function(&'a FunctionDecl),
    /// An `extern` variable.
    Variable(&'a VariableDecl),
}

/// Returns the surface declarations among `items`, in source order,
/// descending into namespaces and linkage blocks.
pub fn surface_decls(items: &[Item]) -> Vec<SurfaceDecl<'_>> {
    let mut out = Vec::new();
    collect(items, &mut out);
    out
}

fn collect<'a>(items: &'a [Item], out: &mut Vec<SurfaceDecl<'a>>) {
    for item in items {
        match item {
            Item::Function(f) if is_linked_function(f) => out.push(SurfaceDecl::Function(f)),
            Item::Variable(v) if is_linked_variable(v) => out.push(SurfaceDecl::Variable(v)),
            Item::Namespace(ns) => collect(&ns.items, out),
            Item::Linkage(block) => collect(&block.items, out),
            Item::Function(_)
            | Item::Variable(_)
            | Item::Typedef(_)
            | Item::Record(_)
            | Item::ForwardDecl(_)
            | Item::Enum(_)
            | Item::Using(_)
            | Item::Template(_)
            | Item::StaticAssert(_)
            | Item::Include(_)
            | Item::Define(_)
            | Item::Pragma(_)
            | Item::Directive(_)
            | Item::Error(_) => {}
        }
    }
}

/// A function is linked when it has no body in the header and is not inline.
pub fn is_linked_function(f: &FunctionDecl) -> bool {
    !f.has_body && !f.specifiers.is_inline
}

/// A variable is linked when it is declared `extern`.
pub fn is_linked_variable(v: &VariableDecl) -> bool {
    v.specifiers.is_extern
}
