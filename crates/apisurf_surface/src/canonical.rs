//! Canonical C spellings of declaration-tree types.
//!
//! The rendered strings are part of an entry's identity and are compared
//! byte for byte across runs. Every node kind has exactly one rendering;
//! kinds without one fail with [`SurfaceError::UnsupportedNode`].

use crate::error::SurfaceError;
use apisurf_common::Interner;
use apisurf_header_parser::ast::{
    FunctionType, Parameter, QualifiedName, QualifiedType, TypeNode, Value,
};
use apisurf_source::{SourceDb, Span};

/// Renders declaration-tree nodes to canonical strings.
pub struct Canonicalizer<'a> {
    interner: &'a Interner,
    source_db: &'a SourceDb,
}

/// A declaration-tree node with a canonical spelling.
pub trait Canonicalize {
    /// Renders this node.
    fn canonical(&self, cx: &Canonicalizer<'_>) -> Result<String, SurfaceError>;
}

impl<'a> Canonicalizer<'a> {
    /// Creates a canonicalizer resolving names through `interner` and error
    /// locations through `source_db`.
    pub fn new(interner: &'a Interner, source_db: &'a SourceDb) -> Self {
        Self {
            interner,
            source_db,
        }
    }

    /// Renders any canonicalizable node.
    pub fn render<T: Canonicalize + ?Sized>(&self, node: &T) -> Result<String, SurfaceError> {
        node.canonical(self)
    }

    /// Renders a parameter list: types joined by `, `, with a `...` marker
    /// for variadic lists.
    pub fn params(&self, params: &[Parameter], variadic: bool) -> Result<String, SurfaceError> {
        let mut rendered = params
            .iter()
            .map(|p| p.canonical(self))
            .collect::<Result<Vec<_>, _>>()?;
        if variadic {
            rendered.push("...".to_string());
        }
        Ok(rendered.join(", "))
    }

    fn unsupported(&self, node: &'static str, span: Span) -> SurfaceError {
        let location = if span.is_dummy() {
            "<unknown location>".to_string()
        } else {
            self.source_db.resolve_span(span).to_string()
        };
        SurfaceError::UnsupportedNode { node, location }
    }
}

impl Canonicalize for QualifiedName {
    fn canonical(&self, cx: &Canonicalizer<'_>) -> Result<String, SurfaceError> {
        if self.segments.is_empty() {
            return Err(cx.unsupported("an anonymous type", self.span));
        }
        let joined = self
            .segments
            .iter()
            .map(|s| cx.interner.resolve(*s))
            .collect::<Vec<_>>()
            .join("::");
        Ok(match self.elaborated {
            Some(kind) => format!("{} {joined}", kind.keyword()),
            None => joined,
        })
    }
}

impl Canonicalize for QualifiedType {
    fn canonical(&self, cx: &Canonicalizer<'_>) -> Result<String, SurfaceError> {
        let mut out = String::new();
        if self.is_const {
            out.push_str("const ");
        }
        if self.is_volatile {
            out.push_str("volatile ");
        }
        out.push_str(&self.name.canonical(cx)?);
        Ok(out)
    }
}

impl Canonicalize for TypeNode {
    fn canonical(&self, cx: &Canonicalizer<'_>) -> Result<String, SurfaceError> {
        match self {
            TypeNode::Named(ty) => ty.canonical(cx),
            TypeNode::Pointer { pointee, .. } => match pointee.as_ref() {
                // A pointer to a function is already spelled `R (*)(P)`.
                TypeNode::Function(f) => f.canonical(cx),
                other => Ok(format!("{}*", other.canonical(cx)?)),
            },
            TypeNode::Array { .. } => {
                let mut dims = String::new();
                let mut ty = self;
                while let TypeNode::Array { element, size } = ty {
                    dims.push('[');
                    dims.push_str(&size.canonical(cx)?);
                    dims.push(']');
                    ty = element.as_ref();
                }
                Ok(format!("{}{dims}", ty.canonical(cx)?))
            }
            TypeNode::Function(f) => f.canonical(cx),
            TypeNode::Reference { .. } => Err(cx.unsupported("a reference type", base_span(self))),
            TypeNode::BlockPointer(_) => Err(cx.unsupported("a block pointer", base_span(self))),
            TypeNode::Error(span) => Err(cx.unsupported("an unparsed type", *span)),
        }
    }
}

impl Canonicalize for FunctionType {
    fn canonical(&self, cx: &Canonicalizer<'_>) -> Result<String, SurfaceError> {
        Ok(format!(
            "{} (*)({})",
            self.return_type.canonical(cx)?,
            cx.params(&self.params, self.variadic)?
        ))
    }
}

impl Canonicalize for Parameter {
    fn canonical(&self, cx: &Canonicalizer<'_>) -> Result<String, SurfaceError> {
        self.ty.canonical(cx)
    }
}

impl Canonicalize for Value {
    fn canonical(&self, _cx: &Canonicalizer<'_>) -> Result<String, SurfaceError> {
        Ok(self
            .tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" "))
    }
}

impl<T: Canonicalize> Canonicalize for Option<T> {
    fn canonical(&self, cx: &Canonicalizer<'_>) -> Result<String, SurfaceError> {
        match self {
            Some(node) => node.canonical(cx),
            None => Ok(String::new()),
        }
    }
}

/// The span of the named type at the bottom of a composed type.
fn base_span(ty: &TypeNode) -> Span {
    match ty {
        TypeNode::Named(q) => q.name.span,
        TypeNode::Pointer { pointee: inner, .. }
        | TypeNode::Reference { referent: inner, .. }
        | TypeNode::BlockPointer(inner)
        | TypeNode::Array { element: inner, .. } => base_span(inner),
        TypeNode::Function(f) => base_span(&f.return_type),
        TypeNode::Error(span) => *span,
    }
}
