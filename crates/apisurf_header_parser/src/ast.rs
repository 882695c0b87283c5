//! Declaration tree produced by the header parser.
//!
//! Every node carries a [`Span`]. Error recovery is represented by
//! `Error(Span)` variants in [`Item`] and [`TypeNode`]. Types are closed sum
//! types so consumers match exhaustively instead of inspecting strings.

use apisurf_common::Ident;
use apisurf_source::Span;
use serde::{Deserialize, Serialize};

// ============================================================================
// Top-level
// ============================================================================

/// A parsed header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderAst {
    /// The top-level items, in source order.
    pub items: Vec<Item>,
    /// The span covering the whole header.
    pub span: Span,
}

/// A declaration or preprocessor line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Item {
    /// A function prototype or definition.
    Function(FunctionDecl),
    /// A variable declaration or definition.
    Variable(VariableDecl),
    /// A `typedef` of one declarator.
    Typedef(TypedefDecl),
    /// A `struct`, `union` or `class` definition.
    Record(RecordDecl),
    /// A `struct Foo;` style forward declaration.
    ForwardDecl(ForwardDecl),
    /// An `enum` definition.
    Enum(EnumDecl),
    /// A `namespace` block.
    Namespace(NamespaceDecl),
    /// An `extern "C"` linkage block.
    Linkage(LinkageBlock),
    /// A `using` alias, declaration or directive.
    Using(UsingDecl),
    /// A `template<...>` declaration, skipped as a unit.
    Template(Span),
    /// A `static_assert(...)`.
    StaticAssert(Span),
    /// An `#include` line.
    Include(IncludeDirective),
    /// A `#define` line.
    Define(DefineDirective),
    /// A `#pragma` line.
    Pragma(PragmaDirective),
    /// Any other directive: conditionals, `#undef`, `#error`, `#line`.
    Directive(OtherDirective),
    /// An error node produced during recovery.
    Error(Span),
}

impl Item {
    /// Returns the span of this item.
    pub fn span(&self) -> Span {
        match self {
            Item::Function(d) => d.span,
            Item::Variable(d) => d.span,
            Item::Typedef(d) => d.span,
            Item::Record(d) => d.span,
            Item::ForwardDecl(d) => d.span,
            Item::Enum(d) => d.span,
            Item::Namespace(d) => d.span,
            Item::Linkage(d) => d.span,
            Item::Using(d) => d.span,
            Item::Include(d) => d.span,
            Item::Define(d) => d.span,
            Item::Pragma(d) => d.span,
            Item::Directive(d) => d.span,
            Item::Template(span) | Item::StaticAssert(span) | Item::Error(span) => *span,
        }
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// Storage-class and function specifiers that matter for linkage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specifiers {
    /// `extern`, or a declaration directly under `extern "C"`.
    pub is_extern: bool,
    /// `static`.
    pub is_static: bool,
    /// `inline` or one of its compiler spellings.
    pub is_inline: bool,
}

/// A function prototype or definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDecl {
    /// The declared name.
    pub name: QualifiedName,
    /// The return type.
    pub return_type: TypeNode,
    /// The parameters, in order.
    pub params: Vec<Parameter>,
    /// Whether the parameter list ends with `...`.
    pub variadic: bool,
    /// Linkage-relevant specifiers.
    pub specifiers: Specifiers,
    /// Whether the header supplies a body.
    pub has_body: bool,
    /// Source span.
    pub span: Span,
}

/// A variable declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDecl {
    /// The declared name.
    pub name: QualifiedName,
    /// The declared type.
    pub ty: TypeNode,
    /// Linkage-relevant specifiers.
    pub specifiers: Specifiers,
    /// The initializer after `=`, if any.
    pub initializer: Option<Value>,
    /// Source span.
    pub span: Span,
}

/// A `typedef` introducing one name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypedefDecl {
    /// The new type name.
    pub name: Ident,
    /// The aliased type.
    pub ty: TypeNode,
    /// Source span.
    pub span: Span,
}

/// Which keyword introduced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    /// `struct`
    Struct,
    /// `union`
    Union,
    /// `class`
    Class,
}

/// A record definition. The body is not inspected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDecl {
    /// The record keyword.
    pub kind: RecordKind,
    /// The tag name, absent for anonymous records.
    pub name: Option<QualifiedName>,
    /// Source span.
    pub span: Span,
}

/// A forward declaration of a record or enum tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardDecl {
    /// The tag keyword.
    pub kind: ElaboratedKind,
    /// The tag name.
    pub name: QualifiedName,
    /// Source span.
    pub span: Span,
}

/// An enum definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDecl {
    /// The tag name, absent for anonymous enums.
    pub name: Option<Ident>,
    /// Whether this is `enum class` / `enum struct`.
    pub scoped: bool,
    /// The enumerator names, in order.
    pub enumerators: Vec<Ident>,
    /// Source span.
    pub span: Span,
}

/// A namespace block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceDecl {
    /// Name segments; `namespace a::b` has two, an anonymous namespace none.
    pub name: Vec<Ident>,
    /// Items inside the block.
    pub items: Vec<Item>,
    /// Source span.
    pub span: Span,
}

/// An `extern "C"` block or single-declaration linkage specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkageBlock {
    /// The linkage string without quotes, e.g. `C`.
    pub abi: String,
    /// Items inside the block.
    pub items: Vec<Item>,
    /// Source span.
    pub span: Span,
}

/// A `using` form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsingDecl {
    /// Which form this is.
    pub kind: UsingKind,
    /// Source span.
    pub span: Span,
}

/// The forms of `using`, plus namespace aliases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UsingKind {
    /// `using Name = Type;`
    Alias {
        /// The alias name.
        name: Ident,
        /// The aliased type.
        ty: TypeNode,
    },
    /// `using ns::name;`
    Declaration(QualifiedName),
    /// `using namespace ns;`
    Directive(QualifiedName),
    /// `namespace short = long::name;`
    NamespaceAlias {
        /// The alias name.
        name: Ident,
        /// The aliased namespace.
        target: QualifiedName,
    },
}

// ============================================================================
// Preprocessor lines
// ============================================================================

/// An `#include` line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncludeDirective {
    /// The path between the delimiters.
    pub path: String,
    /// `true` for `<...>`, `false` for `"..."`.
    pub system: bool,
    /// Source span.
    pub span: Span,
}

/// A `#define` line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefineDirective {
    /// The macro name.
    pub name: Ident,
    /// Source span.
    pub span: Span,
}

/// A `#pragma` line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PragmaDirective {
    /// Everything after `pragma`, trimmed.
    pub text: String,
    /// Source span.
    pub span: Span,
}

/// A directive that is recorded but not interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtherDirective {
    /// The directive keyword, e.g. `ifdef`. Empty for a null directive.
    pub keyword: String,
    /// Source span.
    pub span: Span,
}

// ============================================================================
// Types
// ============================================================================

/// The keyword of an elaborated type specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElaboratedKind {
    /// `struct`
    Struct,
    /// `union`
    Union,
    /// `class`
    Class,
    /// `enum`
    Enum,
}

impl ElaboratedKind {
    /// The keyword as written.
    pub fn keyword(self) -> &'static str {
        match self {
            ElaboratedKind::Struct => "struct",
            ElaboratedKind::Union => "union",
            ElaboratedKind::Class => "class",
            ElaboratedKind::Enum => "enum",
        }
    }
}

/// A possibly `::`-qualified name. A run of fundamental type words such as
/// `unsigned long` is a single segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifiedName {
    /// The elaborating keyword, if written.
    pub elaborated: Option<ElaboratedKind>,
    /// The name components, outermost first.
    pub segments: Vec<Ident>,
    /// Source span.
    pub span: Span,
}

/// A named type with its cv-qualifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifiedType {
    /// `const` was written.
    pub is_const: bool,
    /// `volatile` was written.
    pub is_volatile: bool,
    /// The type name.
    pub name: QualifiedName,
}

/// A type as composed by a declarator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeNode {
    /// A named type with qualifiers.
    Named(QualifiedType),
    /// `T*`. Qualifiers on the pointer itself are kept but do not affect
    /// linkage.
    Pointer {
        /// The pointed-to type.
        pointee: Box<TypeNode>,
        /// `* const`.
        is_const: bool,
        /// `* volatile`.
        is_volatile: bool,
    },
    /// A C++ reference, `T&` or `T&&`.
    Reference {
        /// The referred-to type.
        referent: Box<TypeNode>,
        /// `&&`.
        rvalue: bool,
    },
    /// A block pointer, `R (^)(params)`.
    BlockPointer(Box<TypeNode>),
    /// `T[N]`.
    Array {
        /// The element type.
        element: Box<TypeNode>,
        /// The size expression, absent for `[]`.
        size: Option<Value>,
    },
    /// A function type, as reached through a function pointer.
    Function(FunctionType),
    /// An error node produced during recovery.
    Error(Span),
}

/// A function signature without a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionType {
    /// The return type.
    pub return_type: Box<TypeNode>,
    /// The parameters, in order.
    pub params: Vec<Parameter>,
    /// Whether the list ends with `...`.
    pub variadic: bool,
}

/// One function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// The parameter name, if written.
    pub name: Option<Ident>,
    /// The declared type.
    pub ty: TypeNode,
    /// A C++ default argument.
    pub default: Option<Value>,
    /// Source span.
    pub span: Span,
}

/// An expression kept as its token texts: an array size, an initializer or
/// a default argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    /// The tokens, in order.
    pub tokens: Vec<ValueToken>,
}

/// One token of a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueToken {
    /// The token's source text.
    pub text: String,
    /// Source span.
    pub span: Span,
}
