//! Declaration specifiers, declarators, parameters and values.
//!
//! A declarator is read as a list of operations (pointer, reference, array,
//! function) applied in order to the base type from the specifiers. Pointer
//! prefixes bind tightest, then suffixes in reverse source order, then any
//! parenthesized inner declarator. This is how `int (*fp)(void)` becomes a
//! pointer to a function and `int m[3][4]` an array of three `int[4]`.

use crate::ast::*;
use crate::parser::HeaderParser;
use crate::token::CToken;
use apisurf_common::Ident;
use apisurf_diagnostics::{Diagnostic, DiagnosticCode};
use apisurf_source::Span;

/// The result of parsing declaration specifiers.
pub(crate) struct DeclSpecs {
    pub(crate) specifiers: Specifiers,
    pub(crate) is_typedef: bool,
    pub(crate) base: Option<QualifiedType>,
    /// Record and enum definitions written inside the specifiers.
    pub(crate) defined: Vec<Item>,
}

/// A declarator applied to its base type.
pub(crate) struct Declarator {
    pub(crate) name: Option<QualifiedName>,
    pub(crate) ty: TypeNode,
}

enum DeclOp {
    Pointer { is_const: bool, is_volatile: bool },
    Reference { rvalue: bool },
    Block,
    Array(Option<Value>),
    Function { params: Vec<Parameter>, variadic: bool },
}

struct RawDeclarator {
    name: Option<QualifiedName>,
    ops: Vec<DeclOp>,
}

fn apply_op(ty: TypeNode, op: DeclOp) -> TypeNode {
    match op {
        DeclOp::Pointer {
            is_const,
            is_volatile,
        } => TypeNode::Pointer {
            pointee: Box::new(ty),
            is_const,
            is_volatile,
        },
        DeclOp::Reference { rvalue } => TypeNode::Reference {
            referent: Box::new(ty),
            rvalue,
        },
        DeclOp::Block => TypeNode::BlockPointer(Box::new(ty)),
        DeclOp::Array(size) => TypeNode::Array {
            element: Box::new(ty),
            size,
        },
        DeclOp::Function { params, variadic } => TypeNode::Function(FunctionType {
            return_type: Box::new(ty),
            params,
            variadic,
        }),
    }
}

impl HeaderParser<'_> {
    /// Parses a simple declaration: specifiers, then comma-separated
    /// declarators, then `;` or a function body.
    pub(crate) fn parse_declaration(&mut self, inherited: Specifiers) -> Vec<Item> {
        let start = self.current_span();
        let specs = self.parse_decl_specifiers(inherited);
        let mut items = specs.defined;

        let Some(base) = specs.base else {
            self.expected("type");
            self.recover_to_semicolon();
            items.push(Item::Error(self.span_from(start)));
            return items;
        };

        if self.eat(CToken::Semicolon) {
            if items.is_empty() {
                if let Some(kind) = base.name.elaborated {
                    items.push(Item::ForwardDecl(ForwardDecl {
                        kind,
                        name: base.name,
                        span: self.span_from(start),
                    }));
                }
            }
            return items;
        }

        loop {
            let decl = self.parse_declarator(TypeNode::Named(base.clone()));
            let is_function = matches!(decl.ty, TypeNode::Function(_));
            if is_function {
                self.skip_function_trailer();
                if self.at(CToken::LeftBrace) {
                    self.skip_balanced(CToken::LeftBrace, CToken::RightBrace);
                    let span = self.span_from(start);
                    self.push_declarator(
                        &mut items,
                        specs.specifiers,
                        specs.is_typedef,
                        decl,
                        None,
                        true,
                        span,
                    );
                    return items;
                }
            } else {
                self.skip_decorations();
            }

            let initializer = if self.eat(CToken::Equals) {
                self.parse_value(&[CToken::Comma, CToken::Semicolon])
            } else if self.at(CToken::LeftBrace) {
                self.parse_braced_value()
            } else {
                None
            };
            let span = self.span_from(start);
            self.push_declarator(
                &mut items,
                specs.specifiers,
                specs.is_typedef,
                decl,
                initializer,
                false,
                span,
            );

            if !self.eat(CToken::Comma) {
                break;
            }
        }

        if !self.eat(CToken::Semicolon) {
            self.expected("';'");
            self.recover_to_semicolon();
        }
        items
    }

    #[allow(clippy::too_many_arguments)]
    fn push_declarator(
        &self,
        items: &mut Vec<Item>,
        specifiers: Specifiers,
        is_typedef: bool,
        decl: Declarator,
        initializer: Option<Value>,
        has_body: bool,
        span: Span,
    ) {
        let Some(name) = decl.name.filter(|n| !n.segments.is_empty()) else {
            self.skipped(
                "declaration without a name skipped",
                "only named functions and variables can be exported",
                span,
            );
            return;
        };

        if is_typedef {
            if let Some(&last) = name.segments.last() {
                items.push(Item::Typedef(TypedefDecl {
                    name: last,
                    ty: decl.ty,
                    span,
                }));
            }
            return;
        }

        match decl.ty {
            TypeNode::Function(f) => items.push(Item::Function(FunctionDecl {
                name,
                return_type: *f.return_type,
                params: f.params,
                variadic: f.variadic,
                specifiers,
                has_body,
                span,
            })),
            ty => items.push(Item::Variable(VariableDecl {
                name,
                ty,
                specifiers,
                initializer,
                span,
            })),
        }
    }

    /// Parses storage specifiers, cv-qualifiers and the base type name.
    pub(crate) fn parse_decl_specifiers(&mut self, inherited: Specifiers) -> DeclSpecs {
        let mut specs = DeclSpecs {
            specifiers: inherited,
            is_typedef: false,
            base: None,
            defined: Vec::new(),
        };
        let mut is_const = false;
        let mut is_volatile = false;
        let mut builtin_words: Vec<&str> = Vec::new();
        let mut builtin_span: Option<Span> = None;
        let mut name: Option<QualifiedName> = None;

        loop {
            let has_type = name.is_some() || !builtin_words.is_empty();
            match self.current() {
                CToken::Extern => specs.specifiers.is_extern = true,
                CToken::Static => specs.specifiers.is_static = true,
                CToken::Inline => specs.specifiers.is_inline = true,
                CToken::Typedef => specs.is_typedef = true,
                CToken::IgnoredStorage => {}
                CToken::Const => is_const = true,
                CToken::Volatile => is_volatile = true,
                CToken::Decoration | CToken::Attribute | CToken::Asm => {
                    self.skip_decorations();
                    continue;
                }
                CToken::LeftBracket if self.peek_kind(1) == CToken::LeftBracket => {
                    self.skip_decorations();
                    continue;
                }
                CToken::Identifier if self.at_ignored_macro() => {
                    self.skip_decorations();
                    continue;
                }
                CToken::Identifier if self.current_text() == "typename" => {}
                CToken::Builtin if name.is_none() => {
                    let span = self.current_span();
                    builtin_words.push(self.current_text());
                    builtin_span = Some(builtin_span.map_or(span, |s| s.merge(span)));
                }
                CToken::Struct | CToken::Union | CToken::Class | CToken::Enum if !has_type => {
                    name = Some(self.parse_elaborated(&mut specs.defined));
                    continue;
                }
                CToken::Identifier | CToken::ColonColon if !has_type => {
                    name = Some(self.parse_qualified_name());
                    continue;
                }
                _ => break,
            }
            self.advance();
        }

        if let Some(span) = builtin_span {
            let text = builtin_words.join(" ");
            name = Some(QualifiedName {
                elaborated: None,
                segments: vec![self.interner.get_or_intern(&text)],
                span,
            });
        }
        specs.base = name.map(|name| QualifiedType {
            is_const,
            is_volatile,
            name,
        });
        specs
    }

    /// Parses `struct|union|class|enum [name] [body]`, recording a definition
    /// in `defined` when a body is present.
    fn parse_elaborated(&mut self, defined: &mut Vec<Item>) -> QualifiedName {
        let start = self.current_span();
        let kind = match self.current() {
            CToken::Struct => ElaboratedKind::Struct,
            CToken::Union => ElaboratedKind::Union,
            CToken::Class => ElaboratedKind::Class,
            _ => ElaboratedKind::Enum,
        };
        self.advance();

        let scoped = kind == ElaboratedKind::Enum
            && (self.eat(CToken::Class) || self.eat(CToken::Struct));
        self.skip_decorations();
        let tag = if self.at(CToken::Identifier) || self.at(CToken::ColonColon) {
            Some(self.parse_qualified_name())
        } else {
            None
        };
        self.skip_decorations();
        if self.at(CToken::Identifier) && self.current_text() == "final" {
            self.advance();
        }

        // Base clause or underlying enum type.
        if self.eat(CToken::Colon) {
            while !matches!(
                self.current(),
                CToken::LeftBrace | CToken::Semicolon | CToken::Eof
            ) {
                self.advance();
            }
        }

        if self.at(CToken::LeftBrace) {
            if kind == ElaboratedKind::Enum {
                let enumerators = self.parse_enum_body();
                defined.push(Item::Enum(EnumDecl {
                    name: tag.as_ref().and_then(|t| t.segments.last().copied()),
                    scoped,
                    enumerators,
                    span: self.span_from(start),
                }));
            } else {
                self.skip_balanced(CToken::LeftBrace, CToken::RightBrace);
                let record_kind = match kind {
                    ElaboratedKind::Union => RecordKind::Union,
                    ElaboratedKind::Class => RecordKind::Class,
                    _ => RecordKind::Struct,
                };
                defined.push(Item::Record(RecordDecl {
                    kind: record_kind,
                    name: tag.clone(),
                    span: self.span_from(start),
                }));
            }
        }

        QualifiedName {
            elaborated: Some(kind),
            segments: tag.map(|t| t.segments).unwrap_or_default(),
            span: self.span_from(start),
        }
    }

    /// Parses `{ A, B = 1, ... }` and returns the enumerator names.
    fn parse_enum_body(&mut self) -> Vec<Ident> {
        let start = self.current_span();
        self.expect(CToken::LeftBrace);
        let mut enumerators = Vec::new();
        loop {
            match self.current() {
                CToken::Eof => {
                    self.sink.emit(Diagnostic::error(
                        DiagnosticCode::UNBALANCED,
                        "unclosed enum body",
                        start,
                    ));
                    break;
                }
                CToken::RightBrace => {
                    self.advance();
                    break;
                }
                CToken::Directive | CToken::Comma => self.advance(),
                CToken::Identifier if !self.at_ignored_macro() => {
                    enumerators.push(self.intern_current());
                    self.skip_decorations();
                    if self.eat(CToken::Equals) {
                        self.parse_value(&[CToken::Comma, CToken::RightBrace]);
                    }
                }
                CToken::Identifier | CToken::Attribute | CToken::Decoration => {
                    self.skip_decorations();
                }
                _ => {
                    self.expected("enumerator");
                    self.advance();
                }
            }
        }
        enumerators
    }

    /// Parses a possibly `::`-qualified name. Template arguments are kept as
    /// part of the segment they follow.
    pub(crate) fn parse_qualified_name(&mut self) -> QualifiedName {
        let start = self.current_span();
        let mut segments = Vec::new();
        self.eat(CToken::ColonColon);
        loop {
            if !self.at(CToken::Identifier) {
                self.expected("identifier");
                break;
            }
            if self.current_text() == "operator" {
                segments.push(self.parse_operator_name());
                break;
            }
            let mut segment = self.current_text().to_string();
            self.advance();
            if self.at(CToken::Less) {
                segment.push_str(&self.collect_template_args());
            }
            segments.push(self.interner.get_or_intern(&segment));
            if self.at(CToken::ColonColon) && self.peek_kind(1) == CToken::Identifier {
                self.advance();
            } else {
                break;
            }
        }
        QualifiedName {
            elaborated: None,
            segments,
            span: self.span_from(start),
        }
    }

    /// Reads `operator==`, `operator()`, `operator bool` and friends as one name.
    fn parse_operator_name(&mut self) -> Ident {
        let mut text = String::from("operator");
        self.advance();
        if self.at(CToken::LeftParen) && self.peek_kind(1) == CToken::RightParen {
            text.push_str("()");
            self.advance();
            self.advance();
        } else {
            while !matches!(
                self.current(),
                CToken::LeftParen | CToken::Semicolon | CToken::Eof
            ) {
                push_token_text(&mut text, self.current_text());
                self.advance();
            }
        }
        self.interner.get_or_intern(&text)
    }

    /// Collects `<...>` as text, e.g. `<const char*, 4>`.
    fn collect_template_args(&mut self) -> String {
        let start = self.current_span();
        let mut text = String::new();
        let mut depth = 0i32;
        loop {
            match self.current() {
                CToken::Eof | CToken::Semicolon | CToken::LeftBrace => {
                    self.sink.emit(Diagnostic::error(
                        DiagnosticCode::UNBALANCED,
                        "unclosed template argument list",
                        start,
                    ));
                    return text;
                }
                CToken::Less => depth += 1,
                CToken::Greater => depth -= 1,
                CToken::Operator if self.current_text() == ">>" => depth -= 2,
                _ => {}
            }
            push_token_text(&mut text, self.current_text());
            self.advance();
            if depth <= 0 {
                return text;
            }
        }
    }

    /// Parses a declarator and applies it to `base`.
    pub(crate) fn parse_declarator(&mut self, base: TypeNode) -> Declarator {
        let raw = self.parse_raw_declarator();
        let ty = raw.ops.into_iter().fold(base, apply_op);
        Declarator { name: raw.name, ty }
    }

    fn parse_raw_declarator(&mut self) -> RawDeclarator {
        let mut ops = Vec::new();
        loop {
            match self.current() {
                CToken::Star => {
                    self.advance();
                    let (is_const, is_volatile) = self.parse_cv();
                    ops.push(DeclOp::Pointer {
                        is_const,
                        is_volatile,
                    });
                }
                CToken::Amp | CToken::AmpAmp => {
                    let rvalue = self.at(CToken::AmpAmp);
                    self.advance();
                    ops.push(DeclOp::Reference { rvalue });
                }
                CToken::Caret => {
                    self.advance();
                    ops.push(DeclOp::Block);
                }
                CToken::Decoration | CToken::Attribute | CToken::Asm => self.skip_decorations(),
                CToken::Identifier if self.at_ignored_macro() => self.skip_decorations(),
                _ => break,
            }
        }

        let mut name = None;
        let mut inner = None;
        if self.at(CToken::LeftParen)
            && matches!(
                self.peek_kind(1),
                CToken::Star | CToken::Amp | CToken::AmpAmp | CToken::Caret
            )
        {
            self.advance();
            inner = Some(self.parse_raw_declarator());
            self.expect(CToken::RightParen);
        } else if self.at(CToken::Identifier) || self.at(CToken::ColonColon) {
            name = Some(self.parse_qualified_name());
        }

        let mut suffixes = Vec::new();
        loop {
            match self.current() {
                CToken::LeftBracket if self.peek_kind(1) != CToken::LeftBracket => {
                    self.advance();
                    let size = self.parse_value(&[CToken::RightBracket]);
                    self.expect(CToken::RightBracket);
                    suffixes.push(DeclOp::Array(size));
                }
                CToken::LeftParen => {
                    let (params, variadic) = self.parse_params();
                    suffixes.push(DeclOp::Function { params, variadic });
                }
                CToken::Decoration | CToken::Attribute | CToken::Asm | CToken::LeftBracket => {
                    self.skip_decorations()
                }
                CToken::Identifier if self.at_ignored_macro() => self.skip_decorations(),
                _ => break,
            }
        }

        ops.extend(suffixes.into_iter().rev());
        if let Some(inner) = inner {
            ops.extend(inner.ops);
            name = inner.name;
        }
        RawDeclarator { name, ops }
    }

    /// Parses cv-qualifiers following a `*`.
    fn parse_cv(&mut self) -> (bool, bool) {
        let mut is_const = false;
        let mut is_volatile = false;
        loop {
            match self.current() {
                CToken::Const => is_const = true,
                CToken::Volatile => is_volatile = true,
                CToken::Decoration | CToken::Attribute => {
                    self.skip_decorations();
                    continue;
                }
                CToken::Identifier if self.at_ignored_macro() => {
                    self.skip_decorations();
                    continue;
                }
                _ => return (is_const, is_volatile),
            }
            self.advance();
        }
    }

    /// Parses `( params )`. `(void)` yields one `void` parameter.
    fn parse_params(&mut self) -> (Vec<Parameter>, bool) {
        self.expect(CToken::LeftParen);
        let mut params = Vec::new();
        let mut variadic = false;
        if self.eat(CToken::RightParen) {
            return (params, variadic);
        }
        loop {
            if self.eat(CToken::Ellipsis) {
                variadic = true;
                break;
            }
            params.push(self.parse_parameter());
            if self.eat(CToken::Ellipsis) {
                variadic = true;
                break;
            }
            if !self.eat(CToken::Comma) {
                break;
            }
        }
        if !self.eat(CToken::RightParen) {
            self.expected("')'");
            while !matches!(
                self.current(),
                CToken::RightParen | CToken::Semicolon | CToken::LeftBrace | CToken::Eof
            ) {
                self.advance();
            }
            self.eat(CToken::RightParen);
        }
        (params, variadic)
    }

    fn parse_parameter(&mut self) -> Parameter {
        let start = self.current_span();
        let specs = self.parse_decl_specifiers(Specifiers::default());
        let base = match specs.base {
            Some(base) => TypeNode::Named(base),
            None => {
                self.expected("parameter type");
                TypeNode::Error(self.current_span())
            }
        };
        let decl = self.parse_declarator(base);
        let default = if self.eat(CToken::Equals) {
            self.parse_value(&[CToken::Comma, CToken::RightParen])
        } else {
            None
        };
        Parameter {
            name: decl.name.and_then(|n| n.segments.last().copied()),
            ty: decl.ty,
            default,
            span: self.span_from(start),
        }
    }

    /// Parses a type with an abstract declarator, as in `using T = int (*)(void);`.
    pub(crate) fn parse_type_id(&mut self) -> TypeNode {
        let specs = self.parse_decl_specifiers(Specifiers::default());
        let Some(base) = specs.base else {
            self.expected("type");
            return TypeNode::Error(self.current_span());
        };
        self.parse_declarator(TypeNode::Named(base)).ty
    }

    /// Skips what may follow a function's parameter list: cv and ref
    /// qualifiers, `noexcept`, `override`, attributes and trailing return types.
    fn skip_function_trailer(&mut self) {
        loop {
            match self.current() {
                CToken::Const | CToken::Volatile | CToken::Amp | CToken::AmpAmp => self.advance(),
                CToken::Identifier
                    if matches!(
                        self.current_text(),
                        "noexcept" | "throw" | "override" | "final"
                    ) =>
                {
                    self.advance();
                    if self.at(CToken::LeftParen) {
                        self.skip_balanced(CToken::LeftParen, CToken::RightParen);
                    }
                }
                CToken::Operator if self.current_text() == "->" => {
                    self.advance();
                    self.parse_type_id();
                }
                CToken::Decoration | CToken::Attribute | CToken::Asm | CToken::LeftBracket => {
                    let before = self.pos;
                    self.skip_decorations();
                    if self.pos == before {
                        return;
                    }
                }
                CToken::Identifier if self.at_ignored_macro() => self.skip_decorations(),
                _ => return,
            }
        }
    }

    /// Collects tokens up to one of `terminators` at nesting depth zero.
    /// Returns `None` if no tokens were collected.
    pub(crate) fn parse_value(&mut self, terminators: &[CToken]) -> Option<Value> {
        let mut tokens = Vec::new();
        let mut depth = 0usize;
        loop {
            let kind = self.current();
            if kind == CToken::Eof
                || (depth == 0 && (terminators.contains(&kind) || kind == CToken::Semicolon))
            {
                break;
            }
            match kind {
                CToken::LeftParen | CToken::LeftBracket | CToken::LeftBrace => depth += 1,
                CToken::RightParen | CToken::RightBracket | CToken::RightBrace => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            tokens.push(self.value_token());
        }
        (!tokens.is_empty()).then_some(Value { tokens })
    }

    /// Collects a `{ ... }` initializer as a value.
    fn parse_braced_value(&mut self) -> Option<Value> {
        let start = self.current_span();
        let mut tokens = Vec::new();
        let mut depth = 0usize;
        loop {
            match self.current() {
                CToken::Eof => {
                    self.sink.emit(Diagnostic::error(
                        DiagnosticCode::UNBALANCED,
                        "unclosed initializer",
                        start,
                    ));
                    break;
                }
                CToken::LeftBrace => depth += 1,
                CToken::RightBrace => depth = depth.saturating_sub(1),
                _ => {}
            }
            tokens.push(self.value_token());
            if depth == 0 {
                break;
            }
        }
        Some(Value { tokens })
    }

    fn value_token(&mut self) -> ValueToken {
        let span = self.current_span();
        let token = ValueToken {
            text: self.current_text().to_string(),
            span,
        };
        self.advance();
        token
    }
}

/// Appends token text, separating adjacent words with a space and commas
/// with a trailing space.
fn push_token_text(out: &mut String, text: &str) {
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    if out.ends_with(is_word) && text.starts_with(is_word) {
        out.push(' ');
    }
    out.push_str(text);
    if text == "," {
        out.push(' ');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_text_spacing() {
        let mut out = String::new();
        for t in ["<", "unsigned", "int", ",", "4", ">"] {
            push_token_text(&mut out, t);
        }
        assert_eq!(out, "<unsigned int, 4>");
    }

    #[test]
    fn ops_compose_inside_out() {
        let base = TypeNode::Error(Span::DUMMY);
        let ty = [
            DeclOp::Array(None),
            DeclOp::Pointer {
                is_const: false,
                is_volatile: false,
            },
        ]
        .into_iter()
        .fold(base, apply_op);
        assert!(matches!(
            ty,
            TypeNode::Pointer { ref pointee, .. } if matches!(**pointee, TypeNode::Array { .. })
        ));
    }
}
