//! Core parser infrastructure and top-level header items.
//!
//! The [`HeaderParser`] struct provides primitive operations (advance, expect,
//! eat), balanced skipping and error recovery, while the top-level methods
//! handle namespaces, linkage blocks, `using`, templates and preprocessor
//! lines. Declarations themselves live in `decl.rs`.

use crate::ast::*;
use crate::token::{CToken, Token};
use apisurf_common::{Ident, Interner};
use apisurf_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use apisurf_source::Span;
use std::collections::HashSet;

/// A recursive descent parser for public C/C++ header text.
///
/// The parser consumes the token stream produced by the lexer and builds a
/// [`HeaderAst`]. Errors are reported to the diagnostic sink and represented
/// as `Error` variants in the tree.
pub struct HeaderParser<'src> {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) source: &'src str,
    pub(crate) interner: &'src Interner,
    pub(crate) sink: &'src DiagnosticSink,
    /// Identifiers treated as decoration, like `__attribute__`.
    pub(crate) ignore_macros: &'src HashSet<String>,
}

impl<'src> HeaderParser<'src> {
    /// Creates a new parser from a token stream produced by the lexer.
    ///
    /// The `tokens` must have been lexed from `source`. Identifiers are
    /// interned via `interner`, and parse errors are emitted to `sink`.
    pub fn new(
        tokens: Vec<Token>,
        source: &'src str,
        interner: &'src Interner,
        sink: &'src DiagnosticSink,
        ignore_macros: &'src HashSet<String>,
    ) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            interner,
            sink,
            ignore_macros,
        }
    }

    // ========================================================================
    // Primitive operations
    // ========================================================================

    /// Returns the kind of the current token.
    pub(crate) fn current(&self) -> CToken {
        self.tokens[self.pos].kind
    }

    /// Returns the span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    /// Returns the source text of the current token.
    pub(crate) fn current_text(&self) -> &'src str {
        self.text_of(self.current_span())
    }

    pub(crate) fn text_of(&self, span: Span) -> &'src str {
        self.source
            .get(span.start as usize..span.end as usize)
            .unwrap_or_default()
    }

    /// Returns `true` if the current token matches the given kind.
    pub(crate) fn at(&self, kind: CToken) -> bool {
        self.current() == kind
    }

    /// Returns `true` if the parser is at end of file.
    pub(crate) fn at_eof(&self) -> bool {
        self.current() == CToken::Eof
    }

    /// Returns the kind of the token at pos+offset.
    pub(crate) fn peek_kind(&self, offset: usize) -> CToken {
        self.tokens
            .get(self.pos + offset)
            .map_or(CToken::Eof, |t| t.kind)
    }

    /// Returns the span of the previous token.
    pub(crate) fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            self.current_span()
        }
    }

    /// Span from `start` through the last consumed token.
    pub(crate) fn span_from(&self, start: Span) -> Span {
        start.merge(self.prev_span())
    }

    /// Advances past the current token.
    pub(crate) fn advance(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    /// Consumes the current token if it matches the given kind. Returns `true` if consumed.
    pub(crate) fn eat(&mut self, kind: CToken) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects the current token to match the given kind. Emits an error if not.
    pub(crate) fn expect(&mut self, kind: CToken) {
        if !self.eat(kind) {
            self.expected(kind.describe());
        }
    }

    /// Interns the current identifier and advances.
    pub(crate) fn intern_current(&mut self) -> Ident {
        let ident = self.interner.get_or_intern(self.current_text());
        self.advance();
        ident
    }

    /// Returns `true` if the current token is an identifier configured as an
    /// ignored macro.
    pub(crate) fn at_ignored_macro(&self) -> bool {
        self.at(CToken::Identifier) && self.ignore_macros.contains(self.current_text())
    }

    // ========================================================================
    // Error handling and recovery
    // ========================================================================

    /// Emits a syntax error at the current position.
    pub(crate) fn error(&self, msg: &str) {
        self.sink.emit(Diagnostic::error(
            DiagnosticCode::SYNTAX,
            msg,
            self.current_span(),
        ));
    }

    /// Emits an "expected X" error at the current position.
    pub(crate) fn expected(&self, what: &str) {
        let found = match self.current() {
            CToken::Identifier | CToken::Builtin => format!("'{}'", self.current_text()),
            kind => kind.describe().to_string(),
        };
        self.error(&format!("expected {what}, found {found}"));
    }

    /// Emits a warning that a construct was skipped without inspection.
    pub(crate) fn skipped(&self, msg: &str, note: &str, span: Span) {
        self.sink
            .emit(Diagnostic::warning(DiagnosticCode::SKIPPED, msg, span).with_note(note));
    }

    /// Skips a balanced `open ... close` group starting at the current token.
    pub(crate) fn skip_balanced(&mut self, open: CToken, close: CToken) -> Span {
        let start = self.current_span();
        let mut depth = 0usize;
        loop {
            if self.at_eof() {
                self.sink.emit(Diagnostic::error(
                    DiagnosticCode::UNBALANCED,
                    format!("unclosed {}", open.describe()),
                    start,
                ));
                return self.span_from(start);
            }
            let kind = self.current();
            self.advance();
            if kind == open {
                depth += 1;
            } else if kind == close {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return self.span_from(start);
                }
            }
        }
    }

    /// Recovers to a semicolon, consuming it. Stops before a `}` that would
    /// close an enclosing block.
    pub(crate) fn recover_to_semicolon(&mut self) {
        loop {
            match self.current() {
                CToken::Eof | CToken::RightBrace => return,
                CToken::Semicolon => {
                    self.advance();
                    return;
                }
                CToken::LeftBrace => {
                    self.skip_balanced(CToken::LeftBrace, CToken::RightBrace);
                }
                CToken::LeftParen => {
                    self.skip_balanced(CToken::LeftParen, CToken::RightParen);
                }
                _ => self.advance(),
            }
        }
    }

    /// Skips attributes, `asm` labels, decorations and ignored macros.
    pub(crate) fn skip_decorations(&mut self) {
        loop {
            match self.current() {
                CToken::Decoration => self.advance(),
                CToken::Attribute | CToken::Asm => {
                    self.advance();
                    if self.at(CToken::LeftParen) {
                        self.skip_balanced(CToken::LeftParen, CToken::RightParen);
                    }
                }
                CToken::Identifier if self.at_ignored_macro() => {
                    self.advance();
                    if self.at(CToken::LeftParen) {
                        self.skip_balanced(CToken::LeftParen, CToken::RightParen);
                    }
                }
                CToken::LeftBracket if self.peek_kind(1) == CToken::LeftBracket => {
                    self.skip_balanced(CToken::LeftBracket, CToken::RightBracket);
                }
                _ => return,
            }
        }
    }

    // ========================================================================
    // Top-level parsing
    // ========================================================================

    /// Parses a complete header.
    pub fn parse_header(&mut self) -> HeaderAst {
        let start = self.current_span();
        let items = self.parse_items(false);
        let span = if items.is_empty() {
            start
        } else {
            self.span_from(start)
        };
        HeaderAst { items, span }
    }

    /// Parses items until end of file, or until a `}` when `in_block`.
    pub(crate) fn parse_items(&mut self, in_block: bool) -> Vec<Item> {
        let mut items = Vec::new();
        while !self.at_eof() {
            if self.at(CToken::RightBrace) {
                if in_block {
                    break;
                }
                let span = self.current_span();
                self.sink.emit(Diagnostic::error(
                    DiagnosticCode::UNBALANCED,
                    "unmatched '}'",
                    span,
                ));
                self.advance();
                items.push(Item::Error(span));
                continue;
            }

            let before = self.pos;
            self.parse_item(&mut items);
            if self.pos == before {
                self.expected("declaration");
                items.push(Item::Error(self.current_span()));
                self.advance();
            }
        }
        items
    }

    fn parse_item(&mut self, items: &mut Vec<Item>) {
        match self.current() {
            CToken::Directive => items.push(self.parse_directive()),
            CToken::Semicolon => self.advance(),
            CToken::Namespace => items.push(self.parse_namespace()),
            CToken::Inline if self.peek_kind(1) == CToken::Namespace => {
                self.advance();
                items.push(self.parse_namespace());
            }
            CToken::Extern if self.peek_kind(1) == CToken::StringLiteral => {
                items.push(self.parse_linkage());
            }
            CToken::Using => items.push(self.parse_using()),
            CToken::Template => items.push(self.skip_template()),
            CToken::StaticAssert => items.push(self.skip_static_assert()),
            CToken::LeftBracket if self.peek_kind(1) == CToken::LeftBracket => {
                self.skip_decorations();
                self.eat(CToken::Semicolon);
            }
            CToken::Decoration | CToken::Attribute | CToken::Asm => {
                self.skip_decorations();
                self.eat(CToken::Semicolon);
            }
            CToken::Identifier if self.at_ignored_macro() => {
                self.skip_decorations();
                self.eat(CToken::Semicolon);
            }
            kind if kind.starts_specifier() => {
                items.extend(self.parse_declaration(Specifiers::default()));
            }
            _ => {
                let start = self.current_span();
                self.expected("declaration");
                self.recover_to_semicolon();
                items.push(Item::Error(self.span_from(start)));
            }
        }
    }

    /// Parses a preprocessor line.
    fn parse_directive(&mut self) -> Item {
        let span = self.current_span();
        let text = self.current_text();
        self.advance();

        let body = text.trim_start_matches('#').trim_start();
        let keyword_len = body
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(body.len());
        let (keyword, rest) = body.split_at(keyword_len);
        let rest = strip_line_comment(rest).trim();

        match keyword {
            "include" | "include_next" | "import" => {
                let (path, system) = parse_include_path(rest);
                Item::Include(IncludeDirective { path, system, span })
            }
            "define" => {
                let name_len = rest
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(rest.len());
                if name_len == 0 {
                    self.sink.emit(Diagnostic::error(
                        DiagnosticCode::SYNTAX,
                        "macro name missing in #define",
                        span,
                    ));
                    return Item::Error(span);
                }
                let name = self.interner.get_or_intern(&rest[..name_len]);
                Item::Define(DefineDirective { name, span })
            }
            "pragma" => Item::Pragma(PragmaDirective {
                text: rest.to_string(),
                span,
            }),
            _ => Item::Directive(OtherDirective {
                keyword: keyword.to_string(),
                span,
            }),
        }
    }

    /// Parses `namespace a::b { ... }` or `namespace a = b;`.
    fn parse_namespace(&mut self) -> Item {
        let start = self.current_span();
        self.expect(CToken::Namespace);
        self.skip_decorations();

        let mut name = Vec::new();
        while self.at(CToken::Identifier) {
            name.push(self.intern_current());
            if !self.eat(CToken::ColonColon) {
                break;
            }
        }

        if self.eat(CToken::Equals) {
            let target = self.parse_qualified_name();
            self.expect(CToken::Semicolon);
            let span = self.span_from(start);
            let Some(&alias) = name.first() else {
                self.sink.emit(Diagnostic::error(
                    DiagnosticCode::SYNTAX,
                    "namespace alias without a name",
                    span,
                ));
                return Item::Error(span);
            };
            return Item::Using(UsingDecl {
                kind: UsingKind::NamespaceAlias {
                    name: alias,
                    target,
                },
                span,
            });
        }

        let items = self.parse_block(start);
        Item::Namespace(NamespaceDecl {
            name,
            items,
            span: self.span_from(start),
        })
    }

    /// Parses `extern "C" { ... }` or `extern "C" <declaration>`.
    fn parse_linkage(&mut self) -> Item {
        let start = self.current_span();
        self.expect(CToken::Extern);
        let abi = self.current_text().trim_matches('"').to_string();
        self.advance();

        let items = if self.at(CToken::LeftBrace) {
            self.parse_block(start)
        } else {
            let linked = Specifiers {
                is_extern: true,
                ..Specifiers::default()
            };
            self.parse_declaration(linked)
        };
        Item::Linkage(LinkageBlock {
            abi,
            items,
            span: self.span_from(start),
        })
    }

    /// Parses `{ items }`, reporting an unclosed block at `opener`.
    fn parse_block(&mut self, opener: Span) -> Vec<Item> {
        if !self.eat(CToken::LeftBrace) {
            self.expected("'{'");
            self.recover_to_semicolon();
            return Vec::new();
        }
        let items = self.parse_items(true);
        if !self.eat(CToken::RightBrace) {
            self.sink.emit(Diagnostic::error(
                DiagnosticCode::UNBALANCED,
                "unclosed block",
                opener,
            ));
        }
        items
    }

    /// Parses the three `using` forms.
    fn parse_using(&mut self) -> Item {
        let start = self.current_span();
        self.expect(CToken::Using);

        let kind = if self.eat(CToken::Namespace) {
            UsingKind::Directive(self.parse_qualified_name())
        } else if self.at(CToken::Identifier) && self.peek_kind(1) == CToken::Equals {
            let name = self.intern_current();
            self.expect(CToken::Equals);
            let ty = self.parse_type_id();
            UsingKind::Alias { name, ty }
        } else {
            if self.current_text() == "typename" {
                self.advance();
            }
            UsingKind::Declaration(self.parse_qualified_name())
        };
        self.expect(CToken::Semicolon);
        Item::Using(UsingDecl {
            kind,
            span: self.span_from(start),
        })
    }

    /// Skips a `template<...>` declaration as a unit.
    fn skip_template(&mut self) -> Item {
        let start = self.current_span();
        self.expect(CToken::Template);
        if self.at(CToken::Less) {
            self.skip_angles();
        }
        self.skip_declaration();
        let span = self.span_from(start);
        self.skipped(
            "template declaration skipped",
            "templates have no separately linked symbol",
            span,
        );
        Item::Template(span)
    }

    /// Skips `static_assert(...);`.
    fn skip_static_assert(&mut self) -> Item {
        let start = self.current_span();
        self.expect(CToken::StaticAssert);
        if self.at(CToken::LeftParen) {
            self.skip_balanced(CToken::LeftParen, CToken::RightParen);
        } else {
            self.expected("'('");
        }
        self.expect(CToken::Semicolon);
        Item::StaticAssert(self.span_from(start))
    }

    /// Skips a `<...>` group, treating `>>` as two closers.
    pub(crate) fn skip_angles(&mut self) {
        let start = self.current_span();
        let mut depth = 0i32;
        loop {
            match self.current() {
                CToken::Eof | CToken::Semicolon | CToken::LeftBrace => {
                    self.sink.emit(Diagnostic::error(
                        DiagnosticCode::UNBALANCED,
                        "unclosed '<'",
                        start,
                    ));
                    return;
                }
                CToken::Less => depth += 1,
                CToken::Greater => depth -= 1,
                CToken::Operator if self.current_text() == ">>" => depth -= 2,
                CToken::LeftParen => {
                    self.skip_balanced(CToken::LeftParen, CToken::RightParen);
                    continue;
                }
                _ => {}
            }
            self.advance();
            if depth <= 0 {
                return;
            }
        }
    }

    /// Skips one declaration of unknown shape: through a `;` at depth zero,
    /// or through a body that is not followed by declarators.
    fn skip_declaration(&mut self) {
        loop {
            match self.current() {
                CToken::Eof | CToken::RightBrace => return,
                CToken::Semicolon => {
                    self.advance();
                    return;
                }
                CToken::LeftBrace => {
                    self.skip_balanced(CToken::LeftBrace, CToken::RightBrace);
                    match self.current() {
                        CToken::Semicolon => {
                            self.advance();
                            return;
                        }
                        CToken::Identifier | CToken::Star | CToken::Comma => {}
                        _ => return,
                    }
                }
                CToken::LeftParen => {
                    self.skip_balanced(CToken::LeftParen, CToken::RightParen);
                }
                CToken::LeftBracket => {
                    self.skip_balanced(CToken::LeftBracket, CToken::RightBracket);
                }
                _ => self.advance(),
            }
        }
    }
}

fn strip_line_comment(text: &str) -> &str {
    match text.find("//") {
        Some(idx) => &text[..idx],
        None => text,
    }
}

/// Splits an include operand into its path and whether it used `<...>`.
fn parse_include_path(rest: &str) -> (String, bool) {
    let delimited = |open: char, close: char| {
        rest.strip_prefix(open)
            .and_then(|tail| tail.split_once(close))
            .map(|(path, _)| path.to_string())
    };
    if let Some(path) = delimited('<', '>') {
        (path, true)
    } else if let Some(path) = delimited('"', '"') {
        (path, false)
    } else {
        (rest.to_string(), false)
    }
}
