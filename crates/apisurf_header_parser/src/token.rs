//! Token types for the header lexer.
//!
//! Defines the [`CToken`] enum covering the keywords, punctuation and literal
//! classes that matter for declarations, plus the [`Token`] struct pairing a
//! token kind with its source [`Span`]. Literal text is never stored in the
//! token; it is read back from the source through the span.

use apisurf_source::Span;
use serde::{Deserialize, Serialize};

/// A header token kind.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum CToken {
    // === Storage and function specifiers ===
    /// `extern`
    Extern,
    /// `static`
    Static,
    /// `inline`, `__inline`, `__inline__`, `__forceinline`
    Inline,
    /// `typedef`
    Typedef,
    /// `register`, `thread_local`, `_Thread_local`, `__thread`, `mutable`, `constexpr`
    IgnoredStorage,

    // === Qualifiers ===
    /// `const`, `__const`
    Const,
    /// `volatile`, `__volatile__`
    Volatile,

    // === Type introducers ===
    /// `struct`
    Struct,
    /// `union`
    Union,
    /// `class`
    Class,
    /// `enum`
    Enum,
    /// A fundamental type word: `void`, `char`, `int`, `unsigned`, ...
    Builtin,

    // === C++ declarations ===
    /// `namespace`
    Namespace,
    /// `using`
    Using,
    /// `template`
    Template,
    /// `static_assert`, `_Static_assert`
    StaticAssert,

    // === Decorations skipped by the parser ===
    /// `restrict`, `__restrict`, `__restrict__`, `_Noreturn`, `__extension__`
    Decoration,
    /// `__attribute__`, `__attribute`, `__declspec`, `alignas`, `_Alignas`
    Attribute,
    /// `asm`, `__asm`, `__asm__`
    Asm,

    // === Punctuation ===
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `*`
    Star,
    /// `&`
    Amp,
    /// `&&`
    AmpAmp,
    /// `^` (block pointer)
    Caret,
    /// `:`
    Colon,
    /// `::`
    ColonColon,
    /// `=`
    Equals,
    /// `...`
    Ellipsis,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// Any other operator; only meaningful inside value expressions.
    Operator,

    // === Literals and names ===
    /// An identifier that is not a keyword.
    Identifier,
    /// A numeric literal, including suffixes.
    Number,
    /// A string literal, including the quotes.
    StringLiteral,
    /// A character literal, including the quotes.
    CharLiteral,

    // === Special ===
    /// A whole preprocessor line, from `#` to the unescaped end of line.
    Directive,
    /// A byte sequence the lexer could not classify.
    Error,
    /// End of input.
    Eof,
}

impl CToken {
    /// Returns `true` for tokens that begin a declaration specifier sequence.
    pub fn starts_specifier(self) -> bool {
        matches!(
            self,
            CToken::Extern
                | CToken::Static
                | CToken::Inline
                | CToken::Typedef
                | CToken::IgnoredStorage
                | CToken::Const
                | CToken::Volatile
                | CToken::Struct
                | CToken::Union
                | CToken::Class
                | CToken::Enum
                | CToken::Builtin
                | CToken::Decoration
                | CToken::Attribute
                | CToken::Identifier
                | CToken::ColonColon
        )
    }

    /// A short human-readable description used in "expected X, found Y" errors.
    pub fn describe(self) -> &'static str {
        match self {
            CToken::LeftParen => "'('",
            CToken::RightParen => "')'",
            CToken::LeftBrace => "'{'",
            CToken::RightBrace => "'}'",
            CToken::LeftBracket => "'['",
            CToken::RightBracket => "']'",
            CToken::Semicolon => "';'",
            CToken::Comma => "','",
            CToken::Identifier => "identifier",
            CToken::Eof => "end of file",
            CToken::Directive => "preprocessor directive",
            CToken::StringLiteral => "string literal",
            CToken::Number => "number",
            _ => "token",
        }
    }
}

/// A token with its kind and source location.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Token {
    /// The kind of this token.
    pub kind: CToken,
    /// The source span covering this token's text.
    pub span: Span,
}

/// Looks up a keyword from its text. Returns `None` for ordinary identifiers.
pub fn lookup_keyword(text: &str) -> Option<CToken> {
    let kind = match text {
        "extern" => CToken::Extern,
        "static" => CToken::Static,
        "inline" | "__inline" | "__inline__" | "__forceinline" => CToken::Inline,
        "typedef" => CToken::Typedef,
        "register" | "thread_local" | "_Thread_local" | "__thread" | "mutable" | "constexpr" => {
            CToken::IgnoredStorage
        }
        "const" | "__const" | "__const__" => CToken::Const,
        "volatile" | "__volatile" | "__volatile__" => CToken::Volatile,
        "struct" => CToken::Struct,
        "union" => CToken::Union,
        "class" => CToken::Class,
        "enum" => CToken::Enum,
        "void" | "char" | "short" | "int" | "long" | "float" | "double" | "signed"
        | "unsigned" | "__signed__" | "_Bool" | "bool" | "_Complex" | "wchar_t" | "char8_t"
        | "char16_t" | "char32_t" => CToken::Builtin,
        "namespace" => CToken::Namespace,
        "using" => CToken::Using,
        "template" => CToken::Template,
        "static_assert" | "_Static_assert" => CToken::StaticAssert,
        "restrict" | "__restrict" | "__restrict__" | "_Noreturn" | "__extension__" => {
            CToken::Decoration
        }
        "__attribute__" | "__attribute" | "__declspec" | "alignas" | "_Alignas" => {
            CToken::Attribute
        }
        "asm" | "__asm" | "__asm__" => CToken::Asm,
        _ => return None,
    };
    Some(kind)
}
