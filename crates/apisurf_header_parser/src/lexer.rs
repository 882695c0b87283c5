//! Lexical analyzer for C/C++ header text.
//!
//! Converts header text into a sequence of [`Token`]s. Comments, whitespace
//! and backslash-newline continuations are skipped. A preprocessor line is
//! kept whole as a single [`CToken::Directive`] token so the parser can record
//! includes, defines and pragmas without a preprocessor. Errors are reported
//! to the [`DiagnosticSink`] and produce [`CToken::Error`] tokens.

use crate::token::{lookup_keyword, CToken, Token};
use apisurf_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use apisurf_source::{FileId, Span};

/// Lexes header text into tokens. The result always ends with [`CToken::Eof`].
pub fn lex(source: &str, file: FileId, sink: &DiagnosticSink) -> Vec<Token> {
    let mut lexer = Lexer {
        source: source.as_bytes(),
        pos: 0,
        file,
        sink,
        at_line_start: true,
    };
    lexer.lex_all()
}

struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    file: FileId,
    sink: &'a DiagnosticSink,
    /// Only whitespace has been seen since the last newline.
    at_line_start: bool,
}

impl Lexer<'_> {
    fn lex_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            if self.pos >= self.source.len() {
                tokens.push(Token {
                    kind: CToken::Eof,
                    span: self.span_from(self.pos),
                });
                break;
            }
            let token = self.next_token();
            self.at_line_start = false;
            tokens.push(token);
        }
        tokens
    }

    fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.source.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(self.file, start as u32, self.pos as u32)
    }

    fn error(&self, msg: &str, span: Span) {
        self.sink
            .emit(Diagnostic::error(DiagnosticCode::LEX, msg, span));
    }

    fn skip_trivia(&mut self) {
        while self.pos < self.source.len() {
            match self.peek() {
                b'\n' => {
                    self.pos += 1;
                    self.at_line_start = true;
                }
                b if b.is_ascii_whitespace() => self.pos += 1,
                b'\\' if self.continuation_len() > 0 => self.pos += self.continuation_len(),
                b'/' if self.peek_at(1) == b'/' => self.skip_line_comment(),
                b'/' if self.peek_at(1) == b'*' => self.skip_block_comment(),
                _ => return,
            }
        }
    }

    /// Length of a backslash-newline sequence at the current position, or 0.
    fn continuation_len(&self) -> usize {
        match (self.peek_at(1), self.peek_at(2)) {
            (b'\n', _) => 2,
            (b'\r', b'\n') => 3,
            _ => 0,
        }
    }

    fn skip_line_comment(&mut self) {
        while self.pos < self.source.len() && self.peek() != b'\n' {
            if self.peek() == b'\\' && self.continuation_len() > 0 {
                self.pos += self.continuation_len();
            } else {
                self.pos += 1;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let start = self.pos;
        self.pos += 2;
        loop {
            if self.pos >= self.source.len() {
                self.error("unterminated block comment", self.span_from(start));
                return;
            }
            if self.peek() == b'*' && self.peek_at(1) == b'/' {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
    }

    fn next_token(&mut self) -> Token {
        let start = self.pos;
        let b = self.peek();

        if b == b'#' && self.at_line_start {
            return self.lex_directive(start);
        }
        if is_ident_start(b) {
            return self.lex_identifier_or_keyword(start);
        }
        if b.is_ascii_digit() || (b == b'.' && self.peek_at(1).is_ascii_digit()) {
            return self.lex_number(start);
        }
        if b == b'"' {
            return self.lex_quoted(start, b'"', CToken::StringLiteral);
        }
        if b == b'\'' {
            return self.lex_quoted(start, b'\'', CToken::CharLiteral);
        }
        self.lex_punctuation(start)
    }

    fn lex_directive(&mut self, start: usize) -> Token {
        while self.pos < self.source.len() {
            match self.peek() {
                b'\n' => break,
                b'\\' if self.continuation_len() > 0 => self.pos += self.continuation_len(),
                b'/' if self.peek_at(1) == b'*' => self.skip_block_comment(),
                b'/' if self.peek_at(1) == b'/' => self.skip_line_comment(),
                _ => self.pos += 1,
            }
        }
        Token {
            kind: CToken::Directive,
            span: self.span_from(start),
        }
    }

    fn lex_identifier_or_keyword(&mut self, start: usize) -> Token {
        while is_ident_char(self.peek()) {
            self.pos += 1;
        }
        // Encoding-prefixed literals: L"..", u8"..", u'..'
        if matches!(self.peek(), b'"' | b'\'')
            && matches!(&self.source[start..self.pos], b"L" | b"u" | b"U" | b"u8")
        {
            let quote = self.peek();
            let kind = if quote == b'"' {
                CToken::StringLiteral
            } else {
                CToken::CharLiteral
            };
            return self.lex_quoted(start, quote, kind);
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("");
        Token {
            kind: lookup_keyword(text).unwrap_or(CToken::Identifier),
            span: self.span_from(start),
        }
    }

    fn lex_number(&mut self, start: usize) -> Token {
        loop {
            let b = self.peek();
            let prev = if self.pos > start {
                self.source[self.pos - 1]
            } else {
                0
            };
            if b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b == b'\'' {
                self.pos += 1;
            } else if matches!(b, b'+' | b'-') && matches!(prev, b'e' | b'E' | b'p' | b'P') {
                self.pos += 1;
            } else {
                break;
            }
        }
        Token {
            kind: CToken::Number,
            span: self.span_from(start),
        }
    }

    /// Lexes a quoted literal. `self.pos` may sit on an encoding prefix.
    fn lex_quoted(&mut self, start: usize, quote: u8, kind: CToken) -> Token {
        while self.peek() != quote {
            self.pos += 1;
        }
        self.pos += 1;
        loop {
            match self.peek() {
                0 if self.pos >= self.source.len() => {
                    self.error("unterminated literal", self.span_from(start));
                    return Token {
                        kind: CToken::Error,
                        span: self.span_from(start),
                    };
                }
                b'\n' => {
                    self.error("newline in literal", self.span_from(start));
                    return Token {
                        kind: CToken::Error,
                        span: self.span_from(start),
                    };
                }
                b'\\' => self.pos += 2,
                b if b == quote => {
                    self.pos += 1;
                    break;
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.source.len());
        Token {
            kind,
            span: self.span_from(start),
        }
    }

    fn lex_punctuation(&mut self, start: usize) -> Token {
        let b = self.peek();
        let next = self.peek_at(1);
        let (kind, len) = match b {
            b'(' => (CToken::LeftParen, 1),
            b')' => (CToken::RightParen, 1),
            b'{' => (CToken::LeftBrace, 1),
            b'}' => (CToken::RightBrace, 1),
            b'[' => (CToken::LeftBracket, 1),
            b']' => (CToken::RightBracket, 1),
            b';' => (CToken::Semicolon, 1),
            b',' => (CToken::Comma, 1),
            b'*' if next == b'=' => (CToken::Operator, 2),
            b'*' => (CToken::Star, 1),
            b'&' if next == b'&' => (CToken::AmpAmp, 2),
            b'&' if next == b'=' => (CToken::Operator, 2),
            b'&' => (CToken::Amp, 1),
            b'^' if next == b'=' => (CToken::Operator, 2),
            b'^' => (CToken::Caret, 1),
            b':' if next == b':' => (CToken::ColonColon, 2),
            b':' => (CToken::Colon, 1),
            b'=' if next == b'=' => (CToken::Operator, 2),
            b'=' => (CToken::Equals, 1),
            b'.' if next == b'.' && self.peek_at(2) == b'.' => (CToken::Ellipsis, 3),
            b'<' if next == b'<' || next == b'=' => (CToken::Operator, 2),
            b'<' => (CToken::Less, 1),
            b'>' if next == b'>' || next == b'=' => (CToken::Operator, 2),
            b'>' => (CToken::Greater, 1),
            b'-' if matches!(next, b'>' | b'-' | b'=') => (CToken::Operator, 2),
            b'+' if matches!(next, b'+' | b'=') => (CToken::Operator, 2),
            b'|' if matches!(next, b'|' | b'=') => (CToken::Operator, 2),
            b'!' | b'/' | b'%' if next == b'=' => (CToken::Operator, 2),
            b'+' | b'-' | b'/' | b'%' | b'|' | b'!' | b'~' | b'?' | b'.' => (CToken::Operator, 1),
            _ => {
                let len = utf8_len(b);
                self.pos += len;
                self.error("unexpected character", self.span_from(start));
                return Token {
                    kind: CToken::Error,
                    span: self.span_from(start),
                };
            }
        };
        self.pos += len;
        Token {
            kind,
            span: self.span_from(start),
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Width of the UTF-8 sequence introduced by `lead`, so errors never split a
/// character.
fn utf8_len(lead: u8) -> usize {
    match lead {
        0xF0..=0xF7 => 4,
        0xE0..=0xEF => 3,
        0xC0..=0xDF => 2,
        _ => 1,
    }
}
