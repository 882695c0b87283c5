//! Diagnostic rendering for the build log.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use apisurf_source::SourceDb;
use std::fmt::Write;

/// Formats diagnostics into printable strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic.
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String;
}

/// Renders diagnostics in a rustc-style terminal format:
///
/// ```text
/// error[E101]: expected ';', found '}'
///   --> furi/core/thread.h:10:5
///    |
/// 10 | void furi_thread_start(FuriThread* thread)
///    |     ^
///    = note: ...
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, severity: Severity, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        let code = match severity {
            Severity::Error => "31",
            Severity::Warning => "33",
            Severity::Note => "36",
        };
        format!("\x1b[1;{code}m{text}\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String {
        let mut out = String::new();
        let header = format!("{}[{}]", diag.severity, diag.code);
        let _ = writeln!(out, "{}: {}", self.paint(diag.severity, &header), diag.message);

        if !diag.primary_span.is_dummy() {
            let resolved = source_db.resolve_span(diag.primary_span);
            let file = source_db.get_file(diag.primary_span.file);
            let line_num = resolved.start_line.to_string();
            let padding = " ".repeat(line_num.len());
            let carets = "^".repeat(diag.primary_span.len().max(1) as usize);
            let col_padding = " ".repeat((resolved.start_col as usize).saturating_sub(1));

            let _ = writeln!(out, "{padding}--> {resolved}");
            let _ = writeln!(out, "{padding} |");
            let _ = writeln!(
                out,
                "{line_num} | {}",
                file.line_text(diag.primary_span.start)
            );
            let _ = writeln!(out, "{padding} | {col_padding}{carets}");
        }

        for note in &diag.notes {
            let _ = writeln!(out, "   = note: {note}");
        }
        for help in &diag.help {
            let _ = writeln!(out, "   = help: {help}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::DiagnosticCode;
    use apisurf_source::Span;

    #[test]
    fn render_error_with_span() {
        let mut db = SourceDb::new();
        let id = db.add_source("thread.h", "void f(int a\n".to_string());
        let diag = Diagnostic::error(DiagnosticCode::SYNTAX, "expected ')'", Span::new(id, 12, 13));

        let output = TerminalRenderer::new(false).render(&diag, &db);
        assert!(output.contains("error[E101]: expected ')'"));
        assert!(output.contains("--> thread.h:1:13"));
        assert!(output.contains("void f(int a"));
        assert!(output.contains('^'));
    }

    #[test]
    fn render_notes_without_source() {
        let db = SourceDb::new();
        let diag = Diagnostic::warning(DiagnosticCode::SKIPPED, "template skipped", Span::DUMMY)
            .with_note("templates are never exported")
            .with_help("move it to a private header");

        let output = TerminalRenderer::new(false).render(&diag, &db);
        assert!(output.contains("warning[W200]: template skipped"));
        assert!(output.contains("= note: templates are never exported"));
        assert!(output.contains("= help: move it to a private header"));
        assert!(!output.contains("-->"));
    }

    #[test]
    fn color_wraps_header() {
        let db = SourceDb::new();
        let diag = Diagnostic::error(DiagnosticCode::LEX, "bad", Span::DUMMY);
        let output = TerminalRenderer::new(true).render(&diag, &db);
        assert!(output.starts_with("\x1b[1;31merror[E100]"));
    }
}
