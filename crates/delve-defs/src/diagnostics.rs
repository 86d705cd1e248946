use std::fmt;

use ariadne::{Config, Label, Report, ReportKind, Source};

use crate::element::Span;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The file cannot be loaded.
    Error,
    /// The file loads, but something in it is suspicious.
    Warning,
}

/// A problem found while reading definition markup.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// How serious the problem is.
    pub severity: Severity,
    /// Byte range of the problem in the source.
    pub span: Span,
    /// Human-readable description.
    pub message: String,
    /// Optional text attached to the highlighted span.
    pub label: Option<String>,
}

impl Diagnostic {
    /// An error at `span`.
    pub fn error(span: Span, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            span,
            message: message.into(),
            label: None,
        }
    }

    /// A warning at `span`.
    pub fn warning(span: Span, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            span,
            message: message.into(),
            label: None,
        }
    }

    /// Attach label text to the highlighted span.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns true for error severity.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{prefix}: {}", self.message)
    }
}

/// Summarize a diagnostic list as one line per entry.
pub fn summarize(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| format!("{d} at {}..{}", d.span.start, d.span.end))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Render diagnostics against their source as plain text, in source order.
///
/// The output goes into log records and error values, so it carries no
/// terminal colors.
pub fn render_diagnostics(source: &str, origin: &str, diagnostics: &[Diagnostic]) -> String {
    let mut ordered: Vec<&Diagnostic> = diagnostics.iter().collect();
    ordered.sort_by_key(|d| (d.span.start, d.span.end));

    let mut output = Vec::new();
    for diag in ordered {
        let kind = match diag.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };

        // Spans past the end (unterminated constructs) are clamped so the
        // report still points somewhere useful.
        let end = diag.span.end.min(source.len());
        let span = diag.span.start.min(end.saturating_sub(1))..end;

        let label_text = diag.label.as_deref().unwrap_or(&diag.message);
        Report::build(kind, (origin, span.clone()))
            .with_config(Config::default().with_color(false))
            .with_message(&diag.message)
            .with_label(Label::new((origin, span)).with_message(label_text))
            .finish()
            .write((origin, Source::from(source)), &mut output)
            .ok();
    }

    String::from_utf8(output).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::error(0..5, "unclosed element <entity>");
        assert_eq!(d.to_string(), "error: unclosed element <entity>");
        assert!(d.is_error());
        assert!(!Diagnostic::warning(0..1, "odd").is_error());
    }

    #[test]
    fn summarize_joins_entries() {
        let diags = vec![
            Diagnostic::error(0..1, "first"),
            Diagnostic::warning(4..6, "second"),
        ];
        assert_eq!(summarize(&diags), "error: first at 0..1; warning: second at 4..6");
    }

    #[test]
    fn render_produces_output() {
        let source = "<entity name=\"dust\">\n  <Glyph>\n</entity>";
        let diags = vec![
            Diagnostic::error(34..40, "mismatched closing tag")
                .with_label("expected </Glyph>"),
        ];
        let output = render_diagnostics(source, "dust.xml", &diags);
        assert!(output.contains("mismatched closing tag"));
    }

    #[test]
    fn render_is_plain_text_in_source_order() {
        let source = "<a>&nbsp;</b>";
        let diags = vec![
            Diagnostic::error(11..12, "mismatched closing tag"),
            Diagnostic::warning(3..9, "unknown reference").with_label("kept verbatim"),
        ];
        let output = render_diagnostics(source, "a.xml", &diags);
        assert!(!output.contains('\u{1b}'));
        let warning = output.find("unknown reference").unwrap();
        let error = output.find("mismatched closing tag").unwrap();
        assert!(warning < error);
        assert!(output.contains("kept verbatim"));
    }

    #[test]
    fn render_clamps_spans_past_the_end() {
        let output = render_diagnostics("<a>", "a.xml", &[Diagnostic::error(3..9, "unclosed")]);
        assert!(output.contains("unclosed"));
    }
}
