//! Diagnostic rendering.
//!
//! Two forms: a one-line `file:line:col — message [code]` rendering for
//! logs and test assertions, and an ariadne report with labeled spans,
//! hint notes, and fix help lines. The colorless option keeps test output
//! deterministic.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use tova_common::{Diagnostic, Severity};

/// Rendering options.
#[derive(Copy, Clone, Debug)]
pub struct RenderOptions {
    pub color: bool,
}

impl RenderOptions {
    /// Colorless output, for deterministic snapshots.
    pub fn colorless() -> Self {
        RenderOptions { color: false }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions { color: true }
    }
}

/// The one-line rendering: `file:line:col — message [code]`, with hint
/// and fix appended as extra lines when present.
pub fn render_line(diagnostic: &Diagnostic) -> String {
    let mut out = format!("{} [{}]", diagnostic, diagnostic.code);
    if let Some(hint) = &diagnostic.hint {
        out.push_str(&format!("\n  hint: {hint}"));
    }
    if let Some(fix) = &diagnostic.fix {
        out.push_str(&format!("\n  fix: {}", fix.description));
    }
    out
}

/// Byte offset of a 1-indexed (line, column) position in `source`.
fn offset_of(source: &str, line: u32, column: u32) -> usize {
    let mut remaining = line.saturating_sub(1);
    let mut offset = 0;
    for (i, ch) in source.char_indices() {
        if remaining == 0 {
            break;
        }
        if ch == '\n' {
            remaining -= 1;
            offset = i + 1;
        }
    }
    (offset + column.saturating_sub(1) as usize).min(source.len())
}

/// Render a diagnostic as an ariadne report over the given source text.
pub fn render_diagnostic(diagnostic: &Diagnostic, source: &str, options: &RenderOptions) -> String {
    let config = Config::default().with_color(options.color);
    let kind = match diagnostic.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
    };

    let start = offset_of(source, diagnostic.loc.line, diagnostic.loc.column);
    let len = diagnostic.length.unwrap_or(1).max(1) as usize;
    let span: Range<usize> = start..(start + len).min(source.len().max(start + 1));

    let label_color = match diagnostic.severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
    };

    let mut builder = Report::build(kind, span.clone())
        .with_code(diagnostic.code.as_str())
        .with_message(&diagnostic.message)
        .with_config(config)
        .with_label(
            Label::new(span)
                .with_message(&diagnostic.message)
                .with_color(label_color),
        );

    let mut help = Vec::new();
    if let Some(hint) = &diagnostic.hint {
        help.push(hint.clone());
    }
    if let Some(fix) = &diagnostic.fix {
        help.push(fix.description.clone());
    }
    if !help.is_empty() {
        builder.set_help(help.join("; "));
    }

    let mut buf = Vec::new();
    let cache = Source::from(source);
    builder
        .finish()
        .write(cache, &mut buf)
        .expect("diagnostic rendering never fails on an in-memory buffer");
    String::from_utf8_lossy(&buf).into_owned()
}
