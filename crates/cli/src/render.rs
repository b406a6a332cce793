//! Terminal and JSON rendering for sheet runs.
//!
//! Skipped-row diagnostics are rendered with ariadne against the CSV source
//! when the row can be located in it. Summaries and failures go to stderr in
//! pretty mode and to stdout as JSON otherwise, so piped output stays
//! machine-readable.

use std::io::{self, IsTerminal};
use std::ops::Range;

use ariadne::{Color, Config, Fmt, IndexType, Label, Report, ReportKind, Source};
use serde::Serialize;
use sticker_sheet_core::{BatchResult, SheetError, SkippedRecord, SourceError, Table};
use sticker_sheet_diagnostics::{Diagnostic, Severity, codes};
use sticker_sheet_profile::SheetProfile;
use sticker_sheet_profile::ProfileError;

// ── Output format ───────────────────────────────────────────────────────

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured terminal output.
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use the explicit choice, or pretty for terminals and JSON for pipes.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Severity mapping ────────────────────────────────────────────────────

fn report_kind(severity: &Severity) -> ReportKind<'static> {
    match severity {
        Severity::Error => ReportKind::Error,
        Severity::Warn => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
        _ => ReportKind::Warning,
    }
}

fn severity_color(severity: &Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warn => Color::Yellow,
        Severity::Info => Color::Blue,
        _ => Color::White,
    }
}

// ── Pretty rendering ────────────────────────────────────────────────────

/// The CSV a run read, for pointing diagnostics at their rows.
pub(crate) struct CsvSource<'a> {
    pub(crate) name: &'a str,
    pub(crate) text: &'a str,
    pub(crate) table: &'a Table,
}

impl CsvSource<'_> {
    /// Span of data row `row` without its line terminator, clamped to the
    /// source.
    fn line_span(&self, row: usize) -> Option<Range<usize>> {
        let span = self.table.row_span(row)?;
        let start = span.start.min(self.text.len());
        let end = span.end.min(self.text.len()).max(start);
        let line = self.text.get(start..end)?;
        Some(start..start + line.trim_end_matches(['\r', '\n']).len())
    }
}

/// Render `diagnostics` to stderr.
pub(crate) fn render_diagnostics_pretty(source: Option<&CsvSource<'_>>, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    let config = Config::default()
        .with_compact(false)
        .with_index_type(IndexType::Byte);

    for diag in diagnostics {
        let located = source.and_then(|src| {
            diag.row
                .and_then(|row| src.line_span(row))
                .map(|span| (src, span))
        });
        if let Some((src, span)) = located {
            let mut cache = (src.name, Source::from(src.text));
            let row_label = diag
                .row
                .map_or_else(String::new, |row| format!("data row {}", row + 1));
            let mut builder = Report::build(report_kind(&diag.severity), (src.name, span.clone()))
                .with_code(diag.id.as_ref())
                .with_message(&diag.message)
                .with_config(config)
                .with_label(
                    Label::new((src.name, span))
                        .with_message(row_label)
                        .with_color(severity_color(&diag.severity)),
                );
            if let Some(explanation) = diag.explain() {
                builder = builder.with_help(explanation);
            }
            builder.finish().eprint(&mut cache).ok();
        } else {
            eprintln!("{diag}");
            if let Some(explanation) = diag.explain() {
                eprintln!("  = help: {explanation}");
            }
        }
    }
}

/// Sheet-level warnings for a run with `profile`.
pub(crate) fn sheet_warnings(profile: &SheetProfile) -> Vec<Diagnostic> {
    profile
        .grid_overflow()
        .map(|overflow| {
            Diagnostic::warn(
                codes::GRID_OVERFLOW,
                format!("grid runs past the page edge: {overflow}"),
                None,
            )
        })
        .into_iter()
        .collect()
}

/// Render every skipped record as a warning.
pub(crate) fn render_skipped(source: Option<&CsvSource<'_>>, skipped: &[SkippedRecord]) {
    let diagnostics: Vec<Diagnostic> = skipped.iter().map(SkippedRecord::to_diagnostic).collect();
    render_diagnostics_pretty(source, &diagnostics);
}

// ── Summaries ───────────────────────────────────────────────────────────

/// JSON shape of a finished run.
#[derive(Debug, Serialize)]
pub(crate) struct SheetSummary<'a> {
    pub(crate) success: bool,
    pub(crate) output: &'a str,
    pub(crate) success_count: usize,
    pub(crate) pages: u32,
    pub(crate) blank_count: usize,
    pub(crate) skipped: &'a [SkippedRecord],
    pub(crate) warnings: &'a [Diagnostic],
}

impl<'a> SheetSummary<'a> {
    pub(crate) fn new(
        success: bool,
        output: &'a str,
        result: &'a BatchResult,
        warnings: &'a [Diagnostic],
    ) -> Self {
        Self {
            success,
            output,
            success_count: result.success_count,
            pages: result.pages,
            blank_count: result.blank_count,
            skipped: &result.skipped,
            warnings,
        }
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Print the coloured one-line summary of a run to stderr.
///
/// Example: `wrote stock.pdf: 23 labels on 1 page, 1 skipped, 2 blank`
pub(crate) fn print_summary(output: &str, result: &BatchResult) {
    let mut parts = vec![format!(
        "{} on {}",
        plural(result.success_count, "label"),
        plural(result.pages as usize, "page")
    )
    .fg(Color::Green)
    .to_string()];
    if !result.skipped.is_empty() {
        parts.push(
            format!("{} skipped", result.skipped.len())
                .fg(Color::Yellow)
                .to_string(),
        );
    }
    if result.blank_count > 0 {
        parts.push(format!("{} blank", result.blank_count).fg(Color::Blue).to_string());
    }
    eprintln!("wrote {output}: {}", parts.join(", "));
}

// ── Failures ────────────────────────────────────────────────────────────

/// Diagnostic code for a fatal command error, or `"command_failed"`.
pub(crate) fn failure_code(err: &anyhow::Error) -> &'static str {
    if let Some(e) = err.downcast_ref::<SheetError>() {
        e.code()
    } else if err.downcast_ref::<SourceError>().is_some() {
        codes::SOURCE_UNREADABLE
    } else if err.downcast_ref::<ProfileError>().is_some() {
        codes::PROFILE_INVALID
    } else {
        "command_failed"
    }
}

/// Report a fatal command error in `format`.
pub(crate) fn render_failure(err: &anyhow::Error, format: Format) {
    let code = failure_code(err);
    let message = format!("{err:#}");
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "success": false,
                "error": code,
                "message": message,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string())
            );
        }
        Format::Pretty => {
            render_diagnostics_pretty(None, &[Diagnostic::error(code, message, None)]);
        }
    }
}
