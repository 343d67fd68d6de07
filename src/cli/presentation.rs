//! CLI presentation: per-file status lines and the final report.

use crate::cli::parse::ReportFormat;
use crate::error::ApiError;
use crate::reconcile::{EventSink, FileEvent, Mode, Operation, RunReport};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::io::Write;

/// Prints one status line per event as the run progresses.
///
/// Text format writes `<label>  <path>` lines; json format writes one JSON
/// object per line.
pub struct TerminalSink<W: Write> {
    out: W,
    format: ReportFormat,
    color: bool,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, format: ReportFormat, color: bool) -> Self {
        Self { out, format, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventSink for TerminalSink<W> {
    fn record(&mut self, event: &FileEvent) {
        let line = match self.format {
            ReportFormat::Json => match serde_json::to_string(event) {
                Ok(line) => line,
                Err(_) => return,
            },
            ReportFormat::Text => format_event_text(event, self.color),
        };
        // A closed stdout must not abort the run.
        let _ = writeln!(self.out, "{}", line);
    }
}

/// One human-readable status line.
pub fn format_event_text(event: &FileEvent, color: bool) -> String {
    let label = format!("{:<10}", event_label(event));
    let label = if !color {
        label
    } else {
        match event {
            FileEvent::Verified { .. } => label.green().to_string(),
            FileEvent::Mismatch { .. } => label.red().bold().to_string(),
            FileEvent::HashNotFound { .. }
            | FileEvent::FileNotFound { .. }
            | FileEvent::Unsupported { .. } => label.yellow().to_string(),
            FileEvent::Skipped { .. } => label.dimmed().to_string(),
            _ => label.cyan().to_string(),
        }
    };

    match event {
        FileEvent::Mismatch {
            path,
            expected,
            actual,
        } => format!("{}{} (expected {}, got {})", label, path, expected, actual),
        other => format!("{}{}", label, other.path()),
    }
}

fn event_label(event: &FileEvent) -> &'static str {
    match event {
        FileEvent::Computed { .. } => "computed",
        FileEvent::Skipped { .. } => "skipped",
        FileEvent::Verified { .. } => "ok",
        FileEvent::Mismatch { .. } => "MISMATCH",
        FileEvent::HashNotFound { .. } => "NO HASH",
        FileEvent::FileNotFound { .. } => "MISSING",
        FileEvent::Collected { .. } => "collected",
        FileEvent::Written { .. } => "wrote",
        FileEvent::Removed { .. } => "removed",
        FileEvent::Unsupported { .. } => "BAD NAME",
    }
}

/// Counters worth showing for an operation.
fn report_rows(operation: Operation, report: &RunReport) -> Vec<(&'static str, usize)> {
    let mut rows = match operation {
        Operation::Reconcile(Mode::GenerateSidecars) => vec![
            ("Computed", report.computed),
            ("Skipped", report.skipped),
        ],
        Operation::Reconcile(Mode::GenerateAggregate) => vec![
            ("Computed", report.computed),
            ("Skipped", report.skipped),
            ("Manifests written", report.written),
        ],
        Operation::Reconcile(Mode::VerifySidecars | Mode::VerifyAggregate) => vec![
            ("Verified", report.verified),
            ("Mismatched", report.mismatched),
            ("Hash not found", report.hash_not_found),
            ("File not found", report.file_not_found),
        ],
        Operation::JoinSidecars => vec![
            ("Sidecars collected", report.collected),
            ("Manifests written", report.written),
        ],
        Operation::SplitAggregate => vec![
            ("Sidecars written", report.written),
            ("File not found", report.file_not_found),
        ],
        Operation::RemoveSidecars => vec![("Sidecars removed", report.removed)],
    };
    if report.unsupported > 0 {
        rows.push(("Unsupported names", report.unsupported));
    }
    rows
}

/// Final tally as a table plus a verdict line.
pub fn format_report_text(operation: Operation, report: &RunReport) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Result", "Files"]);
    for (name, count) in report_rows(operation, report) {
        table.add_row(vec![name.to_string(), count.to_string()]);
    }

    let verdict = if report.is_clean() {
        format!("{} finished", operation.name())
    } else {
        let problems = report.mismatched + report.hash_not_found + report.file_not_found;
        format!("{} finished with {} problem(s)", operation.name(), problems)
    };
    format!("{}\n{}", table, verdict)
}

pub fn format_report_json(operation: Operation, report: &RunReport) -> Result<String, ApiError> {
    let out = serde_json::json!({
        "operation": operation.name(),
        "clean": report.is_clean(),
        "report": report,
    });
    serde_json::to_string_pretty(&out)
        .map_err(|e| ApiError::InvalidArgument(format!("Failed to render report: {}", e)))
}
