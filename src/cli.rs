//! CLI domain: parse, route, output, and presentation only.
//! No reconciliation logic; the route dispatches to [`crate::reconcile`].

mod output;
mod parse;
mod presentation;
mod route;

pub use output::{exit_code, map_error, EXIT_CLEAN, EXIT_FATAL, EXIT_FINDINGS};
pub use parse::{Cli, ReportFormat};
pub use presentation::{format_event_text, format_report_json, format_report_text, TerminalSink};
pub use route::{operation_from_cli, RunContext, RunOutcome};
