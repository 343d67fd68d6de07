//! CLI output: error mapping and exit codes.

use crate::error::{ApiError, StorageError};
use crate::reconcile::RunReport;

/// Run finished and found nothing to report.
pub const EXIT_CLEAN: i32 = 0;
/// Run finished with mismatches, missing digests or missing files.
pub const EXIT_FINDINGS: i32 = 1;
/// Run aborted.
pub const EXIT_FATAL: i32 = 2;

/// Map domain errors to a one-line message for stderr.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Storage(StorageError::Format { .. }) => {
            format!("{} (fix or remove the manifest and rerun)", e)
        }
        _ => format!("Error: {}", e),
    }
}

pub fn exit_code(report: &RunReport) -> i32 {
    if report.is_clean() {
        EXIT_CLEAN
    } else {
        EXIT_FINDINGS
    }
}
