//! Contract validation for tracked entity query responses.
//!
//! This crate checks a response envelope against the response contract:
//!
//! - **Structure**: `height`, `width` and `headerWidth` agree with the grid
//! - **Pager**: page numbering, page size and the last page flag
//! - **Headers**: unique names, runtime classes and repeat indexes
//! - **Row context**: qualifiers only on empty cells inside the grid
//! - **Cells**: renderings match the column value types
//! - **Laws**: sorting over composite keys and pagination over page sequences
//!
//! It also compares two responses structurally and fingerprints them, both
//! tolerant of the order of rows tied under the sort keys.
//!
//! # Example
//!
//! ```ignore
//! use tea_validate::{validate_sorted, compare, fingerprint};
//!
//! let report = validate_sorted(&envelope, &keys);
//! for issue in report.sorted_by_severity() {
//!     println!("[{}] {}", issue.severity().label(), issue);
//! }
//! let differences = compare(&expected, &envelope, &keys);
//! ```

mod checks;
mod diff;
mod fingerprint;
mod issue;
mod laws;
mod report;
mod ties;

use tea_model::{ResponseEnvelope, SortKey};
use tracing::debug;

pub use checks::cells::is_valid_cell;
pub use diff::{Difference, compare};
pub use fingerprint::fingerprint;
pub use issue::{Category, Issue, Severity};
pub use laws::{check_pagination, check_sorting};
pub use report::ValidationReport;
pub use ties::{ResolvedSort, resolve_sort, tie_groups};

/// Run every single-response check.
pub fn validate(envelope: &ResponseEnvelope) -> ValidationReport {
    let report = checks::run_all(envelope);
    debug!(
        rows = envelope.rows.len(),
        issues = report.len(),
        errors = report.error_count(),
        "response validated"
    );
    report
}

/// Run every single-response check plus the sorting law for `keys`.
pub fn validate_sorted(envelope: &ResponseEnvelope, keys: &[SortKey]) -> ValidationReport {
    let mut report = validate(envelope);
    report.extend(check_sorting(envelope, keys));
    report
}
