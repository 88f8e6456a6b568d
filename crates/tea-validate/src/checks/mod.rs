//! Contract check modules.
//!
//! Each module inspects one part of a response envelope.

pub mod cells;
mod headers;
mod pager;
mod row_context;
mod structure;

use tea_model::ResponseEnvelope;

use crate::report::ValidationReport;

/// Run all single-response checks.
pub fn run_all(envelope: &ResponseEnvelope) -> ValidationReport {
    let mut report = ValidationReport::new();

    // 1. Row and header counts
    report.extend(structure::check(envelope));

    // 2. Pager consistency
    report.extend(pager::check(envelope));

    // 3. Header names, classes and stage offsets
    report.extend(headers::check(envelope));

    // 4. Qualifiers only on empty cells
    report.extend(row_context::check(envelope));

    // 5. Cell renderings per value type
    report.extend(cells::check(envelope));

    report
}
