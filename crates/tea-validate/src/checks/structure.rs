//! Row, width and height counts.

use tea_model::ResponseEnvelope;

use crate::issue::Issue;

pub fn check(envelope: &ResponseEnvelope) -> Vec<Issue> {
    let mut issues = Vec::new();
    let headers = envelope.headers.len();

    if envelope.height != envelope.rows.len() {
        issues.push(Issue::HeightMismatch {
            height: envelope.height,
            rows: envelope.rows.len(),
        });
    }
    if envelope.header_width != headers {
        issues.push(Issue::HeaderWidthMismatch {
            header_width: envelope.header_width,
            headers,
        });
    }
    // An empty page reports width 0.
    let expected_width = if envelope.rows.is_empty() { 0 } else { headers };
    if envelope.width != expected_width {
        issues.push(Issue::WidthMismatch {
            width: envelope.width,
            expected: expected_width,
        });
    }
    for (row, cells) in envelope.rows.iter().enumerate() {
        if cells.len() != headers {
            issues.push(Issue::RowWidthMismatch {
                row,
                width: cells.len(),
                expected: headers,
            });
        }
    }

    issues
}
