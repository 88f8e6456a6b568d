//! Row context qualifiers may only explain empty cells.

use tea_model::ResponseEnvelope;

use crate::issue::Issue;

pub fn check(envelope: &ResponseEnvelope) -> Vec<Issue> {
    let Some(context) = &envelope.row_context else {
        return vec![];
    };
    let mut issues = Vec::new();

    for (row, column, status) in context.iter() {
        match envelope.cell(row, column) {
            None => issues.push(Issue::ContextOutOfRange { row, column }),
            Some("") => {}
            Some(value) => issues.push(Issue::ContextOnValue {
                row,
                column,
                status,
                value: value.to_string(),
            }),
        }
    }

    issues
}
