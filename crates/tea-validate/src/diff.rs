//! Typed structural comparison of two responses.
//!
//! Headers, pager and metadata items compare exactly, dimensions as sets.
//! Rows compare per tie group: rows tied under the sort keys may appear in
//! any order, so inside a group they are matched in canonical order and the
//! reported row index is a position in that order.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use tea_model::{GridHeader, Metadata, Pager, ResponseEnvelope, SortKey, ValueStatus};

use crate::ties::{annotated_rows, canonical_rows, resolve_sort, tie_groups};

/// One structural difference between an expected and an actual response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Difference {
    HeaderCount {
        expected: usize,
        actual: usize,
    },
    HeaderName {
        index: usize,
        expected: String,
        actual: String,
    },
    HeaderField {
        name: String,
        field: &'static str,
        expected: String,
        actual: String,
    },
    RowCount {
        expected: usize,
        actual: usize,
    },
    Row {
        index: usize,
        expected: Vec<String>,
        actual: Vec<String>,
    },
    RowContextPresence {
        expected: bool,
        actual: bool,
    },
    RowContext {
        row: usize,
        column: usize,
        expected: Option<ValueStatus>,
        actual: Option<ValueStatus>,
    },
    Pager {
        field: &'static str,
        expected: String,
        actual: String,
    },
    MissingItem {
        key: String,
    },
    UnexpectedItem {
        key: String,
    },
    ItemChanged {
        key: String,
    },
    MissingDimension {
        key: String,
    },
    UnexpectedDimension {
        key: String,
    },
    DimensionItems {
        key: String,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difference::HeaderCount { expected, actual } => {
                write!(f, "header count {actual}, expected {expected}")
            }
            Difference::HeaderName {
                index,
                expected,
                actual,
            } => write!(f, "header {index} is {actual}, expected {expected}"),
            Difference::HeaderField {
                name,
                field,
                expected,
                actual,
            } => write!(f, "header {name} {field} is `{actual}`, expected `{expected}`"),
            Difference::RowCount { expected, actual } => {
                write!(f, "row count {actual}, expected {expected}")
            }
            Difference::Row {
                index,
                expected,
                actual,
            } => write!(
                f,
                "row {index} is [{}], expected [{}]",
                actual.join(", "),
                expected.join(", ")
            ),
            Difference::RowContextPresence { expected, actual } => write!(
                f,
                "rowContext {}, expected {}",
                presence(*actual),
                presence(*expected)
            ),
            Difference::RowContext {
                row,
                column,
                expected,
                actual,
            } => write!(
                f,
                "qualifier at ({row}, {column}) is {}, expected {}",
                status(*actual),
                status(*expected)
            ),
            Difference::Pager {
                field,
                expected,
                actual,
            } => write!(f, "pager {field} is {actual}, expected {expected}"),
            Difference::MissingItem { key } => write!(f, "metadata item {key} is missing"),
            Difference::UnexpectedItem { key } => write!(f, "metadata item {key} is unexpected"),
            Difference::ItemChanged { key } => write!(f, "metadata item {key} differs"),
            Difference::MissingDimension { key } => write!(f, "dimension {key} is missing"),
            Difference::UnexpectedDimension { key } => {
                write!(f, "dimension {key} is unexpected")
            }
            Difference::DimensionItems {
                key,
                missing,
                unexpected,
            } => write!(
                f,
                "dimension {key} lacks [{}] and adds [{}]",
                missing.join(", "),
                unexpected.join(", ")
            ),
        }
    }
}

fn presence(present: bool) -> &'static str {
    if present { "present" } else { "absent" }
}

fn status(status: Option<ValueStatus>) -> &'static str {
    status.map_or("none", |status| status.as_str())
}

/// Compare `actual` against `expected`, tolerating reordering of rows tied
/// under `keys`.
pub fn compare(
    expected: &ResponseEnvelope,
    actual: &ResponseEnvelope,
    keys: &[SortKey],
) -> Vec<Difference> {
    let mut differences = Vec::new();
    compare_headers(&expected.headers, &actual.headers, &mut differences);
    compare_rows(expected, actual, keys, &mut differences);
    compare_metadata(&expected.meta_data, &actual.meta_data, &mut differences);
    differences
}

fn compare_headers(expected: &[GridHeader], actual: &[GridHeader], out: &mut Vec<Difference>) {
    if expected.len() != actual.len() {
        out.push(Difference::HeaderCount {
            expected: expected.len(),
            actual: actual.len(),
        });
    }
    for (index, (e, a)) in expected.iter().zip(actual).enumerate() {
        if e.name != a.name {
            out.push(Difference::HeaderName {
                index,
                expected: e.name.clone(),
                actual: a.name.clone(),
            });
            continue;
        }
        let fields = [
            ("column", e.display_name.clone(), a.display_name.clone()),
            ("valueType", e.value_type.to_string(), a.value_type.to_string()),
            ("type", e.value_class.to_string(), a.value_class.to_string()),
            ("hidden", e.hidden.to_string(), a.hidden.to_string()),
            ("meta", e.meta.to_string(), a.meta.to_string()),
            ("optionSet", optional(&e.option_set), optional(&a.option_set)),
            (
                "programStage",
                optional(&e.program_stage),
                optional(&a.program_stage),
            ),
            (
                "repeatableStageParams",
                optional(&e.repeatable_stage_params),
                optional(&a.repeatable_stage_params),
            ),
            (
                "stageOffset",
                optional(&e.stage_offset),
                optional(&a.stage_offset),
            ),
        ];
        for (field, expected, actual) in fields {
            if expected != actual {
                out.push(Difference::HeaderField {
                    name: e.name.clone(),
                    field,
                    expected,
                    actual,
                });
            }
        }
    }
}

fn optional<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map_or_else(String::new, ToString::to_string)
}

fn compare_rows(
    expected: &ResponseEnvelope,
    actual: &ResponseEnvelope,
    keys: &[SortKey],
    out: &mut Vec<Difference>,
) {
    let (expected_context, actual_context) =
        (expected.row_context.is_some(), actual.row_context.is_some());
    if expected_context != actual_context {
        out.push(Difference::RowContextPresence {
            expected: expected_context,
            actual: actual_context,
        });
    }
    if expected.rows.len() != actual.rows.len() {
        out.push(Difference::RowCount {
            expected: expected.rows.len(),
            actual: actual.rows.len(),
        });
        return;
    }

    let specs = resolve_sort(expected, keys).specs;
    let groups = tie_groups(&expected.rows, &specs);
    let expected_rows = canonical_rows(expected, &specs);
    let mut actual_rows = annotated_rows(actual);
    for group in groups {
        actual_rows[group].sort();
    }

    for (index, (e, a)) in expected_rows.iter().zip(&actual_rows).enumerate() {
        if e.cells != a.cells {
            out.push(Difference::Row {
                index,
                expected: e.cells.to_vec(),
                actual: a.cells.to_vec(),
            });
            continue;
        }
        if e.context == a.context || !(expected_context && actual_context) {
            continue;
        }
        let columns: BTreeSet<usize> = e
            .context
            .iter()
            .chain(&a.context)
            .map(|(column, _)| *column)
            .collect();
        for column in columns {
            let lookup = |context: &[(usize, ValueStatus)]| {
                context
                    .iter()
                    .find(|(c, _)| *c == column)
                    .map(|(_, status)| *status)
            };
            let (expected_status, actual_status) = (lookup(&e.context), lookup(&a.context));
            if expected_status != actual_status {
                out.push(Difference::RowContext {
                    row: index,
                    column,
                    expected: expected_status,
                    actual: actual_status,
                });
            }
        }
    }
}

fn compare_metadata(expected: &Metadata, actual: &Metadata, out: &mut Vec<Difference>) {
    compare_pager(&expected.pager, &actual.pager, out);

    for (key, item) in &expected.items {
        match actual.items.get(key) {
            None => out.push(Difference::MissingItem { key: key.clone() }),
            Some(other) if other != item => out.push(Difference::ItemChanged { key: key.clone() }),
            Some(_) => {}
        }
    }
    for key in actual.items.keys() {
        if !expected.items.contains_key(key) {
            out.push(Difference::UnexpectedItem { key: key.clone() });
        }
    }

    compare_dimensions(&expected.dimensions, &actual.dimensions, out);
}

fn compare_pager(expected: &Pager, actual: &Pager, out: &mut Vec<Difference>) {
    let fields = [
        ("page", expected.page.to_string(), actual.page.to_string()),
        (
            "pageSize",
            expected.page_size.to_string(),
            actual.page_size.to_string(),
        ),
        (
            "isLastPage",
            expected.is_last_page.to_string(),
            actual.is_last_page.to_string(),
        ),
        ("total", optional(&expected.total), optional(&actual.total)),
        (
            "pageCount",
            optional(&expected.page_count),
            optional(&actual.page_count),
        ),
    ];
    for (field, expected, actual) in fields {
        if expected != actual {
            out.push(Difference::Pager {
                field,
                expected,
                actual,
            });
        }
    }
}

fn compare_dimensions(
    expected: &BTreeMap<String, Vec<String>>,
    actual: &BTreeMap<String, Vec<String>>,
    out: &mut Vec<Difference>,
) {
    for (key, items) in expected {
        let Some(other) = actual.get(key) else {
            out.push(Difference::MissingDimension { key: key.clone() });
            continue;
        };
        let expected_set: BTreeSet<&String> = items.iter().collect();
        let actual_set: BTreeSet<&String> = other.iter().collect();
        if expected_set != actual_set {
            out.push(Difference::DimensionItems {
                key: key.clone(),
                missing: expected_set
                    .difference(&actual_set)
                    .map(|s| (*s).clone())
                    .collect(),
                unexpected: actual_set
                    .difference(&expected_set)
                    .map(|s| (*s).clone())
                    .collect(),
            });
        }
    }
    for key in actual.keys() {
        if !expected.contains_key(key) {
            out.push(Difference::UnexpectedDimension { key: key.clone() });
        }
    }
}
