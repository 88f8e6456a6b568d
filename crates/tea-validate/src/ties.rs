//! Sort key resolution and tie groups.
//!
//! Rows that compare equal under every sort key may come back in any order.
//! A tie group is a maximal run of such rows; comparisons and fingerprints
//! treat each group as a multiset.

use std::ops::Range;

use serde::Serialize;
use tea_model::{ResponseEnvelope, SortKey, SortSpec, ValueStatus, ValueType, compare_rows};

/// Sort keys bound to response columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSort<'k> {
    pub specs: Vec<SortSpec>,
    /// First key naming no column. The row order under it and every later
    /// key is invisible in the response.
    pub missing: Option<&'k SortKey>,
}

/// Bind the longest resolvable prefix of `keys` to header positions.
///
/// Option set columns hold option names and compare as text.
pub fn resolve_sort<'k>(envelope: &ResponseEnvelope, keys: &'k [SortKey]) -> ResolvedSort<'k> {
    let mut specs = Vec::with_capacity(keys.len());
    for key in keys {
        let Some(column) = envelope.column_index(&key.name) else {
            return ResolvedSort {
                specs,
                missing: Some(key),
            };
        };
        let header = &envelope.headers[column];
        let value_type = if header.option_set.is_some() {
            ValueType::Text
        } else {
            header.value_type
        };
        specs.push(SortSpec {
            column,
            value_type,
            direction: key.direction,
        });
    }
    ResolvedSort {
        specs,
        missing: None,
    }
}

/// Maximal runs of adjacent rows that compare equal. Without sort specs the
/// whole sequence is one group.
pub fn tie_groups<R: AsRef<[String]>>(rows: &[R], specs: &[SortSpec]) -> Vec<Range<usize>> {
    let mut groups = Vec::new();
    let mut start = 0;
    for index in 1..rows.len() {
        let previous = rows[index - 1].as_ref();
        let current = rows[index].as_ref();
        if compare_rows(previous, current, specs).is_ne() {
            groups.push(start..index);
            start = index;
        }
    }
    if !rows.is_empty() {
        groups.push(start..rows.len());
    }
    groups
}

/// A row together with the qualifiers of its empty cells.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub(crate) struct AnnotatedRow<'a> {
    pub cells: &'a [String],
    pub context: Vec<(usize, ValueStatus)>,
}

impl AsRef<[String]> for AnnotatedRow<'_> {
    fn as_ref(&self) -> &[String] {
        self.cells
    }
}

pub(crate) fn annotated_rows(envelope: &ResponseEnvelope) -> Vec<AnnotatedRow<'_>> {
    let mut rows: Vec<AnnotatedRow<'_>> = envelope
        .rows
        .iter()
        .map(|cells| AnnotatedRow {
            cells: cells.as_slice(),
            context: Vec::new(),
        })
        .collect();
    if let Some(context) = &envelope.row_context {
        for (row, column, status) in context.iter() {
            if let Some(annotated) = rows.get_mut(row) {
                annotated.context.push((column, status));
            }
        }
    }
    rows
}

/// Rows with each tie group put into canonical order.
pub(crate) fn canonical_rows<'a>(
    envelope: &'a ResponseEnvelope,
    specs: &[SortSpec],
) -> Vec<AnnotatedRow<'a>> {
    let mut rows = annotated_rows(envelope);
    for group in tie_groups(&rows, specs) {
        rows[group].sort();
    }
    rows
}

#[cfg(test)]
mod tests {
    use tea_model::{GridHeader, Metadata, Pager, SortDirection};

    use super::*;

    fn envelope(rows: &[[&str; 2]]) -> ResponseEnvelope {
        ResponseEnvelope::new(
            vec![
                GridHeader::new("w", "Weight", ValueType::Number),
                GridHeader::new("g", "Gender", ValueType::Number).with_option_set("pC3N9N77UmT"),
            ],
            rows.iter()
                .map(|row| row.iter().map(|c| (*c).to_string()).collect())
                .collect(),
            Metadata::new(Pager::new(1, 10, true)),
            None,
        )
    }

    #[test]
    fn resolves_prefix_and_reports_first_missing_key() {
        let envelope = envelope(&[]);
        let keys = [
            SortKey::desc("w"),
            SortKey::asc("g"),
            SortKey::asc("created"),
            SortKey::asc("w"),
        ];
        let resolved = resolve_sort(&envelope, &keys);
        assert_eq!(resolved.specs.len(), 2);
        assert_eq!(resolved.specs[0].direction, SortDirection::Desc);
        assert_eq!(resolved.specs[1].value_type, ValueType::Text);
        assert_eq!(resolved.missing, Some(&keys[2]));
    }

    #[test]
    fn groups_split_on_key_changes() {
        let envelope = envelope(&[
            ["3.0", "Male"],
            ["3.0", "Female"],
            ["2.0", "Male"],
            ["", "Male"],
            ["", "Female"],
        ]);
        let keys = [SortKey::desc("w")];
        let specs = resolve_sort(&envelope, &keys).specs;
        assert_eq!(tie_groups(&envelope.rows, &specs), vec![0..2, 2..3, 3..5]);
        assert_eq!(tie_groups(&envelope.rows, &[]), vec![0..5]);

        let canonical = canonical_rows(&envelope, &specs);
        assert_eq!(canonical[0].cells, ["3.0", "Female"]);
        assert_eq!(canonical[2].cells, ["2.0", "Male"]);
    }
}
