//! Sorting and pagination laws.

use tea_model::sort::compare_sort_cells;
use tea_model::{ResponseEnvelope, Row, SortKey};

use crate::issue::Issue;
use crate::ties::{resolve_sort, tie_groups};

/// Adjacent rows must be ordered under the composite sort keys.
///
/// Keys after the first one that names no column are not checked.
pub fn check_sorting(envelope: &ResponseEnvelope, keys: &[SortKey]) -> Vec<Issue> {
    let mut issues = Vec::new();
    let resolved = resolve_sort(envelope, keys);
    if let Some(key) = resolved.missing {
        issues.push(Issue::SortColumnMissing {
            key: key.to_string(),
        });
    }

    for (row, pair) in envelope.rows.windows(2).enumerate() {
        for (key, spec) in keys.iter().zip(&resolved.specs) {
            let left = pair[0].get(spec.column).map_or("", String::as_str);
            let right = pair[1].get(spec.column).map_or("", String::as_str);
            let ordering = compare_sort_cells(spec.value_type, spec.direction, left, right);
            if ordering.is_lt() {
                break;
            }
            if ordering.is_gt() {
                issues.push(Issue::UnsortedRows {
                    row: row + 1,
                    key: key.to_string(),
                });
                break;
            }
        }
    }

    issues
}

/// Pages `1..=n` of one query must concatenate to the unpaged sequence,
/// modulo the order of rows tied under `keys`.
pub fn check_pagination(
    pages: &[ResponseEnvelope],
    full: &ResponseEnvelope,
    keys: &[SortKey],
) -> Vec<Issue> {
    let mut issues = Vec::new();

    for (index, page) in pages.iter().enumerate() {
        let pager = &page.meta_data.pager;
        if pager.page as usize != index + 1 {
            issues.push(Issue::PageOutOfSequence {
                index,
                page: pager.page,
            });
        }
        let is_final = index + 1 == pages.len();
        if is_final {
            if !pager.is_last_page {
                issues.push(Issue::MissingLastPage { page: pager.page });
            }
        } else if pager.is_last_page || page.rows.len() < pager.page_size as usize {
            issues.push(Issue::PrematureLastPage {
                page: pager.page,
                height: page.rows.len(),
            });
        }
    }

    let paged: Vec<&Row> = pages.iter().flat_map(|page| &page.rows).collect();
    if paged.len() != full.rows.len() {
        issues.push(Issue::PagedRowCount {
            expected: full.rows.len(),
            actual: paged.len(),
        });
        return issues;
    }

    let specs = resolve_sort(full, keys).specs;
    for group in tie_groups(&full.rows, &specs) {
        let mut expected: Vec<&Row> = full.rows[group.clone()].iter().collect();
        let mut actual = paged[group.clone()].to_vec();
        if expected == actual {
            continue;
        }
        expected.sort();
        actual.sort();
        if let Some(offset) = expected.iter().zip(&actual).position(|(e, a)| e != a) {
            issues.push(Issue::PagesDiverge {
                position: group.start + offset,
                expected: expected[offset].clone(),
                actual: actual[offset].clone(),
            });
        }
    }

    issues
}
