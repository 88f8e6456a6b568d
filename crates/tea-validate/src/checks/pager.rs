//! Pager consistency.

use tea_model::ResponseEnvelope;

use crate::issue::Issue;

pub fn check(envelope: &ResponseEnvelope) -> Vec<Issue> {
    let mut issues = Vec::new();
    let pager = &envelope.meta_data.pager;

    if pager.page < 1 {
        issues.push(Issue::InvalidPage { page: pager.page });
    }
    if envelope.rows.len() > pager.page_size as usize {
        issues.push(Issue::PageSizeExceeded {
            height: envelope.rows.len(),
            page_size: pager.page_size,
        });
    }
    if let Some(total) = pager.total {
        let shown = pager.offset() + envelope.rows.len() as u64;
        // A zero page size shows nothing, so it is never the last page of a
        // non-empty result.
        let expected_last = if pager.page_size == 0 {
            total == 0
        } else {
            shown >= total
        };
        if pager.is_last_page != expected_last {
            issues.push(Issue::LastPageMismatch {
                page: pager.page,
                page_size: pager.page_size,
                total,
                is_last_page: pager.is_last_page,
            });
        }
        if let Some(actual) = pager.page_count {
            let expected = if pager.page_size == 0 {
                0
            } else {
                total.div_ceil(u64::from(pager.page_size))
            };
            if actual != expected {
                issues.push(Issue::PageCountMismatch { expected, actual });
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use tea_model::{Metadata, Pager};

    use super::*;

    fn envelope(pager: Pager, rows: usize) -> ResponseEnvelope {
        ResponseEnvelope::new(
            vec![],
            vec![vec![]; rows],
            Metadata::new(pager),
            None,
        )
    }

    #[test]
    fn totals_must_agree_with_last_page_flag() {
        let pager = Pager::new(2, 10, true).with_total(21);
        let issues = check(&envelope(pager, 10));
        assert_eq!(
            issues,
            vec![Issue::LastPageMismatch {
                page: 2,
                page_size: 10,
                total: 21,
                is_last_page: true
            }]
        );
        let pager = Pager::new(3, 10, true).with_total(21);
        assert!(check(&envelope(pager, 1)).is_empty());
    }

    #[test]
    fn oversized_page_and_zero_page() {
        let issues = check(&envelope(Pager::new(0, 1, true), 2));
        assert_eq!(
            issues,
            vec![
                Issue::InvalidPage { page: 0 },
                Issue::PageSizeExceeded {
                    height: 2,
                    page_size: 1
                }
            ]
        );
    }

    #[test]
    fn page_count_rounds_up() {
        let mut pager = Pager::new(1, 10, false).with_total(21);
        pager.page_count = Some(2);
        assert_eq!(
            check(&envelope(pager, 10)),
            vec![Issue::PageCountMismatch {
                expected: 3,
                actual: 2
            }]
        );
    }
}
