//! Cell renderings per column value type.
//!
//! Numbers must parse, booleans read as `0/1/true/false` and date or
//! date-time cells follow `yyyy-MM-dd HH:mm:ss[.SSS]`.

use std::sync::LazyLock;

use regex::Regex;
use tea_model::cell::is_well_formed;
use tea_model::{GridHeader, ResponseEnvelope};

use crate::issue::Issue;

static TIMESTAMP_CELL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01]) ([01]\d|2[0-3]):[0-5]\d:[0-5]\d(\.\d{1,3})?$")
        .expect("Invalid timestamp cell regex")
});

const MAX_SAMPLES: usize = 5;

pub fn check(envelope: &ResponseEnvelope) -> Vec<Issue> {
    let mut issues = Vec::new();

    for (index, header) in envelope.headers.iter().enumerate() {
        // Option set cells carry option names, not typed values.
        if header.option_set.is_some() {
            continue;
        }
        let (invalid_count, samples) = collect_invalid(envelope, index, header);
        if invalid_count > 0 {
            issues.push(Issue::MalformedCells {
                column: header.name.clone(),
                value_type: header.value_type,
                invalid_count,
                samples,
            });
        }
    }

    issues
}

/// Returns true if `cell` is a valid rendering for the header's value type.
pub fn is_valid_cell(header: &GridHeader, cell: &str) -> bool {
    if cell.is_empty() {
        return true;
    }
    if header.value_type.is_temporal() && !TIMESTAMP_CELL_REGEX.is_match(cell) {
        return false;
    }
    is_well_formed(header.value_type, cell)
}

fn collect_invalid(envelope: &ResponseEnvelope, index: usize, header: &GridHeader) -> (u64, Vec<String>) {
    let mut count = 0u64;
    let mut samples = Vec::new();

    for row in &envelope.rows {
        let Some(cell) = row.get(index) else {
            continue;
        };
        if !is_valid_cell(header, cell) {
            count += 1;
            if samples.len() < MAX_SAMPLES {
                samples.push(cell.clone());
            }
        }
    }

    (count, samples)
}

#[cfg(test)]
mod tests {
    use tea_model::{Metadata, Pager, ValueType};

    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_string()).collect()
    }

    #[test]
    fn typed_cells() {
        let number = GridHeader::new("w", "Weight", ValueType::Number);
        assert!(is_valid_cell(&number, "36282.0"));
        assert!(!is_valid_cell(&number, "heavy"));

        let flag = GridHeader::new("b", "BCG", ValueType::Boolean);
        for cell in ["0", "1", "true", "false", ""] {
            assert!(is_valid_cell(&flag, cell), "{cell}");
        }
        assert!(!is_valid_cell(&flag, "yes"));

        let created = GridHeader::new("created", "Created", ValueType::DateTime);
        assert!(is_valid_cell(&created, "2017-01-20 10:44:02.77"));
        assert!(is_valid_cell(&created, "2021-01-03 08:00:00"));
        assert!(is_valid_cell(&created, "2022-12-29 00:00:00.0"));
        assert!(is_valid_cell(&created, "2015-08-06 21:20:41.750"));
        assert!(is_valid_cell(&created, "2022-12-29 00:00:00.000"));
        assert!(!is_valid_cell(&created, "2022-12-29 00:00:00.0000"));
        assert!(!is_valid_cell(&created, "2021-01-03T08:00:00"));
        assert!(!is_valid_cell(&created, "2021-01-03"));
    }

    #[test]
    fn samples_are_capped() {
        let headers = vec![
            GridHeader::new("w", "Weight", ValueType::Number),
            GridHeader::new("g", "Gender", ValueType::Number).with_option_set("pC3N9N77UmT"),
        ];
        let rows = (0..7).map(|i| row(&[&format!("x{i}"), "Female"])).collect();
        let envelope = ResponseEnvelope::new(
            headers,
            rows,
            Metadata::new(Pager::new(1, 10, true)),
            None,
        );
        let issues = check(&envelope);
        assert_eq!(issues.len(), 1);
        let Issue::MalformedCells {
            column,
            invalid_count,
            samples,
            ..
        } = &issues[0]
        else {
            panic!("unexpected issue {:?}", issues[0]);
        };
        assert_eq!(column, "w");
        assert_eq!(*invalid_count, 7);
        assert_eq!(samples.len(), MAX_SAMPLES);
    }
}
