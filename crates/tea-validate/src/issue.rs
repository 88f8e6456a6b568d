//! Validation issue types.
//!
//! Each variant carries only the data needed to locate and explain one
//! contract violation in a response envelope.

use serde::{Deserialize, Serialize};
use tea_model::{ValueClass, ValueStatus, ValueType};

/// Issue severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Response breaks the contract
    Error,
    /// Suspicious but tolerated
    Warning,
}

impl Severity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            _ => None,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
        }
    }
}

/// Part of the response an issue concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Structure,
    Pager,
    Headers,
    RowContext,
    Cells,
    Sorting,
    Pagination,
}

impl Category {
    pub const fn all() -> &'static [Self] {
        &[
            Self::Structure,
            Self::Pager,
            Self::Headers,
            Self::RowContext,
            Self::Cells,
            Self::Sorting,
            Self::Pagination,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Structure => "Structure",
            Self::Pager => "Pager",
            Self::Headers => "Headers",
            Self::RowContext => "Row context",
            Self::Cells => "Cells",
            Self::Sorting => "Sorting",
            Self::Pagination => "Pagination",
        }
    }
}

/// Contract violation found in a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Issue {
    // Structure checks
    /// `height` disagrees with the number of rows
    HeightMismatch { height: usize, rows: usize },
    /// `headerWidth` disagrees with the number of headers
    HeaderWidthMismatch { header_width: usize, headers: usize },
    /// `width` disagrees with the header count on a non-empty page
    WidthMismatch { width: usize, expected: usize },
    /// A row has the wrong number of cells
    RowWidthMismatch {
        row: usize,
        width: usize,
        expected: usize,
    },

    // Pager checks
    /// More rows than the page size allows
    PageSizeExceeded { height: usize, page_size: u32 },
    /// Pages are numbered from 1
    InvalidPage { page: u32 },
    /// `isLastPage` contradicts the reported total
    LastPageMismatch {
        page: u32,
        page_size: u32,
        total: u64,
        is_last_page: bool,
    },
    /// `pageCount` is not the rounded-up quotient of total and page size
    PageCountMismatch { expected: u64, actual: u64 },

    // Header checks
    /// Two headers share a name
    DuplicateHeader { name: String },
    /// The runtime class does not follow from the value type
    ValueClassMismatch {
        name: String,
        value_type: ValueType,
        value_class: ValueClass,
    },
    /// `stageOffset` must be present exactly when the name carries a stage index
    StageOffsetMismatch {
        name: String,
        expected: Option<i32>,
        actual: Option<i32>,
    },
    /// A non-zero index is not reflected in the column label
    OffsetLabelMissing {
        name: String,
        label: String,
        offset: i32,
    },
    /// The header name is not a valid dimension key
    MalformedHeaderName { name: String },

    // Row context checks
    /// A qualifier points outside the grid
    ContextOutOfRange { row: usize, column: usize },
    /// A qualifier is attached to a cell that holds a value
    ContextOnValue {
        row: usize,
        column: usize,
        status: ValueStatus,
        value: String,
    },

    // Cell checks
    /// Cells that are not a valid rendering of the column type
    MalformedCells {
        column: String,
        value_type: ValueType,
        invalid_count: u64,
        samples: Vec<String>,
    },

    // Law checks
    /// A sort key names no column of the response
    SortColumnMissing { key: String },
    /// Adjacent rows violate the composite sort order
    UnsortedRows { row: usize, key: String },
    /// A page reports the wrong page number
    PageOutOfSequence { index: usize, page: u32 },
    /// A page other than the last one is short or flagged last
    PrematureLastPage { page: u32, height: usize },
    /// The final page is not flagged last
    MissingLastPage { page: u32 },
    /// Concatenated pages differ from the unpaged sequence
    PagesDiverge {
        position: usize,
        expected: Vec<String>,
        actual: Vec<String>,
    },
    /// Concatenated pages hold a different number of rows
    PagedRowCount { expected: usize, actual: usize },
}

impl Issue {
    /// Short stable identifier for reports.
    pub fn code(&self) -> &'static str {
        match self {
            Issue::HeightMismatch { .. } => "ST01",
            Issue::HeaderWidthMismatch { .. } => "ST02",
            Issue::WidthMismatch { .. } => "ST03",
            Issue::RowWidthMismatch { .. } => "ST04",
            Issue::PageSizeExceeded { .. } => "PG01",
            Issue::InvalidPage { .. } => "PG02",
            Issue::LastPageMismatch { .. } => "PG03",
            Issue::PageCountMismatch { .. } => "PG04",
            Issue::DuplicateHeader { .. } => "HD01",
            Issue::ValueClassMismatch { .. } => "HD02",
            Issue::StageOffsetMismatch { .. } => "HD03",
            Issue::OffsetLabelMissing { .. } => "HD04",
            Issue::MalformedHeaderName { .. } => "HD05",
            Issue::ContextOutOfRange { .. } => "RC01",
            Issue::ContextOnValue { .. } => "RC02",
            Issue::MalformedCells { .. } => "CL01",
            Issue::SortColumnMissing { .. } => "SO01",
            Issue::UnsortedRows { .. } => "SO02",
            Issue::PageOutOfSequence { .. } => "PL01",
            Issue::PrematureLastPage { .. } => "PL02",
            Issue::MissingLastPage { .. } => "PL03",
            Issue::PagesDiverge { .. } => "PL04",
            Issue::PagedRowCount { .. } => "PL05",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Issue::HeightMismatch { .. }
            | Issue::HeaderWidthMismatch { .. }
            | Issue::WidthMismatch { .. }
            | Issue::RowWidthMismatch { .. } => Category::Structure,
            Issue::PageSizeExceeded { .. }
            | Issue::InvalidPage { .. }
            | Issue::LastPageMismatch { .. }
            | Issue::PageCountMismatch { .. } => Category::Pager,
            Issue::DuplicateHeader { .. }
            | Issue::ValueClassMismatch { .. }
            | Issue::StageOffsetMismatch { .. }
            | Issue::OffsetLabelMissing { .. }
            | Issue::MalformedHeaderName { .. } => Category::Headers,
            Issue::ContextOutOfRange { .. } | Issue::ContextOnValue { .. } => {
                Category::RowContext
            }
            Issue::MalformedCells { .. } => Category::Cells,
            Issue::SortColumnMissing { .. } | Issue::UnsortedRows { .. } => Category::Sorting,
            Issue::PageOutOfSequence { .. }
            | Issue::PrematureLastPage { .. }
            | Issue::MissingLastPage { .. }
            | Issue::PagesDiverge { .. }
            | Issue::PagedRowCount { .. } => Category::Pagination,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Issue::OffsetLabelMissing { .. }
            | Issue::MalformedHeaderName { .. }
            | Issue::SortColumnMissing { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Where in the response the issue sits, for tabular reports.
    pub fn location(&self) -> String {
        match self {
            Issue::RowWidthMismatch { row, .. } | Issue::UnsortedRows { row, .. } => {
                format!("row {row}")
            }
            Issue::DuplicateHeader { name }
            | Issue::ValueClassMismatch { name, .. }
            | Issue::StageOffsetMismatch { name, .. }
            | Issue::OffsetLabelMissing { name, .. }
            | Issue::MalformedHeaderName { name } => name.clone(),
            Issue::ContextOutOfRange { row, column } | Issue::ContextOnValue { row, column, .. } => {
                format!("({row}, {column})")
            }
            Issue::MalformedCells { column, .. } => column.clone(),
            Issue::SortColumnMissing { key } => key.clone(),
            Issue::PageOutOfSequence { index, .. } => format!("page #{index}"),
            Issue::PrematureLastPage { page, .. } | Issue::MissingLastPage { page } => {
                format!("page {page}")
            }
            Issue::PagesDiverge { position, .. } => format!("row {position}"),
            _ => String::new(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            Issue::HeightMismatch { height, rows } => {
                format!("height is {height} but the response has {rows} rows")
            }
            Issue::HeaderWidthMismatch {
                header_width,
                headers,
            } => format!("headerWidth is {header_width} but there are {headers} headers"),
            Issue::WidthMismatch { width, expected } => {
                format!("width is {width}, expected {expected}")
            }
            Issue::RowWidthMismatch {
                row,
                width,
                expected,
            } => format!("row {row} has {width} cells, expected {expected}"),
            Issue::PageSizeExceeded { height, page_size } => {
                format!("{height} rows exceed page size {page_size}")
            }
            Issue::InvalidPage { page } => format!("page {page} is not a 1-based page number"),
            Issue::LastPageMismatch {
                page,
                page_size,
                total,
                is_last_page,
            } => format!(
                "isLastPage is {is_last_page} on page {page} of size {page_size} with {total} rows in total"
            ),
            Issue::PageCountMismatch { expected, actual } => {
                format!("pageCount is {actual}, expected {expected}")
            }
            Issue::DuplicateHeader { name } => format!("header {name} appears more than once"),
            Issue::ValueClassMismatch {
                name,
                value_type,
                value_class,
            } => format!("header {name} has type {value_class} but value type {value_type}"),
            Issue::StageOffsetMismatch {
                name,
                expected,
                actual,
            } => format!(
                "header {name} has stageOffset {}, expected {}",
                describe_offset(*actual),
                describe_offset(*expected)
            ),
            Issue::OffsetLabelMissing {
                name,
                label,
                offset,
            } => format!("label `{label}` of {name} does not mention index ({offset})"),
            Issue::MalformedHeaderName { name } => {
                format!("header {name} is not a valid dimension key")
            }
            Issue::ContextOutOfRange { row, column } => {
                format!("row context entry ({row}, {column}) lies outside the grid")
            }
            Issue::ContextOnValue {
                row,
                column,
                status,
                value,
            } => format!("{status} qualifier at ({row}, {column}) on non-empty cell `{value}`"),
            Issue::MalformedCells {
                column,
                value_type,
                invalid_count,
                samples,
            } => {
                let sample_str = if samples.is_empty() {
                    String::new()
                } else {
                    format!(" (e.g., {})", samples.join(", "))
                };
                format!(
                    "column {column} has {invalid_count} values that are not valid {value_type}{sample_str}"
                )
            }
            Issue::SortColumnMissing { key } => {
                format!("sort key {key} names no column; later keys are not checked")
            }
            Issue::UnsortedRows { row, key } => {
                format!("row {row} is out of order on {key}")
            }
            Issue::PageOutOfSequence { index, page } => {
                format!("page #{index} of the sequence reports page {page}")
            }
            Issue::PrematureLastPage { page, height } => {
                format!("page {page} ends the sequence early with {height} rows")
            }
            Issue::MissingLastPage { page } => {
                format!("final page {page} is not flagged isLastPage")
            }
            Issue::PagesDiverge {
                position,
                expected,
                actual,
            } => format!(
                "paged row {position} is [{}], expected [{}]",
                actual.join(", "),
                expected.join(", ")
            ),
            Issue::PagedRowCount { expected, actual } => {
                format!("pages hold {actual} rows, expected {expected}")
            }
        }
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

fn describe_offset(offset: Option<i32>) -> String {
    offset.map_or_else(|| "absent".to_string(), |offset| offset.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_issues_are_warnings() {
        let issue = Issue::OffsetLabelMissing {
            name: "IpHINAT79UW.A03MvHHogjR[2].UXz7xuGCEhU".to_string(),
            label: "Weight, Child Programme, Birth".to_string(),
            offset: 2,
        };
        assert_eq!(issue.severity(), Severity::Warning);
        assert_eq!(issue.category(), Category::Headers);
        assert!(issue.message().contains("(2)"));
    }

    #[test]
    fn context_issue_message_names_qualifier() {
        let issue = Issue::ContextOnValue {
            row: 1,
            column: 17,
            status: ValueStatus::NotDetermined,
            value: "1".to_string(),
        };
        assert_eq!(issue.severity(), Severity::Error);
        assert_eq!(issue.location(), "(1, 17)");
        assert_eq!(
            issue.to_string(),
            "RC02: ND qualifier at (1, 17) on non-empty cell `1`"
        );
    }

    #[test]
    fn severity_parse() {
        assert_eq!(Severity::parse(" Warning "), Some(Severity::Warning));
        assert_eq!(Severity::parse("fatal"), None);
    }
}
