//! Composite row ordering.

use std::cmp::Ordering;
use std::fmt;

use crate::{ValueType, compare_cells};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// One sort instruction: a column name and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortKey {
    pub name: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Parse `asc:name` / `desc:name`; a bare name sorts ascending.
    pub fn parse(value: &str) -> Option<Self> {
        match value.split_once(':') {
            Some(("asc", name)) if !name.is_empty() => Some(Self::asc(name)),
            Some(("desc", name)) if !name.is_empty() => Some(Self::desc(name)),
            Some(_) => None,
            None if !value.is_empty() => Some(Self::asc(value)),
            None => None,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.direction.as_str(), self.name)
    }
}

/// A sort key bound to a column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: usize,
    pub value_type: ValueType,
    pub direction: SortDirection,
}

/// Compare two cells under one direction. Empty cells sort last in both
/// directions.
pub fn compare_sort_cells(
    value_type: ValueType,
    direction: SortDirection,
    left: &str,
    right: &str,
) -> Ordering {
    match (left.is_empty(), right.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ordering = compare_cells(value_type, left, right);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }
    }
}

/// Lexicographic comparison of two rows over the sort specs.
pub fn compare_rows<R: AsRef<str>>(left: &[R], right: &[R], specs: &[SortSpec]) -> Ordering {
    for spec in specs {
        let a = left.get(spec.column).map_or("", AsRef::as_ref);
        let b = right.get(spec.column).map_or("", AsRef::as_ref);
        let ordering = compare_sort_cells(spec.value_type, spec.direction, a, b);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
