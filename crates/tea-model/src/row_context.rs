//! Per-cell qualifiers explaining empty values.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Why a cell is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ValueStatus {
    /// The column does not apply: no enrollment or event exists for it.
    #[serde(rename = "NS")]
    NotSupported,
    /// The enrollment or event exists but the value was never captured.
    #[serde(rename = "ND")]
    NotDetermined,
}

impl ValueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueStatus::NotSupported => "NS",
            ValueStatus::NotDetermined => "ND",
        }
    }
}

impl fmt::Display for ValueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "NS" => Ok(ValueStatus::NotSupported),
            "ND" => Ok(ValueStatus::NotDetermined),
            other => Err(format!("Unknown value status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellContext {
    #[serde(rename = "valueStatus")]
    pub value_status: ValueStatus,
}

/// Sparse `row -> column -> qualifier` map.
///
/// Serialized with stringified indexes: `{"1":{"17":{"valueStatus":"ND"}}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowContext(BTreeMap<usize, BTreeMap<usize, CellContext>>);

impl RowContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, row: usize, column: usize, status: ValueStatus) {
        self.0
            .entry(row)
            .or_default()
            .insert(column, CellContext { value_status: status });
    }

    pub fn get(&self, row: usize, column: usize) -> Option<ValueStatus> {
        self.0
            .get(&row)
            .and_then(|columns| columns.get(&column))
            .map(|context| context.value_status)
    }

    /// Entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, ValueStatus)> + '_ {
        self.0.iter().flat_map(|(row, columns)| {
            columns
                .iter()
                .map(move |(column, context)| (*row, *column, context.value_status))
        })
    }

    /// Number of qualified cells.
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeMap::is_empty)
    }

    pub fn count(&self, status: ValueStatus) -> usize {
        self.iter().filter(|(_, _, s)| *s == status).count()
    }
}
