use serde::{Deserialize, Serialize};

use crate::{GridHeader, Metadata, Row, RowContext};

/// A tracked entity query response.
///
/// `width` is the cell count of the rows (zero for an empty page) while
/// `header_width` always counts the headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub headers: Vec<GridHeader>,
    pub meta_data: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_context: Option<RowContext>,
    pub width: usize,
    pub rows: Vec<Row>,
    pub header_width: usize,
    pub height: usize,
}

impl ResponseEnvelope {
    pub fn new(
        headers: Vec<GridHeader>,
        rows: Vec<Row>,
        meta_data: Metadata,
        row_context: Option<RowContext>,
    ) -> Self {
        let width = rows.first().map_or(0, Vec::len);
        Self {
            header_width: headers.len(),
            height: rows.len(),
            width,
            headers,
            meta_data,
            row_context,
            rows,
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header.name == name)
    }

    pub fn header(&self, name: &str) -> Option<&GridHeader> {
        self.headers.iter().find(|header| header.name == name)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
    }

    /// All cells of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).map_or("", String::as_str))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
