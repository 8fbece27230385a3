//! Table types.

use serde::{Deserialize, Serialize};

/// A rectangular grid of plain-text cells.
///
/// Cells never carry inline styling; the header row is flagged by index so a
/// renderer can emphasize it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in the table, all of equal length
    pub rows: Vec<Vec<String>>,

    /// Index of the header row
    pub header_row: usize,

    /// Table caption
    pub caption: Option<String>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            header_row: 0,
            caption: None,
        }
    }

    /// Build a table from ragged rows.
    ///
    /// The grid is as wide as the longest row; shorter rows are filled with
    /// empty cells after their last value.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self {
            rows,
            ..Self::new()
        }
    }

    /// Set the caption and return self.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get the header row.
    pub fn header(&self) -> Option<&[String]> {
        self.rows.get(self.header_row).map(Vec::as_slice)
    }

    /// Get body rows (after the header).
    pub fn body(&self) -> &[Vec<String>] {
        self.rows.get(self.header_row + 1..).unwrap_or(&[])
    }

    /// Get a cell by row and column.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}
