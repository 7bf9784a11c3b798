//! Table models for the reshape pipeline.
//!
//! - [`IndexedTable`] - Rows keyed by a (row key, sub key) composite index
//! - [`Frame`] - A labelled two-dimensional grid of [`Cell`]s
//! - [`ColumnLabel`] - A (data column, sub key) pair produced by unstacking
//! - [`Label`] - Anything that can be written as one or more index fields

use serde::{Deserialize, Serialize};

/// A single value. `None` marks a missing value.
pub type Cell = Option<String>;

// =============================================================================
// Indexed Table
// =============================================================================

/// One parsed row: its composite key and its data values.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedRow {
    pub row_key: String,
    pub sub_key: String,
    /// One entry per data column, in header order.
    pub values: Vec<Cell>,
}

/// A table whose first two columns form a composite index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedTable {
    /// Header of the first column.
    pub row_key_name: String,
    /// Header of the second column.
    pub sub_key_name: String,
    /// Headers of the remaining columns.
    pub value_columns: Vec<String>,
    pub rows: Vec<IndexedRow>,
}

impl IndexedTable {
    pub fn new(
        row_key_name: impl Into<String>,
        sub_key_name: impl Into<String>,
        value_columns: Vec<String>,
    ) -> Self {
        Self {
            row_key_name: row_key_name.into(),
            sub_key_name: sub_key_name.into(),
            value_columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. Missing trailing values are padded with `None`.
    pub fn push(&mut self, row_key: impl Into<String>, sub_key: impl Into<String>, mut values: Vec<Cell>) {
        values.resize(self.value_columns.len(), None);
        self.rows.push(IndexedRow {
            row_key: row_key.into(),
            sub_key: sub_key.into(),
            values,
        });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// =============================================================================
// Labels
// =============================================================================

/// Column label of an unstacked frame: a data column paired with a sub key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnLabel {
    pub value_column: String,
    pub sub_key: String,
}

impl ColumnLabel {
    pub fn new(value_column: impl Into<String>, sub_key: impl Into<String>) -> Self {
        Self {
            value_column: value_column.into(),
            sub_key: sub_key.into(),
        }
    }
}

/// A row or column label that is written as one CSV field per level.
pub trait Label {
    fn parts(&self) -> Vec<&str>;
}

impl Label for String {
    fn parts(&self) -> Vec<&str> {
        vec![self.as_str()]
    }
}

impl Label for ColumnLabel {
    fn parts(&self) -> Vec<&str> {
        vec![self.value_column.as_str(), self.sub_key.as_str()]
    }
}

// =============================================================================
// Frame
// =============================================================================

/// A dense grid with labelled rows (`index`) and columns.
///
/// `cells[r][c]` is the value at `index[r]`, `columns[c]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<R, C> {
    /// One name per level of the row labels.
    pub index_names: Vec<String>,
    /// One name per level of the column labels.
    pub column_names: Vec<String>,
    pub index: Vec<R>,
    pub columns: Vec<C>,
    cells: Vec<Vec<Cell>>,
}

impl<R, C> Frame<R, C> {
    /// Build a frame from row-major cells.
    ///
    /// Every row of `cells` must have `columns.len()` entries and there must
    /// be `index.len()` rows; this is checked in debug builds only.
    pub fn from_cells(
        index_names: Vec<String>,
        column_names: Vec<String>,
        index: Vec<R>,
        columns: Vec<C>,
        cells: Vec<Vec<Cell>>,
    ) -> Self {
        debug_assert_eq!(cells.len(), index.len());
        debug_assert!(cells.iter().all(|row| row.len() == columns.len()));
        Self {
            index_names,
            column_names,
            index,
            columns,
            cells,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Cells of one row, in column order.
    pub fn row(&self, r: usize) -> &[Cell] {
        &self.cells[r]
    }

    pub fn rows(&self) -> impl Iterator<Item = (&R, &[Cell])> {
        self.index.iter().zip(self.cells.iter().map(Vec::as_slice))
    }

    /// Swap rows and columns, including their level names.
    pub fn transpose(self) -> Frame<C, R> {
        let n_rows = self.index.len();
        let mut transposed: Vec<Vec<Cell>> = (0..self.columns.len())
            .map(|_| Vec::with_capacity(n_rows))
            .collect();

        for row in self.cells {
            for (c, cell) in row.into_iter().enumerate() {
                transposed[c].push(cell);
            }
        }

        Frame {
            index_names: self.column_names,
            column_names: self.index_names,
            index: self.columns,
            columns: self.index,
            cells: transposed,
        }
    }
}

impl<R: PartialEq, C: PartialEq> Frame<R, C> {
    /// Look up a cell by its labels. `None` if either label is unknown.
    pub fn get(&self, row: &R, column: &C) -> Option<&Cell> {
        let r = self.index.iter().position(|l| l == row)?;
        let c = self.columns.iter().position(|l| l == column)?;
        Some(&self.cells[r][c])
    }
}

// =============================================================================
// Tests
// =============================================================================
