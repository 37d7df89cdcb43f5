//! Tabular (grid) cell storage

use crate::error::{Error, Result};

/// A two-dimensional grid of floats with explicit bounds.
///
/// The backing storage only ever grows. Shrinking the bounds hides the
/// values outside them, and growing again within the retained storage makes
/// those values visible again. Indices are zero-based.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabularCell {
    rows: usize,
    cols: usize,
    /// Backing storage, at least `rows` x `cols`
    data: Vec<Vec<f64>>,
}

impl TabularCell {
    /// Create a zero-filled table
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    /// Number of visible rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of visible columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Change the bounds, keeping every value written so far
    pub fn resize(&mut self, rows: usize, cols: usize) {
        let width = self.data.first().map_or(0, Vec::len).max(cols);
        if self.data.len() < rows {
            self.data.resize_with(rows, Vec::new);
        }
        for row in &mut self.data {
            if row.len() < width {
                row.resize(width, 0.0);
            }
        }
        self.rows = rows;
        self.cols = cols;
    }

    /// Read the value at (`row`, `col`)
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.check_bounds(row, col)?;
        Ok(self.data[row][col])
    }

    /// Write the value at (`row`, `col`)
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        self.check_bounds(row, col)?;
        self.data[row][col] = value;
        Ok(())
    }

    /// Iterate over the visible rows
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.data[..self.rows].iter().map(move |row| &row[..self.cols])
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::Range {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }
}
