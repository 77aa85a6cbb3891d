//! Dense matrices of unsigned words.

use std::fmt;

use itertools::Itertools;
use macflow::*;
use thiserror::Error;

/// Matrix construction and arithmetic errors.
#[allow(missing_docs)]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("matrix has no rows or no columns")]
    Empty,
    #[error("row {row} has {len} elements, expected {expected}")]
    Ragged { row: usize, len: usize, expected: usize },
    #[error("cannot multiply {lhs_rows}x{lhs_cols} by {rhs_rows}x{rhs_cols}")]
    ShapeMismatch { lhs_rows: usize, lhs_cols: usize, rhs_rows: usize, rhs_cols: usize },
}

/// Row-major matrix of unsigned words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<u64>,
}

impl Matrix {
    /// Creates a matrix from its rows.
    pub fn from_rows(rows: Vec<Vec<u64>>) -> Result<Self, MatrixError> {
        let cols = rows.first().map_or(0, Vec::len);
        if cols == 0 {
            return Err(MatrixError::Empty);
        }
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(MatrixError::Ragged { row, len: r.len(), expected: cols });
        }
        Ok(Self { rows: rows.len(), cols, data: rows.into_iter().flatten().collect() })
    }

    /// Creates a `rows x cols` matrix of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self { Self { rows, cols, data: vec![0; rows * cols] } }

    /// Number of rows.
    pub fn rows(&self) -> usize { self.rows }

    /// Number of columns.
    pub fn cols(&self) -> usize { self.cols }

    /// Returns the element at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> u64 {
        assert!(row < self.rows && col < self.cols, "({row}, {col}) is out of bounds");
        self.data[row * self.cols + col]
    }

    /// Sets the element at row-major position `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of bounds.
    pub fn set_slot(&mut self, slot: usize, value: u64) { self.data[slot] = value; }

    /// Returns the elements in row-major order.
    pub fn as_slice(&self) -> &[u64] { &self.data }

    /// Returns the largest element.
    pub fn max_value(&self) -> u64 { self.data.iter().copied().max().unwrap_or(0) }

    /// Computes `self * other` with every multiply and add wrapping modulo `2^width`.
    pub fn matmul_wrapping(&self, other: &Matrix, width: usize) -> Result<Matrix, MatrixError> {
        if self.cols != other.rows {
            return Err(MatrixError::ShapeMismatch {
                lhs_rows: self.rows,
                lhs_cols: self.cols,
                rhs_rows: other.rows,
                rhs_cols: other.cols,
            });
        }

        let data = itertools::iproduct!(0..self.rows, 0..other.cols)
            .map(|(i, j)| {
                (0..self.cols).fold(0u64, |acc, k| {
                    let product = truncate(self.get(i, k).wrapping_mul(other.get(k, j)), width);
                    truncate(acc.wrapping_add(product), width)
                })
            })
            .collect();
        Ok(Matrix { rows: self.rows, cols: other.cols, data })
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.data.iter().map(|v| v.to_string().len()).max().unwrap_or(1);
        for row in self.data.chunks(self.cols.max(1)) {
            writeln!(f, "[{}]", row.iter().map(|v| format!("{v:>width$}")).join(" "))?;
        }
        Ok(())
    }
}
