//! Dense numeric arrays stored in [`Node::Matrix`](crate::Node::Matrix) nodes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A dense, row-major matrix of `f64`s.
///
/// The number of entries always equals `rows * cols`; the constructors enforce this.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Creates a matrix with the given shape from its entries in row-major order. Returns [`None`]
    /// if the number of entries does not match the shape.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != rows * cols {
            return None;
        }
        Some(Self { rows, cols, data })
    }

    /// Creates a matrix with the given shape, with every entry set to `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self { rows, cols, data: vec![value; rows * cols] }
    }

    /// Creates a matrix from a list of rows. Returns [`None`] if the rows are not all the same
    /// length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != cols) {
            return None;
        }

        let n_rows = rows.len();
        Some(Self {
            rows: n_rows,
            cols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    /// Returns the number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the `(rows, cols)` shape of the matrix.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns the entries of the matrix in row-major order.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Returns the entry at the given position, or [`None`] if it is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col).copied()
    }

    /// Returns the given row as a slice, or [`None`] if it is out of bounds.
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row >= self.rows {
            return None;
        }
        self.data.get(row * self.cols..(row + 1) * self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_checked() {
        assert!(Matrix::new(2, 3, vec![0.0; 6]).is_some());
        assert!(Matrix::new(2, 3, vec![0.0; 5]).is_none());
    }

    #[test]
    fn ragged_rows() {
        assert!(Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).is_none());
    }

    #[test]
    fn row_major() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.get(1, 0), Some(4.0));
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.row(1), Some(&[4.0, 5.0, 6.0][..]));
    }
}
