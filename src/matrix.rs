//! Integer matrix with row-major storage
//!
//! # Example
//!
//! ```
//! use parconv::Matrix;
//!
//! // Create a 2x3 matrix
//! let m = Matrix::zeros(2, 3);
//! assert_eq!(m.rows(), 2);
//! assert_eq!(m.cols(), 3);
//! ```

use std::fmt;

use crate::{ParconvError, Result};

/// A 2D integer matrix with row-major storage
///
/// Data is stored in row-major format (C-style), where consecutive elements
/// in memory belong to the same row.
///
/// # Storage Layout
///
/// For a 2x3 matrix:
/// ```text
/// [[a, b, c],
///  [d, e, f]]
/// ```
/// Data is stored as: [a, b, c, d, e, f]
///
/// A matrix is filled once when it is built and only read afterwards, so the
/// same `&Matrix` can be handed to every worker of a parallel executor.
///
/// # Example
///
/// ```
/// use parconv::Matrix;
///
/// let m = Matrix::from_vec(2, 2, vec![1, 2, 3, 4]).unwrap();
/// assert_eq!(m.get(0, 0), Some(&1));
/// assert_eq!(m.get(0, 1), Some(&2));
/// assert_eq!(m.get(1, 0), Some(&3));
/// assert_eq!(m.get(1, 1), Some(&4));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<i32>,
}

impl Matrix {
    /// Creates a zero-filled matrix
    ///
    /// # Panics
    ///
    /// Panics if `rows * cols` overflows `usize`.
    ///
    /// # Example
    ///
    /// ```
    /// use parconv::Matrix;
    ///
    /// let m = Matrix::new(3, 4);
    /// assert_eq!(m.rows(), 3);
    /// assert_eq!(m.cols(), 4);
    /// assert!(m.as_slice().iter().all(|&x| x == 0));
    /// ```
    pub fn new(rows: usize, cols: usize) -> Self {
        Matrix::filled(rows, cols, 0)
    }

    /// Number of cells in a `rows x cols` matrix
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the count does not fit in `usize`.
    ///
    /// ```
    /// use parconv::Matrix;
    ///
    /// assert_eq!(Matrix::cell_count(3, 4).unwrap(), 12);
    /// assert!(Matrix::cell_count(usize::MAX, 2).is_err());
    /// ```
    pub fn cell_count(rows: usize, cols: usize) -> Result<usize> {
        rows.checked_mul(cols).ok_or_else(|| {
            ParconvError::InvalidInput(format!("Matrix dimensions {rows}x{cols} overflow usize"))
        })
    }

    /// Creates a matrix from a vector of data
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `data.len() != rows * cols` or the product
    /// overflows
    ///
    /// # Example
    ///
    /// ```
    /// use parconv::Matrix;
    ///
    /// let m = Matrix::from_vec(2, 2, vec![1, 2, 3, 4]).unwrap();
    /// assert_eq!(m.shape(), (2, 2));
    /// ```
    pub fn from_vec(rows: usize, cols: usize, data: Vec<i32>) -> Result<Self> {
        let expected = Self::cell_count(rows, cols)?;
        if data.len() != expected {
            return Err(ParconvError::InvalidInput(format!(
                "Data length {} does not match matrix dimensions {}x{} (expected {})",
                data.len(),
                rows,
                cols,
                expected
            )));
        }

        Ok(Matrix { rows, cols, data })
    }

    /// Creates a matrix filled with zeros
    ///
    /// # Panics
    ///
    /// Panics if `rows * cols` overflows `usize`.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix::new(rows, cols)
    }

    /// Creates a matrix filled with `value`
    ///
    /// # Panics
    ///
    /// Panics if `rows * cols` overflows `usize`; fallible callers go through
    /// [`Matrix::cell_count`] first.
    ///
    /// ```
    /// use parconv::Matrix;
    ///
    /// let ones = Matrix::filled(3, 3, 1);
    /// assert_eq!(ones.as_slice().iter().sum::<i32>(), 9);
    /// ```
    pub fn filled(rows: usize, cols: usize, value: i32) -> Self {
        let len = rows
            .checked_mul(cols)
            .unwrap_or_else(|| panic!("matrix dimensions {rows}x{cols} overflow usize"));
        Matrix {
            rows,
            cols,
            data: vec![value; len],
        }
    }

    /// Returns the number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the shape as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Gets a reference to an element at (row, col)
    ///
    /// Returns `None` if indices are out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<&i32> {
        if row >= self.rows || col >= self.cols {
            None
        } else {
            self.data.get(row * self.cols + col)
        }
    }

    /// Gets a mutable reference to an element at (row, col)
    ///
    /// Returns `None` if indices are out of bounds
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut i32> {
        if row >= self.rows || col >= self.cols {
            None
        } else {
            let idx = row * self.cols + col;
            self.data.get_mut(idx)
        }
    }

    /// Element at (row, col) with out-of-range coordinates replaced by the
    /// nearest edge index
    ///
    /// # Panics
    ///
    /// Panics if the matrix is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use parconv::Matrix;
    ///
    /// let m = Matrix::from_vec(2, 2, vec![1, 2, 3, 4]).unwrap();
    /// assert_eq!(m.clamped(-1, -1), 1);
    /// assert_eq!(m.clamped(5, 0), 3);
    /// assert_eq!(m.clamped(0, 7), 2);
    /// ```
    #[inline]
    pub fn clamped(&self, row: isize, col: isize) -> i32 {
        let r = clamp_index(row, self.rows);
        let c = clamp_index(col, self.cols);
        self.data[r * self.cols + c]
    }

    /// Returns a row as a slice
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.rows()`.
    pub fn row(&self, row: usize) -> &[i32] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Returns a reference to the underlying data
    pub fn as_slice(&self) -> &[i32] {
        &self.data
    }

    /// Mutable access for executors that split the buffer among workers
    pub(crate) fn as_mut_slice(&mut self) -> &mut [i32] {
        &mut self.data
    }
}

#[inline]
fn clamp_index(idx: isize, extent: usize) -> usize {
    if idx < 0 {
        0
    } else if idx as usize >= extent {
        extent - 1
    } else {
        idx as usize
    }
}

/// Fixed-width (6) columns, one row per line
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for value in self.row(row) {
                write!(f, "{value:>6} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_new() {
        let m = Matrix::new(3, 4);
        assert_eq!(m.shape(), (3, 4));
        assert_eq!(m.len(), 12);
        assert!(m.as_slice().iter().all(|&x| x == 0));
    }

    #[test]
    fn test_matrix_from_vec() {
        let m = Matrix::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(m.get(1, 2), Some(&6));
        assert_eq!(m.row(1), &[4, 5, 6]);
    }

    #[test]
    fn test_matrix_from_vec_invalid_size() {
        let result = Matrix::from_vec(2, 2, vec![1, 2, 3]);
        assert!(matches!(result, Err(ParconvError::InvalidInput(_))));
    }

    #[test]
    fn test_matrix_get_out_of_bounds() {
        let m = Matrix::new(2, 2);
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.get(0, 2), None);
    }

    #[test]
    fn test_matrix_get_mut() {
        let mut m = Matrix::new(2, 2);
        *m.get_mut(1, 0).unwrap() = 9;
        assert_eq!(m.as_slice(), &[0, 0, 9, 0]);
        assert!(m.get_mut(5, 5).is_none());
    }

    #[test]
    fn test_matrix_empty() {
        let m = Matrix::new(0, 5);
        assert!(m.is_empty());
        assert_eq!(m.to_string(), "");
    }

    #[test]
    fn test_clamped_replicates_edges() {
        let m = Matrix::from_vec(3, 3, (1..=9).collect()).unwrap();
        assert_eq!(m.clamped(-2, 1), 2);
        assert_eq!(m.clamped(1, -3), 4);
        assert_eq!(m.clamped(3, 3), 9);
        assert_eq!(m.clamped(1, 1), 5);
    }

    #[test]
    fn test_display_fixed_width() {
        let m = Matrix::from_vec(2, 2, vec![1, 22, 333, -4]).unwrap();
        assert_eq!(
            m.to_string(),
            "     1     22 \n   333     -4 \n"
        );
    }

    #[test]
    fn test_from_vec_overflowing_dimensions() {
        let result = Matrix::from_vec(usize::MAX, 2, vec![1, 2]);
        assert!(matches!(result, Err(ParconvError::InvalidInput(_))));
        assert!(Matrix::cell_count(2, usize::MAX / 2 + 1).is_err());
        assert_eq!(Matrix::cell_count(0, usize::MAX).unwrap(), 0);
    }
}
