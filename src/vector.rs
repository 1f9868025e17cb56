//! Integer vector with sequential and sharded element-wise addition

use std::fmt;

use tracing::instrument;

use crate::executor::{fill_bands, fill_strided};
use crate::partition::partition;
use crate::{ParconvError, Result};

/// Fixed-length integer vector
///
/// # Examples
///
/// ```
/// use parconv::Vector;
///
/// let a = Vector::from_slice(&[1, 2, 3]);
/// let b = Vector::from_slice(&[4, 5, 6]);
/// let result = a.add_contiguous(&b, 2).unwrap();
///
/// assert_eq!(result.as_slice(), &[5, 7, 9]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vector {
    data: Vec<i32>,
}

impl Vector {
    /// Create vector from slice
    pub fn from_slice(data: &[i32]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// Create vector taking ownership of `data`
    pub fn from_vec(data: Vec<i32>) -> Self {
        Self { data }
    }

    /// Zero-filled vector of length `len`
    pub fn zeros(len: usize) -> Self {
        Self { data: vec![0; len] }
    }

    /// Get underlying data as slice
    pub fn as_slice(&self) -> &[i32] {
        &self.data
    }

    /// Get vector length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if vector is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn check_len(&self, other: &Self) -> Result<()> {
        if self.len() != other.len() {
            return Err(ParconvError::SizeMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(())
    }

    /// Element-wise addition on the calling thread
    ///
    /// # Errors
    ///
    /// Returns [`ParconvError::SizeMismatch`] if vectors have different lengths.
    pub fn add_sequential(&self, other: &Self) -> Result<Self> {
        self.check_len(other)?;
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a.wrapping_add(*b))
            .collect();
        Ok(Self { data })
    }

    /// Element-wise addition with `workers` contiguous index ranges
    ///
    /// # Errors
    ///
    /// `SizeMismatch` for different lengths, `InvalidInput` for zero workers,
    /// `WorkerFailure` if a worker does not complete.
    ///
    /// # Examples
    ///
    /// ```
    /// use parconv::Vector;
    ///
    /// let a = Vector::from_slice(&[1, 2, 3, 4]);
    /// let b = Vector::from_slice(&[4, 3, 2, 1]);
    /// assert_eq!(a.add_contiguous(&b, 4).unwrap().as_slice(), &[5, 5, 5, 5]);
    /// ```
    #[instrument(level = "debug", skip(self, other), fields(len = self.len()))]
    pub fn add_contiguous(&self, other: &Self, workers: usize) -> Result<Self> {
        self.check_len(other)?;
        let ranges = partition(self.len(), workers)?;

        let mut data = vec![0; self.len()];
        fill_bands(&mut data, 1, &ranges, |idx| {
            self.data[idx].wrapping_add(other.data[idx])
        })?;
        Ok(Self { data })
    }

    /// Element-wise addition with `stride` workers on interleaved indices
    ///
    /// Worker `i` computes positions `i, i + stride, i + 2*stride, …`. With
    /// `stride == self.len()` every element gets its own thread.
    ///
    /// # Errors
    ///
    /// `SizeMismatch` for different lengths, `InvalidInput` for a zero stride,
    /// `WorkerFailure` if a worker does not complete.
    #[instrument(level = "debug", skip(self, other), fields(len = self.len()))]
    pub fn add_strided(&self, other: &Self, stride: usize) -> Result<Self> {
        self.check_len(other)?;

        let mut data = vec![0; self.len()];
        fill_strided(&mut data, stride, |idx| {
            self.data[idx].wrapping_add(other.data[idx])
        })?;
        Ok(Self { data })
    }
}

/// `[a, b, c]`
impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice() {
        let v = Vector::from_slice(&[1, 2, 3]);
        assert_eq!(v.len(), 3);
        assert_eq!(v.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_zeros_and_empty() {
        assert_eq!(Vector::zeros(3).as_slice(), &[0, 0, 0]);
        assert!(Vector::zeros(0).is_empty());
    }

    #[test]
    fn test_add_sequential() {
        let a = Vector::from_slice(&[1, 2, 3, 4]);
        let b = Vector::from_slice(&[4, 3, 2, 1]);
        assert_eq!(a.add_sequential(&b).unwrap().as_slice(), &[5, 5, 5, 5]);
    }

    #[test]
    fn test_add_contiguous_one_element_per_worker() {
        let a = Vector::from_slice(&[1, 2, 3, 4]);
        let b = Vector::from_slice(&[4, 3, 2, 1]);
        let seq = a.add_sequential(&b).unwrap();
        let par = a.add_contiguous(&b, 4).unwrap();
        assert_eq!(par.as_slice(), &[5, 5, 5, 5]);
        assert_eq!(par, seq);
    }

    #[test]
    fn test_add_contiguous_uneven_split() {
        let a = Vector::from_vec((0..11).collect());
        let b = Vector::from_vec((0..11).map(|x| x * 3).collect());
        let expected: Vec<i32> = (0..11).map(|x| x * 4).collect();
        assert_eq!(a.add_contiguous(&b, 3).unwrap().as_slice(), expected.as_slice());
    }

    #[test]
    fn test_add_strided_thread_per_element() {
        let a = Vector::from_slice(&[1, 2, 3, 4]);
        let b = Vector::from_slice(&[4, 3, 2, 1]);
        assert_eq!(a.add_strided(&b, 4).unwrap().as_slice(), &[5, 5, 5, 5]);
    }

    #[test]
    fn test_add_empty() {
        let a = Vector::from_slice(&[]);
        let b = Vector::from_slice(&[]);
        assert!(a.add_contiguous(&b, 4).unwrap().is_empty());
        assert!(a.add_strided(&b, 1).unwrap().is_empty());
    }

    #[test]
    fn test_add_size_mismatch() {
        let a = Vector::from_slice(&[1, 2]);
        let b = Vector::from_slice(&[1]);
        let expected = ParconvError::SizeMismatch {
            expected: 2,
            actual: 1,
        };
        assert_eq!(a.add_sequential(&b).unwrap_err(), expected);
        assert_eq!(a.add_contiguous(&b, 2).unwrap_err(), expected);
        assert_eq!(a.add_strided(&b, 2).unwrap_err(), expected);
    }

    #[test]
    fn test_add_zero_workers() {
        let a = Vector::from_slice(&[1]);
        assert!(matches!(
            a.add_contiguous(&a, 0),
            Err(ParconvError::InvalidInput(_))
        ));
        assert!(matches!(
            a.add_strided(&a, 0),
            Err(ParconvError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_add_wraps_at_native_width() {
        let a = Vector::from_slice(&[i32::MAX]);
        let b = Vector::from_slice(&[1]);
        assert_eq!(a.add_sequential(&b).unwrap().as_slice(), &[i32::MIN]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Vector::from_slice(&[1, 2, 3]).to_string(), "[1, 2, 3]");
    }
}
