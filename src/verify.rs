//! Equality checks between a parallel result and the sequential reference
//!
//! A race or an off-by-one in partitioning shows up here as a mismatching
//! cell; nothing else in the pipeline would notice a wrong answer.

use serde::Serialize;

use crate::{Matrix, ParconvError, Result};

/// First cell at which two buffers differ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    /// Linear (row-major) index of the cell
    pub index: usize,
    /// Value in the reference buffer
    pub expected: i32,
    /// Value in the checked buffer
    pub actual: i32,
}

/// True when the first `extent` cells of `a` and `b` are identical
///
/// Stops at the first differing cell. Buffers shorter than `extent` compare
/// unequal.
///
/// ```
/// use parconv::verify::equal;
///
/// assert!(equal(&[1, 2, 3], &[1, 2, 3], 3));
/// assert!(!equal(&[1, 2, 3], &[1, 0, 3], 3));
/// assert!(equal(&[1, 2, 3], &[1, 2, 9], 2));
/// ```
pub fn equal(a: &[i32], b: &[i32], extent: usize) -> bool {
    if a.len() < extent || b.len() < extent {
        return false;
    }
    a[..extent].iter().zip(&b[..extent]).all(|(x, y)| x == y)
}

/// First position where `actual` differs from `expected`
///
/// A length difference is reported at the end of the shorter buffer, with the
/// missing value shown as 0.
pub fn first_mismatch(expected: &[i32], actual: &[i32]) -> Option<Mismatch> {
    if let Some(index) = expected.iter().zip(actual).position(|(x, y)| x != y) {
        return Some(Mismatch {
            index,
            expected: expected[index],
            actual: actual[index],
        });
    }

    if expected.len() != actual.len() {
        let index = expected.len().min(actual.len());
        return Some(Mismatch {
            index,
            expected: expected.get(index).copied().unwrap_or_default(),
            actual: actual.get(index).copied().unwrap_or_default(),
        });
    }

    None
}

/// Check a parallel result against the sequential reference
///
/// # Errors
///
/// `SizeMismatch` if the shapes differ, `VerificationMismatch` naming the first
/// differing cell otherwise.
pub fn check_matrix(expected: &Matrix, actual: &Matrix) -> Result<()> {
    if expected.shape() != actual.shape() {
        return Err(ParconvError::SizeMismatch {
            expected: expected.len(),
            actual: actual.len(),
        });
    }

    if equal(expected.as_slice(), actual.as_slice(), expected.len()) {
        return Ok(());
    }
    match first_mismatch(expected.as_slice(), actual.as_slice()) {
        None => Ok(()),
        Some(m) => Err(ParconvError::VerificationMismatch {
            row: m.index / expected.cols(),
            col: m.index % expected.cols(),
            expected: m.expected,
            actual: m.actual,
        }),
    }
}
