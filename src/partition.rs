//! Static work partitioning
//!
//! Splits an extent `[0, n)` among `p` workers once per run. Two shapes are
//! supported:
//!
//! - **Contiguous**: `p` ordered, gap-free half-open intervals whose sizes
//!   differ by at most one. The `n % p` leftover units go one at a time to the
//!   earliest intervals.
//! - **Strided**: worker `i` owns `i, i + stride, i + 2*stride, …`.
//!
//! # Example
//!
//! ```
//! use parconv::partition::partition;
//!
//! // 10 rows over 4 workers: sizes 3, 3, 2, 2
//! let parts = partition(10, 4).unwrap();
//! let sizes: Vec<usize> = parts.iter().map(|p| p.len()).collect();
//! assert_eq!(sizes, vec![3, 3, 2, 2]);
//! assert_eq!(parts[0].start, 0);
//! assert_eq!(parts[3].end, 10);
//! ```

use std::iter::StepBy;
use std::ops::Range;

use serde::Serialize;

use crate::{ParconvError, Result};

/// Half-open interval `[start, end)` of rows, columns or linear indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Partition {
    /// First index owned by the worker
    pub start: usize,
    /// One past the last index owned by the worker
    pub end: usize,
}

impl Partition {
    /// Create a partition; `start` must not exceed `end`
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "partition start {start} past end {end}");
        Self { start, end }
    }

    /// Number of indices in the interval
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True when the worker owning this interval has nothing to do
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Split `[0, n)` into `p` contiguous intervals
///
/// The first `n % p` intervals get `n / p + 1` indices, the rest get `n / p`.
/// When `p > n` the trailing intervals are empty.
///
/// # Errors
///
/// Returns `InvalidInput` if `p == 0`.
///
/// # Example
///
/// ```
/// use parconv::partition::partition;
///
/// let parts = partition(2, 4).unwrap();
/// assert_eq!(parts.len(), 4);
/// assert!(parts[2].is_empty() && parts[3].is_empty());
/// ```
pub fn partition(n: usize, p: usize) -> Result<Vec<Partition>> {
    if p == 0 {
        return Err(ParconvError::InvalidInput(
            "cannot partition work among zero workers".to_string(),
        ));
    }

    let base = n / p;
    let remainder = n % p;

    let mut parts = Vec::with_capacity(p);
    let mut start = 0;
    for i in 0..p {
        let len = base + usize::from(i < remainder);
        parts.push(Partition::new(start, start + len));
        start += len;
    }

    debug_assert_eq!(start, n);
    Ok(parts)
}

/// Linear indices below `n` owned by `worker` under an interleaved split
///
/// # Errors
///
/// Returns `InvalidInput` if `stride == 0`.
///
/// # Example
///
/// ```
/// use parconv::partition::strided;
///
/// let owned: Vec<usize> = strided(10, 3, 1).unwrap().collect();
/// assert_eq!(owned, vec![1, 4, 7]);
/// ```
pub fn strided(n: usize, stride: usize, worker: usize) -> Result<StepBy<Range<usize>>> {
    if stride == 0 {
        return Err(ParconvError::InvalidInput(
            "stride must be at least 1".to_string(),
        ));
    }
    Ok((worker.min(n)..n).step_by(stride))
}
