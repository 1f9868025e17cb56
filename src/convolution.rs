//! Sequential 2D convolution with clamped boundaries
//!
//! Every output cell `(i, j)` sums, over the kernel window centred on it,
//! `matrix[clamp(ki)][clamp(kj)] * kernel[ki - i + KR/2][kj - j + KC/2]`.
//! Coordinates that fall outside the matrix are replaced by the nearest edge
//! index, so border cells see replicated edge values rather than zeros. The
//! output has the same shape as the input.
//!
//! This pass is the reference every parallel strategy in [`crate::executor`]
//! must reproduce exactly.
//!
//! # Example
//!
//! ```
//! use parconv::{convolution, Matrix};
//!
//! let input = Matrix::from_vec(2, 2, vec![1, 2, 3, 4]).unwrap();
//! let kernel = Matrix::filled(3, 3, 1);
//! let out = convolution::convolve(&input, &kernel).unwrap();
//!
//! // (0,0) sees 1 four times, 2 twice, 3 twice, 4 once
//! assert_eq!(out.get(0, 0), Some(&(4 + 4 + 6 + 4)));
//! ```

use tracing::instrument;

use crate::timing::{timed, Timed};
use crate::{Matrix, ParconvError, Result};

/// Reject kernels whose window would not be symmetric around the centre cell
///
/// # Errors
///
/// Returns `InvalidInput` if either kernel extent is zero or even.
pub fn validate_kernel(kernel: &Matrix) -> Result<()> {
    let (kr, kc) = kernel.shape();
    validate_kernel_shape(kr, kc)
}

/// [`validate_kernel`] on extents alone, before any kernel is built
///
/// # Errors
///
/// Returns `InvalidInput` if either extent is zero or even.
pub fn validate_kernel_shape(kr: usize, kc: usize) -> Result<()> {
    if kr == 0 || kc == 0 {
        return Err(ParconvError::InvalidInput(format!(
            "Kernel must not be empty (got {kr}x{kc})"
        )));
    }
    if kr % 2 == 0 || kc % 2 == 0 {
        return Err(ParconvError::InvalidInput(format!(
            "Kernel extents must be odd (got {kr}x{kc})"
        )));
    }
    Ok(())
}

/// Convolved value of output cell `(i, j)`
///
/// `kernel` must already have passed [`validate_kernel`] and `matrix` must be
/// non-empty. Arithmetic wraps at `i32` width.
#[inline]
pub fn convolve_cell(matrix: &Matrix, kernel: &Matrix, i: usize, j: usize) -> i32 {
    let half_r = (kernel.rows() / 2) as isize;
    let half_c = (kernel.cols() / 2) as isize;
    let (i, j) = (i as isize, j as isize);

    let mut sum = 0i32;
    for ki in (i - half_r)..=(i + half_r) {
        let kernel_row = kernel.row((ki - i + half_r) as usize);
        for kj in (j - half_c)..=(j + half_c) {
            let weight = kernel_row[(kj - j + half_c) as usize];
            sum = sum.wrapping_add(matrix.clamped(ki, kj).wrapping_mul(weight));
        }
    }
    sum
}

/// Reference convolution, computed cell by cell in row-major order
///
/// # Errors
///
/// Returns `InvalidInput` if the kernel has an even or zero extent.
#[instrument(level = "debug", skip_all, fields(dims = %format!("{}x{} * {}x{}", matrix.rows(), matrix.cols(), kernel.rows(), kernel.cols())))]
pub fn convolve(matrix: &Matrix, kernel: &Matrix) -> Result<Matrix> {
    validate_kernel(kernel)?;

    let (rows, cols) = matrix.shape();
    let mut result = Matrix::zeros(rows, cols);
    if result.is_empty() {
        return Ok(result);
    }

    for (idx, cell) in result.as_mut_slice().iter_mut().enumerate() {
        *cell = convolve_cell(matrix, kernel, idx / cols, idx % cols);
    }

    Ok(result)
}

/// [`convolve`] with its wall-clock duration
///
/// # Errors
///
/// Same as [`convolve`].
pub fn convolve_timed(matrix: &Matrix, kernel: &Matrix) -> Result<Timed<Matrix>> {
    timed(|| convolve(matrix, kernel)).transpose()
}
