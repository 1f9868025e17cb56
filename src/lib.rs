//! Parconv: statically partitioned data-parallel kernels
//!
//! Two workloads run on a fixed number of worker threads, each owning a
//! disjoint slice of the output:
//!
//! 1. **Vector addition** - element-wise `c[i] = a[i] + b[i]`
//! 2. **2D convolution** - clamped-boundary convolution of a matrix with an
//!    odd-sized kernel
//!
//! Every parallel result is checked against a sequential reference.
//!
//! # Design Principles
//!
//! - **Static partitioning**: work is divided up front, remainders go to the
//!   first workers, nothing is rebalanced at runtime
//! - **Disjoint writes**: output regions come from `split_at_mut`, so the
//!   compute phase needs no locks
//! - **Fresh threads per run**: workers are scoped OS threads joined before
//!   the result is returned
//! - **Verified**: a parallel run that disagrees with the reference is reported
//!   and fails the process
//!
//! # Quick Start
//!
//! ```rust
//! use parconv::{Matrix, Strategy, Vector};
//!
//! let a = Vector::from_slice(&[1, 2, 3, 4]);
//! let b = Vector::from_slice(&[4, 3, 2, 1]);
//! assert_eq!(a.add_contiguous(&b, 4).unwrap().as_slice(), &[5, 5, 5, 5]);
//!
//! let m = Matrix::filled(4, 4, 1);
//! let k = Matrix::filled(3, 3, 1);
//! let out = parconv::executor::convolve_with(&m, &k, Strategy::Columns, 2).unwrap();
//! assert_eq!(out.get(0, 0), Some(&9));
//! ```

pub mod config;
pub mod convolution;
pub mod error;
pub mod executor;
pub mod generate;
pub mod matrix;
pub mod partition;
pub mod pipeline;
pub mod report;
pub mod timing;
pub mod vector;
pub mod verify;

pub use error::{ParconvError, Result};
pub use executor::Strategy;
pub use matrix::Matrix;
pub use vector::Vector;
