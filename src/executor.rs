//! Parallel executors over statically partitioned work
//!
//! Every executor follows the same shape:
//!
//! 1. Split the output buffer into disjoint `&mut` regions, one per worker,
//!    using [`crate::partition`].
//! 2. Spawn one fresh OS thread per region with [`scoped_workers`]. Inputs are
//!    shared by `&` reference; each worker writes only to the region it owns.
//! 3. Join every worker before the buffer is handed back.
//!
//! No locks or atomics are involved in the compute phase: disjointness comes
//! from `split_at_mut`, so each cell has exactly one writer by construction.
//!
//! # Strategies
//!
//! | Strategy   | Worker `w` owns                                        |
//! |------------|--------------------------------------------------------|
//! | `Rows`     | all columns of row band `w`                            |
//! | `Columns`  | column band `w` of every row                           |
//! | `Elements` | linear cells `w, w + P, w + 2P, …` (interleaved)       |
//!
//! # Example
//!
//! ```
//! use parconv::{executor, convolution, Matrix, Strategy};
//!
//! let m = Matrix::from_vec(3, 3, (1..=9).collect()).unwrap();
//! let k = Matrix::filled(3, 3, 1);
//!
//! let reference = convolution::convolve(&m, &k).unwrap();
//! for strategy in [Strategy::Rows, Strategy::Columns, Strategy::Elements] {
//!     let parallel = executor::convolve_with(&m, &k, strategy, 2).unwrap();
//!     assert_eq!(parallel, reference);
//! }
//! ```

use std::any::Any;
use std::fmt;
use std::mem;
use std::thread;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::convolution::{convolve_cell, validate_kernel};
use crate::partition::{partition, strided, Partition};
use crate::timing::{timed, Timed};
use crate::{Matrix, ParconvError, Result};

/// How the result buffer is divided among workers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Contiguous bands of rows
    Rows,
    /// Contiguous bands of columns
    #[default]
    Columns,
    /// Interleaved single cells
    Elements,
}

impl Strategy {
    /// All strategies, in the order they are usually reported
    pub const ALL: [Strategy; 3] = [Strategy::Rows, Strategy::Columns, Strategy::Elements];

    /// Lowercase name used on the command line and in reports
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Rows => "rows",
            Strategy::Columns => "columns",
            Strategy::Elements => "elements",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Run `f(worker, shard)` on one fresh thread per shard, then join them all
///
/// Returns only after every spawned thread has finished, whether or not any
/// of them failed. Threads are named `parconv-worker-{index}`.
///
/// # Errors
///
/// Returns `WorkerFailure` for the first worker (by index) that could not be
/// spawned or that panicked. Workers after a spawn failure are not started.
///
/// # Example
///
/// ```
/// use parconv::executor::scoped_workers;
///
/// let mut out = [0usize; 4];
/// let shards: Vec<&mut usize> = out.iter_mut().collect();
/// scoped_workers(shards, |worker, cell| *cell = worker * 10).unwrap();
/// assert_eq!(out, [0, 10, 20, 30]);
/// ```
pub fn scoped_workers<S, F>(shards: Vec<S>, f: F) -> Result<()>
where
    S: Send,
    F: Fn(usize, S) + Sync,
{
    let f = &f;
    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(shards.len());
        let mut spawn_failure = None;

        for (worker, shard) in shards.into_iter().enumerate() {
            let spawned = thread::Builder::new()
                .name(format!("parconv-worker-{worker}"))
                .spawn_scoped(scope, move || f(worker, shard));
            match spawned {
                Ok(handle) => handles.push((worker, handle)),
                Err(err) => {
                    spawn_failure = Some(ParconvError::WorkerFailure {
                        worker,
                        reason: format!("could not spawn thread: {err}"),
                    });
                    break;
                }
            }
        }

        // Barrier: every started worker is joined before anything is reported
        let mut failure = None;
        for (worker, handle) in handles {
            if let Err(payload) = handle.join() {
                failure.get_or_insert(ParconvError::WorkerFailure {
                    worker,
                    reason: panic_reason(payload.as_ref()),
                });
            }
        }

        match failure.or(spawn_failure) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    })
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_string()
    }
}

/// Fill `out` band by band; band `w` covers `out[start*width..end*width]`
///
/// `cell` maps a linear index of `out` to its value.
pub(crate) fn fill_bands<F>(out: &mut [i32], width: usize, bands: &[Partition], cell: F) -> Result<()>
where
    F: Fn(usize) -> i32 + Sync,
{
    let mut shards = Vec::with_capacity(bands.len());
    let mut rest = out;
    for band in bands {
        let (head, tail) = mem::take(&mut rest).split_at_mut(band.len() * width);
        shards.push((*band, head));
        rest = tail;
    }

    scoped_workers(shards, |worker, (band, region)| {
        trace!(worker, start = band.start, end = band.end, "band worker started");
        let base = band.start * width;
        for (offset, value) in region.iter_mut().enumerate() {
            *value = cell(base + offset);
        }
    })
}

/// Fill a `rows x cols` row-major `out` by column bands
///
/// Worker `w` receives, for every row, the segment of that row inside band `w`.
pub(crate) fn fill_column_bands<F>(
    out: &mut [i32],
    rows: usize,
    cols: usize,
    bands: &[Partition],
    cell: F,
) -> Result<()>
where
    F: Fn(usize) -> i32 + Sync,
{
    debug_assert_eq!(out.len(), rows * cols);

    let mut shards: Vec<(Partition, Vec<&mut [i32]>)> = bands
        .iter()
        .map(|band| (*band, Vec::with_capacity(rows)))
        .collect();

    if cols > 0 {
        for row in out.chunks_mut(cols) {
            let mut rest = row;
            for (band, segments) in shards.iter_mut() {
                let (head, tail) = mem::take(&mut rest).split_at_mut(band.len());
                segments.push(head);
                rest = tail;
            }
        }
    }

    scoped_workers(shards, |worker, (band, segments)| {
        trace!(worker, start = band.start, end = band.end, "column band worker started");
        for (row, segment) in segments.into_iter().enumerate() {
            for (offset, value) in segment.iter_mut().enumerate() {
                *value = cell(row * cols + band.start + offset);
            }
        }
    })
}

/// Fill `out` with an interleaved split: worker `w` owns `w, w + stride, …`
pub(crate) fn fill_strided<F>(out: &mut [i32], stride: usize, cell: F) -> Result<()>
where
    F: Fn(usize) -> i32 + Sync,
{
    if stride == 0 {
        return Err(ParconvError::InvalidInput(
            "strided sharding needs at least one worker".to_string(),
        ));
    }

    let len = out.len();
    let mut shards = Vec::with_capacity(stride);
    for worker in 0..stride {
        shards.push((strided(len, stride, worker)?, Vec::with_capacity(len / stride + 1)));
    }

    for (idx, value) in out.iter_mut().enumerate() {
        shards[idx % stride].1.push(value);
    }

    scoped_workers(shards, |worker, (indices, cells)| {
        trace!(worker, stride, cells = cells.len(), "strided worker started");
        for (idx, value) in indices.zip(cells) {
            *value = cell(idx);
        }
    })
}

/// Row-sharded convolution with `workers` contiguous row bands
///
/// # Errors
///
/// `InvalidInput` for a bad kernel or `workers == 0`; `WorkerFailure` if a
/// worker does not complete.
#[instrument(level = "debug", skip(matrix, kernel), fields(dims = %format!("{}x{}", matrix.rows(), matrix.cols())))]
pub fn convolve_rows(matrix: &Matrix, kernel: &Matrix, workers: usize) -> Result<Matrix> {
    validate_kernel(kernel)?;
    let (rows, cols) = matrix.shape();
    let bands = partition(rows, workers)?;

    let mut result = Matrix::zeros(rows, cols);
    fill_bands(result.as_mut_slice(), cols, &bands, |idx| {
        convolve_cell(matrix, kernel, idx / cols, idx % cols)
    })?;
    Ok(result)
}

/// Column-sharded convolution with `workers` contiguous column bands
///
/// # Errors
///
/// `InvalidInput` for a bad kernel or `workers == 0`; `WorkerFailure` if a
/// worker does not complete.
#[instrument(level = "debug", skip(matrix, kernel), fields(dims = %format!("{}x{}", matrix.rows(), matrix.cols())))]
pub fn convolve_columns(matrix: &Matrix, kernel: &Matrix, workers: usize) -> Result<Matrix> {
    validate_kernel(kernel)?;
    let (rows, cols) = matrix.shape();
    let bands = partition(cols, workers)?;

    let mut result = Matrix::zeros(rows, cols);
    fill_column_bands(result.as_mut_slice(), rows, cols, &bands, |idx| {
        convolve_cell(matrix, kernel, idx / cols, idx % cols)
    })?;
    Ok(result)
}

/// Element-sharded convolution: `workers` threads with interleaved cells
///
/// # Errors
///
/// `InvalidInput` for a bad kernel or `workers == 0`; `WorkerFailure` if a
/// worker does not complete.
#[instrument(level = "debug", skip(matrix, kernel), fields(dims = %format!("{}x{}", matrix.rows(), matrix.cols())))]
pub fn convolve_elements(matrix: &Matrix, kernel: &Matrix, workers: usize) -> Result<Matrix> {
    validate_kernel(kernel)?;
    let (rows, cols) = matrix.shape();

    let mut result = Matrix::zeros(rows, cols);
    fill_strided(result.as_mut_slice(), workers, |idx| {
        convolve_cell(matrix, kernel, idx / cols, idx % cols)
    })?;
    Ok(result)
}

/// Convolve with the given sharding strategy
///
/// # Errors
///
/// Same as the strategy-specific executors.
pub fn convolve_with(
    matrix: &Matrix,
    kernel: &Matrix,
    strategy: Strategy,
    workers: usize,
) -> Result<Matrix> {
    match strategy {
        Strategy::Rows => convolve_rows(matrix, kernel, workers),
        Strategy::Columns => convolve_columns(matrix, kernel, workers),
        Strategy::Elements => convolve_elements(matrix, kernel, workers),
    }
}

/// [`convolve_with`] with its wall-clock duration, spawn and join included
///
/// # Errors
///
/// Same as [`convolve_with`].
pub fn convolve_with_timed(
    matrix: &Matrix,
    kernel: &Matrix,
    strategy: Strategy,
    workers: usize,
) -> Result<Timed<Matrix>> {
    timed(|| convolve_with(matrix, kernel, strategy, workers)).transpose()
}
