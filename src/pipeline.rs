//! End-to-end runs: generate → sequential → parallel → verify → report
//!
//! Both pipelines compute the sequential reference first, then the parallel
//! strategies on the very same input. A worker failure aborts only the strategy
//! it happened in; samples already collected stay in the report.

use tracing::{info, info_span, warn};

use crate::config::{RunConfig, VectorRunConfig};
use crate::convolution::{convolve_timed, validate_kernel, validate_kernel_shape};
use crate::executor::convolve_with_timed;
use crate::generate::{Generator, NUMBER_LIMIT};
use crate::report::{RunReport, TimingSample};
use crate::timing::{timed, Timed};
use crate::verify::{check_matrix, equal, first_mismatch};
use crate::{ParconvError, Result, Vector};

/// Inputs with every extent below this are printed with the report
pub const DIAGNOSTIC_THRESHOLD: usize = 10;

/// Convolution run as described by `config`
///
/// With `config.workers == 0` only the sequential pass runs.
///
/// # Errors
///
/// `InvalidInput` if the kernel extents are even or zero, or the matrix is
/// too large to address; both are checked before any data is generated. Worker failures and mismatches are recorded in the
/// report instead.
pub fn run_convolution(config: &RunConfig) -> Result<RunReport> {
    let span = info_span!(
        "convolution",
        input = %config.input_path.display(),
        workers = config.workers,
        strategy = %config.strategy
    );
    let _guard = span.enter();

    let (matrix, kernel) = match &config.data {
        Some(data) => (data.matrix.clone(), data.kernel.clone()),
        None => {
            let dims = config.dims;
            validate_kernel_shape(dims.kernel_rows, dims.kernel_cols)?;
            let mut generator = Generator::from_seed(config.seed);
            (
                generator.matrix(dims.rows, dims.cols, NUMBER_LIMIT)?,
                generator.matrix(dims.kernel_rows, dims.kernel_cols, NUMBER_LIMIT)?,
            )
        }
    };
    validate_kernel(&kernel)?;

    let mut report = RunReport::new(
        "convolution",
        format!(
            "{}x{} matrix, {}x{} kernel",
            matrix.rows(),
            matrix.cols(),
            kernel.rows(),
            kernel.cols()
        ),
    );

    let small = matrix.rows() < DIAGNOSTIC_THRESHOLD && matrix.cols() < DIAGNOSTIC_THRESHOLD;
    if small {
        report.preview("Matrix", &matrix);
        report.preview("Kernel", &kernel);
    }

    let sequential = convolve_timed(&matrix, &kernel)?;
    info!(elapsed = ?sequential.elapsed, "sequential pass finished");
    report
        .samples
        .push(TimingSample::new("sequential", 0, sequential.elapsed));

    if config.is_sequential_only() {
        if small {
            report.preview("Result", &sequential.value);
        }
        return Ok(report);
    }

    let strategy = config.strategy.name();
    let parallel = convolve_with_timed(&matrix, &kernel, config.strategy, config.workers);
    let check = record_parallel(&mut report, strategy, config.workers, parallel)
        .and_then(|result| {
            if small {
                report.preview("Result", &result);
            }
            check_matrix(&sequential.value, &result)
        });
    report.verification.record(strategy, check)?;

    if !report.verification.is_ok() {
        warn!(verification = ?report.verification, "parallel run did not match");
    }
    Ok(report)
}

/// Keep the timing sample of a finished parallel run and hand back its result
fn record_parallel<T>(
    report: &mut RunReport,
    strategy: &str,
    workers: usize,
    parallel: Result<Timed<T>>,
) -> Result<T> {
    let run = parallel?;
    info!(strategy, workers, elapsed = ?run.elapsed, "parallel pass finished");
    report
        .samples
        .push(TimingSample::new(strategy, workers, run.elapsed));
    Ok(run.value)
}

/// Vector-addition demo as described by `config`
///
/// Runs the sequential pass, the contiguous strategy with `config.workers`
/// workers, and the interleaved strategy with one worker per element.
///
/// # Errors
///
/// `InvalidInput` for `config.workers == 0`. Worker failures and mismatches
/// are recorded in the report instead.
pub fn run_vector_addition(config: &VectorRunConfig) -> Result<RunReport> {
    let span = info_span!("vector_addition", len = config.len, workers = config.workers);
    let _guard = span.enter();

    if config.workers == 0 {
        return Err(ParconvError::InvalidInput(
            "vector addition needs at least one worker".to_string(),
        ));
    }

    let mut generator = Generator::from_seed(config.seed);
    let a = generator.vector(config.len, NUMBER_LIMIT)?;
    let b = generator.vector(config.len, NUMBER_LIMIT)?;

    let mut report = RunReport::new("vector_addition", format!("{} elements", config.len));
    let small = config.len < DIAGNOSTIC_THRESHOLD;

    let sequential = timed(|| a.add_sequential(&b)).transpose()?;
    report
        .samples
        .push(TimingSample::new("sequential", 0, sequential.elapsed));
    if small {
        report.preview("a", &a);
        report.preview("b", &b);
        report.preview("sequential", &sequential.value);
    }

    let stride = config.len.max(1);
    let runs = [
        ("contiguous", config.workers, timed(|| a.add_contiguous(&b, config.workers)).transpose()),
        ("per-element", stride, timed(|| a.add_strided(&b, stride)).transpose()),
    ];

    for (label, workers, parallel) in runs {
        let check = record_parallel(&mut report, label, workers, parallel).and_then(|result| {
            if small {
                report.preview(label, &result);
            }
            check_vector(&sequential.value, &result)
        });
        report.verification.record(label, check)?;
    }

    Ok(report)
}

fn check_vector(expected: &Vector, actual: &Vector) -> Result<()> {
    let (expected, actual) = (expected.as_slice(), actual.as_slice());
    if expected.len() == actual.len() && equal(expected, actual, expected.len()) {
        return Ok(());
    }
    match first_mismatch(expected, actual) {
        None => Ok(()),
        Some(m) => Err(ParconvError::VerificationMismatch {
            row: 0,
            col: m.index,
            expected: m.expected,
            actual: m.actual,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;
    use crate::config::{Dimensions, InputData};
    use crate::executor::Strategy;
    use crate::report::Verification;
    use crate::timing::TimeUnit;
    use crate::Matrix;

    fn config(workers: usize, strategy: Strategy) -> RunConfig {
        RunConfig {
            input_path: PathBuf::from("input.txt"),
            dims: Dimensions {
                rows: 12,
                cols: 9,
                kernel_rows: 3,
                kernel_cols: 5,
            },
            data: None,
            workers,
            strategy,
            seed: Some(42),
            unit: TimeUnit::Millis,
        }
    }

    #[test]
    fn test_sequential_only() {
        let report = run_convolution(&config(0, Strategy::Columns)).unwrap();
        assert_eq!(report.samples.len(), 1);
        assert_eq!(report.samples[0].label, "sequential");
        assert_eq!(report.verification, Verification::Skipped);
    }

    #[test]
    fn test_each_strategy_verifies() {
        for strategy in Strategy::ALL {
            let report = run_convolution(&config(4, strategy)).unwrap();
            assert_eq!(report.verification, Verification::Passed, "{strategy}");
            assert!(report.sample(strategy.name()).is_some());
        }
    }

    #[test]
    fn test_explicit_data_is_used() {
        let mut cfg = config(2, Strategy::Rows);
        cfg.data = Some(InputData {
            matrix: Matrix::from_vec(2, 2, vec![1, 2, 3, 4]).unwrap(),
            kernel: Matrix::from_vec(1, 1, vec![2]).unwrap(),
        });
        let report = run_convolution(&cfg).unwrap();
        assert_eq!(report.shape, "2x2 matrix, 1x1 kernel");
        let result = report.previews.iter().find(|p| p.title == "Result").unwrap();
        assert_eq!(result.body, Matrix::from_vec(2, 2, vec![2, 4, 6, 8]).unwrap().to_string());
    }

    #[test]
    fn test_even_kernel_fails_before_running() {
        let mut cfg = config(2, Strategy::Rows);
        cfg.dims.kernel_rows = 4;
        assert!(matches!(
            run_convolution(&cfg),
            Err(ParconvError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_even_kernel_rejected_before_generating() {
        // 10^10 cells; the kernel has to be rejected first
        let mut cfg = config(2, Strategy::Rows);
        cfg.dims.rows = 100_000;
        cfg.dims.cols = 100_000;
        cfg.dims.kernel_cols = 4;
        assert!(matches!(
            run_convolution(&cfg),
            Err(ParconvError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_overflowing_dimensions_are_an_error() {
        let mut cfg = config(2, Strategy::Rows);
        cfg.dims.rows = usize::MAX;
        cfg.dims.cols = 3;
        assert!(matches!(
            run_convolution(&cfg),
            Err(ParconvError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_check_vector() {
        let a = Vector::from_slice(&[1, 2, 3]);
        assert_eq!(check_vector(&a, &a.clone()), Ok(()));
        assert_eq!(
            check_vector(&a, &Vector::from_slice(&[1, 7, 3])),
            Err(ParconvError::VerificationMismatch {
                row: 0,
                col: 1,
                expected: 2,
                actual: 7,
            })
        );
        assert!(check_vector(&a, &Vector::from_slice(&[1, 2])).is_err());
    }

    #[test]
    fn test_large_inputs_are_not_previewed() {
        let report = run_convolution(&config(3, Strategy::Elements)).unwrap();
        assert!(report.previews.is_empty());
    }

    #[test]
    fn test_worker_failure_keeps_collected_samples() {
        let mut report = RunReport::new("convolution", "test");
        report
            .samples
            .push(TimingSample::new("sequential", 0, Duration::from_millis(1)));

        let failed: Result<Timed<Matrix>> = Err(ParconvError::WorkerFailure {
            worker: 0,
            reason: "panicked".to_string(),
        });
        let check = record_parallel(&mut report, "rows", 2, failed).map(|_| ());
        report.verification.record("rows", check).unwrap();

        assert_eq!(report.samples.len(), 1);
        assert!(matches!(report.verification, Verification::Aborted { .. }));
    }

    #[test]
    fn test_vector_addition_demo() {
        let cfg = VectorRunConfig {
            len: 4,
            workers: 4,
            seed: Some(7),
            unit: TimeUnit::Nanos,
        };
        let report = run_vector_addition(&cfg).unwrap();
        let labels: Vec<&str> = report.samples.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["sequential", "contiguous", "per-element"]);
        assert_eq!(report.sample("per-element").unwrap().workers, 4);
        assert_eq!(report.verification, Verification::Passed);
        assert_eq!(report.previews.len(), 5);
    }

    #[test]
    fn test_vector_addition_empty() {
        let cfg = VectorRunConfig {
            len: 0,
            ..VectorRunConfig::default()
        };
        let report = run_vector_addition(&cfg).unwrap();
        assert_eq!(report.verification, Verification::Passed);
    }

    #[test]
    fn test_vector_addition_zero_workers() {
        let cfg = VectorRunConfig {
            workers: 0,
            ..VectorRunConfig::default()
        };
        assert!(run_vector_addition(&cfg).is_err());
    }
}
