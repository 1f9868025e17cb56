//! Run reports and their text / JSON rendering

use std::time::Duration;

use serde::Serialize;

use crate::timing::TimeUnit;
use crate::{ParconvError, Result};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// JSON for tooling and CI
    Json,
}

/// One timed execution of one executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimingSample {
    /// Executor name, e.g. `sequential` or `columns`
    pub label: String,
    /// Worker threads used; 0 for the sequential pass
    pub workers: usize,
    /// Wall-clock time in nanoseconds
    pub elapsed_ns: u64,
}

impl TimingSample {
    /// Sample from a measured duration
    pub fn new(label: impl Into<String>, workers: usize, elapsed: Duration) -> Self {
        Self {
            label: label.into(),
            workers,
            elapsed_ns: u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX),
        }
    }

    /// Measured duration
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_ns)
    }
}

/// Outcome of comparing parallel results with the sequential reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verification {
    /// Only the sequential pass ran
    #[default]
    Skipped,
    /// Every parallel result matched
    Passed,
    /// A parallel result differed from the reference
    Mismatch {
        /// Strategy that produced the wrong answer
        strategy: String,
        /// Row of the first differing cell (0 for vectors)
        row: usize,
        /// Column of the first differing cell (index for vectors)
        col: usize,
        /// Reference value
        expected: i32,
        /// Parallel value
        actual: i32,
    },
    /// A worker failed, so the strategy produced no result
    Aborted {
        /// Strategy whose workers failed
        strategy: String,
        /// Failure description
        reason: String,
    },
}

impl Verification {
    /// True unless a mismatch or worker failure was recorded
    pub fn is_ok(&self) -> bool {
        matches!(self, Verification::Skipped | Verification::Passed)
    }

    /// Record the result of checking `strategy`; the first failure is kept
    pub fn record(&mut self, strategy: &str, check: Result<()>) -> Result<()> {
        let outcome = match check {
            Ok(()) => Verification::Passed,
            Err(ParconvError::VerificationMismatch {
                row,
                col,
                expected,
                actual,
            }) => Verification::Mismatch {
                strategy: strategy.to_string(),
                row,
                col,
                expected,
                actual,
            },
            Err(ParconvError::WorkerFailure { worker, reason }) => Verification::Aborted {
                strategy: strategy.to_string(),
                reason: format!("worker {worker}: {reason}"),
            },
            Err(other) => return Err(other),
        };

        if self.is_ok() {
            *self = outcome;
        }
        Ok(())
    }
}

/// Titled block printed for small inputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    /// Heading such as `Matrix`
    pub title: String,
    /// Pre-rendered contents
    pub body: String,
}

/// Everything a run prints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// `convolution` or `vector_addition`
    pub workload: String,
    /// One-line description of the input shape
    pub shape: String,
    /// Timing samples in execution order
    pub samples: Vec<TimingSample>,
    /// Verification outcome
    pub verification: Verification,
    /// Small inputs and results, text output only
    #[serde(skip)]
    pub previews: Vec<Preview>,
}

impl RunReport {
    /// Empty report for `workload`
    pub fn new(workload: impl Into<String>, shape: impl Into<String>) -> Self {
        Self {
            workload: workload.into(),
            shape: shape.into(),
            ..Self::default()
        }
    }

    /// Add a preview block
    pub fn preview(&mut self, title: impl Into<String>, body: impl ToString) {
        self.previews.push(Preview {
            title: title.into(),
            body: body.to_string(),
        });
    }

    /// Sample recorded under `label`
    pub fn sample(&self, label: &str) -> Option<&TimingSample> {
        self.samples.iter().find(|s| s.label == label)
    }
}

/// Line printed when a parallel result differs from the reference
pub const MISMATCH_LINE: &str = "Error - Matrixes are not equal";

/// Render `report` as text
#[must_use]
pub fn format_text(report: &RunReport, unit: TimeUnit) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}: {}\n", report.workload, report.shape));

    for preview in &report.previews {
        out.push_str(&format!("{}:\n{}", preview.title, preview.body));
        if !preview.body.ends_with('\n') {
            out.push('\n');
        }
    }

    for sample in &report.samples {
        if sample.workers == 0 {
            out.push_str(&format!(
                "{} took {}\n",
                sample.label,
                unit.format(sample.elapsed())
            ));
        } else {
            out.push_str(&format!(
                "{} ({} workers) took {}\n",
                sample.label,
                sample.workers,
                unit.format(sample.elapsed())
            ));
        }
    }

    match &report.verification {
        Verification::Skipped | Verification::Passed => {}
        Verification::Mismatch {
            strategy,
            row,
            col,
            expected,
            actual,
        } => {
            out.push_str(MISMATCH_LINE);
            out.push_str(&format!(
                " ({strategy}: ({row}, {col}) expected {expected}, got {actual})\n"
            ));
        }
        Verification::Aborted { strategy, reason } => {
            out.push_str(&format!("Error - {strategy} run aborted: {reason}\n"));
        }
    }

    out
}

/// Render `report` as pretty JSON
///
/// # Errors
///
/// Returns `InvalidInput` if serialization fails.
pub fn format_json(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report)
        .map_err(|err| ParconvError::InvalidInput(format!("cannot serialize report: {err}")))
}

/// Render `report` in `format`
///
/// # Errors
///
/// Same as [`format_json`].
pub fn render(report: &RunReport, format: OutputFormat, unit: TimeUnit) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_text(report, unit)),
        OutputFormat::Json => format_json(report),
    }
}
