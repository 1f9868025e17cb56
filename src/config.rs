//! Run configuration
//!
//! The input file holds whitespace-separated integers:
//!
//! ```text
//! rows cols
//! kernel_rows kernel_cols
//! [rows*cols matrix values]
//! [kernel_rows*kernel_cols kernel values]
//! ```
//!
//! The four dimensions are required and the kernel extents must be odd. The
//! values are optional; when present they replace randomly generated data, and
//! both blocks must be complete.
//! The worker count comes from the command line, never from the file.
//!
//! # Example
//!
//! ```
//! use parconv::config::InputFile;
//!
//! let input = InputFile::parse("4 5\n3 3\n").unwrap();
//! assert_eq!(input.dims.rows, 4);
//! assert_eq!(input.dims.kernel_cols, 3);
//! assert!(input.data.is_none());
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::convolution::validate_kernel_shape;
use crate::executor::Strategy;
use crate::timing::TimeUnit;
use crate::{Matrix, ParconvError, Result};

/// Input file used when none is given on the command line
pub const DEFAULT_INPUT: &str = "input.txt";

/// Matrix and kernel shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    /// Matrix rows
    pub rows: usize,
    /// Matrix columns
    pub cols: usize,
    /// Kernel rows
    pub kernel_rows: usize,
    /// Kernel columns
    pub kernel_cols: usize,
}

/// Matrix and kernel values read from the input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputData {
    /// Input matrix
    pub matrix: Matrix,
    /// Convolution kernel
    pub kernel: Matrix,
}

/// Parsed input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// Required dimensions
    pub dims: Dimensions,
    /// Optional explicit data
    pub data: Option<InputData>,
}

struct Tokens<'a> {
    inner: Box<dyn Iterator<Item = (usize, &'a str)> + 'a>,
    /// Line of the most recently consumed token
    line: usize,
    last_line: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        let inner = text
            .lines()
            .enumerate()
            .flat_map(|(idx, line)| line.split_whitespace().map(move |tok| (idx + 1, tok)));
        Self {
            inner: Box::new(inner),
            line: 1,
            last_line: text.lines().count(),
        }
    }

    fn next_value<T: FromStr>(&mut self, what: &str) -> Result<Option<T>> {
        match self.inner.next() {
            None => Ok(None),
            Some((line, tok)) => {
                self.line = line;
                tok.parse().map(Some).map_err(|_| {
                    ParconvError::parse(line, format!("expected {what}, found `{tok}`"))
                })
            }
        }
    }

    fn require<T: FromStr>(&mut self, what: &str) -> Result<T> {
        self.next_value(what)?.ok_or_else(|| {
            ParconvError::parse(self.last_line.max(1), format!("missing {what}"))
        })
    }
}

impl InputFile {
    /// Read and parse `path`
    ///
    /// # Errors
    ///
    /// `Config` if the file cannot be read, `Parse` if its contents are malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|err| ParconvError::config(path, err.to_string()))?;
        let input = Self::parse(&text)?;
        debug!(path = %path.display(), dims = ?input.dims, explicit_data = input.data.is_some(), "loaded input file");
        Ok(input)
    }

    /// Parse input file contents
    ///
    /// # Errors
    ///
    /// `Parse` for a missing or non-numeric dimension, a matrix too large to
    /// address, an even or zero kernel extent, a non-numeric value, or a value
    /// block whose length does not match the dimensions.
    pub fn parse(text: &str) -> Result<Self> {
        let mut tokens = Tokens::new(text);

        let rows = tokens.require("matrix row count")?;
        let cols = tokens.require("matrix column count")?;
        let matrix_len = Matrix::cell_count(rows, cols).map_err(|_| {
            ParconvError::parse(tokens.line, format!("matrix {rows}x{cols} is too large"))
        })?;

        let kernel_rows = tokens.require("kernel row count")?;
        let kernel_cols = tokens.require("kernel column count")?;
        validate_kernel_shape(kernel_rows, kernel_cols).map_err(|_| {
            ParconvError::parse(
                tokens.line,
                format!("kernel extents must be odd and non-zero (got {kernel_rows}x{kernel_cols})"),
            )
        })?;
        let value_count = Matrix::cell_count(kernel_rows, kernel_cols)
            .ok()
            .and_then(|kernel_len| matrix_len.checked_add(kernel_len))
            .ok_or_else(|| {
                ParconvError::parse(
                    tokens.line,
                    format!("kernel {kernel_rows}x{kernel_cols} is too large"),
                )
            })?;

        let dims = Dimensions {
            rows,
            cols,
            kernel_rows,
            kernel_cols,
        };

        let mut values = Vec::new();
        while let Some(value) = tokens.next_value::<i32>("integer value")? {
            values.push(value);
        }

        let data = if values.is_empty() {
            None
        } else {
            if values.len() != value_count {
                return Err(ParconvError::parse(
                    tokens.last_line,
                    format!(
                        "expected {value_count} matrix and kernel values, found {}",
                        values.len()
                    ),
                ));
            }
            let kernel_values = values.split_off(matrix_len);
            Some(InputData {
                matrix: Matrix::from_vec(dims.rows, dims.cols, values)?,
                kernel: Matrix::from_vec(dims.kernel_rows, dims.kernel_cols, kernel_values)?,
            })
        };

        Ok(Self { dims, data })
    }
}

/// Everything a convolution run needs, fixed before any work starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Where the dimensions came from
    pub input_path: PathBuf,
    /// Matrix and kernel shapes
    pub dims: Dimensions,
    /// Explicit data from the input file, if any
    pub data: Option<InputData>,
    /// 0 runs the sequential pass only
    pub workers: usize,
    /// How work is divided when `workers >= 1`
    pub strategy: Strategy,
    /// Seed for generated data
    pub seed: Option<u64>,
    /// Unit for timing lines
    pub unit: TimeUnit,
}

impl RunConfig {
    /// Load the input file and combine it with command-line settings
    ///
    /// # Errors
    ///
    /// Same as [`InputFile::load`].
    pub fn load(
        input_path: impl Into<PathBuf>,
        workers: usize,
        strategy: Strategy,
        seed: Option<u64>,
        unit: TimeUnit,
    ) -> Result<Self> {
        let input_path = input_path.into();
        let input = InputFile::load(&input_path)?;
        Ok(Self {
            input_path,
            dims: input.dims,
            data: input.data,
            workers,
            strategy,
            seed,
            unit,
        })
    }

    /// True when no parallel strategy should run
    pub fn is_sequential_only(&self) -> bool {
        self.workers == 0
    }
}

/// Settings for the vector-addition demo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorRunConfig {
    /// Vector length
    pub len: usize,
    /// Workers for the contiguous strategy
    pub workers: usize,
    /// Seed for generated data
    pub seed: Option<u64>,
    /// Unit for timing lines
    pub unit: TimeUnit,
}

impl Default for VectorRunConfig {
    fn default() -> Self {
        Self {
            len: 10,
            workers: 4,
            seed: None,
            unit: TimeUnit::Nanos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_dimensions_only() {
        let input = InputFile::parse("10 10 3 3").unwrap();
        assert_eq!(
            input.dims,
            Dimensions {
                rows: 10,
                cols: 10,
                kernel_rows: 3,
                kernel_cols: 3
            }
        );
        assert_eq!(input.data, None);
    }

    #[test]
    fn test_parse_with_data() {
        let text = "2 2\n1 1\n1 2\n3 4\n5\n";
        let input = InputFile::parse(text).unwrap();
        let data = input.data.unwrap();
        assert_eq!(data.matrix.as_slice(), &[1, 2, 3, 4]);
        assert_eq!(data.kernel.as_slice(), &[5]);
    }

    #[test]
    fn test_parse_missing_dimension() {
        let err = InputFile::parse("4 4\n3\n").unwrap_err();
        assert_eq!(err, ParconvError::parse(2, "missing kernel column count"));
    }

    #[test]
    fn test_parse_empty_file() {
        let err = InputFile::parse("").unwrap_err();
        assert_eq!(err, ParconvError::parse(1, "missing matrix row count"));
    }

    #[test]
    fn test_parse_bad_token_reports_line() {
        let err = InputFile::parse("4 4\nthree 3\n").unwrap_err();
        assert_eq!(
            err,
            ParconvError::parse(2, "expected kernel row count, found `three`")
        );
    }

    #[test]
    fn test_parse_negative_dimension() {
        assert!(matches!(
            InputFile::parse("-1 4 3 3"),
            Err(ParconvError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_parse_overflowing_dimensions() {
        let err = InputFile::parse("18446744073709551615 2 1 1 5").unwrap_err();
        assert!(matches!(err, ParconvError::Parse { line: 1, .. }));

        let err = InputFile::parse("1 1\n4294967297 4294967297\n").unwrap_err();
        assert!(matches!(err, ParconvError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_parse_even_kernel() {
        let err = InputFile::parse("100000 100000\n4 4\n").unwrap_err();
        assert_eq!(
            err,
            ParconvError::parse(2, "kernel extents must be odd and non-zero (got 4x4)")
        );
        assert!(InputFile::parse("4 4 0 3").is_err());
    }

    #[test]
    fn test_parse_incomplete_data() {
        let err = InputFile::parse("2 2 1 1\n1 2 3\n").unwrap_err();
        assert!(err.to_string().contains("expected 5 matrix and kernel values, found 3"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = InputFile::load("/definitely/not/here/input.txt").unwrap_err();
        assert!(matches!(err, ParconvError::Config { .. }));
    }

    #[test]
    fn test_run_config_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "6 8\n3 5").unwrap();

        let config =
            RunConfig::load(file.path(), 0, Strategy::Rows, Some(1), TimeUnit::Millis).unwrap();
        assert_eq!(config.dims.cols, 8);
        assert_eq!(config.dims.kernel_cols, 5);
        assert!(config.is_sequential_only());
        assert_eq!(config.input_path, file.path());
    }

    #[test]
    fn test_vector_config_default() {
        let config = VectorRunConfig::default();
        assert_eq!(config.workers, 4);
        assert_eq!(config.unit, TimeUnit::Nanos);
    }
}
