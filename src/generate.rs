//! Random test data
//!
//! Values are drawn uniformly from `[0, limit)`. A seeded generator makes a
//! run reproducible; [`Generator::new`] seeds from OS entropy.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Matrix, ParconvError, Result, Vector};

/// Default exclusive upper bound for generated values
pub const NUMBER_LIMIT: i32 = 10;

/// Source of bounded random integers
#[derive(Debug, Clone)]
pub struct Generator {
    rng: StdRng,
}

impl Generator {
    /// Generator seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator
    ///
    /// ```
    /// use parconv::generate::Generator;
    ///
    /// let a = Generator::seeded(7).vector(16, 10).unwrap();
    /// let b = Generator::seeded(7).vector(16, 10).unwrap();
    /// assert_eq!(a, b);
    /// ```
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generator from an optional seed
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::seeded)
    }

    fn values(&mut self, len: usize, limit: i32) -> Result<Vec<i32>> {
        if limit <= 0 {
            return Err(ParconvError::InvalidInput(format!(
                "value limit must be positive (got {limit})"
            )));
        }
        Ok((0..len).map(|_| self.rng.gen_range(0..limit)).collect())
    }

    /// Vector of `len` values in `[0, limit)`
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `limit <= 0`.
    pub fn vector(&mut self, len: usize, limit: i32) -> Result<Vector> {
        Ok(Vector::from_vec(self.values(len, limit)?))
    }

    /// `rows x cols` matrix of values in `[0, limit)`
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `limit <= 0` or `rows * cols` overflows.
    pub fn matrix(&mut self, rows: usize, cols: usize, limit: i32) -> Result<Matrix> {
        let len = Matrix::cell_count(rows, cols)?;
        Matrix::from_vec(rows, cols, self.values(len, limit)?)
    }
}
