//! Wall-clock measurement of executor runs

use std::fmt;
use std::time::{Duration, Instant};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A value together with the time it took to produce
#[derive(Debug, Clone, PartialEq)]
pub struct Timed<T> {
    /// What the measured closure returned
    pub value: T,
    /// Wall-clock time spent in the closure
    pub elapsed: Duration,
}

impl<T, E> Timed<Result<T, E>> {
    /// Move the error out of a timed fallible run
    pub fn transpose(self) -> Result<Timed<T>, E> {
        let elapsed = self.elapsed;
        self.value.map(|value| Timed { value, elapsed })
    }
}

/// Run `f` and measure how long it takes
///
/// # Example
///
/// ```
/// use parconv::timing::timed;
///
/// let run = timed(|| (1..=10).sum::<i32>());
/// assert_eq!(run.value, 55);
/// ```
pub fn timed<T>(f: impl FnOnce() -> T) -> Timed<T> {
    let start = Instant::now();
    let value = f();
    Timed {
        value,
        elapsed: start.elapsed(),
    }
}

/// Unit used when printing durations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum TimeUnit {
    /// Integer nanoseconds
    #[serde(rename = "ns")]
    #[value(name = "ns")]
    Nanos,
    /// Fractional milliseconds
    #[default]
    #[serde(rename = "ms")]
    #[value(name = "ms")]
    Millis,
}

impl TimeUnit {
    /// Duration expressed in this unit
    pub fn value(self, elapsed: Duration) -> f64 {
        match self {
            TimeUnit::Nanos => elapsed.as_nanos() as f64,
            TimeUnit::Millis => elapsed.as_nanos() as f64 / 1e6,
        }
    }

    /// Human-readable rendering such as `1.250000 ms` or `1250000 ns`
    pub fn format(self, elapsed: Duration) -> String {
        match self {
            TimeUnit::Nanos => format!("{} ns", elapsed.as_nanos()),
            TimeUnit::Millis => format!("{:.6} ms", self.value(elapsed)),
        }
    }

    /// Short suffix
    pub fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Nanos => "ns",
            TimeUnit::Millis => "ms",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}
