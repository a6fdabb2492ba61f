//! Three-point (PERT) duration estimates and their sampler.

use std::cell::OnceCell;

use pyo3::prelude::*;
use rand::Rng;
use rand_distr::{Beta, Distribution};
use thiserror::Error;

/// Weight of the most likely value in the PERT Beta fit.
const PERT_LAMBDA: f64 = 4.0;

/// Errors raised when an estimate cannot be sampled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EstimateError {
    #[error("Invalid three-point estimate ({min}, {mode}, {max}): expected min <= mode <= max")]
    InvalidShape { min: i64, mode: i64, max: i64 },
}

/// Optimistic / most likely / pessimistic duration estimate.
///
/// Sampling draws from a Beta distribution scaled onto `[min, max]` whose mode
/// is `mode`, then rounds to the nearest integer (ties to even). The fitted
/// distribution is built on the first draw and reused afterwards.
#[pyclass]
#[derive(Clone, Debug)]
pub struct ThreePointEstimate {
    #[pyo3(get)]
    min: i64,
    #[pyo3(get)]
    mode: i64,
    #[pyo3(get)]
    max: i64,
    distribution: OnceCell<Result<Beta<f64>, EstimateError>>,
}

impl ThreePointEstimate {
    /// Ordering of the three points is not checked here; see [`Self::sample`].
    pub fn new(min: i64, mode: i64, max: i64) -> Self {
        Self {
            min,
            mode,
            max,
            distribution: OnceCell::new(),
        }
    }

    /// Estimate with no spread: every sample is `value`.
    pub fn fixed(value: i64) -> Self {
        Self::new(value, value, value)
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn mode(&self) -> i64 {
        self.mode
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    /// PERT expected value, `(min + 4 * mode + max) / 6`.
    pub fn mean(&self) -> f64 {
        (self.min as f64 + PERT_LAMBDA * self.mode as f64 + self.max as f64) / (PERT_LAMBDA + 2.0)
    }

    /// Draw one integer duration.
    ///
    /// Returns `min` without touching the generator when `min == max`. Fails
    /// with [`EstimateError::InvalidShape`] when `min <= mode <= max` does not hold.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<i64, EstimateError> {
        if self.min == self.max {
            return Ok(self.min);
        }

        let beta = self
            .distribution
            .get_or_init(|| self.fit())
            .as_ref()
            .map_err(Clone::clone)?;

        let unit: f64 = beta.sample(rng);
        let value = self.min as f64 + unit * self.range();
        Ok(value.round_ties_even() as i64)
    }

    /// Width of the support, in floating point so extreme bounds cannot overflow.
    fn range(&self) -> f64 {
        self.max as f64 - self.min as f64
    }

    fn fit(&self) -> Result<Beta<f64>, EstimateError> {
        let invalid = || EstimateError::InvalidShape {
            min: self.min,
            mode: self.mode,
            max: self.max,
        };

        if !(self.min <= self.mode && self.mode <= self.max) {
            return Err(invalid());
        }

        let range = self.range();
        let alpha = 1.0 + PERT_LAMBDA * (self.mode as f64 - self.min as f64) / range;
        let beta = 1.0 + PERT_LAMBDA * (self.max as f64 - self.mode as f64) / range;

        Beta::new(alpha, beta).map_err(|_| invalid())
    }
}

impl PartialEq for ThreePointEstimate {
    fn eq(&self, other: &Self) -> bool {
        (self.min, self.mode, self.max) == (other.min, other.mode, other.max)
    }
}

impl Eq for ThreePointEstimate {}

impl From<(i64, i64, i64)> for ThreePointEstimate {
    fn from((min, mode, max): (i64, i64, i64)) -> Self {
        Self::new(min, mode, max)
    }
}

#[pymethods]
impl ThreePointEstimate {
    #[new]
    fn py_new(min: i64, mode: i64, max: i64) -> Self {
        Self::new(min, mode, max)
    }

    #[pyo3(name = "mean")]
    fn py_mean(&self) -> f64 {
        self.mean()
    }

    #[pyo3(name = "sample")]
    fn py_sample(&self) -> PyResult<i64> {
        self.sample(&mut rand::thread_rng())
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
    }

    fn __repr__(&self) -> String {
        format!(
            "ThreePointEstimate(min={}, mode={}, max={})",
            self.min, self.mode, self.max
        )
    }
}
