//! Configuration types for the project simulator.

use pyo3::prelude::*;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::logging::VERBOSITY_SILENT;

/// Configuration for Monte Carlo schedule simulation.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Random seed for reproducible runs (None = thread-local generator)
    #[pyo3(get, set)]
    pub seed: Option<u64>,
    /// Verbosity level: 0=silent, 1=summary, 2=iterations, 3=debug.
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            verbosity: VERBOSITY_SILENT,
        }
    }
}

impl SimulationConfig {
    /// Set seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Generator for one simulation run.
    pub(crate) fn rng(&self) -> Box<dyn RngCore> {
        match self.seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(rand::thread_rng()),
        }
    }
}

#[pymethods]
impl SimulationConfig {
    #[new]
    #[pyo3(signature = (seed=None, verbosity=None))]
    fn new(seed: Option<u64>, verbosity: Option<u8>) -> Self {
        let defaults = Self::default();
        Self {
            seed,
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "SimulationConfig(seed={:?}, verbosity={})",
            self.seed, self.verbosity
        )
    }
}
