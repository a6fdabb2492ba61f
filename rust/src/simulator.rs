//! Monte Carlo simulation of project completion time.

use std::collections::BTreeMap;

use rand::Rng;
use thiserror::Error;

use crate::config::SimulationConfig;
use crate::models::{ProjectSchedule, ProjectSimulatorResults};
use crate::network::{NetworkError, ProjectNetwork};
use crate::{log_debug, log_iterations, log_summary};

/// Errors that can occur during simulation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error("Iteration count must be positive (got {0})")]
    InvalidIterationCount(i64),
    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// Repeatedly recalculates a network with resampled durations.
pub struct ProjectSimulator<'a> {
    network: &'a ProjectNetwork,
    config: SimulationConfig,
}

impl<'a> ProjectSimulator<'a> {
    pub fn new(network: &'a ProjectNetwork) -> Self {
        Self::with_config(network, SimulationConfig::default())
    }

    pub fn with_config(network: &'a ProjectNetwork, config: SimulationConfig) -> Self {
        Self { network, config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run `iterations` independent schedule calculations.
    ///
    /// The generator comes from the config: seeded when `seed` is set.
    pub fn simulate(&self, iterations: i64) -> Result<ProjectSimulatorResults, SimulationError> {
        let mut rng = self.config.rng();
        self.simulate_with_rng(iterations, &mut rng)
    }

    /// Run `iterations` schedule calculations drawing from `rng`.
    ///
    /// `schedule_min` and `schedule_max` are running bounds that start at 0,
    /// so `schedule_min` stays at 0 whenever every finish time is positive.
    /// Use [`ProjectSimulatorResults::observed_min`] for the smallest finish seen.
    pub fn simulate_with_rng<R: Rng + ?Sized>(
        &self,
        iterations: i64,
        rng: &mut R,
    ) -> Result<ProjectSimulatorResults, SimulationError> {
        if iterations <= 0 {
            return Err(SimulationError::InvalidIterationCount(iterations));
        }

        let verbosity = self.config.verbosity;
        log_debug!(
            verbosity,
            "[simulate] order: {}",
            self.network.topological_order()?.join(" -> ")
        );

        let mut min: i64 = 0;
        let mut max: i64 = 0;
        let mut histogram: BTreeMap<i64, u64> = BTreeMap::new();

        for iteration in 0..iterations {
            let schedule = self.network.calculate_with_rng(rng)?;
            let finish = schedule.finish_time();

            log_iterations!(
                verbosity,
                "[simulate] iteration {}: finish={} critical={}",
                iteration,
                finish,
                schedule.critical_path().join("->")
            );
            log_schedule(verbosity, &schedule);

            min = min.min(finish);
            max = max.max(finish);
            *histogram.entry(finish).or_insert(0) += 1;
        }

        log_summary!(
            verbosity,
            "[simulate] {} iterations: min={} max={} outcomes={}",
            iterations,
            min,
            max,
            histogram.len()
        );

        Ok(ProjectSimulatorResults {
            schedule_min: min,
            schedule_max: max,
            histogram,
        })
    }
}

fn log_schedule(verbosity: u8, schedule: &ProjectSchedule<'_>) {
    for node in schedule.activity_nodes() {
        log_debug!(
            verbosity,
            "  {}: dur={} es={} ef={} ls={} lf={}",
            node.id(),
            node.duration(),
            node.earliest_start(),
            node.earliest_finish(),
            node.latest_start(),
            node.latest_finish()
        );
    }
}
