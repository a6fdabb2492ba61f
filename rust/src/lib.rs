//! Rust implementation of the Planner project scheduling engine.
//!
//! Builds a dependency network of activities with three-point duration
//! estimates, computes critical path schedules over it, and runs Monte Carlo
//! simulations of the project finish time.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

pub mod calculations;
mod config;
mod estimate;
pub mod interner;
pub mod logging;
mod matrix;
mod models;
mod network;
mod simulator;
pub mod solver;

pub use config::SimulationConfig;
pub use estimate::{EstimateError, ThreePointEstimate};
pub use interner::{ActivityId, ActivityIdInterner};
pub use matrix::DependencyMatrix;
pub use models::{Activity, ActivityNode, ProjectSchedule, ProjectSimulatorResults};
pub use network::{NetworkError, ProjectNetwork};
pub use simulator::{ProjectSimulator, SimulationError};
pub use solver::{solve, solve_ids, SolverError};

/// Timing of one activity in a calculated schedule (PyO3 wrapper).
#[pyclass(name = "ActivityNode")]
#[derive(Clone, Debug)]
pub struct PyActivityNode {
    #[pyo3(get)]
    pub id: String,
    #[pyo3(get)]
    pub description: String,
    #[pyo3(get)]
    pub duration: i64,
    #[pyo3(get)]
    pub earliest_start: i64,
    #[pyo3(get)]
    pub earliest_finish: i64,
    #[pyo3(get)]
    pub latest_start: i64,
    #[pyo3(get)]
    pub latest_finish: i64,
}

impl From<&ActivityNode<'_>> for PyActivityNode {
    fn from(node: &ActivityNode<'_>) -> Self {
        Self {
            id: node.id().to_string(),
            description: node.activity().description().to_string(),
            duration: node.duration(),
            earliest_start: node.earliest_start(),
            earliest_finish: node.earliest_finish(),
            latest_start: node.latest_start(),
            latest_finish: node.latest_finish(),
        }
    }
}

#[pymethods]
impl PyActivityNode {
    fn slack(&self) -> i64 {
        self.latest_start - self.earliest_start
    }

    fn is_critical(&self) -> bool {
        self.latest_finish == self.earliest_finish
    }

    fn __repr__(&self) -> String {
        format!(
            "ActivityNode(id={:?}, duration={}, es={}, ef={}, ls={}, lf={})",
            self.id,
            self.duration,
            self.earliest_start,
            self.earliest_finish,
            self.latest_start,
            self.latest_finish
        )
    }
}

/// A calculated schedule detached from its network (PyO3 wrapper).
#[pyclass(name = "ProjectSchedule")]
#[derive(Clone, Debug)]
pub struct PyProjectSchedule {
    #[pyo3(get)]
    pub activity_nodes: Vec<PyActivityNode>,
    #[pyo3(get)]
    pub start_time: i64,
    #[pyo3(get)]
    pub finish_time: i64,
    #[pyo3(get)]
    pub critical_path: Vec<String>,
}

impl From<&ProjectSchedule<'_>> for PyProjectSchedule {
    fn from(schedule: &ProjectSchedule<'_>) -> Self {
        Self {
            activity_nodes: schedule
                .activity_nodes()
                .iter()
                .map(PyActivityNode::from)
                .collect(),
            start_time: schedule.start_time(),
            finish_time: schedule.finish_time(),
            critical_path: schedule
                .critical_path()
                .iter()
                .map(|id| id.to_string())
                .collect(),
        }
    }
}

#[pymethods]
impl PyProjectSchedule {
    fn node(&self, id: &str) -> Option<PyActivityNode> {
        self.activity_nodes.iter().find(|node| node.id == id).cloned()
    }

    fn __repr__(&self) -> String {
        format!(
            "ProjectSchedule(activities={}, finish_time={}, critical_path={:?})",
            self.activity_nodes.len(),
            self.finish_time,
            self.critical_path
        )
    }
}

/// Compute one critical path schedule for a list of activities.
///
/// # Arguments
/// * `activities` - Activities to schedule; precedents may reference any activity in the list
/// * `seed` - Optional seed for the duration draws
///
/// # Raises
/// * ValueError on duplicate ids, unknown or cyclic references, or invalid estimates
#[pyfunction]
#[pyo3(signature = (activities, seed=None))]
fn calculate_schedule(activities: Vec<Activity>, seed: Option<u64>) -> PyResult<PyProjectSchedule> {
    let network = ProjectNetwork::with_activities(activities)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    let config = SimulationConfig {
        seed,
        ..SimulationConfig::default()
    };
    let mut rng = config.rng();

    match network.calculate_with_rng(&mut rng) {
        Ok(schedule) => Ok(PyProjectSchedule::from(&schedule)),
        Err(e) => Err(PyValueError::new_err(e.to_string())),
    }
}

/// Run a Monte Carlo simulation of the project finish time.
///
/// # Raises
/// * ValueError if `iterations <= 0` or the network cannot be scheduled
#[pyfunction]
#[pyo3(signature = (activities, iterations, config=None))]
fn simulate_project(
    activities: Vec<Activity>,
    iterations: i64,
    config: Option<SimulationConfig>,
) -> PyResult<ProjectSimulatorResults> {
    let network = ProjectNetwork::with_activities(activities)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    let simulator = ProjectSimulator::with_config(&network, config.unwrap_or_default());

    match simulator.simulate(iterations) {
        Ok(results) => Ok(results),
        Err(e) => Err(PyValueError::new_err(e.to_string())),
    }
}

/// The planner.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<ThreePointEstimate>()?;
    m.add_class::<Activity>()?;
    m.add_class::<PyActivityNode>()?;
    m.add_class::<PyProjectSchedule>()?;
    m.add_class::<ProjectSimulatorResults>()?;

    // Config types
    m.add_class::<SimulationConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(calculate_schedule, m)?)?;
    m.add_function(wrap_pyfunction!(simulate_project, m)?)?;

    Ok(())
}
