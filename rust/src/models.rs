//! Core data types for project networks and their schedules.

use pyo3::prelude::*;
use std::collections::BTreeMap;

use crate::calculations;
use crate::estimate::ThreePointEstimate;

/// A unit of project work with precedence constraints.
///
/// Immutable once built. Precedent IDs are kept unique in first-seen order.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Activity {
    #[pyo3(get)]
    id: String,
    #[pyo3(get)]
    description: String,
    #[pyo3(get)]
    duration: ThreePointEstimate,
    #[pyo3(get)]
    precedents: Vec<String>,
}

impl Activity {
    /// Create an activity with no precedents.
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        duration: impl Into<ThreePointEstimate>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            duration: duration.into(),
            precedents: Vec::new(),
        }
    }

    /// Replace the precedent set. Duplicate IDs are dropped.
    pub fn with_precedents<I, S>(mut self, precedents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.precedents.clear();
        for precedent in precedents {
            let precedent = precedent.into();
            if !self.precedents.contains(&precedent) {
                self.precedents.push(precedent);
            }
        }
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn duration(&self) -> &ThreePointEstimate {
        &self.duration
    }

    pub fn precedents(&self) -> &[String] {
        &self.precedents
    }
}

#[pymethods]
impl Activity {
    #[new]
    #[pyo3(signature = (id, description, duration, precedents=None))]
    fn py_new(
        id: String,
        description: String,
        duration: (i64, i64, i64),
        precedents: Option<Vec<String>>,
    ) -> Self {
        Self::new(id, description, duration).with_precedents(precedents.unwrap_or_default())
    }

    fn __repr__(&self) -> String {
        format!(
            "Activity(id={:?}, duration=({}, {}, {}), precedents={:?})",
            self.id,
            self.duration.min(),
            self.duration.mode(),
            self.duration.max(),
            self.precedents
        )
    }
}

/// Timing of one activity within a single schedule calculation.
#[derive(Clone, Debug)]
pub struct ActivityNode<'a> {
    activity: &'a Activity,
    pub(crate) duration: i64,
    pub(crate) earliest_start: i64,
    pub(crate) earliest_finish: i64,
    pub(crate) latest_start: i64,
    pub(crate) latest_finish: i64,
}

impl<'a> ActivityNode<'a> {
    /// Node after the forward pass; latest times are filled in by the backward pass.
    pub(crate) fn new(
        activity: &'a Activity,
        duration: i64,
        earliest_start: i64,
        earliest_finish: i64,
    ) -> Self {
        Self {
            activity,
            duration,
            earliest_start,
            earliest_finish,
            latest_start: 0,
            latest_finish: 0,
        }
    }

    pub fn activity(&self) -> &'a Activity {
        self.activity
    }

    pub fn id(&self) -> &'a str {
        &self.activity.id
    }

    /// Duration sampled for this calculation.
    pub fn duration(&self) -> i64 {
        self.duration
    }

    pub fn earliest_start(&self) -> i64 {
        self.earliest_start
    }

    pub fn earliest_finish(&self) -> i64 {
        self.earliest_finish
    }

    pub fn latest_start(&self) -> i64 {
        self.latest_start
    }

    pub fn latest_finish(&self) -> i64 {
        self.latest_finish
    }

    /// Total float: how far the start can slip without moving the finish.
    pub fn slack(&self) -> i64 {
        self.latest_start - self.earliest_start
    }

    pub fn is_critical(&self) -> bool {
        calculations::is_critical_path(self)
    }
}

/// Result of one schedule calculation over a project network.
#[derive(Clone, Debug)]
pub struct ProjectSchedule<'a> {
    activity_nodes: Vec<ActivityNode<'a>>,
    start_time: i64,
    finish_time: i64,
    critical_path: Vec<&'a str>,
}

impl<'a> ProjectSchedule<'a> {
    pub(crate) fn new(
        activity_nodes: Vec<ActivityNode<'a>>,
        start_time: i64,
        finish_time: i64,
        critical_path: Vec<&'a str>,
    ) -> Self {
        Self {
            activity_nodes,
            start_time,
            finish_time,
            critical_path,
        }
    }

    /// Nodes for every registered activity, in topological order.
    pub fn activity_nodes(&self) -> &[ActivityNode<'a>] {
        &self.activity_nodes
    }

    pub fn node(&self, id: &str) -> Option<&ActivityNode<'a>> {
        self.activity_nodes.iter().find(|node| node.id() == id)
    }

    pub fn start_time(&self) -> i64 {
        self.start_time
    }

    pub fn finish_time(&self) -> i64 {
        self.finish_time
    }

    /// IDs with zero float, in topological order.
    pub fn critical_path(&self) -> &[&'a str] {
        &self.critical_path
    }
}

/// Aggregate of many simulated schedules.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectSimulatorResults {
    /// Lowest finish time seen, with the running bound starting at 0.
    #[pyo3(get)]
    pub schedule_min: i64,
    /// Highest finish time seen, with the running bound starting at 0.
    #[pyo3(get)]
    pub schedule_max: i64,
    /// Finish time -> number of iterations that produced it.
    #[pyo3(get)]
    pub histogram: BTreeMap<i64, u64>,
}

impl ProjectSimulatorResults {
    /// Total number of recorded iterations.
    pub fn iterations(&self) -> u64 {
        self.histogram.values().sum()
    }

    /// Smallest finish time actually produced, unlike `schedule_min`.
    pub fn observed_min(&self) -> Option<i64> {
        self.histogram.keys().next().copied()
    }

    /// Largest finish time actually produced.
    pub fn observed_max(&self) -> Option<i64> {
        self.histogram.keys().next_back().copied()
    }
}

#[pymethods]
impl ProjectSimulatorResults {
    #[pyo3(name = "iterations")]
    fn py_iterations(&self) -> u64 {
        self.iterations()
    }

    #[pyo3(name = "observed_min")]
    fn py_observed_min(&self) -> Option<i64> {
        self.observed_min()
    }

    #[pyo3(name = "observed_max")]
    fn py_observed_max(&self) -> Option<i64> {
        self.observed_max()
    }

    fn __repr__(&self) -> String {
        format!(
            "ProjectSimulatorResults(schedule_min={}, schedule_max={}, outcomes={})",
            self.schedule_min,
            self.schedule_max,
            self.histogram.len()
        )
    }
}
