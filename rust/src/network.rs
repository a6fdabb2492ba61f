//! Project network: activities, their dependency matrix, and CPM calculation.

use std::cell::OnceCell;

use rand::Rng;
use thiserror::Error;

use crate::calculations;
use crate::estimate::EstimateError;
use crate::interner::ActivityId;
use crate::matrix::DependencyMatrix;
use crate::models::{Activity, ActivityNode, ProjectSchedule};
use crate::solver::{self, SolverError};

/// Errors that can occur while building or calculating a network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Activity with ID '{0}' already exists in the network")]
    DuplicateActivity(String),
    #[error("Activity '{id}' is a precedent of '{referenced_by}' but was never added to the network")]
    UnknownActivityReference { id: String, referenced_by: String },
    #[error("Activity '{id}' has an unusable duration estimate: {source}")]
    InvalidEstimate {
        id: String,
        #[source]
        source: EstimateError,
    },
    #[error(transparent)]
    Solver(#[from] SolverError),
}

#[derive(Debug)]
struct Entry {
    activity: Activity,
    /// Interned precedent IDs, parallel to `activity.precedents()`.
    precedents: Vec<ActivityId>,
}

/// A set of activities and the precedence graph between them.
///
/// The topological order of the graph is computed on the first calculation and
/// cached until the next [`add`](Self::add). The cache uses interior mutability,
/// so a network must not be shared across threads.
#[derive(Debug, Default)]
pub struct ProjectNetwork {
    /// Registered activities indexed by interned ID. `None` marks an ID that is
    /// only known as somebody's precedent.
    entries: Vec<Option<Entry>>,
    registered: usize,
    matrix: DependencyMatrix,
    order: OnceCell<Vec<ActivityId>>,
}

impl ProjectNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a network from `activities`, stopping at the first duplicate ID.
    pub fn with_activities<I>(activities: I) -> Result<Self, NetworkError>
    where
        I: IntoIterator<Item = Activity>,
    {
        let mut network = Self::new();
        network.add_range(activities)?;
        Ok(network)
    }

    /// Register an activity.
    ///
    /// Precedents do not need to exist yet; unresolved ones surface as
    /// [`NetworkError::UnknownActivityReference`] when the network is calculated.
    pub fn add(&mut self, activity: Activity) -> Result<(), NetworkError> {
        if self.contains(activity.id()) {
            return Err(NetworkError::DuplicateActivity(activity.id().to_string()));
        }

        let id = self.matrix.add(
            activity.id(),
            activity.precedents().iter().map(String::as_str),
        );
        let precedents = activity
            .precedents()
            .iter()
            .filter_map(|precedent| self.matrix.index_of(precedent))
            .collect();

        self.entries.resize_with(self.matrix.len(), || None);
        self.entries[id as usize] = Some(Entry {
            activity,
            precedents,
        });
        self.registered += 1;
        self.order.take();
        Ok(())
    }

    /// Add each activity in turn.
    ///
    /// Not atomic: on a duplicate, activities before it stay registered.
    pub fn add_range<I>(&mut self, activities: I) -> Result<(), NetworkError>
    where
        I: IntoIterator<Item = Activity>,
    {
        for activity in activities {
            self.add(activity)?;
        }
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Activity> {
        let idx = self.matrix.index_of(id)?;
        self.entries
            .get(idx as usize)?
            .as_ref()
            .map(|entry| &entry.activity)
    }

    /// Registered activities in the order they were first seen by the matrix.
    pub fn activities(&self) -> impl Iterator<Item = &Activity> + '_ {
        self.entries.iter().flatten().map(|entry| &entry.activity)
    }

    /// Number of registered activities (unresolved precedents excluded).
    pub fn len(&self) -> usize {
        self.registered
    }

    pub fn is_empty(&self) -> bool {
        self.registered == 0
    }

    pub fn matrix(&self) -> &DependencyMatrix {
        &self.matrix
    }

    /// Every known ID, precedents before dependents.
    pub fn topological_order(&self) -> Result<Vec<&str>, NetworkError> {
        Ok(self
            .ordered_ids()?
            .iter()
            .filter_map(|&idx| self.matrix.resolve(idx))
            .collect())
    }

    fn ordered_ids(&self) -> Result<&[ActivityId], SolverError> {
        if let Some(order) = self.order.get() {
            return Ok(order);
        }
        let order = solver::solve(&self.matrix)?;
        Ok(self.order.get_or_init(|| order))
    }

    /// Calculate one schedule with freshly sampled durations.
    pub fn calculate(&self) -> Result<ProjectSchedule<'_>, NetworkError> {
        self.calculate_with_rng(&mut rand::thread_rng())
    }

    /// Calculate one schedule, sampling every duration from `rng`.
    pub fn calculate_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<ProjectSchedule<'_>, NetworkError> {
        let order = self.ordered_ids()?;
        let mut nodes: Vec<Option<ActivityNode<'_>>> = vec![None; self.matrix.len()];

        // Forward pass. Topological order guarantees precedent nodes exist.
        for &idx in order {
            let entry = self.entry(idx)?;
            let activity = &entry.activity;

            let duration =
                activity
                    .duration()
                    .sample(rng)
                    .map_err(|source| NetworkError::InvalidEstimate {
                        id: activity.id().to_string(),
                        source,
                    })?;

            let precedents = entry
                .precedents
                .iter()
                .map(|&precedent| self.node_at(&nodes, precedent))
                .collect::<Result<Vec<_>, _>>()?;

            let earliest_start = calculations::earliest_start(precedents);
            let earliest_finish = calculations::earliest_finish(earliest_start, duration);

            nodes[idx as usize] = Some(ActivityNode::new(
                activity,
                duration,
                earliest_start,
                earliest_finish,
            ));
        }

        // Backward pass, dependents first.
        let mut finish: i64 = 0;
        let mut critical_path: Vec<&str> = Vec::new();

        for &idx in order.iter().rev() {
            let node = self.node_at(&nodes, idx)?;
            let dependents = self
                .matrix
                .dependents_at(idx)
                .iter()
                .map(|&dependent| self.node_at(&nodes, dependent))
                .collect::<Result<Vec<_>, _>>()?;

            let latest_finish = calculations::latest_finish(node, dependents);
            let latest_start = calculations::latest_start(latest_finish, node.duration());

            if let Some(node) = nodes[idx as usize].as_mut() {
                node.latest_finish = latest_finish;
                node.latest_start = latest_start;

                finish = finish.max(latest_finish);

                if calculations::is_critical_path(node) {
                    critical_path.push(node.id());
                }
            }
        }

        // Collected while walking backwards.
        critical_path.reverse();

        let activity_nodes = order
            .iter()
            .filter_map(|&idx| nodes[idx as usize].take())
            .collect();

        Ok(ProjectSchedule::new(activity_nodes, 0, finish, critical_path))
    }

    fn entry(&self, idx: ActivityId) -> Result<&Entry, NetworkError> {
        self.entries
            .get(idx as usize)
            .and_then(Option::as_ref)
            .ok_or_else(|| self.unknown_reference(idx))
    }

    fn node_at<'n, 's>(
        &self,
        nodes: &'n [Option<ActivityNode<'s>>],
        idx: ActivityId,
    ) -> Result<&'n ActivityNode<'s>, NetworkError> {
        nodes
            .get(idx as usize)
            .and_then(Option::as_ref)
            .ok_or_else(|| self.unknown_reference(idx))
    }

    fn unknown_reference(&self, idx: ActivityId) -> NetworkError {
        let id = self.matrix.resolve(idx).unwrap_or_default().to_string();
        // Any ID in the matrix without an entry was added as someone's precedent
        let referenced_by = self
            .matrix
            .dependents_at(idx)
            .iter()
            .filter_map(|&dependent| self.matrix.resolve(dependent))
            .min()
            .unwrap_or_default()
            .to_string();
        NetworkError::UnknownActivityReference { id, referenced_by }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::ThreePointEstimate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn make_activity(id: &str, estimate: (i64, i64, i64), precedents: &[&str]) -> Activity {
        Activity::new(id, id, ThreePointEstimate::new(estimate.0, estimate.1, estimate.2))
            .with_precedents(precedents.iter().copied())
    }

    fn fixed(id: &str, duration: i64, precedents: &[&str]) -> Activity {
        make_activity(id, (duration, duration, duration), precedents)
    }

    /// Six-activity network with real spread on every estimate.
    fn sample_network() -> ProjectNetwork {
        ProjectNetwork::with_activities([
            make_activity("A", (17, 29, 47), &[]),
            make_activity("B", (6, 12, 24), &["A"]),
            make_activity("C", (16, 19, 28), &["A"]),
            make_activity("D", (13, 16, 19), &["B"]),
            make_activity("E", (2, 5, 14), &["C"]),
            make_activity("F", (2, 5, 8), &["D", "E"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_two_activity_chain() {
        let network =
            ProjectNetwork::with_activities([fixed("A", 10, &[]), fixed("B", 5, &["A"])]).unwrap();
        let schedule = network.calculate().unwrap();

        let a = schedule.node("A").unwrap();
        let b = schedule.node("B").unwrap();
        assert_eq!((a.earliest_start(), a.earliest_finish()), (0, 10));
        assert_eq!((b.earliest_start(), b.earliest_finish()), (10, 15));
        assert_eq!(schedule.start_time(), 0);
        assert_eq!(schedule.finish_time(), 15);
        assert_eq!(schedule.critical_path(), &["A", "B"]);
    }

    #[test]
    fn test_diamond_float() {
        let network = ProjectNetwork::with_activities([
            fixed("a", 2, &[]),
            fixed("b", 3, &["a"]),
            fixed("c", 1, &["a"]),
            fixed("d", 2, &["b", "c"]),
        ])
        .unwrap();
        let schedule = network.calculate().unwrap();

        let c = schedule.node("c").unwrap();
        assert_eq!((c.earliest_start(), c.earliest_finish()), (2, 3));
        assert_eq!((c.latest_start(), c.latest_finish()), (4, 5));
        assert_eq!(c.slack(), 2);

        let a = schedule.node("a").unwrap();
        assert_eq!((a.latest_start(), a.latest_finish()), (0, 2));

        assert_eq!(schedule.finish_time(), 7);
        assert_eq!(schedule.critical_path(), &["a", "b", "d"]);
    }

    #[test]
    fn test_every_terminal_activity_is_critical() {
        // c ends early but has no dependents, so it is measured against itself
        let network = ProjectNetwork::with_activities([
            fixed("a", 4, &[]),
            fixed("b", 6, &["a"]),
            fixed("c", 1, &["a"]),
        ])
        .unwrap();
        let schedule = network.calculate().unwrap();

        let c = schedule.node("c").unwrap();
        assert_eq!(c.latest_finish(), c.earliest_finish());
        assert_eq!(schedule.finish_time(), 10);

        let mut path = schedule.critical_path().to_vec();
        assert_eq!(path[0], "a");
        path.sort();
        assert_eq!(path, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_schedule_invariants_hold_across_samples() {
        let network = sample_network();
        let order = network.topological_order().unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let schedule = network.calculate_with_rng(&mut rng).unwrap();
            assert_eq!(schedule.activity_nodes().len(), network.len());
            assert!(!schedule.critical_path().is_empty());

            for node in schedule.activity_nodes() {
                assert!(node.earliest_start() >= 0);
                assert!(node.earliest_finish() >= node.earliest_start());
                assert!(node.latest_start() >= node.earliest_start());
                if node.activity().precedents().is_empty() {
                    assert_eq!(node.earliest_start(), 0);
                }
                let is_terminal = network
                    .matrix()
                    .dependents_of(node.id())
                    .unwrap()
                    .next()
                    .is_none();
                if is_terminal {
                    assert_eq!(node.latest_finish(), node.earliest_finish());
                }
            }

            for id in schedule.critical_path() {
                let node = schedule.node(id).unwrap();
                assert_eq!(node.latest_finish(), node.earliest_finish());
            }

            // Critical path comes back in topological order
            let positions: Vec<usize> = schedule
                .critical_path()
                .iter()
                .map(|id| order.iter().position(|x| x == id).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]));

            let f = schedule.node("F").unwrap();
            assert_eq!(schedule.finish_time(), f.earliest_finish());
            assert!((38..=98).contains(&schedule.finish_time()));
        }
    }

    #[test]
    fn test_topological_order_puts_precedents_first() {
        let network = sample_network();
        let order = network.topological_order().unwrap();
        assert_eq!(order.len(), 6);

        for activity in network.activities() {
            let own = order.iter().position(|&x| x == activity.id()).unwrap();
            for precedent in activity.precedents() {
                let pre = order.iter().position(|x| x == precedent).unwrap();
                assert!(pre < own, "{precedent} should precede {}", activity.id());
            }
        }
    }

    #[test]
    fn test_order_is_cached_until_next_add() {
        let mut network = ProjectNetwork::new();
        network.add(fixed("a", 1, &[])).unwrap();
        assert!(network.order.get().is_none());

        network.calculate().unwrap();
        assert_eq!(network.order.get().map(Vec::len), Some(1));

        network.add(fixed("b", 1, &["a"])).unwrap();
        assert!(network.order.get().is_none());

        let schedule = network.calculate().unwrap();
        assert_eq!(schedule.finish_time(), 2);
        assert_eq!(network.order.get().map(Vec::len), Some(2));
    }

    #[test]
    fn test_duplicate_activity_is_rejected() {
        let mut network = ProjectNetwork::new();
        network.add(fixed("A", 1, &[])).unwrap();

        let err = network.add(fixed("A", 2, &[])).unwrap_err();
        assert_eq!(err, NetworkError::DuplicateActivity("A".to_string()));
        assert_eq!(network.len(), 1);
        assert_eq!(network.get("A").unwrap().duration().min(), 1);
    }

    #[test]
    fn test_add_range_is_not_atomic() {
        let mut network = ProjectNetwork::new();
        let err = network
            .add_range([fixed("a", 1, &[]), fixed("b", 1, &["a"]), fixed("a", 3, &[])])
            .unwrap_err();

        assert_eq!(err, NetworkError::DuplicateActivity("a".to_string()));
        assert_eq!(network.len(), 2);
        assert!(network.contains("a"));
        assert!(network.contains("b"));
    }

    #[test]
    fn test_precedent_can_be_added_after_dependent() {
        let mut network = ProjectNetwork::new();
        network.add(fixed("b", 5, &["a"])).unwrap();
        assert!(!network.contains("a"));

        network.add(fixed("a", 10, &[])).unwrap();
        let schedule = network.calculate().unwrap();

        assert_eq!(schedule.node("b").unwrap().earliest_start(), 10);
        assert_eq!(schedule.critical_path(), &["a", "b"]);
    }

    #[test]
    fn test_cycle_fails_calculation() {
        let network = ProjectNetwork::with_activities([
            fixed("A", 1, &["C"]),
            fixed("B", 1, &["A"]),
            fixed("C", 1, &["B"]),
        ])
        .unwrap();

        match network.calculate() {
            Err(NetworkError::Solver(SolverError::CyclicDependency { unresolved })) => {
                assert_eq!(unresolved.len(), 3);
            }
            other => panic!("expected cyclic dependency, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_precedent_fails_calculation() {
        let network =
            ProjectNetwork::with_activities([fixed("a", 1, &[]), fixed("b", 1, &["a", "ghost"])])
                .unwrap();

        assert_eq!(network.len(), 2);
        assert_eq!(
            network.calculate().unwrap_err(),
            NetworkError::UnknownActivityReference {
                id: "ghost".to_string(),
                referenced_by: "b".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_estimate_fails_calculation() {
        let network = ProjectNetwork::with_activities([make_activity("a", (5, 1, 9), &[])]).unwrap();

        match network.calculate() {
            Err(NetworkError::InvalidEstimate { id, .. }) => assert_eq!(id, "a"),
            other => panic!("expected invalid estimate, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_network() {
        let network = ProjectNetwork::new();
        let schedule = network.calculate().unwrap();

        assert!(network.is_empty());
        assert!(schedule.activity_nodes().is_empty());
        assert!(schedule.critical_path().is_empty());
        assert_eq!(schedule.finish_time(), 0);
    }
}
