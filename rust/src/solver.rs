//! Layered topological sort over a [`DependencyMatrix`].

use crate::interner::ActivityId;
use crate::matrix::DependencyMatrix;

/// Error types for dependency solving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// No activity could be placed in a pass but some remain unplaced.
    CyclicDependency {
        /// IDs left unplaced when the solver stalled, in matrix order.
        unresolved: Vec<String>,
    },
    /// The produced order does not cover the matrix exactly once.
    Inconsistent { expected: usize, actual: usize },
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverError::CyclicDependency { unresolved } => {
                write!(
                    f,
                    "Cyclic dependency found among activities: {}",
                    unresolved.join(", ")
                )
            }
            SolverError::Inconsistent { expected, actual } => {
                write!(
                    f,
                    "Dependency order has {actual} entries but the matrix has {expected} keys"
                )
            }
        }
    }
}

impl std::error::Error for SolverError {}

/// Order every key of `matrix` so that precedents come before their dependents.
///
/// Each pass collects the keys whose dependents are all placed already (the
/// current sinks) as one layer. Because the matrix stores precedent -> dependents
/// edges, the accumulated layers run from last to first and are reversed at the end.
///
/// Order within a layer follows matrix key order but is not part of the contract.
pub fn solve(matrix: &DependencyMatrix) -> Result<Vec<ActivityId>, SolverError> {
    let count = matrix.len();
    let mut placed = vec![false; count];
    let mut order: Vec<ActivityId> = Vec::with_capacity(count);

    while order.len() < count {
        let layer = find_leaves(matrix, &placed);

        if layer.is_empty() {
            let unresolved = (0..count)
                .filter(|&idx| !placed[idx])
                .filter_map(|idx| matrix.resolve(idx as ActivityId))
                .map(str::to_string)
                .collect();
            return Err(SolverError::CyclicDependency { unresolved });
        }

        for &id in &layer {
            placed[id as usize] = true;
        }
        order.extend(layer);
    }

    order.reverse();

    if order.len() != count {
        return Err(SolverError::Inconsistent {
            expected: count,
            actual: order.len(),
        });
    }

    Ok(order)
}

/// Same as [`solve`], resolved back to string IDs.
pub fn solve_ids(matrix: &DependencyMatrix) -> Result<Vec<String>, SolverError> {
    Ok(solve(matrix)?
        .into_iter()
        .filter_map(|id| matrix.resolve(id))
        .map(str::to_string)
        .collect())
}

/// Unplaced keys with no unplaced dependents.
fn find_leaves(matrix: &DependencyMatrix, placed: &[bool]) -> Vec<ActivityId> {
    (0..matrix.len() as ActivityId)
        .filter(|&id| !placed[id as usize])
        .filter(|&id| {
            matrix
                .dependents_at(id)
                .iter()
                .all(|&dependent| placed[dependent as usize])
        })
        .collect()
}
