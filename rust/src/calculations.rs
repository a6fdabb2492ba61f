//! Critical path method arithmetic.
//!
//! Pure helpers used by the forward and backward passes of
//! [`ProjectNetwork::calculate`](crate::ProjectNetwork::calculate).

use crate::models::ActivityNode;

/// Earliest start: the latest earliest finish among precedents, or 0 with none.
pub fn earliest_start<'n, 'a: 'n, I>(precedents: I) -> i64
where
    I: IntoIterator<Item = &'n ActivityNode<'a>>,
{
    precedents
        .into_iter()
        .map(|node| node.earliest_finish)
        .fold(0, i64::max)
}

/// Saturates at the `i64` bounds.
pub fn earliest_finish(earliest_start: i64, duration: i64) -> i64 {
    earliest_start.saturating_add(duration)
}

pub fn latest_start(latest_finish: i64, duration: i64) -> i64 {
    latest_finish.saturating_sub(duration)
}

/// Latest finish: the earliest latest start among dependents.
///
/// A node with no dependents finishes at its own earliest finish.
pub fn latest_finish<'n, 'a: 'n, I>(node: &ActivityNode<'_>, dependents: I) -> i64
where
    I: IntoIterator<Item = &'n ActivityNode<'a>>,
{
    dependents
        .into_iter()
        .map(|dependent| dependent.latest_start)
        .min()
        .unwrap_or(node.earliest_finish)
}

/// Zero float between latest and earliest finish.
pub fn is_critical_path(node: &ActivityNode<'_>) -> bool {
    node.latest_finish - node.earliest_finish == 0
}
