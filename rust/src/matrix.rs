//! Dependency matrix: precedent -> dependents adjacency.
//!
//! The matrix is the reversed view of the activities' precedence lists. Every
//! activity added becomes a key, and so does every precedent it names, even if
//! that precedent is never registered as an activity itself.

use rustc_hash::FxHashSet;

use crate::interner::{ActivityId, ActivityIdInterner};

/// Adjacency map from each known activity ID to the IDs that list it as a precedent.
///
/// Keys iterate in first-seen order. There is no removal.
#[derive(Debug, Clone, Default)]
pub struct DependencyMatrix {
    ids: ActivityIdInterner,
    dependents: Vec<FxHashSet<ActivityId>>,
}

impl DependencyMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `item` and record it as a dependent of each of `precedents`.
    ///
    /// Returns the interned ID of `item`.
    pub fn add<'p, I>(&mut self, item: &str, precedents: I) -> ActivityId
    where
        I: IntoIterator<Item = &'p str>,
    {
        let item_id = self.key(item);
        for precedent in precedents {
            let precedent_id = self.key(precedent);
            self.dependents[precedent_id as usize].insert(item_id);
        }
        item_id
    }

    /// Interns `id`, inserting an empty dependent set if it is new.
    fn key(&mut self, id: &str) -> ActivityId {
        let interned = self.ids.intern(id);
        if interned as usize == self.dependents.len() {
            self.dependents.push(FxHashSet::default());
        }
        interned
    }

    /// IDs of the activities that depend on `id`, or `None` if `id` is unknown.
    pub fn dependents_of(&self, id: &str) -> Option<impl Iterator<Item = &str> + '_> {
        let index = self.ids.get(id)?;
        Some(
            self.dependents[index as usize]
                .iter()
                .filter_map(|&dependent| self.ids.resolve(dependent)),
        )
    }

    /// Dependents of an interned key. Panics on an ID this matrix did not issue.
    #[inline]
    pub(crate) fn dependents_at(&self, id: ActivityId) -> &FxHashSet<ActivityId> {
        &self.dependents[id as usize]
    }

    #[inline]
    pub fn index_of(&self, id: &str) -> Option<ActivityId> {
        self.ids.get(id)
    }

    #[inline]
    pub fn resolve(&self, id: ActivityId) -> Option<&str> {
        self.ids.resolve(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.get(id).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.ids.iter()
    }

    pub fn len(&self) -> usize {
        self.dependents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependents.is_empty()
    }
}
