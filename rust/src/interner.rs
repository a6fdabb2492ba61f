//! String interning for activity identifiers.
//!
//! Maps string activity IDs to dense integer IDs so the dependency matrix and
//! per-calculation node tables can be plain vectors.
//!
//! IDs are handed out in first-seen order and never reused. That order is the
//! key order of [`DependencyMatrix`](crate::DependencyMatrix), and the solver
//! scans keys in that order, so activities placed in the same layer come out
//! in the order they were first mentioned. Schedules for the same input are
//! therefore laid out identically from run to run.

use rustc_hash::FxHashMap;

/// Interned activity ID (u32 for compact storage and fast hashing).
pub type ActivityId = u32;

/// String interner that maps activity ID strings to integers.
#[derive(Debug, Clone)]
pub struct ActivityIdInterner {
    by_name: FxHashMap<String, ActivityId>,
    names: Vec<String>,
}

impl ActivityIdInterner {
    /// Create a new interner with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            by_name: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            names: Vec::with_capacity(capacity),
        }
    }

    /// Intern a string, returning its integer ID.
    /// If already interned, returns the existing ID.
    pub fn intern(&mut self, s: &str) -> ActivityId {
        if let Some(&id) = self.by_name.get(s) {
            return id;
        }
        let id = self.names.len() as ActivityId;
        self.names.push(s.to_string());
        self.by_name.insert(s.to_string(), id);
        id
    }

    #[inline]
    pub fn get(&self, s: &str) -> Option<ActivityId> {
        self.by_name.get(s).copied()
    }

    #[inline]
    pub fn resolve(&self, id: ActivityId) -> Option<&str> {
        self.names.get(id as usize).map(|s| s.as_str())
    }

    /// All interned strings in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for ActivityIdInterner {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}
