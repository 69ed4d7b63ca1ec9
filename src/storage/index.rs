//! Time-Ordered Expiration Index
//!
//! An ordered collection of `(deadline, key name)` pairs, one per key with a
//! nonzero ttl. The deadline is the key's absolute expiration instant,
//! `last_renewed + ttl`. The background sweeper walks the index from the
//! earliest deadline and stops at the first entry that is still in the
//! future, so a sweep touches only the keys that are actually due.
//!
//! A `BTreeSet` keyed by `(Instant, String)` gives logarithmic insert and
//! remove; the name tiebreaker keeps entries with equal deadlines distinct,
//! so removal always targets the right one.

use std::collections::BTreeSet;
use std::time::Instant;

/// Time-ordered index over the keys that can expire.
#[derive(Debug, Clone, Default)]
pub struct ExpiryIndex {
    entries: BTreeSet<(Instant, String)>,
}

impl ExpiryIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry for `name` expiring at `deadline`.
    pub fn insert(&mut self, deadline: Instant, name: String) {
        self.entries.insert((deadline, name));
    }

    /// Removes the entry for `name` at `deadline`, if present.
    pub fn remove(&mut self, deadline: Instant, name: &str) {
        // BTreeSet::remove borrows the full element; the allocation here is
        // on the removal path only.
        self.entries.remove(&(deadline, name.to_string()));
    }

    /// Collects every entry whose deadline is at or before `now`, earliest
    /// first. The walk stops at the first entry strictly later than `now`.
    pub fn due(&self, now: Instant) -> Vec<(Instant, String)> {
        self.entries
            .iter()
            .take_while(|(deadline, _)| *deadline <= now)
            .cloned()
            .collect()
    }

    /// Number of entries in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no key can expire.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the exact `(deadline, name)` entry is present.
    pub fn contains(&self, deadline: Instant, name: &str) -> bool {
        self.entries
            .iter()
            .any(|(d, n)| *d == deadline && n == name)
    }
}
