//! Adjacency Maintainer
//!
//! Directed graph of "reliably reachable" transitions derived from the
//! best-action probabilities. An edge is admitted when the probability of a
//! pair rises above the threshold τ and dropped when it falls to τ or below,
//! so a single noisy observation never toggles an edge back and forth.

use gap_common::{Result, StateId};
use tracing::debug;

use crate::infra::arena::SquareTable;

/// Outcome of applying the hysteresis rule to one pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeChange {
    Admitted,
    Removed,
    Unchanged,
}

/// Adjacency lists with O(1) membership checks
#[derive(Debug, Clone)]
pub struct Adjacency {
    threshold: f64,
    /// Neighbours in admission order
    lists: Vec<Vec<StateId>>,
    flags: SquareTable<bool>,
    edges: usize,
}

impl Adjacency {
    pub fn new(capacity: usize, threshold: f64) -> Result<Self> {
        Ok(Self {
            threshold,
            lists: Vec::new(),
            flags: SquareTable::new(capacity, 1, false)?,
            edges: 0,
        })
    }

    /// Make room for `states` states
    pub fn reserve_states(&mut self, states: usize) -> Result<()> {
        if self.flags.ensure(states)? {
            debug!(capacity = self.flags.capacity(), "Grew adjacency map");
        }
        if states > self.lists.len() {
            self.lists.try_reserve(states - self.lists.len())?;
        }
        Ok(())
    }

    /// Append an empty neighbour list for a newly registered state
    ///
    /// Room must have been reserved with `reserve_states`.
    pub(crate) fn add_state(&mut self) {
        self.lists.push(Vec::new());
    }

    #[inline]
    pub fn contains(&self, si: StateId, sf: StateId) -> bool {
        *self.flags.get(si.index(), sf.index())
    }

    /// Neighbours of `si` in admission order
    pub fn neighbors(&self, si: StateId) -> &[StateId] {
        self.lists
            .get(si.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of edges
    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// Apply the hysteresis rule to `(si, sf)` given its current probability
    pub fn apply(&mut self, si: StateId, sf: StateId, probability: f64) -> EdgeChange {
        let present = self.contains(si, sf);
        if !present && probability > self.threshold {
            self.insert(si, sf);
            EdgeChange::Admitted
        } else if present && probability <= self.threshold {
            self.remove(si, sf);
            EdgeChange::Removed
        } else {
            EdgeChange::Unchanged
        }
    }

    /// Drop `(si, sf)` if its probability fell to the threshold or below
    pub fn demote(&mut self, si: StateId, sf: StateId, probability: f64) -> bool {
        if probability <= self.threshold && self.contains(si, sf) {
            self.remove(si, sf);
            true
        } else {
            false
        }
    }

    fn insert(&mut self, si: StateId, sf: StateId) {
        *self.flags.get_mut(si.index(), sf.index()) = true;
        self.lists[si.index()].push(sf);
        self.edges += 1;
        debug!(from = %si, to = %sf, "Edge admitted");
    }

    fn remove(&mut self, si: StateId, sf: StateId) {
        *self.flags.get_mut(si.index(), sf.index()) = false;
        let list = &mut self.lists[si.index()];
        if let Some(pos) = list.iter().position(|&s| s == sf) {
            list.remove(pos);
        }
        self.edges -= 1;
        debug!(from = %si, to = %sf, "Edge removed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjacency(states: usize) -> Adjacency {
        let mut adj = Adjacency::new(states, 0.5).unwrap();
        adj.reserve_states(states).unwrap();
        for _ in 0..states {
            adj.add_state();
        }
        adj
    }

    #[test]
    fn test_hysteresis_rule() {
        let mut adj = adjacency(2);
        let (s0, s1) = (StateId(0), StateId(1));

        assert_eq!(adj.apply(s0, s1, 0.5), EdgeChange::Unchanged);
        assert!(!adj.contains(s0, s1));

        assert_eq!(adj.apply(s0, s1, 0.51), EdgeChange::Admitted);
        assert_eq!(adj.apply(s0, s1, 0.9), EdgeChange::Unchanged);
        assert_eq!(adj.neighbors(s0), &[s1]);

        assert_eq!(adj.apply(s0, s1, 0.5), EdgeChange::Removed);
        assert!(adj.neighbors(s0).is_empty());
        assert_eq!(adj.apply(s0, s1, 0.2), EdgeChange::Unchanged);
        assert_eq!(adj.edge_count(), 0);
    }

    #[test]
    fn test_removal_keeps_admission_order() {
        let mut adj = adjacency(4);
        let s0 = StateId(0);
        for sf in [3, 1, 2] {
            adj.apply(s0, StateId(sf), 1.0);
        }

        assert!(adj.demote(s0, StateId(1), 0.3));
        assert!(!adj.demote(s0, StateId(2), 0.7));
        assert_eq!(adj.neighbors(s0), &[StateId(3), StateId(2)]);
        assert_eq!(adj.edge_count(), 2);
    }

    #[test]
    fn test_unknown_state_has_no_neighbors() {
        let adj = adjacency(1);
        assert!(adj.neighbors(StateId(5)).is_empty());
    }
}
