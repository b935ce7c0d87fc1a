//! Label Registry
//!
//! Maps externally supplied state labels to dense [`StateId`]s. Ids are
//! handed out in discovery order and the mapping only ever grows.

use std::collections::HashMap;
use std::hash::Hash;

use gap_common::{GapError, Result, StateId};

/// Bidirectional label ↔ id mapping
#[derive(Debug, Clone)]
pub struct LabelRegistry<L> {
    ids: HashMap<L, StateId>,
    labels: Vec<L>,
}

impl<L: Eq + Hash + Clone> LabelRegistry<L> {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            labels: Vec::new(),
        }
    }

    /// Number of registered states
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Id of a known label
    pub fn lookup(&self, label: &L) -> Option<StateId> {
        self.ids.get(label).copied()
    }

    /// Label of a known id
    pub fn label(&self, id: StateId) -> Option<&L> {
        self.labels.get(id.index())
    }

    /// Id the next new label will receive
    pub fn next_id(&self) -> StateId {
        StateId::from_index(self.labels.len())
    }

    /// Reserve room for one more label without changing the mapping
    pub fn reserve(&mut self) -> Result<()> {
        if self.labels.len() >= u32::MAX as usize {
            return Err(GapError::CapacityExceeded {
                limit: u32::MAX as usize,
            });
        }
        self.labels.try_reserve(1)?;
        self.ids.try_reserve(1)?;
        Ok(())
    }

    /// Commit a new label; callers check `lookup` and call `reserve` first
    pub(crate) fn insert(&mut self, label: L) -> StateId {
        let id = self.next_id();
        self.ids.insert(label.clone(), id);
        self.labels.push(label);
        id
    }

    /// Iterate `(id, label)` pairs in id order
    pub fn iter(&self) -> impl Iterator<Item = (StateId, &L)> {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, label)| (StateId::from_index(i), label))
    }
}

impl<L: Eq + Hash + Clone> Default for LabelRegistry<L> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_discovery_order() {
        let mut registry = LabelRegistry::new();
        for label in ["[0, 1]3[][]", "[1]1[0]1[]"] {
            registry.reserve().unwrap();
            registry.insert(label.to_string());
        }

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup(&"[1]1[0]1[]".to_string()), Some(StateId(1)));
        assert_eq!(registry.label(StateId(0)).map(String::as_str), Some("[0, 1]3[][]"));
        assert_eq!(registry.label(StateId(2)), None);
        assert_eq!(registry.next_id(), StateId(2));
    }

    #[test]
    fn test_iter_pairs() {
        let mut registry = LabelRegistry::new();
        registry.reserve().unwrap();
        registry.insert((3u8, 4u8));

        let pairs: Vec<_> = registry.iter().collect();
        assert_eq!(pairs, vec![(StateId(0), &(3, 4))]);
    }
}
