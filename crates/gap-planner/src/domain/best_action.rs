//! Best-Action Cache
//!
//! For every ordered pair `(si, sf)` the cache records which action currently
//! gives the highest probability of reaching `sf` from `si`, and that
//! probability.
//!
//! Each `(si, action)` owns a bucket: the ordered list of destinations for
//! which `action` is the current winner. Buckets are intrusive doubly-linked
//! lists threaded through the `(si, sf)` cells, so a destination belongs to
//! at most one bucket of its source and push-front, pop-front and removal
//! are all O(1).

use gap_common::{ActionId, Result, StateId};
use tracing::debug;

use crate::infra::arena::{RowTable, SquareTable};

/// One `(si, sf)` cell: winning action, its probability and bucket links
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct BestEntry {
    action: Option<ActionId>,
    probability: f64,
    prev: Option<StateId>,
    next: Option<StateId>,
}

/// Per-pair best-action records plus per-(state, action) buckets
#[derive(Debug, Clone)]
pub struct BestActionCache {
    entries: SquareTable<BestEntry>,
    heads: RowTable<Option<StateId>>,
    lengths: RowTable<u32>,
}

impl BestActionCache {
    pub fn new(capacity: usize, action_count: usize) -> Result<Self> {
        Ok(Self {
            entries: SquareTable::new(capacity, 1, BestEntry::default())?,
            heads: RowTable::new(capacity, action_count, None)?,
            lengths: RowTable::new(capacity, action_count, 0)?,
        })
    }

    pub fn reserve_states(&mut self, states: usize) -> Result<()> {
        if self.entries.ensure(states)? {
            debug!(capacity = self.entries.capacity(), "Grew best-action cache");
        }
        self.heads.ensure(states)?;
        self.lengths.ensure(states)?;
        Ok(())
    }

    #[inline]
    fn entry(&self, si: StateId, sf: StateId) -> &BestEntry {
        self.entries.get(si.index(), sf.index())
    }

    #[inline]
    fn entry_mut(&mut self, si: StateId, sf: StateId) -> &mut BestEntry {
        self.entries.get_mut(si.index(), sf.index())
    }

    /// Winning action and probability for `(si, sf)`
    pub fn best(&self, si: StateId, sf: StateId) -> Option<(ActionId, f64)> {
        let entry = self.entry(si, sf);
        entry.action.map(|a| (a, entry.probability))
    }

    /// Winning probability for `(si, sf)`, zero when nothing has won yet
    #[inline]
    pub fn probability(&self, si: StateId, sf: StateId) -> f64 {
        self.entry(si, sf).probability
    }

    #[inline]
    pub fn action(&self, si: StateId, sf: StateId) -> Option<ActionId> {
        self.entry(si, sf).action
    }

    /// Overwrite the cached probability without moving buckets
    pub fn set_probability(&mut self, si: StateId, sf: StateId, probability: f64) {
        self.entry_mut(si, sf).probability = probability;
    }

    /// Make `action` the winner for `(si, sf)` with `probability`
    ///
    /// Moves `sf` out of its previous bucket (if any) to the front of the
    /// bucket of `action`.
    pub fn assign(&mut self, si: StateId, sf: StateId, action: ActionId, probability: f64) {
        self.remove(si, sf);
        self.push_front(si, action, sf);
        self.entry_mut(si, sf).probability = probability;
    }

    /// Clear the record for `(si, sf)` and unlink it from its bucket
    pub fn clear(&mut self, si: StateId, sf: StateId) {
        self.remove(si, sf);
        self.entry_mut(si, sf).probability = 0.0;
    }

    /// Link `sf` at the front of the `(si, action)` bucket
    ///
    /// `sf` must not currently be in any bucket of `si`.
    pub fn push_front(&mut self, si: StateId, action: ActionId, sf: StateId) {
        debug_assert!(self.entry(si, sf).action.is_none());
        let a = action.index();
        let head = self.heads.row(si.index())[a];

        if let Some(old_head) = head {
            self.entry_mut(si, old_head).prev = Some(sf);
        }
        {
            let entry = self.entry_mut(si, sf);
            entry.action = Some(action);
            entry.prev = None;
            entry.next = head;
        }
        self.heads.row_mut(si.index())[a] = Some(sf);
        self.lengths.row_mut(si.index())[a] += 1;
    }

    /// Unlink and return the front of the `(si, action)` bucket
    ///
    /// The popped destination keeps its probability but has no winning
    /// action until it is pushed into a bucket again.
    pub fn pop_front(&mut self, si: StateId, action: ActionId) -> Option<StateId> {
        let head = self.heads.row(si.index())[action.index()]?;
        self.remove(si, head);
        Some(head)
    }

    /// Unlink `sf` from whichever bucket of `si` holds it
    pub fn remove(&mut self, si: StateId, sf: StateId) {
        let BestEntry {
            action, prev, next, ..
        } = *self.entry(si, sf);
        let Some(action) = action else {
            return;
        };
        let a = action.index();

        match prev {
            Some(prev) => self.entry_mut(si, prev).next = next,
            None => self.heads.row_mut(si.index())[a] = next,
        }
        if let Some(next) = next {
            self.entry_mut(si, next).prev = prev;
        }

        let entry = self.entry_mut(si, sf);
        entry.action = None;
        entry.prev = None;
        entry.next = None;
        self.lengths.row_mut(si.index())[a] -= 1;
    }

    /// Destinations currently won by `action` from `si`, front to back
    pub fn bucket(&self, si: StateId, action: ActionId) -> Bucket<'_> {
        Bucket {
            cache: self,
            si,
            cursor: self.heads.row(si.index())[action.index()],
        }
    }

    pub fn bucket_len(&self, si: StateId, action: ActionId) -> usize {
        self.lengths.row(si.index())[action.index()] as usize
    }
}

/// Iterator over one bucket
pub struct Bucket<'a> {
    cache: &'a BestActionCache,
    si: StateId,
    cursor: Option<StateId>,
}

impl Iterator for Bucket<'_> {
    type Item = StateId;

    fn next(&mut self) -> Option<StateId> {
        let current = self.cursor?;
        self.cursor = self.cache.entry(self.si, current).next;
        Some(current)
    }
}
