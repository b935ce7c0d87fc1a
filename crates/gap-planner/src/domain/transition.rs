//! Transition Model
//!
//! Observation counters `count[a][si][sf]` and per-(state, action) totals
//! `total[si][a]`, from which empirical transition probabilities are derived.
//!
//! Counters are `f64`: rescaling multiplies a whole row by
//! `reset / threshold`, which leaves fractional counts behind.

use gap_common::{ActionId, Result, StateId};
use tracing::debug;

use crate::infra::arena::{RowTable, SquareTable};

/// Dense observation counters for a growing state space
#[derive(Debug, Clone)]
pub struct TransitionModel {
    /// `(si, sf)` cell holds one counter per action
    counts: SquareTable<f64>,
    /// `si` row holds one total per action
    totals: RowTable<f64>,
    rescale_threshold: f64,
    rescale_reset: f64,
    observations: u64,
    rescales: u64,
}

impl TransitionModel {
    pub fn new(
        capacity: usize,
        action_count: usize,
        rescale_threshold: f64,
        rescale_reset: f64,
    ) -> Result<Self> {
        Ok(Self {
            counts: SquareTable::new(capacity, action_count, 0.0)?,
            totals: RowTable::new(capacity, action_count, 0.0)?,
            rescale_threshold,
            rescale_reset,
            observations: 0,
            rescales: 0,
        })
    }

    /// Make room for `states` states in every table
    pub fn reserve_states(&mut self, states: usize) -> Result<()> {
        if self.counts.ensure(states)? {
            debug!(capacity = self.counts.capacity(), "Grew transition counters");
        }
        self.totals.ensure(states)?;
        Ok(())
    }

    /// Record one observation and return the updated `P(si, action, sf)`
    pub fn record(&mut self, si: StateId, sf: StateId, action: ActionId) -> f64 {
        let a = action.index();
        self.counts.cell_mut(si.index(), sf.index())[a] += 1.0;
        self.totals.row_mut(si.index())[a] += 1.0;
        self.observations += 1;
        self.probability(si, action, sf)
    }

    #[inline]
    pub fn count(&self, action: ActionId, si: StateId, sf: StateId) -> f64 {
        self.counts.cell(si.index(), sf.index())[action.index()]
    }

    #[inline]
    pub fn total(&self, si: StateId, action: ActionId) -> f64 {
        self.totals.row(si.index())[action.index()]
    }

    /// Empirical `P(si, action, sf)`, zero for an unobserved action
    #[inline]
    pub fn probability(&self, si: StateId, action: ActionId, sf: StateId) -> f64 {
        let total = self.total(si, action);
        if total > 0.0 {
            self.count(action, si, sf) / total
        } else {
            0.0
        }
    }

    /// Most probable action leading from `si` to `sf`
    ///
    /// Ties keep `incumbent` when it is among the maxima, otherwise the
    /// lowest action id wins. Returns `None` when no action has ever led
    /// from `si` to `sf`.
    pub fn best_action(
        &self,
        si: StateId,
        sf: StateId,
        incumbent: Option<ActionId>,
    ) -> Option<(ActionId, f64)> {
        let counts = self.counts.cell(si.index(), sf.index());
        let totals = self.totals.row(si.index());

        let mut best: Option<(ActionId, f64)> = None;
        for (a, (&count, &total)) in counts.iter().zip(totals).enumerate() {
            if total <= 0.0 || count <= 0.0 {
                continue;
            }
            let p = count / total;
            match best {
                Some((_, best_p)) if p <= best_p => {}
                _ => best = Some((ActionId::from_index(a), p)),
            }
        }

        match (best, incumbent) {
            (Some((_, best_p)), Some(incumbent))
                if self.probability(si, incumbent, sf) == best_p =>
            {
                Some((incumbent, best_p))
            }
            _ => best,
        }
    }

    /// Scale the `(si, action)` row down once its total reaches the threshold
    ///
    /// Probabilities keep their value; later observations weigh more.
    /// Returns `true` when a rescale happened.
    pub fn rescale_if_due(&mut self, si: StateId, action: ActionId, states: usize) -> bool {
        let a = action.index();
        let total = self.totals.row(si.index())[a];
        if total < self.rescale_threshold {
            return false;
        }

        let ratio = self.rescale_reset / self.rescale_threshold;
        self.totals.row_mut(si.index())[a] = total * ratio;
        for sf in 0..states {
            self.counts.cell_mut(si.index(), sf)[a] *= ratio;
        }
        self.rescales += 1;

        debug!(state = %si, action = %action, ratio, "Rescaled transition counters");
        true
    }

    /// Number of observations recorded so far
    pub fn observation_count(&self) -> u64 {
        self.observations
    }

    /// Number of rescales applied so far
    pub fn rescale_count(&self) -> u64 {
        self.rescales
    }
}
