//! Shared Learner Handle
//!
//! The learner is single-threaded by design. Embedders that need to reach
//! it from several threads share one [`SharedLearner`]: every call holds a
//! single lock for its whole duration, so an `observe` can never interleave
//! with a running `find_path`.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use gap_common::{ActionId, Result};
use parking_lot::Mutex;

use crate::config::LearnerConfig;
use crate::domain::plan::Plan;
use crate::learner::GapLearner;

/// Cloneable, lock-protected handle to a [`GapLearner`]
#[derive(Debug)]
pub struct SharedLearner<L> {
    inner: Arc<Mutex<GapLearner<L>>>,
}

impl<L> Clone for SharedLearner<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L> SharedLearner<L>
where
    L: Eq + Hash + Clone + Debug,
{
    pub fn new(config: LearnerConfig) -> Result<Self> {
        Ok(Self::from_learner(GapLearner::new(config)?))
    }

    pub fn from_learner(learner: GapLearner<L>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(learner)),
        }
    }

    pub fn register_state(&self, label: L) -> Result<bool> {
        self.inner.lock().register_state(label)
    }

    pub fn observe(&self, before: L, after: L, action: ActionId) -> Result<()> {
        self.inner.lock().observe(before, after, action)
    }

    pub fn find_path(&self, start: &L, goal: &L) -> Result<Option<Plan>> {
        self.inner.lock().find_path(start, goal)
    }

    /// Run `f` with exclusive access, for compound read sequences
    pub fn with<R>(&self, f: impl FnOnce(&mut GapLearner<L>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
