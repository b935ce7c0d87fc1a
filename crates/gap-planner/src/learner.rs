//! GAP Learner
//!
//! Ties the label registry, transition model, best-action cache, adjacency
//! and planner together behind the label-based interface used by
//! environment drivers.
//!
//! Every `observe` keeps the best-action cache exact:
//! 1. Count the observation and recompute `P(si, a, sf)`
//! 2. Promote `a` for `(si, sf)` if it now beats the cached winner
//! 3. Admit or drop the `si → sf` edge by hysteresis
//! 4. Re-derive the winner of every other destination in the `(si, a)`
//!    bucket, since their probabilities shrank with the new total
//! 5. Rescale the `(si, a)` row once it reaches the rescale threshold

use std::fmt::Debug;
use std::hash::Hash;

use gap_common::{ActionId, GapError, Result, StateId};
use tracing::{debug, trace};

use crate::config::LearnerConfig;
use crate::domain::adjacency::Adjacency;
use crate::domain::best_action::BestActionCache;
use crate::domain::plan::Plan;
use crate::domain::planner::{self, Planner, SearchTree, TransitionGraph};
use crate::domain::registry::LabelRegistry;
use crate::domain::transition::TransitionModel;

/// Online transition-graph learner and most-probable-path planner
///
/// `L` is the caller's state label (a state string, a tuple, ...).
#[derive(Debug, Clone)]
pub struct GapLearner<L> {
    config: LearnerConfig,
    registry: LabelRegistry<L>,
    model: TransitionModel,
    cache: BestActionCache,
    adjacency: Adjacency,
    planner: Planner,
    visits: Vec<u64>,
    total_visits: u64,
}

/// Borrowed graph view over the adjacency and the best-action cache
struct LearnedGraph<'a> {
    states: usize,
    adjacency: &'a Adjacency,
    cache: &'a BestActionCache,
}

impl TransitionGraph for LearnedGraph<'_> {
    fn state_count(&self) -> usize {
        self.states
    }

    fn neighbors(&self, si: StateId) -> &[StateId] {
        self.adjacency.neighbors(si)
    }

    fn edge_probability(&self, si: StateId, sf: StateId) -> f64 {
        self.cache.probability(si, sf)
    }

    fn edge_action(&self, si: StateId, sf: StateId) -> Option<ActionId> {
        self.cache.action(si, sf)
    }

    fn has_edge(&self, si: StateId, sf: StateId) -> bool {
        self.adjacency.contains(si, sf)
    }
}

impl<L> GapLearner<L>
where
    L: Eq + Hash + Clone + Debug,
{
    /// Build a learner from a validated configuration
    pub fn new(config: LearnerConfig) -> Result<Self> {
        config.validate()?;
        let capacity = config.initial_capacity;
        let actions = config.action_count;

        Ok(Self {
            registry: LabelRegistry::new(),
            model: TransitionModel::new(
                capacity,
                actions,
                config.rescale_threshold,
                config.rescale_reset,
            )?,
            cache: BestActionCache::new(capacity, actions)?,
            adjacency: Adjacency::new(capacity, config.edge_threshold)?,
            planner: Planner::new(config.max_frontier),
            visits: Vec::new(),
            total_visits: 0,
            config,
        })
    }

    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Label boundary
    // ------------------------------------------------------------------

    /// Register `label`, returning `true` if it was new
    pub fn register_state(&mut self, label: L) -> Result<bool> {
        self.register(label).map(|(_, is_new)| is_new)
    }

    /// Register `label`, returning its id and whether it was new
    pub fn register(&mut self, label: L) -> Result<(StateId, bool)> {
        if let Some(id) = self.registry.lookup(&label) {
            return Ok((id, false));
        }

        let next = self.registry.len();
        if let Some(limit) = self.config.max_states {
            if next >= limit {
                return Err(GapError::CapacityExceeded { limit });
            }
        }

        // grow everything first, commit only once every table has room
        let needed = next + 1;
        self.registry.reserve()?;
        self.model.reserve_states(needed)?;
        self.cache.reserve_states(needed)?;
        self.adjacency.reserve_states(needed)?;
        self.visits.try_reserve(1)?;

        self.adjacency.add_state();
        self.visits.push(1);
        self.total_visits += 1;
        let id = self.registry.insert(label);

        debug!(state = %id, label = ?self.registry.label(id), "Discovered state");
        Ok((id, true))
    }

    /// Record that `action` taken in `before` led to `after`
    ///
    /// Unknown labels are registered first. The action is validated before
    /// anything is registered or counted.
    pub fn observe(&mut self, before: L, after: L, action: ActionId) -> Result<()> {
        self.check_action(action)?;
        if let Some(limit) = self.config.max_states {
            let mut fresh = usize::from(self.registry.lookup(&before).is_none());
            if before != after && self.registry.lookup(&after).is_none() {
                fresh += 1;
            }
            if self.registry.len() + fresh > limit {
                return Err(GapError::CapacityExceeded { limit });
            }
        }
        let (si, _) = self.register(before)?;
        let (sf, _) = self.register(after)?;
        self.update(si, sf, action);
        Ok(())
    }

    /// Most probable plan from `start` to `goal`
    ///
    /// `Ok(None)` when no path is known, including when either label has
    /// never been seen.
    pub fn find_path(&mut self, start: &L, goal: &L) -> Result<Option<Plan>> {
        match (self.registry.lookup(start), self.registry.lookup(goal)) {
            (Some(si), Some(sg)) => self.find_path_ids(si, sg),
            _ => {
                self.planner.clear_plan();
                Ok(None)
            }
        }
    }

    pub fn state_id(&self, label: &L) -> Option<StateId> {
        self.registry.lookup(label)
    }

    pub fn label(&self, id: StateId) -> Option<&L> {
        self.registry.label(id)
    }

    pub fn state_count(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Registered `(id, label)` pairs in discovery order
    pub fn states(&self) -> impl Iterator<Item = (StateId, &L)> {
        self.registry.iter()
    }

    // ------------------------------------------------------------------
    // Index boundary
    // ------------------------------------------------------------------

    /// Record an observation between already registered states
    pub fn observe_ids(&mut self, si: StateId, sf: StateId, action: ActionId) -> Result<()> {
        self.check_action(action)?;
        self.check_state(si)?;
        self.check_state(sf)?;
        self.update(si, sf, action);
        Ok(())
    }

    /// Most probable plan between registered states
    pub fn find_path_ids(&mut self, si: StateId, sg: StateId) -> Result<Option<Plan>> {
        self.check_state(si)?;
        self.check_state(sg)?;

        let graph = LearnedGraph {
            states: self.registry.len(),
            adjacency: &self.adjacency,
            cache: &self.cache,
        };
        self.planner.find_path(&graph, si, sg)
    }

    fn check_action(&self, action: ActionId) -> Result<()> {
        if action.index() >= self.config.action_count {
            return Err(GapError::InvalidAction {
                action: action.0,
                action_count: self.config.action_count,
            });
        }
        Ok(())
    }

    fn check_state(&self, id: StateId) -> Result<()> {
        if id.index() >= self.registry.len() {
            return Err(GapError::UnknownState(id));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Model maintenance
    // ------------------------------------------------------------------

    fn update(&mut self, si: StateId, sf: StateId, action: ActionId) {
        let p = self.model.record(si, sf, action);
        trace!(from = %si, to = %sf, action = %action, p, "Observed transition");

        if p > self.cache.probability(si, sf) {
            self.cache.assign(si, sf, action, p);
        }

        let best = self.cache.probability(si, sf);
        self.adjacency.apply(si, sf, best);

        self.sweep(si, sf, action);

        if self
            .model
            .rescale_if_due(si, action, self.registry.len())
        {
            self.refresh_bucket(si, action);
        }

        self.visits[sf.index()] += 1;
        self.total_visits += 1;
    }

    /// Re-derive the winner of every destination attributed to `action`
    ///
    /// Their probabilities dropped when `total[si][action]` grew. `sf` was
    /// settled by the caller and stays in place.
    fn sweep(&mut self, si: StateId, sf: StateId, action: ActionId) {
        let mut kept = Vec::with_capacity(self.cache.bucket_len(si, action));

        while let Some(sl) = self.cache.pop_front(si, action) {
            if sl == sf {
                kept.push(sl);
                continue;
            }

            match self.model.best_action(si, sl, Some(action)) {
                Some((winner, p)) if winner == action => {
                    self.cache.set_probability(si, sl, p);
                    kept.push(sl);
                    self.adjacency.demote(si, sl, p);
                }
                Some((winner, p)) => {
                    self.cache.push_front(si, winner, sl);
                    self.cache.set_probability(si, sl, p);
                    self.adjacency.demote(si, sl, p);
                    trace!(from = %si, to = %sl, %winner, p, "Best action moved");
                }
                None => {
                    self.cache.clear(si, sl);
                    self.adjacency.demote(si, sl, 0.0);
                }
            }
        }

        for sl in kept.into_iter().rev() {
            self.cache.push_front(si, action, sl);
        }
    }

    /// Re-read cached probabilities of the `(si, action)` bucket after a rescale
    ///
    /// Values only move by rounding, but edges must agree with what is cached.
    fn refresh_bucket(&mut self, si: StateId, action: ActionId) {
        let members: Vec<StateId> = self.cache.bucket(si, action).collect();
        for sl in members {
            let p = self.model.probability(si, action, sl);
            self.cache.set_probability(si, sl, p);
            self.adjacency.apply(si, sl, p);
        }
    }

    // ------------------------------------------------------------------
    // Read accessors
    // ------------------------------------------------------------------

    pub fn count(&self, action: ActionId, si: StateId, sf: StateId) -> f64 {
        self.model.count(action, si, sf)
    }

    pub fn total(&self, si: StateId, action: ActionId) -> f64 {
        self.model.total(si, action)
    }

    /// Empirical `P(si, action, sf)`
    pub fn probability(&self, si: StateId, action: ActionId, sf: StateId) -> f64 {
        self.model.probability(si, action, sf)
    }

    /// Cached winning action and probability for `(si, sf)`
    pub fn best_action(&self, si: StateId, sf: StateId) -> Option<(ActionId, f64)> {
        self.cache.best(si, sf)
    }

    pub fn neighbors(&self, si: StateId) -> &[StateId] {
        self.adjacency.neighbors(si)
    }

    pub fn has_edge(&self, si: StateId, sf: StateId) -> bool {
        si.index() < self.registry.len()
            && sf.index() < self.registry.len()
            && self.adjacency.contains(si, sf)
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.edge_count()
    }

    pub fn observation_count(&self) -> u64 {
        self.model.observation_count()
    }

    /// Counter rows rescaled so far
    pub fn rescale_count(&self) -> u64 {
        self.model.rescale_count()
    }

    /// Probability of completing `states` hop by hop with the best actions
    pub fn path_probability(&self, states: &[StateId]) -> f64 {
        if states.iter().any(|s| s.index() >= self.registry.len()) {
            return 0.0;
        }
        let graph = LearnedGraph {
            states: self.registry.len(),
            adjacency: &self.adjacency,
            cache: &self.cache,
        };
        planner::path_probability(&graph, states)
    }

    // ------------------------------------------------------------------
    // Exploration support
    // ------------------------------------------------------------------

    /// Times `id` was reached, counting its discovery
    pub fn visits(&self, id: StateId) -> u64 {
        self.visits.get(id.index()).copied().unwrap_or(0)
    }

    pub fn total_visits(&self) -> u64 {
        self.total_visits
    }

    /// Least visited registered state among `candidates`, first on ties
    pub fn least_visited<I>(&self, candidates: I) -> Option<StateId>
    where
        I: IntoIterator<Item = StateId>,
    {
        candidates
            .into_iter()
            .filter(|s| s.index() < self.visits.len())
            .min_by_key(|s| self.visits[s.index()])
    }

    // ------------------------------------------------------------------
    // Planner state
    // ------------------------------------------------------------------

    pub fn cached_plan(&self) -> Option<&Plan> {
        self.planner.cached_plan()
    }

    /// Goal of the last plan produced by a search
    pub fn last_goal(&self) -> Option<StateId> {
        self.planner.last_goal()
    }

    pub fn last_search(&self) -> Option<&SearchTree> {
        self.planner.last_tree()
    }

    /// Forget the cached plan so the next query searches from scratch
    pub fn clear_plan(&mut self) {
        self.planner.clear_plan();
    }
}
