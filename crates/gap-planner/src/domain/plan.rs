//! Plans and the Plan Cache
//!
//! A [`Plan`] is a state path plus the actions realizing each hop. The
//! [`PlanCache`] keeps the most recent plan so that an agent knocked off
//! course can resume it without a new search once it is back on the path.

use gap_common::{ActionId, StateId};
use serde::{Deserialize, Serialize};

/// Ordered state path and the actions connecting consecutive states
///
/// `actions.len() == states.len() - 1` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub actions: Vec<ActionId>,
    pub states: Vec<StateId>,
}

impl Plan {
    /// Plan that is already at its goal
    pub fn trivial(state: StateId) -> Self {
        Self {
            actions: Vec::new(),
            states: vec![state],
        }
    }

    pub fn start(&self) -> Option<StateId> {
        self.states.first().copied()
    }

    pub fn goal(&self) -> Option<StateId> {
        self.states.last().copied()
    }

    /// First action to take, `None` for a trivial plan
    pub fn next_action(&self) -> Option<ActionId> {
        self.actions.first().copied()
    }

    /// Number of hops
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Position of `state` on the path
    pub fn position(&self, state: StateId) -> Option<usize> {
        self.states.iter().position(|&s| s == state)
    }

    /// Sub-plan covering `states[from..=to]`
    pub fn slice(&self, from: usize, to: usize) -> Option<Plan> {
        if from > to || to >= self.states.len() {
            return None;
        }
        Some(Plan {
            actions: self.actions[from..to].to_vec(),
            states: self.states[from..=to].to_vec(),
        })
    }
}

/// Most recently computed plan and the goal it was searched for
#[derive(Debug, Clone, Default)]
pub struct PlanCache {
    plan: Option<Plan>,
    goal: Option<StateId>,
}

impl PlanCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    /// Goal of the last plan produced by a search
    pub fn goal(&self) -> Option<StateId> {
        self.goal
    }

    pub fn set_goal(&mut self, goal: StateId) {
        self.goal = Some(goal);
    }

    pub fn store(&mut self, plan: Plan) {
        self.plan = Some(plan);
    }

    pub fn clear(&mut self) {
        self.plan = None;
    }

    /// Reuse the cached plan from `si` to `sg`
    ///
    /// Applies when both states lie on the cached path with `sg` not before
    /// `si`, and `probability` of the cached plan is still positive. Returns
    /// the whole plan when `si` is its first state, otherwise the sub-plan
    /// starting at `si`.
    pub fn reuse(
        &self,
        si: StateId,
        sg: StateId,
        probability: impl FnOnce(&Plan) -> f64,
    ) -> Option<Plan> {
        let plan = self.plan.as_ref()?;
        let from = plan.position(si)?;
        let to = plan.position(sg)?;
        if to < from || probability(plan) <= 0.0 {
            return None;
        }
        if from == 0 && to + 1 == plan.states.len() {
            return Some(plan.clone());
        }
        plan.slice(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> Plan {
        Plan {
            actions: vec![ActionId(2), ActionId(0), ActionId(1)],
            states: vec![StateId(4), StateId(1), StateId(7), StateId(3)],
        }
    }

    #[test]
    fn test_plan_accessors() {
        let plan = plan();
        assert_eq!(plan.start(), Some(StateId(4)));
        assert_eq!(plan.goal(), Some(StateId(3)));
        assert_eq!(plan.next_action(), Some(ActionId(2)));
        assert_eq!(plan.len(), 3);

        let trivial = Plan::trivial(StateId(9));
        assert!(trivial.is_empty());
        assert_eq!(trivial.next_action(), None);
        assert_eq!(trivial.goal(), Some(StateId(9)));
    }

    #[test]
    fn test_slice() {
        let sub = plan().slice(1, 2).unwrap();
        assert_eq!(sub.states, vec![StateId(1), StateId(7)]);
        assert_eq!(sub.actions, vec![ActionId(0)]);
        assert!(plan().slice(2, 1).is_none());
        assert!(plan().slice(0, 4).is_none());
    }

    #[test]
    fn test_reuse_whole_and_suffix() {
        let mut cache = PlanCache::new();
        cache.store(plan());

        let whole = cache.reuse(StateId(4), StateId(3), |_| 0.8).unwrap();
        assert_eq!(whole, plan());

        let suffix = cache.reuse(StateId(7), StateId(3), |_| 0.8).unwrap();
        assert_eq!(suffix.states, vec![StateId(7), StateId(3)]);
        assert_eq!(suffix.actions, vec![ActionId(1)]);
    }

    #[test]
    fn test_reuse_rejected() {
        let mut cache = PlanCache::new();
        assert!(cache.reuse(StateId(4), StateId(3), |_| 1.0).is_none());

        cache.store(plan());
        // zero probability path
        assert!(cache.reuse(StateId(4), StateId(3), |_| 0.0).is_none());
        // goal behind the start
        assert!(cache.reuse(StateId(7), StateId(1), |_| 1.0).is_none());
        // state off the path
        assert!(cache.reuse(StateId(5), StateId(3), |_| 1.0).is_none());

        cache.clear();
        assert!(cache.plan().is_none());
    }
}
