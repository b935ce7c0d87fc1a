//! Most-Probable-Path Planner
//!
//! Finds the path from a start state to a goal that maximizes the product of
//! best-action probabilities along its edges.
//!
//! The search:
//! 1. Reuse a sub-path of the cached plan when the agent is back on it
//! 2. Breadth-first reachability check over the adjacency graph
//! 3. Label-setting search over cumulative probability (Dijkstra on
//!    `-ln p` weights, run directly on products)
//! 4. Walk predecessors back from the goal to build states and actions

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use gap_common::{ActionId, GapError, Result, StateId};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use super::plan::{Plan, PlanCache};

/// Read-only view of the learned graph used by the planner
pub trait TransitionGraph {
    /// Number of registered states
    fn state_count(&self) -> usize;

    /// Adjacency-admitted successors of `si`
    fn neighbors(&self, si: StateId) -> &[StateId];

    /// Best-action probability of `si → sf`, zero when unobserved
    fn edge_probability(&self, si: StateId, sf: StateId) -> f64;

    /// Action that realizes `si → sf` most reliably
    fn edge_action(&self, si: StateId, sf: StateId) -> Option<ActionId>;

    /// Whether `si → sf` is currently an admitted edge
    fn has_edge(&self, si: StateId, sf: StateId) -> bool {
        self.neighbors(si).contains(&sf)
    }
}

/// Probability of completing `states` hop by hop
///
/// Short-circuits to zero at the first unobserved hop.
pub fn path_probability<G: TransitionGraph + ?Sized>(graph: &G, states: &[StateId]) -> f64 {
    let mut joint = 1.0;
    for hop in states.windows(2) {
        joint *= graph.edge_probability(hop[0], hop[1]);
        if joint == 0.0 {
            return 0.0;
        }
    }
    joint
}

/// Probability of `plan` as it stands in the current graph
///
/// Zero once any hop has lost its edge or its winning action changed.
pub fn plan_probability<G: TransitionGraph + ?Sized>(graph: &G, plan: &Plan) -> f64 {
    let intact = plan
        .states
        .windows(2)
        .zip(&plan.actions)
        .all(|(hop, &action)| {
            graph.has_edge(hop[0], hop[1]) && graph.edge_action(hop[0], hop[1]) == Some(action)
        });
    if !intact {
        return 0.0;
    }
    path_probability(graph, &plan.states)
}

/// Whether `sg` can be reached from `si` through at least one edge
pub fn reachable<G: TransitionGraph + ?Sized>(graph: &G, si: StateId, sg: StateId) -> bool {
    let mut seen = vec![false; graph.state_count()];
    let mut queue: VecDeque<StateId> = VecDeque::new();

    for &next in graph.neighbors(si) {
        if !seen[next.index()] {
            seen[next.index()] = true;
            queue.push_back(next);
        }
    }

    while let Some(state) = queue.pop_front() {
        if state == sg {
            return true;
        }
        for &next in graph.neighbors(state) {
            if !seen[next.index()] {
                seen[next.index()] = true;
                queue.push_back(next);
            }
        }
    }
    false
}

/// Finalized part of the last weighted search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchTree {
    pub root: StateId,
    /// Predecessor of each finalized state (`None` for the root and for
    /// states that were never finalized)
    pub predecessors: Vec<Option<StateId>>,
    /// Hop distance from the root for each finalized state
    pub distances: Vec<Option<u32>>,
    /// Cumulative path probability for each finalized state
    pub probabilities: Vec<f64>,
    /// States in finalization order, root first
    pub order: Vec<StateId>,
}

impl SearchTree {
    fn new(root: StateId, states: usize) -> Self {
        let mut tree = Self {
            root,
            predecessors: vec![None; states],
            distances: vec![None; states],
            probabilities: vec![0.0; states],
            order: Vec::new(),
        };
        tree.distances[root.index()] = Some(0);
        tree.probabilities[root.index()] = 1.0;
        tree.order.push(root);
        tree
    }

    pub fn is_finalized(&self, state: StateId) -> bool {
        self.distances
            .get(state.index())
            .map_or(false, Option::is_some)
    }

    fn finalize(&mut self, predecessor: StateId, state: StateId, probability: f64) {
        let distance = self.distances[predecessor.index()].unwrap_or(0) + 1;
        self.predecessors[state.index()] = Some(predecessor);
        self.distances[state.index()] = Some(distance);
        self.probabilities[state.index()] = probability;
        self.order.push(state);
    }

    /// Root-to-`goal` state path through finalized predecessors
    pub fn path_to(&self, goal: StateId) -> Option<Vec<StateId>> {
        if !self.is_finalized(goal) {
            return None;
        }
        let mut path = vec![goal];
        let mut current = goal;
        while let Some(prev) = self.predecessors[current.index()] {
            path.push(prev);
            current = prev;
        }
        path.reverse();
        (path[0] == self.root).then_some(path)
    }

    /// Largest hop distance reached
    pub fn max_distance(&self) -> u32 {
        self.distances.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Finalized states at the largest hop distance, in finalization order
    ///
    /// These sit on the edge of the known graph and make natural
    /// exploration targets.
    pub fn frontier_states(&self) -> Vec<StateId> {
        let max = self.max_distance();
        self.order
            .iter()
            .copied()
            .filter(|s| self.distances[s.index()] == Some(max))
            .collect()
    }
}

/// Frontier entry ordered by cumulative probability, then insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Candidate {
    probability: OrderedFloat<f64>,
    sequence: Reverse<u64>,
    predecessor: StateId,
    state: StateId,
}

/// Max-heap frontier with stable tie-breaking
struct Frontier {
    heap: BinaryHeap<Candidate>,
    sequence: u64,
    limit: Option<usize>,
}

impl Frontier {
    fn new(limit: Option<usize>) -> Self {
        Self {
            heap: BinaryHeap::new(),
            sequence: 0,
            limit,
        }
    }

    fn push(&mut self, predecessor: StateId, state: StateId, probability: f64) -> Result<()> {
        self.heap.push(Candidate {
            probability: OrderedFloat(probability),
            sequence: Reverse(self.sequence),
            predecessor,
            state,
        });
        self.sequence += 1;

        match self.limit {
            Some(limit) if self.heap.len() > limit => Err(GapError::FrontierExceeded { limit }),
            _ => Ok(()),
        }
    }

    fn pop(&mut self) -> Option<Candidate> {
        self.heap.pop()
    }
}

/// Label-setting search for the most probable path from `si` to `sg`
///
/// Stops as soon as `sg` is finalized or the frontier runs dry.
pub fn search<G: TransitionGraph + ?Sized>(
    graph: &G,
    si: StateId,
    sg: StateId,
    max_frontier: Option<usize>,
) -> Result<SearchTree> {
    let mut tree = SearchTree::new(si, graph.state_count());
    let mut frontier = Frontier::new(max_frontier);

    expand(graph, &tree, &mut frontier, si, 1.0)?;

    while let Some(candidate) = frontier.pop() {
        if tree.is_finalized(candidate.state) {
            continue;
        }

        let probability = candidate.probability.into_inner();
        tree.finalize(candidate.predecessor, candidate.state, probability);
        trace!(state = %candidate.state, probability, "Finalized");

        if candidate.state == sg {
            break;
        }
        expand(graph, &tree, &mut frontier, candidate.state, probability)?;
    }

    Ok(tree)
}

fn expand<G: TransitionGraph + ?Sized>(
    graph: &G,
    tree: &SearchTree,
    frontier: &mut Frontier,
    from: StateId,
    cumulative: f64,
) -> Result<()> {
    for &next in graph.neighbors(from) {
        if tree.is_finalized(next) {
            continue;
        }
        let edge = graph.edge_probability(from, next);
        if edge > 0.0 {
            frontier.push(from, next, edge * cumulative)?;
        }
    }
    Ok(())
}

/// Planner state: the plan cache and the last search tree
#[derive(Debug, Clone, Default)]
pub struct Planner {
    cache: PlanCache,
    last_tree: Option<SearchTree>,
    max_frontier: Option<usize>,
}

impl Planner {
    pub fn new(max_frontier: Option<usize>) -> Self {
        Self {
            cache: PlanCache::new(),
            last_tree: None,
            max_frontier,
        }
    }

    /// Most probable plan from `si` to `sg`, `None` when no path is known
    #[instrument(level = "debug", skip(self, graph))]
    pub fn find_path<G: TransitionGraph + ?Sized>(
        &mut self,
        graph: &G,
        si: StateId,
        sg: StateId,
    ) -> Result<Option<Plan>> {
        if si == sg {
            return Ok(Some(Plan::trivial(si)));
        }

        if let Some(plan) = self
            .cache
            .reuse(si, sg, |plan| plan_probability(graph, plan))
        {
            debug!(hops = plan.len(), "Reusing cached plan");
            return Ok(Some(plan));
        }

        if !reachable(graph, si, sg) {
            debug!("Goal not reachable");
            self.cache.clear();
            return Ok(None);
        }
        self.cache.set_goal(sg);

        let tree = match search(graph, si, sg, self.max_frontier) {
            Ok(tree) => tree,
            Err(err) => {
                self.cache.clear();
                return Err(err);
            }
        };

        let plan = tree
            .path_to(sg)
            .and_then(|states| Self::realize(graph, states));
        self.last_tree = Some(tree);

        match plan {
            Some(plan) => {
                debug!(hops = plan.len(), "Found plan");
                self.cache.store(plan.clone());
                Ok(Some(plan))
            }
            None => {
                self.cache.clear();
                Ok(None)
            }
        }
    }

    /// Attach the winning action to every hop of `states`
    fn realize<G: TransitionGraph + ?Sized>(graph: &G, states: Vec<StateId>) -> Option<Plan> {
        let actions = states
            .windows(2)
            .map(|hop| graph.edge_action(hop[0], hop[1]))
            .collect::<Option<Vec<_>>>()?;
        Some(Plan { actions, states })
    }

    pub fn cached_plan(&self) -> Option<&Plan> {
        self.cache.plan()
    }

    pub fn last_goal(&self) -> Option<StateId> {
        self.cache.goal()
    }

    pub fn last_tree(&self) -> Option<&SearchTree> {
        self.last_tree.as_ref()
    }

    pub fn clear_plan(&mut self) {
        self.cache.clear();
    }
}
