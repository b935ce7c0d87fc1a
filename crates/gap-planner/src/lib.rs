//! # GAP Planner
//!
//! Online learner that builds a probabilistic transition graph from observed
//! `(state, action, next state)` triples and answers "most likely path to a
//! goal" queries while the graph is still being learned.
//!
//! ## Key Concepts
//!
//! - **State**: opaque label from the environment, mapped to a dense [`StateId`]
//! - **Best action**: for each state pair, the action most likely to cause
//!   that transition, kept exact after every observation
//! - **Edge**: a state pair whose best-action probability rose above τ
//! - **Plan**: states plus the actions realizing each hop, maximizing the
//!   product of edge probabilities
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      GapLearner                         │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐      │
//! │  │  register   │  │  observe    │  │  find_path  │      │
//! │  └──────┬──────┘  └──────┬──────┘  └──────┬──────┘      │
//! │         │                │                │             │
//! │  ┌──────┴──────┐  ┌──────┴──────┐  ┌──────┴──────┐      │
//! │  │   Label     │  │ Transition  │  │  Planner    │      │
//! │  │  Registry   │  │   Model     │  │ + PlanCache │      │
//! │  └─────────────┘  └──────┬──────┘  └──────┬──────┘      │
//! │                   ┌──────┴────────────────┴──────┐      │
//! │                   │ BestActionCache + Adjacency  │      │
//! │                   └──────────────────────────────┘      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use gap_planner::{ActionId, GapLearner, LearnerConfig};
//!
//! let mut gap = GapLearner::new(LearnerConfig::new(2)).unwrap();
//! gap.observe("A", "B", ActionId(0)).unwrap();
//!
//! let plan = gap.find_path(&"A", &"B").unwrap().unwrap();
//! assert_eq!(plan.next_action(), Some(ActionId(0)));
//! ```

pub mod config;
pub mod domain;
pub mod infra;
pub mod learner;

// Re-export core types
pub use config::LearnerConfig;
pub use domain::plan::Plan;
pub use domain::planner::{SearchTree, TransitionGraph};
pub use learner::GapLearner;

// Re-export infrastructure
pub use infra::shared::SharedLearner;

// Re-export shared identifiers and errors
pub use gap_common::{ActionId, GapError, Result, StateId};

/// GAP planner version
pub const GAP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_tracks_workspace() {
        assert_eq!(GAP_VERSION, gap_common::VERSION);
    }
}
