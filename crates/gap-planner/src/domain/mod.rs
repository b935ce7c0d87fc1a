//! GAP domain logic
//!
//! Label registry, transition counters, best-action cache, adjacency and
//! the most-probable-path planner.

pub mod adjacency;
pub mod best_action;
pub mod plan;
pub mod planner;
pub mod registry;
pub mod transition;
