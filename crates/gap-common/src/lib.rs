//! # GAP Common
//!
//! Shared identifiers and errors for the GAP transition-graph learner.
//!
//! ## Core Types
//!
//! - [`StateId`]: dense id of a discovered state, assigned in discovery order
//! - [`ActionId`]: id of an action in the fixed range `[0, A)`
//! - [`GapError`]: unified error for contract violations and growth failures

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{GapError, Result};
pub use types::ids::{ActionId, StateId};

/// GAP version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default action space size (four-way grid moves)
pub const DEFAULT_ACTION_COUNT: usize = 4;

/// Default initial state-space capacity
pub const DEFAULT_INITIAL_CAPACITY: usize = 120;

/// Default edge admission threshold (τ)
pub const DEFAULT_EDGE_THRESHOLD: f64 = 0.5;

/// Default observation count that triggers a rescale
pub const DEFAULT_RESCALE_THRESHOLD: f64 = 55.0;

/// Default count a rescaled row is pinned back to
pub const DEFAULT_RESCALE_RESET: f64 = 50.0;
