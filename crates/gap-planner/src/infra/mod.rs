//! GAP infrastructure
//!
//! Table storage and the thread-safe learner handle.

pub mod arena;
pub mod shared;
