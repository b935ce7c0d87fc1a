//! StateId / ActionId - dense identifiers used by every table
//!
//! States are numbered in discovery order starting at zero and are never
//! renumbered. Actions live in a fixed range `[0, A)` chosen when the
//! learner is built.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense, zero-based identifier of a discovered state
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StateId(pub u32);

impl StateId {
    /// Table index for this state
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Build an id from a table index
    ///
    /// Callers only produce indices below the registry length, which is
    /// bounded by `u32::MAX` at registration time.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl From<u32> for StateId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Identifier of an action in `[0, A)`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ActionId(pub u32);

impl ActionId {
    /// Table index for this action
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

impl From<u32> for ActionId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
