//! Core identifier types for the GAP learner

pub mod ids;
