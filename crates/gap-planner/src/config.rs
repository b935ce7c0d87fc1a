//! Learner configuration

use anyhow::{Context, Result};
use gap_common::GapError;
use serde::{Deserialize, Serialize};

/// Construction parameters of a [`GapLearner`](crate::GapLearner)
///
/// Fixed once the learner is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerConfig {
    /// States the tables are sized for up front
    pub initial_capacity: usize,
    /// Size of the action space `A`
    pub action_count: usize,
    /// Edge admission threshold τ in (0, 1)
    pub edge_threshold: f64,
    /// Action total at which a counter row is rescaled
    pub rescale_threshold: f64,
    /// Value a rescaled action total is pinned back to
    pub rescale_reset: f64,
    /// Optional upper bound on the number of states
    pub max_states: Option<usize>,
    /// Optional upper bound on the search frontier size
    pub max_frontier: Option<usize>,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            initial_capacity: gap_common::DEFAULT_INITIAL_CAPACITY,
            action_count: gap_common::DEFAULT_ACTION_COUNT,
            edge_threshold: gap_common::DEFAULT_EDGE_THRESHOLD,
            rescale_threshold: gap_common::DEFAULT_RESCALE_THRESHOLD,
            rescale_reset: gap_common::DEFAULT_RESCALE_RESET,
            max_states: None,
            max_frontier: None,
        }
    }
}

impl LearnerConfig {
    /// Configuration for an action space of `action_count` actions
    pub fn new(action_count: usize) -> Self {
        Self {
            action_count,
            ..Self::default()
        }
    }

    /// Load configuration from environment and `.env`
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();

        if let Some(v) = env_parse("GAP_INITIAL_CAPACITY")? {
            cfg.initial_capacity = v;
        }
        if let Some(v) = env_parse("GAP_ACTION_COUNT")? {
            cfg.action_count = v;
        }
        if let Some(v) = env_parse("GAP_EDGE_THRESHOLD")? {
            cfg.edge_threshold = v;
        }
        if let Some(v) = env_parse("GAP_RESCALE_THRESHOLD")? {
            cfg.rescale_threshold = v;
        }
        if let Some(v) = env_parse("GAP_RESCALE_RESET")? {
            cfg.rescale_reset = v;
        }
        if let Some(v) = env_parse("GAP_MAX_STATES")? {
            cfg.max_states = Some(v);
        }
        if let Some(v) = env_parse("GAP_MAX_FRONTIER")? {
            cfg.max_frontier = Some(v);
        }

        cfg.validate().context("invalid GAP configuration")?;
        Ok(cfg)
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_edge_threshold(mut self, threshold: f64) -> Self {
        self.edge_threshold = threshold;
        self
    }

    /// Rescale rows reaching `threshold` observations back to `reset`
    pub fn with_rescale(mut self, threshold: f64, reset: f64) -> Self {
        self.rescale_threshold = threshold;
        self.rescale_reset = reset;
        self
    }

    pub fn with_max_states(mut self, max_states: usize) -> Self {
        self.max_states = Some(max_states);
        self
    }

    pub fn with_max_frontier(mut self, max_frontier: usize) -> Self {
        self.max_frontier = Some(max_frontier);
        self
    }

    /// Check parameter ranges
    pub fn validate(&self) -> gap_common::Result<()> {
        if self.action_count == 0 {
            return Err(GapError::Config("action_count must be at least 1".into()));
        }
        if self.action_count > u32::MAX as usize {
            return Err(GapError::Config("action_count exceeds u32 range".into()));
        }
        if !(self.edge_threshold > 0.0 && self.edge_threshold < 1.0) {
            return Err(GapError::Config(format!(
                "edge_threshold must lie in (0, 1), got {}",
                self.edge_threshold
            )));
        }
        if !(self.rescale_reset > 0.0) {
            return Err(GapError::Config(format!(
                "rescale_reset must be positive, got {}",
                self.rescale_reset
            )));
        }
        if !(self.rescale_reset <= self.rescale_threshold) {
            return Err(GapError::Config(format!(
                "rescale_reset {} exceeds rescale_threshold {}",
                self.rescale_reset, self.rescale_threshold
            )));
        }
        if self.max_states == Some(0) {
            return Err(GapError::Config("max_states must be at least 1".into()));
        }
        if self.max_frontier == Some(0) {
            return Err(GapError::Config("max_frontier must be at least 1".into()));
        }
        Ok(())
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("failed to parse {key}={raw}")),
        Err(_) => Ok(None),
    }
}
