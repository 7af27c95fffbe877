//! MCTS configuration parameters.
//!
//! These parameters control the behavior of the Monte Carlo Tree Search
//! algorithm. The configuration is an immutable value handed to the engine
//! at construction.

use serde::{Deserialize, Serialize};

/// MCTS configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Number of simulations per search.
    pub num_simulations: usize,

    /// PUCT exploration constant.
    /// UCB(s, a) = Q(s, a) + cpuct * P(s, a) * sqrt(sum_b N(s, b)) / (1 + N(s, a))
    pub cpuct: f32,

    /// Temperature for action selection.
    /// - 0.0: always pick highest visit count (greedy)
    /// - 1.0: sample proportional to visit counts
    /// - >1.0: more uniform distribution
    /// - <1.0: more peaked distribution
    pub temperature: f32,

    /// Move number at which to drop temperature to 0 (greedy).
    /// Set to 0 to always use the configured temperature.
    pub temperature_drop_move: usize,

    /// Dirichlet noise alpha (for root exploration).
    /// Higher values = more uniform noise, lower = more concentrated.
    pub dirichlet_alpha: f32,

    /// Fraction of the root prior replaced with Dirichlet noise.
    /// 0 = no exploration noise, 1 = pure noise.
    pub exploration_fraction: f32,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: 25,
            cpuct: 1.0,
            temperature: 1.0,
            temperature_drop_move: 15,
            dirichlet_alpha: 0.3,
            exploration_fraction: 0.0,
        }
    }
}

impl MctsConfig {
    /// Create a new config with the specified number of simulations.
    pub fn with_simulations(num_simulations: usize) -> Self {
        Self {
            num_simulations,
            ..Default::default()
        }
    }

    /// Create a config for evaluation (greedy action selection).
    pub fn for_evaluation(num_simulations: usize) -> Self {
        Self {
            num_simulations,
            temperature: 0.0,
            temperature_drop_move: 0,
            exploration_fraction: 0.0,
            ..Default::default()
        }
    }

    /// Get the effective temperature for a given move number.
    pub fn effective_temperature(&self, move_number: usize) -> f32 {
        if self.temperature_drop_move > 0 && move_number >= self.temperature_drop_move {
            0.0
        } else {
            self.temperature
        }
    }

    /// Whether root noise is enabled.
    pub fn uses_root_noise(&self) -> bool {
        self.exploration_fraction > 0.0 && self.dirichlet_alpha > 0.0
    }
}
