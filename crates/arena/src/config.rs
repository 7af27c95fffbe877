//! Run configuration for arena matches.
//!
//! An optional TOML file fills [`ArenaConfig`]; missing keys keep their
//! defaults, and the CLI applies its flags on top.
//!
//! ```toml
//! games = 40
//! seed = 7
//! board = "nested"
//!
//! [agent_one]
//! kind = "mcts-rollout"
//!
//! [agent_one.mcts]
//! num_simulations = 50
//! temperature = 0.0
//!
//! [agent_two]
//! kind = "random"
//! ```

use crate::error::{ArenaError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};
use uttt_mcts::MctsConfig;

/// Which game the arena plays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BoardKind {
    /// 9x9 nested tic-tac-toe.
    #[default]
    Nested,
    /// Plain 3x3 tic-tac-toe.
    Classic,
}

/// How an agent picks its moves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AgentKind {
    /// Uniform over valid moves.
    #[default]
    Random,
    /// MCTS with uniform priors and a neutral value.
    MctsUniform,
    /// MCTS with random-playout values.
    MctsRollout,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub kind: AgentKind,

    /// Search settings, ignored by random agents.
    pub mcts: MctsConfig,

    /// Playout cap for `mcts-rollout`.
    pub rollout_depth: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            kind: AgentKind::Random,
            mcts: MctsConfig::default(),
            rollout_depth: 81,
        }
    }
}

impl AgentConfig {
    pub fn random() -> Self {
        Self::default()
    }

    /// Greedy MCTS agent backed by rollouts.
    pub fn mcts_rollout(num_simulations: usize) -> Self {
        Self {
            kind: AgentKind::MctsRollout,
            mcts: MctsConfig::for_evaluation(num_simulations),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Total games; the first mover alternates every game.
    pub games: usize,
    pub seed: u64,
    pub board: BoardKind,
    pub agent_one: AgentConfig,
    pub agent_two: AgentConfig,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            games: 40,
            seed: 42,
            board: BoardKind::Nested,
            agent_one: AgentConfig::mcts_rollout(50),
            agent_two: AgentConfig::random(),
        }
    }
}

impl ArenaConfig {
    /// Parse a config from TOML text. The path is only used in errors.
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| ArenaError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ArenaError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loading config from {}", path.display());
        Self::from_toml_str(&content, path)
    }

    /// Load `path` if given, otherwise fall back to built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                debug!("No config file given, using built-in defaults");
                Ok(Self::default())
            }
        }
    }
}
