//! Error types for arena runs.

use std::path::PathBuf;
use thiserror::Error;
use uttt_core::GameError;
use uttt_mcts::SearchError;

#[derive(Error, Debug)]
pub enum ArenaError {
    /// An agent picked an illegal move, or the game rejected a transition.
    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("failed to read config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ArenaError>;
