use thiserror::Error;
use uttt_core::{GameError, GameOutcome};

/// Errors that can occur during MCTS search.
#[derive(Debug, Error, PartialEq)]
pub enum SearchError {
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("Cannot search a finished position ({0})")]
    TerminalRoot(GameOutcome),
}

/// Convenience Result type for search operations
pub type Result<T> = std::result::Result<T, SearchError>;
