use thiserror::Error;

/// Errors raised by game implementations and the shared value types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("Invalid action {action} (action space size {action_size})")]
    InvalidAction { action: usize, action_size: usize },

    #[error("Policy length {actual} does not match action space size {expected}")]
    PolicyLengthMismatch { expected: usize, actual: usize },

    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid board: {0}")]
    InvalidBoard(String),
}

/// Convenience Result type for game operations
pub type Result<T> = std::result::Result<T, GameError>;
