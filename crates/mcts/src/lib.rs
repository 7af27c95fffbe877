//! Memoised Monte Carlo Tree Search.
//!
//! The engine works with any [`uttt_core::Game`]: every state it visits is
//! first put in canonical form (player to move = X), so a single table of
//! statistics keyed by [`Game::string_key`](uttt_core::Game::string_key)
//! serves both sides.
//!
//! # Features
//!
//! - **PUCT selection** over priors supplied by an [`Evaluator`]
//! - **Memoisation** that persists across searches until [`Mcts::clear`]
//! - **Root noise**: optional Dirichlet mixing, off by default
//! - **Temperature readout** from root visit counts
//!
//! # Example
//!
//! ```
//! use uttt_core::{Game, Player};
//! use uttt_mcts::{Mcts, MctsConfig, RolloutEvaluator};
//! use uttt_tictactoe::NestedTicTacToe;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let game = NestedTicTacToe;
//! let state = game.initial_state();
//!
//! let config = MctsConfig::with_simulations(50);
//! let rng = ChaCha8Rng::seed_from_u64(42);
//! let evaluator = RolloutEvaluator::new(rng.clone(), 81);
//! let mut mcts = Mcts::new(config, evaluator, rng);
//!
//! let result = mcts.search(&game, &state, Player::X).expect("root is not terminal");
//! println!("Best action: {}", result.best_action);
//! println!("Root value: {}", result.typed_value());
//! ```

pub mod config;
pub mod error;
pub mod evaluator;
mod node;
pub mod search;
mod tree;

pub use config::MctsConfig;
pub use error::{Result, SearchError};
pub use evaluator::{Evaluation, Evaluator, RolloutEvaluator, UniformEvaluator};
pub use search::{Mcts, SearchResult};
