//! Core game abstractions and common types
//!
//! This crate provides the [`Game`] trait that any two-player zero-sum
//! board game implements to be searchable by the MCTS engine.
//!
//! # Types
//!
//! - [`Game`] - Trait for game implementations
//! - [`Player`] - The two signed sides
//! - [`GameOutcome`] - Terminal result from one side's perspective
//! - [`ActionMask`] - Legal actions over the flattened action space
//! - [`Policy`] - Probability distribution over actions (sums to 1.0)
//! - [`Value`] - Game value estimate in [-1, 1]

mod error;
mod game;
mod types;

pub use error::{GameError, Result};
pub use game::Game;
pub use types::{ActionMask, GameOutcome, Player, Policy, Value, DRAW_VALUE};
