//! Tic-tac-toe games for the search engine.
//!
//! - [`TicTacToe`]: plain n×n tic-tac-toe (3×3 by default)
//! - [`NestedTicTacToe`]: nine 3×3 local boards on a 9×9 grid, won on a
//!   3×3 [`MetaBoard`] of local results
//!
//! Both implement [`uttt_core::Game`] with a trailing pass action and the
//! eight board symmetries.

mod board;
mod classic;
mod nested;
mod symmetry;

pub use board::Board;
pub use classic::TicTacToe;
pub use nested::{MetaBoard, MetaCell, NestedState, NestedTicTacToe};
pub use symmetry::Symmetry;
