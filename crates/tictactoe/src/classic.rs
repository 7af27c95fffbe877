//! Plain n×n tic-tac-toe.
//!
//! The 3×3 game is solved (perfect play draws), which makes it a useful
//! yardstick for the search engine before moving to the nested variant.

use crate::board::Board;
use crate::symmetry::Symmetry;
use uttt_core::{ActionMask, Game, GameError, GameOutcome, Player, Result};

/// n×n tic-tac-toe where a full row, column or diagonal wins.
#[derive(Clone, Debug)]
pub struct TicTacToe {
    n: usize,
}

impl TicTacToe {
    pub fn new(n: usize) -> Self {
        Self { n }
    }
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Game for TicTacToe {
    type State = Board;

    fn initial_state(&self) -> Self::State {
        Board::new(self.n)
    }

    fn board_size(&self) -> (usize, usize) {
        (self.n, self.n)
    }

    fn next_state(
        &self,
        state: &Self::State,
        player: Player,
        action: usize,
    ) -> Result<(Self::State, Player)> {
        if !self.valid_moves(state, player).is_set(action) {
            return Err(GameError::InvalidAction {
                action,
                action_size: self.action_size(),
            });
        }

        if action == self.pass_action() {
            return Ok((state.clone(), player.opponent()));
        }

        let next = state.with_stone(action / self.n, action % self.n, player);
        Ok((next, player.opponent()))
    }

    fn valid_moves(&self, state: &Self::State, _player: Player) -> ActionMask {
        let legal = state.legal_moves();
        if legal.is_empty() {
            return ActionMask::pass_only(self.action_size());
        }

        let mut mask = ActionMask::empty(self.action_size());
        for (row, col) in legal {
            mask.set(row * self.n + col);
        }
        mask
    }

    fn game_ended(&self, state: &Self::State, player: Player) -> GameOutcome {
        state.outcome(player)
    }

    fn canonical_form(&self, state: &Self::State, player: Player) -> Self::State {
        match player {
            Player::X => state.clone(),
            Player::O => state.negated(),
        }
    }

    fn symmetries(&self, state: &Self::State, policy: &[f32]) -> Result<Vec<(Self::State, Vec<f32>)>> {
        let expected = self.action_size();
        if policy.len() != expected {
            return Err(GameError::PolicyLengthMismatch {
                expected,
                actual: policy.len(),
            });
        }

        let (cells, pass) = policy.split_at(self.n * self.n);
        Ok(Symmetry::all()
            .into_iter()
            .map(|sym| {
                let mut pi = sym.apply(self.n, cells);
                pi.push(pass[0]);
                (state.transformed(sym), pi)
            })
            .collect())
    }

    fn string_key(&self, state: &Self::State) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.n * self.n);
        state.write_key(&mut key);
        key
    }
}
