use crate::{ActionMask, GameOutcome, Player, Result};
use std::hash::Hash;

/// A two-player zero-sum board game as seen by the search engine.
///
/// States are immutable values: every transition builds a new state and
/// never touches the one it was derived from. The player to move is not
/// stored in the state; callers thread it alongside and it alternates on
/// every transition, including the pass action.
///
/// Actions are flattened cell indices `row * cols + col`, plus one extra
/// pass index (`rows * cols`) used when no cell is legal.
pub trait Game: Clone + Send + Sync {
    /// The board state (cells plus whatever move history the rules need).
    type State: Clone + Send + Eq + Hash;

    /// Returns the empty-board start state.
    fn initial_state(&self) -> Self::State;

    /// Board dimensions as `(rows, cols)`.
    fn board_size(&self) -> (usize, usize);

    /// Size of the action space, including the pass slot.
    fn action_size(&self) -> usize {
        let (rows, cols) = self.board_size();
        rows * cols + 1
    }

    /// Index of the pass action.
    fn pass_action(&self) -> usize {
        self.action_size() - 1
    }

    /// Applies `action` for `player`, returning the next state and the next
    /// player to move (always `player.opponent()`).
    ///
    /// # Errors
    /// Returns `GameError::InvalidAction` if the action's bit is unset in
    /// `valid_moves(state, player)`.
    fn next_state(
        &self,
        state: &Self::State,
        player: Player,
        action: usize,
    ) -> Result<(Self::State, Player)>;

    /// Legal actions for `player`: either a set of real cells, or the pass
    /// action alone when no cell is playable.
    fn valid_moves(&self, state: &Self::State, player: Player) -> ActionMask;

    /// Terminal outcome from `player`'s perspective.
    fn game_ended(&self, state: &Self::State, player: Player) -> GameOutcome;

    /// The state as seen by `player`: unchanged for `Player::X`, every
    /// stone's owner swapped for `Player::O`.
    fn canonical_form(&self, state: &Self::State, player: Player) -> Self::State;

    /// All (state, policy) pairs related by the board's symmetry group,
    /// identity included. The pass entry is carried through unchanged.
    ///
    /// # Errors
    /// Returns `GameError::PolicyLengthMismatch` if `policy.len()` differs
    /// from `action_size()`.
    fn symmetries(&self, state: &Self::State, policy: &[f32]) -> Result<Vec<(Self::State, Vec<f32>)>>;

    /// Collision-free serialization of a (canonical) state, used as the
    /// search cache key.
    fn string_key(&self, state: &Self::State) -> Vec<u8>;
}
