//! Nested ("ultimate") tic-tac-toe.
//!
//! A 9×9 board split into nine 3×3 local boards. Winning a local board
//! claims the matching cell of a 3×3 meta-board; three meta-cells in a line
//! win the game. A move at (row, col) sends the opponent to the local board
//! at (row % 3, col % 3), unless that board is already decided, in which
//! case any undecided local board is open.

use std::fmt;

use crate::board::Board;
use crate::symmetry::Symmetry;
use uttt_core::{ActionMask, Game, GameError, GameOutcome, Player, Result};

/// Side length of the full board.
pub const SIZE: usize = 9;
/// Side length of a local board and of the meta-board.
pub const LOCAL: usize = 3;

/// Summary of one local board.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub enum MetaCell {
    #[default]
    Open,
    Won(Player),
    Drawn,
}

impl MetaCell {
    pub fn is_decided(self) -> bool {
        self != MetaCell::Open
    }

    fn negated(self) -> Self {
        match self {
            MetaCell::Won(p) => MetaCell::Won(p.opponent()),
            other => other,
        }
    }

    /// Summarise a finished local board; `Open` while it is still in play.
    fn of(local: &Board) -> Self {
        match local.winner() {
            Some(p) => MetaCell::Won(p),
            None if local.is_full() => MetaCell::Drawn,
            None => MetaCell::Open,
        }
    }
}

/// The 3×3 board of local-board results.
///
/// Once a cell is decided it is never re-derived from its local board.
#[derive(Clone, PartialEq, Eq, Debug, Hash, Default)]
pub struct MetaBoard {
    cells: [MetaCell; LOCAL * LOCAL],
}

impl MetaBoard {
    pub fn get(&self, row: usize, col: usize) -> MetaCell {
        self.cells[row * LOCAL + col]
    }

    fn set(&mut self, row: usize, col: usize, cell: MetaCell) {
        self.cells[row * LOCAL + col] = cell;
    }

    /// The meta-board as a 3×3 game board. Drawn cells belong to nobody and
    /// count as filled.
    fn as_board(&self) -> Board {
        let mut board = Board::new(LOCAL);
        for (i, cell) in self.cells.iter().enumerate() {
            if let MetaCell::Won(p) = cell {
                board = board.with_stone(i / LOCAL, i % LOCAL, *p);
            }
        }
        board
    }

    /// Result of the whole game from `player`'s perspective.
    pub fn outcome(&self, player: Player) -> GameOutcome {
        let board = self.as_board();
        if board.is_win(player) {
            GameOutcome::Win
        } else if board.is_win(player.opponent()) {
            GameOutcome::Loss
        } else if self.cells.iter().any(|c| !c.is_decided()) {
            GameOutcome::Ongoing
        } else {
            GameOutcome::Draw
        }
    }

    fn negated(&self) -> Self {
        Self {
            cells: self.cells.map(MetaCell::negated),
        }
    }
}

/// A nested tic-tac-toe position.
///
/// Carries the last move so the active-board rule can be derived, and the
/// meta-board so decided local boards stay frozen.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct NestedState {
    board: Board,
    meta: MetaBoard,
    last_move: Option<(usize, usize)>,
}

impl NestedState {
    /// Empty board, no move played.
    pub fn new() -> Self {
        Self {
            board: Board::new(SIZE),
            meta: MetaBoard::default(),
            last_move: None,
        }
    }

    /// Build a position from a 9×9 board, deriving the meta-board from the
    /// local boards.
    ///
    /// # Errors
    /// Returns `GameError::InvalidBoard` if the board is not 9×9 or the last
    /// move is off the board.
    pub fn from_board(board: Board, last_move: Option<(usize, usize)>) -> Result<Self> {
        if board.size() != SIZE {
            return Err(GameError::InvalidBoard(format!(
                "nested board must be {}x{}, got {}x{}",
                SIZE,
                SIZE,
                board.size(),
                board.size()
            )));
        }
        if let Some((row, col)) = last_move {
            if row >= SIZE || col >= SIZE {
                return Err(GameError::InvalidBoard(format!(
                    "last move ({}, {}) is off the board",
                    row, col
                )));
            }
        }

        let mut meta = MetaBoard::default();
        for br in 0..LOCAL {
            for bc in 0..LOCAL {
                meta.set(br, bc, MetaCell::of(&local_board(&board, br, bc)));
            }
        }

        Ok(Self {
            board,
            meta,
            last_move,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn meta(&self) -> &MetaBoard {
        &self.meta
    }

    pub fn last_move(&self) -> Option<(usize, usize)> {
        self.last_move
    }

    /// The local board at meta coordinates (row, col).
    pub fn local_board(&self, row: usize, col: usize) -> Board {
        local_board(&self.board, row, col)
    }

    /// The local board the next move is restricted to, if the restriction
    /// is in force.
    pub fn active_board(&self) -> Option<(usize, usize)> {
        let (row, col) = self.last_move?;
        let target = (row % LOCAL, col % LOCAL);
        let open = !self.meta.get(target.0, target.1).is_decided()
            && self.local_board(target.0, target.1).has_legal_moves();
        open.then_some(target)
    }

    fn place(&self, row: usize, col: usize, player: Player) -> Self {
        let board = self.board.with_stone(row, col, player);
        let mut meta = self.meta.clone();
        let (br, bc) = (row / LOCAL, col / LOCAL);
        if !meta.get(br, bc).is_decided() {
            meta.set(br, bc, MetaCell::of(&local_board(&board, br, bc)));
        }
        Self {
            board,
            meta,
            last_move: Some((row, col)),
        }
    }
}

impl Default for NestedState {
    fn default() -> Self {
        Self::new()
    }
}

fn local_board(board: &Board, row: usize, col: usize) -> Board {
    board.sub_board(row * LOCAL, col * LOCAL, LOCAL)
}

impl fmt::Display for NestedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..SIZE {
            if row > 0 && row % LOCAL == 0 {
                writeln!(f, "------+-------+------")?;
            }
            for col in 0..SIZE {
                if col > 0 {
                    if col % LOCAL == 0 {
                        write!(f, " | ")?;
                    } else {
                        write!(f, " ")?;
                    }
                }
                match self.board.get(row, col) {
                    Some(p) => write!(f, "{}", p)?,
                    None => write!(f, "-")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Nested tic-tac-toe game rules.
#[derive(Clone, Debug, Default)]
pub struct NestedTicTacToe;

impl NestedTicTacToe {
    /// Empty cells of every undecided local board.
    fn open_cells(&self, state: &NestedState, mask: &mut ActionMask) {
        for br in 0..LOCAL {
            for bc in 0..LOCAL {
                if !state.meta.get(br, bc).is_decided() {
                    self.local_cells(state, br, bc, mask);
                }
            }
        }
    }

    fn local_cells(&self, state: &NestedState, br: usize, bc: usize, mask: &mut ActionMask) {
        for r in br * LOCAL..(br + 1) * LOCAL {
            for c in bc * LOCAL..(bc + 1) * LOCAL {
                if state.board.get(r, c).is_none() {
                    mask.set(r * SIZE + c);
                }
            }
        }
    }
}

impl Game for NestedTicTacToe {
    type State = NestedState;

    fn initial_state(&self) -> Self::State {
        NestedState::new()
    }

    fn board_size(&self) -> (usize, usize) {
        (SIZE, SIZE)
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

        Ok((state.place(action / SIZE, action % SIZE, player), player.opponent()))
    }

    fn valid_moves(&self, state: &Self::State, _player: Player) -> ActionMask {
        let mut mask = ActionMask::empty(self.action_size());
        match state.active_board() {
            Some((br, bc)) => self.local_cells(state, br, bc, &mut mask),
            None => self.open_cells(state, &mut mask),
        }

        if mask.count() == 0 {
            return ActionMask::pass_only(self.action_size());
        }
        mask
    }

    fn game_ended(&self, state: &Self::State, player: Player) -> GameOutcome {
        state.meta.outcome(player)
    }

    fn canonical_form(&self, state: &Self::State, player: Player) -> Self::State {
        match player {
            Player::X => state.clone(),
            Player::O => NestedState {
                board: state.board.negated(),
                meta: state.meta.negated(),
                last_move: state.last_move,
            },
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

        let (cells, pass) = policy.split_at(SIZE * SIZE);
        Ok(Symmetry::all()
            .into_iter()
            .map(|sym| {
                let transformed = NestedState {
                    board: state.board.transformed(sym),
                    meta: MetaBoard {
                        cells: to_array(sym.apply(LOCAL, &state.meta.cells)),
                    },
                    last_move: state.last_move.map(|(r, c)| sym.map(SIZE, r, c)),
                };
                let mut pi = sym.apply(SIZE, cells);
                pi.push(pass[0]);
                (transformed, pi)
            })
            .collect())
    }

    fn string_key(&self, state: &Self::State) -> Vec<u8> {
        let mut key = Vec::with_capacity(SIZE * SIZE + LOCAL * LOCAL + 2);
        state.board.write_key(&mut key);
        key.extend(state.meta.cells.iter().map(|c| match c {
            MetaCell::Open => 0u8,
            MetaCell::Won(Player::X) => 1,
            MetaCell::Won(Player::O) => 2,
            MetaCell::Drawn => 3,
        }));
        match state.last_move {
            Some((r, c)) => key.extend([r as u8, c as u8]),
            None => key.extend([u8::MAX, u8::MAX]),
        }
        key
    }
}

fn to_array(cells: Vec<MetaCell>) -> [MetaCell; LOCAL * LOCAL] {
    let mut out = [MetaCell::Open; LOCAL * LOCAL];
    out.copy_from_slice(&cells);
    out
}
