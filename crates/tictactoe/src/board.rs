//! Square grid of cells with line-win detection.

use std::fmt;
use uttt_core::{GameError, GameOutcome, Player, Result};

use crate::symmetry::Symmetry;

/// An n×n grid, row-major. A cell holds the player whose stone occupies it.
///
/// ```text
///  0 | 1 | 2
/// -----------
///  3 | 4 | 5
/// -----------
///  6 | 7 | 8
/// ```
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct Board {
    n: usize,
    cells: Vec<Option<Player>>,
}

impl Board {
    /// Create an empty n×n board.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            cells: vec![None; n * n],
        }
    }

    /// Build a board from row-major cells.
    ///
    /// # Errors
    /// Returns `GameError::InvalidBoard` if `cells.len() != n * n`.
    pub fn from_cells(n: usize, cells: Vec<Option<Player>>) -> Result<Self> {
        if cells.len() != n * n {
            return Err(GameError::InvalidBoard(format!(
                "expected {} cells for a {}x{} board, got {}",
                n * n,
                n,
                n,
                cells.len()
            )));
        }
        Ok(Self { n, cells })
    }

    /// Build a board from signed cells (`1`, `-1`, `0`).
    ///
    /// # Errors
    /// Returns `GameError::InvalidBoard` on a wrong length or a value other
    /// than -1, 0 or 1.
    pub fn from_signs(n: usize, signs: &[i8]) -> Result<Self> {
        let cells = signs
            .iter()
            .map(|&s| match s {
                0 => Ok(None),
                _ => Player::from_sign(s)
                    .map(Some)
                    .ok_or_else(|| GameError::InvalidBoard(format!("invalid cell value {}", s))),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_cells(n, cells)
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.n
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Player> {
        self.cells[row * self.n + col]
    }

    pub fn cells(&self) -> &[Option<Player>] {
        &self.cells
    }

    /// Copy of this board with `player`'s stone at (row, col).
    pub fn with_stone(&self, row: usize, col: usize, player: Player) -> Self {
        let mut board = self.clone();
        board.cells[row * self.n + col] = Some(player);
        board
    }

    /// Empty cells as (row, col), row-major.
    pub fn legal_moves(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(i, _)| (i / self.n, i % self.n))
            .collect()
    }

    pub fn has_legal_moves(&self) -> bool {
        self.cells.iter().any(|c| c.is_none())
    }

    pub fn is_full(&self) -> bool {
        !self.has_legal_moves()
    }

    /// True if `player` holds a complete row, column or diagonal.
    pub fn is_win(&self, player: Player) -> bool {
        let n = self.n;
        let owns = |r: usize, c: usize| self.get(r, c) == Some(player);

        (0..n).any(|r| (0..n).all(|c| owns(r, c)))
            || (0..n).any(|c| (0..n).all(|r| owns(r, c)))
            || (0..n).all(|i| owns(i, i))
            || (0..n).all(|i| owns(i, n - 1 - i))
    }

    /// The player holding a complete line, if any.
    pub fn winner(&self) -> Option<Player> {
        [Player::X, Player::O].into_iter().find(|&p| self.is_win(p))
    }

    /// Outcome of this grid as a standalone game, from `player`'s perspective.
    pub fn outcome(&self, player: Player) -> GameOutcome {
        if self.is_win(player) {
            GameOutcome::Win
        } else if self.is_win(player.opponent()) {
            GameOutcome::Loss
        } else if self.has_legal_moves() {
            GameOutcome::Ongoing
        } else {
            GameOutcome::Draw
        }
    }

    /// Every stone's owner swapped.
    pub fn negated(&self) -> Self {
        Self {
            n: self.n,
            cells: self.cells.iter().map(|c| c.map(Player::opponent)).collect(),
        }
    }

    /// The `size`×`size` window whose top-left corner is (row, col).
    pub fn sub_board(&self, row: usize, col: usize, size: usize) -> Self {
        let mut cells = Vec::with_capacity(size * size);
        for r in row..row + size {
            for c in col..col + size {
                cells.push(self.get(r, c));
            }
        }
        Self { n: size, cells }
    }

    /// This board under a dihedral transform.
    pub fn transformed(&self, symmetry: Symmetry) -> Self {
        Self {
            n: self.n,
            cells: symmetry.apply(self.n, &self.cells),
        }
    }

    /// One byte per cell: 0 empty, 1 X, 2 O.
    pub(crate) fn write_key(&self, key: &mut Vec<u8>) {
        key.extend(self.cells.iter().map(|c| match c {
            None => 0u8,
            Some(Player::X) => 1,
            Some(Player::O) => 2,
        }));
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.n {
            for col in 0..self.n {
                if col > 0 {
                    write!(f, " ")?;
                }
                match self.get(row, col) {
                    Some(p) => write!(f, "{}", p)?,
                    None => write!(f, "-")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
