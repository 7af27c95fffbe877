//! Dihedral symmetries of a square grid.
//!
//! The group has 8 elements: 4 quarter-turn rotations, each optionally
//! followed by a left-right mirror.

/// One element of the dihedral group of the square.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Symmetry {
    /// Counter-clockwise quarter turns (0-3).
    rotations: u8,
    /// Mirror left-right after rotating.
    mirror: bool,
}

impl Symmetry {
    pub const IDENTITY: Symmetry = Symmetry {
        rotations: 0,
        mirror: false,
    };

    /// All 8 symmetries, identity first.
    pub fn all() -> [Symmetry; 8] {
        let mut out = [Self::IDENTITY; 8];
        for rotations in 0..4u8 {
            for (k, mirror) in [false, true].into_iter().enumerate() {
                out[rotations as usize * 2 + k] = Symmetry { rotations, mirror };
            }
        }
        out
    }

    /// Where the cell at (row, col) of an n×n grid ends up.
    pub fn map(self, n: usize, row: usize, col: usize) -> (usize, usize) {
        let (mut r, mut c) = (row, col);
        for _ in 0..self.rotations {
            (r, c) = (n - 1 - c, r);
        }
        if self.mirror {
            c = n - 1 - c;
        }
        (r, c)
    }

    /// Permute a row-major n×n grid.
    pub fn apply<T: Copy>(self, n: usize, cells: &[T]) -> Vec<T> {
        debug_assert_eq!(cells.len(), n * n);
        let mut out = cells.to_vec();
        for row in 0..n {
            for col in 0..n {
                let (r, c) = self.map(n, row, col);
                out[r * n + c] = cells[row * n + col];
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_all_distinct() {
        let cells: Vec<u8> = (0..9).collect();
        let images: HashSet<Vec<u8>> = Symmetry::all()
            .iter()
            .map(|s| s.apply(3, &cells))
            .collect();
        assert_eq!(images.len(), 8);
    }

    #[test]
    fn test_identity() {
        let cells: Vec<u8> = (0..16).collect();
        assert_eq!(Symmetry::IDENTITY.apply(4, &cells), cells);
        assert_eq!(Symmetry::all()[0], Symmetry::IDENTITY);
    }

    #[test]
    fn test_quarter_turn() {
        // 0 1 2      2 5 8
        // 3 4 5  ->  1 4 7
        // 6 7 8      0 3 6
        let cells: Vec<u8> = (0..9).collect();
        let quarter = Symmetry {
            rotations: 1,
            mirror: false,
        };
        assert_eq!(quarter.apply(3, &cells), vec![2, 5, 8, 1, 4, 7, 0, 3, 6]);
    }

    #[test]
    fn test_mirror() {
        let cells: Vec<u8> = (0..9).collect();
        let mirror = Symmetry {
            rotations: 0,
            mirror: true,
        };
        assert_eq!(mirror.apply(3, &cells), vec![2, 1, 0, 5, 4, 3, 8, 7, 6]);
    }

    #[test]
    fn test_map_preserves_block_structure() {
        // Cells of one 3x3 block of a 9x9 grid stay together under every symmetry.
        for sym in Symmetry::all() {
            let blocks: HashSet<(usize, usize)> = (3..6)
                .flat_map(|r| (0..3).map(move |c| (r, c)))
                .map(|(r, c)| {
                    let (r2, c2) = sym.map(9, r, c);
                    (r2 / 3, c2 / 3)
                })
                .collect();
            assert_eq!(blocks.len(), 1);
        }
    }
}
