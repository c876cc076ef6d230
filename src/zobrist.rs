//! Zobrist hashing of board positions under the eight symmetries.
//!
//! A position hash is the XOR of one random key per stone, chosen by the
//! stone's color and its cell *after* applying a [`Transform`]. Because XOR
//! is order independent and self-inverse, the hash can be computed by a full
//! scan or kept up to date by toggling keys as stones come and go; both give
//! the same value for the same set of stones.
//!
//! Hashing board `P` under transform `t` gives the same value as hashing the
//! transformed board `t(P)` under the identity, which is what lets the joseki
//! index store every symmetric variant of an opening.

use std::sync::OnceLock;

use crate::board::{Board, Color, Point};
use crate::constants::{KEY_BITS, MAX_SIZE, ZOBRIST_SEED};
use crate::symmetry::Transform;

const TABLE_LEN: usize = 2 * MAX_SIZE * MAX_SIZE;

/// Per (color, cell) random keys, generated on first use.
///
/// Each key depends only on the seed and its slot, so tables built from the
/// same seed agree no matter in which order keys are first requested.
pub struct KeyTable {
    seed: u64,
    keys: Vec<OnceLock<u32>>,
}

impl Default for KeyTable {
    fn default() -> Self {
        Self::new(ZOBRIST_SEED)
    }
}

impl std::fmt::Debug for KeyTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let generated = self.keys.iter().filter(|k| k.get().is_some()).count();
        f.debug_struct("KeyTable")
            .field("seed", &self.seed)
            .field("generated", &generated)
            .finish()
    }
}

impl KeyTable {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            keys: (0..TABLE_LEN).map(|_| OnceLock::new()).collect(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn generate(&self, slot: usize) -> u32 {
        let mut rng =
            fastrand::Rng::with_seed(self.seed ^ (slot as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        rng.u32(..) >> (32 - KEY_BITS)
    }

    /// Key of a `color` stone on cell `pt`.
    #[inline]
    pub fn key(&self, color: Color, pt: Point) -> u32 {
        let slot = pt * 2 + color.index();
        match self.keys.get(slot) {
            Some(cell) => *cell.get_or_init(|| self.generate(slot)),
            None => self.generate(slot),
        }
    }

    /// XOR the key of `color` at `pt`, seen through `transform`, into `hash`.
    #[inline]
    pub fn toggle(&self, hash: u32, color: Color, pt: Point, size: usize, transform: Transform) -> u32 {
        hash ^ self.key(color, transform.apply(pt, size))
    }

    /// Hash every stone on `board` under `transform`.
    pub fn hash(&self, board: &Board, transform: Transform) -> u32 {
        self.hash_filtered(board, transform, |_| true).0
    }

    /// Hash the stones on cells accepted by `include`.
    ///
    /// Returns the hash together with the number of stones that went into it.
    pub fn hash_filtered(
        &self,
        board: &Board,
        transform: Transform,
        mut include: impl FnMut(Point) -> bool,
    ) -> (u32, usize) {
        let size = board.size();
        board
            .occupied()
            .filter(|&(pt, _)| include(pt))
            .fold((0, 0), |(hash, stones), (pt, color)| {
                (self.toggle(hash, color, pt, size, transform), stones + 1)
            })
    }
}

/// Hashes of one board under all eight transforms, maintained incrementally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SymmetricHash {
    hashes: [u32; 8],
}

impl SymmetricHash {
    /// Full scan of `board`.
    pub fn of(keys: &KeyTable, board: &Board) -> Self {
        let mut hashes = [0; 8];
        for t in Transform::ALL {
            hashes[t.index()] = keys.hash(board, t);
        }
        Self { hashes }
    }

    pub fn get(&self, transform: Transform) -> u32 {
        self.hashes[transform.index()]
    }

    /// Account for cell `pt` changing from `from` to `to`.
    pub fn update(
        &mut self,
        keys: &KeyTable,
        size: usize,
        pt: Point,
        from: Option<Color>,
        to: Option<Color>,
    ) {
        if from == to {
            return;
        }
        for t in Transform::ALL {
            let h = &mut self.hashes[t.index()];
            if let Some(color) = from {
                *h = keys.toggle(*h, color, pt, size, t);
            }
            if let Some(color) = to {
                *h = keys.toggle(*h, color, pt, size, t);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{place, UndoLog};

    #[test]
    fn test_keys_are_deterministic_and_order_independent() {
        let a = KeyTable::default();
        let b = KeyTable::default();
        // Request keys in opposite orders.
        let forward: Vec<u32> = (0..50).map(|pt| a.key(Color::Black, pt)).collect();
        let mut backward: Vec<u32> = (0..50).rev().map(|pt| b.key(Color::Black, pt)).collect();
        backward.reverse();
        assert_eq!(forward, backward);
        assert_ne!(a.key(Color::Black, 7), a.key(Color::White, 7));
        assert_ne!(KeyTable::new(1).key(Color::Black, 0), KeyTable::new(2).key(Color::Black, 0));
    }

    #[test]
    fn test_keys_fit_in_31_bits() {
        let keys = KeyTable::default();
        let mut any_high = false;
        for pt in 0..MAX_SIZE * MAX_SIZE {
            for color in [Color::Black, Color::White] {
                let k = keys.key(color, pt);
                assert!(k < 1 << 31);
                any_high |= k >= 1 << 30;
            }
        }
        assert!(any_high, "keys should span the full width");
    }

    #[test]
    fn test_empty_board_hashes_to_zero() {
        let keys = KeyTable::default();
        let board = Board::new(19);
        for t in Transform::ALL {
            assert_eq!(keys.hash(&board, t), 0);
        }
    }

    #[test]
    fn test_hash_of_transformed_board() {
        let keys = KeyTable::default();
        let size = 9;
        let mut board = Board::new(size);
        board.set(2, Some(Color::Black));
        board.set(12, Some(Color::White));
        board.set(40, Some(Color::Black));
        for t in Transform::ALL {
            let mut image = Board::new(size);
            for (pt, color) in board.occupied() {
                image.set(t.apply(pt, size), Some(color));
            }
            assert_eq!(keys.hash(&image, Transform::Identity), keys.hash(&board, t));
        }
    }

    #[test]
    fn test_hash_filtered_counts_stones() {
        let keys = KeyTable::default();
        let mut board = Board::new(9);
        board.set(0, Some(Color::Black));
        board.set(80, Some(Color::White));
        let (h, n) = keys.hash_filtered(&board, Transform::Identity, |pt| pt < 40);
        assert_eq!(n, 1);
        assert_eq!(h, keys.key(Color::Black, 0));
    }

    #[test]
    fn test_incremental_matches_full_scan() {
        let keys = KeyTable::default();
        let size = 9;
        let mut board = Board::new(size);
        let mut undo = UndoLog::new();
        let mut running = SymmetricHash::default();

        // Black surrounds and captures a white stone; every mutation in the
        // undo log is replayed into the running hashes.
        let moves = [
            (31, Color::Black),
            (40, Color::White),
            (39, Color::Black),
            (0, Color::White),
            (41, Color::Black),
            (1, Color::White),
            (49, Color::Black),
        ];
        for (pt, color) in moves {
            let mark = undo.len();
            place(&mut board, pt, color, &mut undo).unwrap();
            for entry in undo.since(mark) {
                running.update(&keys, size, entry.pt, entry.previous, board.get(entry.pt));
            }
            assert_eq!(running, SymmetricHash::of(&keys, &board));
        }
        assert_eq!(board.get(40), None);

        while let Some((entry, replaced)) = undo.undo_one(&mut board) {
            running.update(&keys, size, entry.pt, replaced, entry.previous);
            assert_eq!(running, SymmetricHash::of(&keys, &board));
        }
        assert_eq!(running, SymmetricHash::default());
    }
}
