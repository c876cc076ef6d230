//! The eight symmetries of a square board.
//!
//! A transform maps a cell of the original board to the cell it lands on in
//! the transformed board. Indices 0-7 follow the order of [`Transform::ALL`].

use crate::board::Point;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Transform {
    /// 0: no change
    Identity,
    /// 1: mirror across the vertical axis
    MirrorX,
    /// 2: mirror across the horizontal axis
    MirrorY,
    /// 3: both mirrors (180 degree rotation)
    Rotate180,
    /// 4: quarter turn clockwise
    RotateRight,
    /// 5: quarter turn counter-clockwise
    RotateLeft,
    /// 6: quarter turn clockwise then mirror (main diagonal reflection)
    Transpose,
    /// 7: quarter turn counter-clockwise then mirror (anti-diagonal reflection)
    AntiTranspose,
}

impl Transform {
    pub const ALL: [Transform; 8] = [
        Transform::Identity,
        Transform::MirrorX,
        Transform::MirrorY,
        Transform::Rotate180,
        Transform::RotateRight,
        Transform::RotateLeft,
        Transform::Transpose,
        Transform::AntiTranspose,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Map column `x`, row `y` on a `size` board.
    #[inline]
    pub fn apply_xy(self, x: usize, y: usize, size: usize) -> (usize, usize) {
        let s = size - 1;
        match self {
            Transform::Identity => (x, y),
            Transform::MirrorX => (s - x, y),
            Transform::MirrorY => (x, s - y),
            Transform::Rotate180 => (s - x, s - y),
            Transform::RotateRight => (s - y, x),
            Transform::RotateLeft => (y, s - x),
            Transform::Transpose => (y, x),
            Transform::AntiTranspose => (s - y, s - x),
        }
    }

    /// Map a cell index on a `size` board.
    #[inline]
    pub fn apply(self, pt: Point, size: usize) -> Point {
        let (x, y) = self.apply_xy(pt % size, pt / size, size);
        y * size + x
    }
}
