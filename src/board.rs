//! Board value type and record coordinates.
//!
//! Cells are addressed row-major: `pt = y * size + x`, with `(0, 0)` the
//! top-left corner. This is the frame used by game records (`aa` is the
//! top-left point), position strings and the joseki index alike.

use std::fmt;

use crate::constants::{COORD_ALPHABET, DELTA, MAX_SIZE};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Numeric occupancy: black is +1, white is -1.
    pub fn sign(self) -> i8 {
        match self {
            Color::Black => 1,
            Color::White => -1,
        }
    }

    /// Row of this color in per-color tables.
    pub fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }

    /// Color of a record move property (`B` or `W`).
    pub fn from_property(name: &str) -> Option<Color> {
        match name {
            "B" => Some(Color::Black),
            "W" => Some(Color::White),
            _ => None,
        }
    }
}

/// A cell index.
pub type Point = usize;

/// A square grid of cells, each empty or holding one stone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<Option<Color>>,
    stones: usize,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
            stones: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of cells.
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    /// Number of stones on the board.
    pub fn stones(&self) -> usize {
        self.stones
    }

    pub fn is_empty(&self) -> bool {
        self.stones == 0
    }

    /// Contents of `pt`; points off the board read as empty.
    #[inline]
    pub fn get(&self, pt: Point) -> Option<Color> {
        self.cells.get(pt).copied().flatten()
    }

    /// Overwrite `pt` and return what was there.
    ///
    /// Points off the board are ignored.
    pub fn set(&mut self, pt: Point, value: Option<Color>) -> Option<Color> {
        let Some(cell) = self.cells.get_mut(pt) else {
            return None;
        };
        let previous = std::mem::replace(cell, value);
        match (previous.is_some(), value.is_some()) {
            (false, true) => self.stones += 1,
            (true, false) => self.stones -= 1,
            _ => {}
        }
        previous
    }

    /// Change the board size. Only an empty board can be resized.
    pub fn resize(&mut self, size: usize) -> bool {
        if !self.is_empty() {
            return false;
        }
        if size != self.size {
            *self = Board::new(size);
        }
        true
    }

    pub fn xy(&self, pt: Point) -> (usize, usize) {
        (pt % self.size, pt / self.size)
    }

    pub fn point(&self, x: usize, y: usize) -> Option<Point> {
        (x < self.size && y < self.size).then(|| y * self.size + x)
    }

    /// Orthogonal neighbors of `pt` that lie on the board.
    ///
    /// Neighbors never wrap: the last cell of a row is not adjacent to the
    /// first cell of the next one.
    pub fn neighbors(&self, pt: Point) -> impl Iterator<Item = Point> + '_ {
        let (x, y) = self.xy(pt);
        DELTA.iter().filter_map(move |&(dx, dy)| {
            let nx = x.checked_add_signed(dx)?;
            let ny = y.checked_add_signed(dy)?;
            self.point(nx, ny)
        })
    }

    /// All stones with their points, in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (Point, Color)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(pt, c)| c.map(|c| (pt, c)))
    }
}

/// Parse a two-letter record coordinate (`"dd"`) into a point.
///
/// The first letter is the column, the second the row. Returns `None` for
/// anything that is not two letters naming a point on a `size` board,
/// including the empty string records use for a pass.
pub fn parse_point(s: &str, size: usize) -> Option<Point> {
    let &[col, row] = s.as_bytes() else {
        return None;
    };
    let x = COORD_ALPHABET.iter().position(|&c| c == col)?;
    let y = COORD_ALPHABET.iter().position(|&c| c == row)?;
    (x < size && y < size && size <= MAX_SIZE).then(|| y * size + x)
}

/// Format a point as a two-letter record coordinate.
pub fn format_point(pt: Point, size: usize) -> String {
    let letter = |i: usize| COORD_ALPHABET.get(i).map_or('?', |&c| c as char);
    format!("{}{}", letter(pt % size), letter(pt / size))
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size {
            for x in 0..self.size {
                let ch = match self.get(y * self.size + x) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
