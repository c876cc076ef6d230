//! Stone placement with captures, suicide rejection and exact undo.
//!
//! Every mutation [`place`] makes is recorded in an [`UndoLog`] as the
//! point and the value it held before, so any sequence of placements can be
//! rolled back bit for bit. Ko is not checked here: replaying recorded games
//! never needs it, and live positions carry their ko cell separately.

use std::fmt;

use crate::board::{Board, Color, Point};

/// Why a placement was rejected. The board is unchanged in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    /// Point is off the board
    OutOfBounds,
    /// Point is not empty
    Occupied,
    /// Move would leave its own group without liberties and captures nothing
    Suicide,
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::OutOfBounds => write!(f, "illegal move: point off the board"),
            MoveError::Occupied => write!(f, "illegal move: point not empty"),
            MoveError::Suicide => write!(f, "illegal move: suicide"),
        }
    }
}

impl std::error::Error for MoveError {}

/// One recorded mutation: `pt` held `previous` before it was overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoEntry {
    pub pt: Point,
    pub previous: Option<Color>,
}

/// Mutations in the order they were made.
#[derive(Debug, Clone, Default)]
pub struct UndoLog {
    entries: Vec<UndoEntry>,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries recorded after the log had length `mark`.
    pub fn since(&self, mark: usize) -> &[UndoEntry] {
        self.entries.get(mark..).unwrap_or(&[])
    }

    fn push(&mut self, pt: Point, previous: Option<Color>) {
        self.entries.push(UndoEntry { pt, previous });
    }

    /// Revert the most recent mutation.
    ///
    /// Returns the entry together with the value the point held just before
    /// it was restored.
    pub fn undo_one(&mut self, board: &mut Board) -> Option<(UndoEntry, Option<Color>)> {
        let entry = self.entries.pop()?;
        let replaced = board.set(entry.pt, entry.previous);
        Some((entry, replaced))
    }

    /// Revert mutations until the log is back to length `mark`.
    pub fn rollback(&mut self, board: &mut Board, mark: usize) {
        while self.len() > mark {
            self.undo_one(board);
        }
    }
}

/// A connected group of same-colored stones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub stones: Vec<Point>,
    /// Number of distinct empty points adjacent to the group.
    pub liberties: usize,
}

/// Flood-fill the group containing the stone at `start`.
///
/// An empty `start` yields an empty group with no liberties.
pub fn group_at(board: &Board, start: Point) -> Group {
    let Some(color) = board.get(start) else {
        return Group {
            stones: Vec::new(),
            liberties: 0,
        };
    };
    let mut visited = vec![false; board.area()];
    let mut liberty_seen = vec![false; board.area()];
    let mut stones = Vec::new();
    let mut liberties = 0;
    let mut stack = vec![start];

    while let Some(pt) = stack.pop() {
        if visited[pt] {
            continue;
        }
        visited[pt] = true;
        stones.push(pt);
        for n in board.neighbors(pt) {
            match board.get(n) {
                None => {
                    if !liberty_seen[n] {
                        liberty_seen[n] = true;
                        liberties += 1;
                    }
                }
                Some(c) if c == color && !visited[n] => stack.push(n),
                _ => {}
            }
        }
    }
    Group { stones, liberties }
}

/// Liberties of the group at `pt` (0 for an empty point).
pub fn liberties(board: &Board, pt: Point) -> usize {
    group_at(board, pt).liberties
}

/// Place a `color` stone at `pt` under area-scoring capture rules.
///
/// Opposing groups left without liberties are removed, which makes the move
/// legal even if the placed stone had no liberty of its own. Otherwise a
/// move whose group ends up with no liberties is suicide and is rolled back.
/// On success returns the number of captured stones; every mutation is
/// appended to `undo`. On failure neither `board` nor `undo` changes.
pub fn place(
    board: &mut Board,
    pt: Point,
    color: Color,
    undo: &mut UndoLog,
) -> Result<usize, MoveError> {
    if pt >= board.area() {
        return Err(MoveError::OutOfBounds);
    }
    if board.get(pt).is_some() {
        return Err(MoveError::Occupied);
    }
    board.set(pt, Some(color));
    undo.push(pt, None);

    let mut direct_liberties = 0;
    let mut captured: Vec<Point> = Vec::new();
    let neighbors: Vec<Point> = board.neighbors(pt).collect();
    for n in neighbors {
        match board.get(n) {
            None => direct_liberties += 1,
            Some(c) if c == color => {}
            Some(_) => {
                if captured.contains(&n) {
                    continue;
                }
                let group = group_at(board, n);
                if group.liberties == 0 {
                    captured.extend(group.stones);
                }
            }
        }
    }

    if !captured.is_empty() {
        for &stone in &captured {
            let previous = board.set(stone, None);
            undo.push(stone, previous);
        }
        return Ok(captured.len());
    }

    if direct_liberties == 0 && liberties(board, pt) == 0 {
        undo.undo_one(board);
        return Err(MoveError::Suicide);
    }
    Ok(0)
}
