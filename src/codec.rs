//! Position strings.
//!
//! A position string lists the rows of a board top to bottom, separated by
//! `/`. Within a row, a digit stands for that many empty cells (consecutive
//! digits add up, so a run of twelve is written `93`), `b`/`w` are black and
//! white stones, upper case marks the stone played last, and `X` is an empty
//! cell that may not be retaken because of ko.
//!
//! ```
//! use joseki_advisor::codec::{decode, encode};
//!
//! let pos = decode("3/1bW/3", 3).unwrap();
//! assert_eq!(pos.board.stones(), 2);
//! assert_eq!(pos.last_move, Some(5));
//! assert_eq!(encode(&pos.board, &pos.ko, pos.last_move), "3/1bW/3");
//! ```

use std::fmt;

use crate::board::{Board, Color, Point};
use crate::constants::{BLACK_STONE, KO_MARK, MAX_EMPTY_RUN, ROW_SEPARATOR, WHITE_STONE};

/// A decoded position string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPosition {
    pub board: Board,
    /// Cells marked as forbidden by ko, in the order they appeared.
    pub ko: Vec<Point>,
    /// The stone written in upper case, if any.
    pub last_move: Option<Point>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A character that is neither a digit, a stone, the ko mark nor `/`.
    UnexpectedChar { ch: char, offset: usize },
    /// More rows than the board has.
    TooManyRows { offset: usize },
    /// A row describes more cells than the board is wide.
    RowOverflow { row: usize },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::UnexpectedChar { ch, offset } => {
                write!(f, "unexpected character {ch:?} at offset {offset}")
            }
            CodecError::TooManyRows { offset } => {
                write!(f, "too many rows (separator at offset {offset})")
            }
            CodecError::RowOverflow { row } => write!(f, "row {row} is longer than the board"),
        }
    }
}

impl std::error::Error for CodecError {}

/// Decode a position string for a `size` x `size` board.
///
/// Missing trailing rows or cells are empty.
pub fn decode(setup: &str, size: usize) -> Result<DecodedPosition, CodecError> {
    let mut board = Board::new(size);
    let mut ko = Vec::new();
    let mut last_move = None;
    let mut row = 0;
    let mut col = 0;

    for (offset, ch) in setup.char_indices() {
        if ch == ROW_SEPARATOR {
            row += 1;
            col = 0;
            if row >= size {
                return Err(CodecError::TooManyRows { offset });
            }
            continue;
        }
        if let Some(run) = ch.to_digit(10) {
            col += run as usize;
            if col > size {
                return Err(CodecError::RowOverflow { row });
            }
            continue;
        }

        let color = match ch.to_ascii_lowercase() {
            _ if ch == KO_MARK => None,
            BLACK_STONE => Some(Color::Black),
            WHITE_STONE => Some(Color::White),
            _ => return Err(CodecError::UnexpectedChar { ch, offset }),
        };
        let pt = board
            .point(col, row)
            .ok_or(CodecError::RowOverflow { row })?;
        match color {
            Some(color) => {
                board.set(pt, Some(color));
                if ch.is_ascii_uppercase() {
                    last_move = Some(pt);
                }
            }
            None => ko.push(pt),
        }
        col += 1;
    }

    Ok(DecodedPosition {
        board,
        ko,
        last_move,
    })
}

/// Encode a board as a position string.
///
/// Cells listed in `ko` are written as the ko mark whatever they hold; the
/// stone at `last_move` is written in upper case.
pub fn encode(board: &Board, ko: &[Point], last_move: Option<Point>) -> String {
    let size = board.size();
    let mut out = String::with_capacity(board.area());

    for y in 0..size {
        if y != 0 {
            out.push(ROW_SEPARATOR);
        }
        let mut empty = 0;
        for x in 0..size {
            let pt = y * size + x;
            let ch = if ko.contains(&pt) {
                Some(KO_MARK)
            } else {
                board.get(pt).map(|color| {
                    let letter = match color {
                        Color::Black => BLACK_STONE,
                        Color::White => WHITE_STONE,
                    };
                    if last_move == Some(pt) {
                        letter.to_ascii_uppercase()
                    } else {
                        letter
                    }
                })
            };
            match ch {
                Some(ch) => {
                    flush_run(&mut out, &mut empty);
                    out.push(ch);
                }
                None => {
                    if empty == MAX_EMPTY_RUN {
                        flush_run(&mut out, &mut empty);
                    }
                    empty += 1;
                }
            }
        }
        flush_run(&mut out, &mut empty);
    }
    out
}

fn flush_run(out: &mut String, empty: &mut usize) {
    if *empty != 0 {
        out.push_str(&empty.to_string());
        *empty = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board() {
        assert_eq!(encode(&Board::new(19), &[], None), ["991"; 19].join("/"));
        let pos = decode(&["991"; 19].join("/"), 19).unwrap();
        assert!(pos.board.is_empty());
        assert_eq!(pos.board.size(), 19);
    }

    #[test]
    fn test_decode_stones_and_marks() {
        let pos = decode("2b/wX1/B", 3).unwrap();
        assert_eq!(pos.board.get(2), Some(Color::Black));
        assert_eq!(pos.board.get(3), Some(Color::White));
        assert_eq!(pos.board.get(4), None);
        assert_eq!(pos.board.get(6), Some(Color::Black));
        assert_eq!(pos.ko, vec![4]);
        assert_eq!(pos.last_move, Some(6));
        assert_eq!(pos.board.stones(), 3);
    }

    #[test]
    fn test_encode_ko_and_last_move() {
        let mut board = Board::new(3);
        board.set(0, Some(Color::White));
        board.set(5, Some(Color::Black));
        // The ko mark wins even over an occupied cell.
        board.set(8, Some(Color::Black));
        assert_eq!(encode(&board, &[4, 8], Some(0)), "W2/1Xb/2X");
    }

    #[test]
    fn test_long_runs_are_split() {
        let mut board = Board::new(13);
        board.set(12, Some(Color::Black));
        let s = encode(&board, &[], None);
        assert!(s.starts_with("93b/"));
        assert_eq!(decode(&s, 13).unwrap().board, board);
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(
            decode("2q", 3),
            Err(CodecError::UnexpectedChar { ch: 'q', offset: 1 })
        );
        assert_eq!(decode("1/1/1/1", 3), Err(CodecError::TooManyRows { offset: 5 }));
        assert_eq!(decode("4", 3), Err(CodecError::RowOverflow { row: 0 }));
        assert_eq!(decode("3b", 3), Err(CodecError::RowOverflow { row: 0 }));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let pos = decode("b", 3).unwrap();
        assert_eq!(pos.board.stones(), 1);
        assert_eq!(encode(&pos.board, &[], None), "b2/3/3");
    }
}
