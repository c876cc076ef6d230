//! Joseki-Advisor: opening-book suggestions for a Go-playing agent.
//!
//! A corpus of game records is parsed once, every variation is replayed on a
//! board, and each position is indexed under its eight symmetries by a
//! Zobrist hash. Live positions are then matched corner by corner against
//! that index to propose follow-up moves with a fixed confidence.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry, hashing and advisor defaults
//! - [`grammar`] - Backtracking parser combinators
//! - [`sgf`] - Game record grammar and tree
//! - [`board`] - Board value type and record coordinates
//! - [`codec`] - Position string encoding and decoding
//! - [`rules`] - Stone placement, captures and undo
//! - [`symmetry`] - The eight board symmetries
//! - [`zobrist`] - Position hashing under a symmetry
//! - [`joseki`] - Index construction and corpus loading
//! - [`advisor`] - Query-time matching of live positions
//!
//! ## Example
//!
//! ```
//! use joseki_advisor::advisor::{Advisor, AdvisorConfig};
//! use joseki_advisor::board::parse_point;
//! use joseki_advisor::joseki::JosekiIndex;
//!
//! let index = JosekiIndex::from_text("(;SZ[9];B[ee];W[ge];B[gc])").unwrap();
//! let config = AdvisorConfig { board_size: 9, ..AdvisorConfig::default() };
//! let advisor = Advisor::with_config(index, config);
//!
//! // Black in the center, white one point to its right.
//! let mut weights = vec![0.0; 81];
//! advisor.advise("9/9/9/9/4b1w2/9/9/9/9", &mut weights);
//! assert_eq!(weights[parse_point("gc", 9).unwrap()], 0.9);
//! ```

pub mod advisor;
pub mod board;
pub mod codec;
pub mod constants;
pub mod grammar;
pub mod joseki;
pub mod rules;
pub mod sgf;
pub mod symmetry;
pub mod zobrist;
