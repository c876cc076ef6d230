//! Constants for board geometry, hashing and advisor defaults.
//!
//! Runtime overrides go through [`crate::advisor::AdvisorConfig`] and the
//! command line; everything here is the compiled-in default.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN) used for live positions when nothing else is configured.
pub const DEFAULT_SIZE: usize = 19;

/// Largest board a record may declare with `SZ`.
///
/// Bounded by the record coordinate alphabet below.
pub const MAX_SIZE: usize = 19;

/// Letters used by game records for both columns and rows, `aa` being the
/// top-left corner.
pub const COORD_ALPHABET: &[u8; MAX_SIZE] = b"abcdefghijklmnopqrs";

/// Orthogonal neighbor offsets as (dx, dy). Order: North, East, South, West.
pub const DELTA: [(isize, isize); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

// =============================================================================
// Position Strings
// =============================================================================

/// Separator between rows of a position string.
pub const ROW_SEPARATOR: char = '/';

/// Letter for a black stone; upper case marks the most recent move.
pub const BLACK_STONE: char = 'b';

/// Letter for a white stone; upper case marks the most recent move.
pub const WHITE_STONE: char = 'w';

/// Empty cell that may not be played because of ko.
pub const KO_MARK: char = 'X';

/// Longest run of empty cells written as a single digit.
pub const MAX_EMPTY_RUN: usize = 9;

// =============================================================================
// Hashing
// =============================================================================

/// Seed of the key generator. Fixed so every table built in one process
/// produces the same hashes.
pub const ZOBRIST_SEED: u64 = 0x1BAD_F00D;

/// Keys are 31-bit values.
pub const KEY_BITS: u32 = 31;

// =============================================================================
// Joseki Advisor
// =============================================================================

/// Confidence given to every cell found in the joseki index.
pub const JOSEKI_WEIGHT: f32 = 0.9;

/// A quadrant needs this many stones before its hash is looked up.
pub const MIN_QUADRANT_STONES: usize = 2;

/// Ply count after which moves are recorded in the index.
pub const MIN_INDEXED_STONES: usize = 2;

/// Corpus read at startup when no path is given on the command line.
pub const DEFAULT_CORPUS: &str = "data/joseki.sgf";
