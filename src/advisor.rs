//! Joseki suggestions for live positions.
//!
//! Joseki are local, so a live position is never looked up as a whole.
//! Instead each of four overlapping corner regions is hashed on its own
//! (identity transform, stones inside the region only), and a region whose
//! hash is in the index marks every recorded follow-up with a fixed weight.

use std::sync::Arc;

use log::{debug, warn};

use crate::board::{format_point, Board, Point};
use crate::codec::decode;
use crate::constants::{DEFAULT_SIZE, JOSEKI_WEIGHT, MIN_QUADRANT_STONES};
use crate::joseki::JosekiIndex;
use crate::symmetry::Transform;

/// An inclusive rectangle of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quadrant {
    pub min_x: usize,
    pub max_x: usize,
    pub min_y: usize,
    pub max_y: usize,
}

impl Quadrant {
    pub fn contains(&self, x: usize, y: usize) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }

    /// The four corner regions of a `size` board, each a little over half
    /// the board wide so that neighboring regions overlap.
    ///
    /// Order: top-left, top-right, bottom-left, bottom-right.
    pub fn corners(size: usize) -> [Quadrant; 4] {
        let last = size.saturating_sub(1);
        let low = 0..=(size / 2 + 1).min(last);
        let high = (size / 2).saturating_sub(1)..=last;
        let region = |xs: &std::ops::RangeInclusive<usize>, ys: &std::ops::RangeInclusive<usize>| {
            Quadrant {
                min_x: *xs.start(),
                max_x: *xs.end(),
                min_y: *ys.start(),
                max_y: *ys.end(),
            }
        };
        [
            region(&low, &low),
            region(&high, &low),
            region(&low, &high),
            region(&high, &high),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorConfig {
    /// Size of the boards described by incoming position strings.
    pub board_size: usize,
    /// Weight given to every suggested cell.
    pub weight: f32,
    /// Stones a region needs before it is looked up.
    pub min_stones: usize,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_SIZE,
            weight: JOSEKI_WEIGHT,
            min_stones: MIN_QUADRANT_STONES,
        }
    }
}

/// Whether `weight` can be written into a move buffer: in `(0, 1]`.
pub fn valid_weight(weight: f32) -> bool {
    weight > 0.0 && weight <= 1.0
}

/// A suggested move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Suggestion {
    pub cell: Point,
    pub weight: f32,
}

/// Answers queries against a finished [`JosekiIndex`].
#[derive(Debug, Clone)]
pub struct Advisor {
    index: Arc<JosekiIndex>,
    config: AdvisorConfig,
    quadrants: [Quadrant; 4],
}

impl Advisor {
    pub fn new(index: impl Into<Arc<JosekiIndex>>) -> Self {
        Self::with_config(index, AdvisorConfig::default())
    }

    /// A weight outside `(0, 1]` is replaced by [`JOSEKI_WEIGHT`].
    pub fn with_config(index: impl Into<Arc<JosekiIndex>>, mut config: AdvisorConfig) -> Self {
        if !valid_weight(config.weight) {
            warn!(
                "joseki weight {} is outside (0, 1], using {JOSEKI_WEIGHT}",
                config.weight
            );
            config.weight = JOSEKI_WEIGHT;
        }
        let quadrants = Quadrant::corners(config.board_size);
        Self {
            index: index.into(),
            config,
            quadrants,
        }
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    pub fn index(&self) -> &JosekiIndex {
        &self.index
    }

    pub fn quadrants(&self) -> &[Quadrant; 4] {
        &self.quadrants
    }

    /// Write the weight of every joseki move for `position` into `weights`,
    /// indexed by cell.
    ///
    /// Cells without a suggestion are left untouched, so an unchanged buffer
    /// means no match. A position string that does not decode is treated as
    /// having no match.
    pub fn advise(&self, position: &str, weights: &mut [f32]) {
        match decode(position, self.config.board_size) {
            Ok(decoded) => self.advise_board(&decoded.board, weights),
            Err(e) => warn!("cannot advise on {position:?}: {e}"),
        }
    }

    /// [`Advisor::advise`] for an already decoded board.
    ///
    /// Regions follow the board's own size, which need not be the configured
    /// one.
    pub fn advise_board(&self, board: &Board, weights: &mut [f32]) {
        let size = board.size();
        let quadrants = if size == self.config.board_size {
            self.quadrants
        } else {
            Quadrant::corners(size)
        };
        let keys = self.index.keys();
        for (i, quadrant) in quadrants.iter().enumerate() {
            let (hash, stones) = keys.hash_filtered(board, Transform::Identity, |pt| {
                quadrant.contains(pt % size, pt / size)
            });
            if stones < self.config.min_stones {
                continue;
            }
            let Some(candidates) = self.index.candidates(hash) else {
                continue;
            };
            debug!(
                "quadrant {i} [{hash}] matches: {}",
                candidates
                    .iter()
                    .map(|&pt| format_point(pt, size))
                    .collect::<Vec<_>>()
                    .join(" ")
            );
            for &pt in candidates {
                if let Some(w) = weights.get_mut(pt) {
                    *w = self.config.weight;
                }
            }
        }
    }

    /// All suggestions for `position`, ordered by cell.
    pub fn suggest(&self, position: &str) -> Vec<Suggestion> {
        let mut weights = vec![0.0; self.config.board_size * self.config.board_size];
        self.advise(position, &mut weights);
        weights
            .iter()
            .enumerate()
            .filter(|&(_, &w)| w > 0.0)
            .map(|(cell, &weight)| Suggestion { cell, weight })
            .collect()
    }
}
