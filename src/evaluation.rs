//! Positional heuristic over every four-tile alignment
//!
//! # Scoring
//! An alignment is scorable for a player when it holds at least one of
//! their tiles and none of the opponent's. Its value grows faster than the
//! number of tiles in it, shrinks with the height of its lowest tile and is
//! halved for vertical runs. The opponent's scorable alignments of two or
//! three tiles weigh heavier than the player's own, so the score of a
//! position for one color is not the negation of its score for the other.

use crate::alignment::{groupings, Grouping, RUN};
use crate::bitboard::{BitBoard, Color};

/// Tuning constants of the heuristic
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EvalWeights {
    /// Value of an alignment holding one, two and three tiles of a single player
    pub base: [f64; RUN - 1],
    /// Value of a completed alignment, left unscaled
    pub won_line: f64,
    /// Per-row decay, favouring alignments closer to the bottom
    pub height_factor: f64,
    /// Multiplier applied to vertical alignments
    pub vertical_discount: f64,
    /// Multiplier applied to the opponent's alignments of two or three tiles
    pub opponent_multiplier: f64,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            base: [1.0, 2.4, 8.4],
            won_line: 100000.0,
            height_factor: 0.5,
            vertical_discount: 0.5,
            opponent_multiplier: 1.5,
        }
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct Evaluator {
    weights: EvalWeights,
}

impl Evaluator {
    pub fn new(weights: EvalWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &EvalWeights {
        &self.weights
    }

    /// Scores `board` from the point of view of `perspective`
    ///
    /// Positive values favour `perspective`.
    pub fn evaluate(&self, board: &BitBoard, perspective: Color) -> f64 {
        let own = board.occupancy(perspective);
        let opp = board.occupancy(perspective.opponent());

        let mut score = 0.0;
        for grouping in groupings() {
            let mine = (own & grouping.mask).count_ones() as usize;
            let theirs = (opp & grouping.mask).count_ones() as usize;
            match (mine, theirs) {
                (0, 0) => {}
                (k, 0) => score += self.grouping_value(grouping, k, false),
                (0, k) => score -= self.grouping_value(grouping, k, true),
                // contested, nobody can complete it
                _ => {}
            }
        }
        score
    }

    /// The value of a scorable alignment holding `tiles` tiles of one player
    pub fn grouping_value(&self, grouping: &Grouping, tiles: usize, opponent: bool) -> f64 {
        if tiles >= RUN {
            return self.weights.won_line;
        }

        let mut value = self.weights.base[tiles - 1]
            * self.weights.height_factor.powi(grouping.row as i32);
        if grouping.is_vertical() {
            value *= self.weights.vertical_discount;
        }
        if opponent && tiles >= 2 {
            value *= self.weights.opponent_multiplier;
        }
        value
    }
}
