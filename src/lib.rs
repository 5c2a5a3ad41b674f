//! A minimax agent for playing the board game 'Connect 4'
//!
//! This agent uses a depth-limited minimax search with alpha-beta pruning
//! over a compact bitboard, scoring the leaves with a positional heuristic
//! built on precomputed four-in-a-row masks.
//!
//! # Basic Usage
//!
//! ```
//! use connect4_minimax::{bitboard::{BitBoard, Color}, search::choose_move};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! // player A has three discs on the bottom row and is to move
//! let board = BitBoard::from_moves("112233")?;
//!
//! assert_eq!(choose_move(&board, Color::A), Some(3));
//!# Ok(())
//!# }
//! ```

use static_assertions::*;
pub use anyhow;

pub mod alignment;

pub mod bitboard;

pub mod error;

pub mod evaluation;

pub mod search;

mod test;

/// The width of the game board in tiles
pub const WIDTH: usize = 7;

/// The height of the game board in tiles
pub const HEIGHT: usize = 6;

/// The number of bits in a column of the bitboard representation
pub const COLUMN_STRIDE: usize = HEIGHT;

// ensure that the given dimensions fit in a u64 for the bitboard representation
const_assert!(WIDTH * COLUMN_STRIDE <= 64);
