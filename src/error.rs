//! Error types for board construction and move application

use thiserror::Error;

/// Errors raised by the board layer
///
/// These all signal a defect in the caller rather than a condition worth
/// retrying: the search only ever plays columns it got from
/// [`open_columns`](crate::bitboard::BitBoard::open_columns).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// A move was played into a full or nonexistent column
    #[error("Invalid move, column {column} is full or out of range")]
    IllegalMove { column: usize },

    /// The two color masks share tiles, or tiles lie outside the board
    #[error("Invalid board state, overlapping or out-of-range tiles {overlap:#x}")]
    InvalidBoardState { overlap: u64 },

    /// A move string contained something other than a column digit
    #[error("could not parse '{found}' at position {position} as a valid move")]
    ParseMove { position: usize, found: char },
}

/// Result type for board operations
pub type BoardResult<T> = Result<T, BoardError>;
