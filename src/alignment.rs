//! Precomputed masks for every possible four-in-a-row on the board
//!
//! The tables are built by `const fn`s at compile time, so they are
//! read-only for the lifetime of the process and shared freely between
//! searches.

use static_assertions::*;

use crate::{COLUMN_STRIDE, HEIGHT, WIDTH};

/// The number of tiles in a winning alignment
pub const RUN: usize = 4;

pub const HORIZONTAL_COUNT: usize = (WIDTH - RUN + 1) * HEIGHT;
pub const VERTICAL_COUNT: usize = WIDTH * (HEIGHT - RUN + 1);
pub const DIAGONAL_COUNT: usize = (WIDTH - RUN + 1) * (HEIGHT - RUN + 1);

const_assert_eq!(HORIZONTAL_COUNT, 24);
const_assert_eq!(VERTICAL_COUNT, 21);
const_assert_eq!(DIAGONAL_COUNT, 12);

/// The direction an alignment runs in
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Family {
    Horizontal,
    Vertical,
    FallingDiagonal,
    RisingDiagonal,
}

/// A single four-tile alignment
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Grouping {
    /// The four tiles of the alignment
    pub mask: u64,
    /// The row of the lowest tile in the alignment
    pub row: usize,
    pub family: Family,
}

impl Grouping {
    const EMPTY: Self = Self {
        mask: 0,
        row: 0,
        family: Family::Horizontal,
    };

    /// Vertical runs need sequential moves in one column and are easy to block
    pub fn is_vertical(&self) -> bool {
        self.family == Family::Vertical
    }
}

/// The bit of the tile at (column, row)
pub const fn tile(column: usize, row: usize) -> u64 {
    1 << (column * COLUMN_STRIDE + row)
}

// builds the mask of a run starting at (column, row), stepping by (dx, dy)
const fn run_mask(column: usize, row: usize, dx: usize, dy: isize) -> u64 {
    let mut mask = 0;
    let mut i = 0;
    while i < RUN {
        let r = row as isize + dy * i as isize;
        mask |= tile(column + dx * i, r as usize);
        i += 1;
    }
    mask
}

const fn horizontal() -> [Grouping; HORIZONTAL_COUNT] {
    let mut groupings = [Grouping::EMPTY; HORIZONTAL_COUNT];
    let mut i = 0;
    let mut row = 0;
    while row < HEIGHT {
        let mut column = 0;
        while column + RUN <= WIDTH {
            groupings[i] = Grouping {
                mask: run_mask(column, row, 1, 0),
                row,
                family: Family::Horizontal,
            };
            i += 1;
            column += 1;
        }
        row += 1;
    }
    groupings
}

const fn vertical() -> [Grouping; VERTICAL_COUNT] {
    let mut groupings = [Grouping::EMPTY; VERTICAL_COUNT];
    let mut i = 0;
    let mut column = 0;
    while column < WIDTH {
        let mut row = 0;
        while row + RUN <= HEIGHT {
            groupings[i] = Grouping {
                mask: run_mask(column, row, 0, 1),
                row,
                family: Family::Vertical,
            };
            i += 1;
            row += 1;
        }
        column += 1;
    }
    groupings
}

const fn falling_diagonal() -> [Grouping; DIAGONAL_COUNT] {
    let mut groupings = [Grouping::EMPTY; DIAGONAL_COUNT];
    let mut i = 0;
    let mut column = 0;
    while column + RUN <= WIDTH {
        // start at the top-left tile and step down to the right
        let mut row = RUN - 1;
        while row < HEIGHT {
            groupings[i] = Grouping {
                mask: run_mask(column, row, 1, -1),
                row: row + 1 - RUN,
                family: Family::FallingDiagonal,
            };
            i += 1;
            row += 1;
        }
        column += 1;
    }
    groupings
}

const fn rising_diagonal() -> [Grouping; DIAGONAL_COUNT] {
    let mut groupings = [Grouping::EMPTY; DIAGONAL_COUNT];
    let mut i = 0;
    let mut column = 0;
    while column + RUN <= WIDTH {
        let mut row = 0;
        while row + RUN <= HEIGHT {
            groupings[i] = Grouping {
                mask: run_mask(column, row, 1, 1),
                row,
                family: Family::RisingDiagonal,
            };
            i += 1;
            row += 1;
        }
        column += 1;
    }
    groupings
}

/// Horizontal alignments, bottom row first
pub static HORIZONTAL: [Grouping; HORIZONTAL_COUNT] = horizontal();

/// Vertical alignments, left column first
pub static VERTICAL: [Grouping; VERTICAL_COUNT] = vertical();

/// Diagonal alignments running down to the right
pub static FALLING_DIAGONAL: [Grouping; DIAGONAL_COUNT] = falling_diagonal();

/// Diagonal alignments running up to the right
pub static RISING_DIAGONAL: [Grouping; DIAGONAL_COUNT] = rising_diagonal();

/// Every alignment family, in the order victory is checked
pub static FAMILIES: [&[Grouping]; 4] = [
    &HORIZONTAL,
    &VERTICAL,
    &FALLING_DIAGONAL,
    &RISING_DIAGONAL,
];

/// Iterates over every alignment on the board, family by family
pub fn groupings() -> impl Iterator<Item = &'static Grouping> {
    FAMILIES.iter().flat_map(|family| family.iter())
}
