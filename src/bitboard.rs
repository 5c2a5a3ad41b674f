use std::fmt;

use crate::alignment::{tile, FAMILIES};
use crate::error::{BoardError, BoardResult};
use crate::{COLUMN_STRIDE, HEIGHT, WIDTH};

mod static_masks {
    use crate::alignment::tile;
    use crate::{HEIGHT, WIDTH};

    pub const fn bottom_mask() -> u64 {
        let mut mask = 0;
        let mut column = 0;
        while column < WIDTH {
            mask |= tile(column, 0);
            column += 1;
        }
        mask
    }
    pub const fn full_board_mask() -> u64 {
        bottom_mask() * ((1 << HEIGHT as u64) - 1)
    }
}

/// The order in which columns are visited, from the middle outwards, as
/// the middle columns are often better moves
pub const MOVE_ORDER: [usize; WIDTH] = [3, 2, 4, 5, 1, 6, 0];

/// The owner of a tile
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Color {
    A,
    B,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::A => Color::B,
            Color::B => Color::A,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::A => write!(f, "A"),
            Color::B => write!(f, "B"),
        }
    }
}

/// A column that completes a four-in-a-row for `color` when played
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct KillerMove {
    pub column: Option<usize>,
    pub color: Color,
}

impl KillerMove {
    pub fn is_found(&self) -> bool {
        self.column.is_some()
    }

    /// The column as a signed index, with -1 meaning no winning column exists
    pub fn sentinel_column(&self) -> i32 {
        self.column.map_or(-1, |column| column as i32)
    }
}

/// An immutable Connect 4 position
///
/// Tile `(column, row)` lives at bit `6 * column + row`, with row 0 at the
/// bottom. Playing a move returns a new board, so positions can be shared
/// and compared freely.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct BitBoard {
    // mask of player A's tiles
    occupancy_a: u64,
    // mask of player B's tiles
    occupancy_b: u64,
}

impl BitBoard {
    pub const fn new() -> Self {
        Self {
            occupancy_a: 0,
            occupancy_b: 0,
        }
    }

    /// Creates a board from raw occupancy masks, rejecting overlapping tiles
    /// and tiles outside the 7x6 grid
    pub fn from_masks(occupancy_a: u64, occupancy_b: u64) -> BoardResult<Self> {
        let board = Self {
            occupancy_a,
            occupancy_b,
        };
        board.validate()?;
        Ok(board)
    }

    /// Replays a sequence of 1-indexed column digits, starting with player A
    pub fn from_moves<S: AsRef<str>>(moves: S) -> BoardResult<Self> {
        let mut board = Self::new();
        let mut color = Color::A;

        for (position, column_char) in moves.as_ref().chars().enumerate() {
            match column_char.to_digit(10).map(|c| c as usize) {
                Some(column @ 1..=WIDTH) => {
                    board = board.apply_move(column - 1, color)?;
                    color = color.opponent();
                }
                _ => {
                    return Err(BoardError::ParseMove {
                        position,
                        found: column_char,
                    })
                }
            }
        }
        Ok(board)
    }

    pub fn occupancy_a(&self) -> u64 {
        self.occupancy_a
    }

    pub fn occupancy_b(&self) -> u64 {
        self.occupancy_b
    }

    pub fn occupancy(&self, color: Color) -> u64 {
        match color {
            Color::A => self.occupancy_a,
            Color::B => self.occupancy_b,
        }
    }

    /// Mask of all tiles
    pub fn board_mask(&self) -> u64 {
        self.occupancy_a | self.occupancy_b
    }

    pub fn top_mask(column: usize) -> u64 {
        tile(column, HEIGHT - 1)
    }

    pub fn column_mask(column: usize) -> u64 {
        ((1 << HEIGHT) - 1) << (column * COLUMN_STRIDE)
    }

    pub fn disc_count(&self) -> usize {
        self.board_mask().count_ones() as usize
    }

    pub fn column_height(&self, column: usize) -> usize {
        (self.board_mask() & Self::column_mask(column)).count_ones() as usize
    }

    pub fn cell(&self, column: usize, row: usize) -> Option<Color> {
        let tile = tile(column, row);
        if self.occupancy_a & tile != 0 {
            Some(Color::A)
        } else if self.occupancy_b & tile != 0 {
            Some(Color::B)
        } else {
            None
        }
    }

    /// The player whose turn it is, assuming A moved first
    pub fn next_to_move(&self) -> Color {
        if self.occupancy_a.count_ones() > self.occupancy_b.count_ones() {
            Color::B
        } else {
            Color::A
        }
    }

    pub fn is_column_open(&self, column: usize) -> bool {
        column < WIDTH && Self::top_mask(column) & self.board_mask() == 0
    }

    pub fn is_full(&self) -> bool {
        self.board_mask() & static_masks::full_board_mask() == static_masks::full_board_mask()
    }

    /// The open columns of the board, in [`MOVE_ORDER`]
    pub fn open_columns(&self) -> OpenColumns {
        OpenColumns {
            board_mask: self.board_mask(),
            index: 0,
        }
    }

    /// Drops a tile of `color` into `column`, returning the new position
    pub fn apply_move(&self, column: usize, color: Color) -> BoardResult<Self> {
        if !self.is_column_open(column) {
            return Err(BoardError::IllegalMove { column });
        }
        Ok(self.play(column, color))
    }

    // the caller guarantees that the column is open
    pub(crate) fn play(&self, column: usize, color: Color) -> Self {
        debug_assert!(self.is_column_open(column));
        // the lowest empty tile of the column
        let free = !self.board_mask() & Self::column_mask(column);
        let move_bitmap = free & free.wrapping_neg();

        let mut next = *self;
        match color {
            Color::A => next.occupancy_a |= move_bitmap,
            Color::B => next.occupancy_b |= move_bitmap,
        }
        next
    }

    fn validate(&self) -> BoardResult<()> {
        let overlap = (self.occupancy_a & self.occupancy_b)
            | (self.board_mask() & !static_masks::full_board_mask());
        if overlap != 0 {
            return Err(BoardError::InvalidBoardState { overlap });
        }
        Ok(())
    }

    /// Returns the color holding a complete alignment, if any
    ///
    /// Families are checked rows first, then columns, falling and rising
    /// diagonals, and the first match wins.
    pub fn check_victory(&self) -> BoardResult<Option<Color>> {
        self.validate()?;
        Ok(self.winner())
    }

    // victory check for boards built through the validated constructors
    pub(crate) fn winner(&self) -> Option<Color> {
        for family in FAMILIES.iter() {
            for grouping in family.iter() {
                if self.occupancy_a & grouping.mask == grouping.mask {
                    return Some(Color::A);
                }
                if self.occupancy_b & grouping.mask == grouping.mask {
                    return Some(Color::B);
                }
            }
        }
        None
    }

    fn has_alignment(player_mask: u64) -> bool {
        FAMILIES.iter().any(|family| {
            family
                .iter()
                .any(|grouping| player_mask & grouping.mask == grouping.mask)
        })
    }

    /// Finds the first column, in [`MOVE_ORDER`], that wins immediately for `color`
    pub fn find_killer_move(&self, color: Color) -> KillerMove {
        let column = self
            .open_columns()
            .find(|&column| Self::has_alignment(self.play(column, color).occupancy(color)));
        KillerMove { column, color }
    }
}

/// Iterator over the open columns of a position, centre first
#[derive(Clone)]
pub struct OpenColumns {
    board_mask: u64,
    index: usize,
}

impl Iterator for OpenColumns {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < WIDTH {
            let column = MOVE_ORDER[self.index];
            self.index += 1;
            if BitBoard::top_mask(column) & self.board_mask == 0 {
                return Some(column);
            }
        }
        None
    }
}
