use anyhow::{anyhow, Result};
use crossterm::{
    cursor::MoveTo,
    style::{style, Attribute, Color as TermColor, PrintStyledContent},
    QueueableCommand,
};

use std::io::{stdout, Write};

use connect4_minimax::{
    alignment::tile,
    bitboard::{BitBoard, Color},
    HEIGHT, WIDTH,
};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum GameState {
    Playing,
    Won(Color),
    Draw,
}

/// The host's view of a game, translated into a [`BitBoard`] for the engine
#[derive(Clone)]
pub struct Grid {
    cells: [Option<Color>; WIDTH * HEIGHT], // cells are stored left-to-right, bottom-to-top
    heights: [usize; WIDTH],
    to_move: Color,
    pub state: GameState,
}

impl Grid {
    pub fn new() -> Self {
        Self {
            cells: [None; WIDTH * HEIGHT],
            heights: [0; WIDTH],
            to_move: Color::A,
            state: GameState::Playing,
        }
    }

    pub fn to_move(&self) -> Color {
        self.to_move
    }

    pub fn num_moves(&self) -> usize {
        self.heights.iter().sum()
    }

    /// Plays a 1-indexed column for the player to move, returning the new game state
    pub fn play_checked(&mut self, column_one_indexed: usize) -> Result<GameState> {
        if let GameState::Won(_) | GameState::Draw = self.state {
            return Err(anyhow!("Invalid move, the game is over"));
        }
        if column_one_indexed < 1 || column_one_indexed > WIDTH {
            return Err(anyhow!(
                "Invalid move, column {} out of range. Columns must be between 1 and {}",
                column_one_indexed,
                WIDTH
            ));
        }
        let column = column_one_indexed - 1;
        if self.heights[column] >= HEIGHT {
            return Err(anyhow!("Invalid move, column {} full", column_one_indexed));
        }

        let player = self.to_move;
        self.cells[column + WIDTH * self.heights[column]] = Some(player);
        self.heights[column] += 1;
        self.to_move = player.opponent();

        self.state = match self.to_bitboard()?.check_victory()? {
            Some(winner) => GameState::Won(winner),
            None if self.num_moves() == WIDTH * HEIGHT => GameState::Draw,
            None => GameState::Playing,
        };
        Ok(self.state)
    }

    pub fn to_bitboard(&self) -> Result<BitBoard> {
        let mut occupancy_a = 0;
        let mut occupancy_b = 0;
        for (idx, cell) in self.cells.iter().enumerate() {
            let bit = tile(idx % WIDTH, idx / WIDTH);
            match cell {
                Some(Color::A) => occupancy_a |= bit,
                Some(Color::B) => occupancy_b |= bit,
                None => {}
            }
        }
        Ok(BitBoard::from_masks(occupancy_a, occupancy_b)?)
    }

    pub fn display(&self) -> Result<()> {
        let mut stdout = stdout();

        let cols: String = (1..=WIDTH).map(|x| x.to_string()).collect();
        stdout.queue(PrintStyledContent(style(cols + "\n")))?;
        for _ in 0..HEIGHT {
            stdout.queue(PrintStyledContent(style("\n")))?;
        }
        stdout.flush()?;

        let (origin_x, origin_y) = crossterm::cursor::position()?;

        for (idx, cell) in self.cells.iter().enumerate() {
            let (pos_x, pos_y) = (
                origin_x + (idx % WIDTH) as u16,
                origin_y - (idx / WIDTH) as u16,
            );

            stdout
                .queue(MoveTo(pos_x, pos_y))?
                .queue(PrintStyledContent(
                    style("O")
                        .attribute(Attribute::Bold)
                        .on(TermColor::DarkBlue)
                        .with(match cell {
                            Some(Color::A) => TermColor::Red,
                            Some(Color::B) => TermColor::Yellow,
                            None => TermColor::DarkBlue,
                        }),
                ))?;
        }
        stdout
            .queue(MoveTo(origin_x + WIDTH as u16, origin_y))?
            .queue(PrintStyledContent(style("\n")))?;
        stdout.flush()?;
        Ok(())
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}
