use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use rayon::prelude::*;

use std::io::{stdin, stdout, Write};
use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use connect4_minimax::{bitboard::Color, search::*, WIDTH};

mod grid;
use grid::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of plies searched by the AI
    #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
    depth: usize,

    /// Color the evaluation is scored for during search
    #[arg(long, value_enum, default_value_t = PerspectiveArg::Engine)]
    perspective: PerspectiveArg,

    /// Search every branch without alpha-beta pruning
    #[arg(long)]
    no_pruning: bool,

    /// Score completed alignments as decisive wins or losses
    #[arg(long)]
    terminal_scores: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a game in the terminal (the default)
    Play {
        /// Player A is AI controlled
        #[arg(long)]
        ai_a: bool,
        /// Player B is AI controlled
        #[arg(long)]
        ai_b: bool,
    },
    /// Let the AI play itself from every two-move opening
    Bench,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PerspectiveArg {
    Engine,
    Opponent,
}

impl Args {
    fn search_config(&self) -> SearchConfig {
        SearchConfig::default()
            .with_depth(self.depth)
            .with_pruning(!self.no_pruning)
            .with_terminal_scores(self.terminal_scores)
            .with_perspective(match self.perspective {
                PerspectiveArg::Engine => Perspective::Engine,
                PerspectiveArg::Opponent => Perspective::Opponent,
            })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    )
    .format(|buf, record| writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args()))
    .init();

    let searcher = Searcher::new(args.search_config());
    debug!("search settings: {:?}", searcher.config());

    match args.command {
        Some(Command::Bench) => bench(&searcher),
        Some(Command::Play { ai_a, ai_b }) if ai_a || ai_b => play(&searcher, (ai_a, ai_b)),
        _ => {
            let ai_players = (ask_ai_control(Color::A)?, ask_ai_control(Color::B)?);
            play(&searcher, ai_players)
        }
    }
}

fn ask_ai_control(color: Color) -> Result<bool> {
    let stdin = stdin();
    loop {
        let mut buffer = String::new();
        print!("Is player {} AI controlled? y/n: ", color);
        stdout().flush().context("failed to flush to stdout")?;
        stdin.read_line(&mut buffer)?;
        match buffer.to_lowercase().chars().next() {
            Some('y') => return Ok(true),
            Some('n') => return Ok(false),
            _ => println!("Unknown answer given"),
        }
    }
}

fn play(searcher: &Searcher, ai_players: (bool, bool)) -> Result<()> {
    let stdin = stdin();
    let mut grid = Grid::new();

    println!("Welcome to Connect 4\n");

    // game loop
    loop {
        grid.display().context("Failed to draw board")?;

        match grid.state {
            GameState::Playing => {
                let color = grid.to_move();
                let ai_controlled = match color {
                    Color::A => ai_players.0,
                    Color::B => ai_players.1,
                };

                let next_move =
                    // AI player
                    if ai_controlled {
                        // slow down play if both players are AI
                        if ai_players == (true, true) {
                            std::thread::sleep(Duration::from_secs(1));
                        }

                        let report = think(searcher, &grid, color)?;
                        for (column, score) in report.root_scores.iter().enumerate() {
                            if let Some(score) = score {
                                debug!("column {}: {:.3}", column + 1, score);
                            }
                        }
                        let column = report
                            .column
                            .ok_or_else(|| anyhow!("no legal move left for player {}", color))?;

                        match report.decision {
                            Decision::ImmediateWin => println!("Player {} wins on the spot.", color),
                            Decision::ForcedBlock => println!("Player {} must block.", color),
                            _ => println!(
                                "Searched {} positions in {:.3}s, score {:.3}",
                                report.nodes,
                                report.elapsed.as_secs_f64(),
                                report.score.unwrap_or_default()
                            ),
                        }
                        println!("Best move: {}", column + 1);
                        column + 1

                    // human player
                    } else {
                        print!("Player {} move input > ", color);
                        stdout().flush().context("Failed to flush to stdout")?;
                        let mut input_str = String::new();
                        stdin.read_line(&mut input_str)?;

                        match input_str.trim().parse::<usize>() {
                            Err(_) => {
                                println!("Invalid number: {}", input_str.trim());
                                continue;
                            }
                            Ok(column) => column,
                        }
                    };

                if let Err(err) = grid.play_checked(next_move) {
                    println!("{}", err);
                    // try the move again
                    continue;
                }
            }

            // end states
            GameState::Won(color) => {
                println!("Player {} wins!", color);
                break;
            }
            GameState::Draw => {
                println!("Draw!");
                break;
            }
        }
    }
    Ok(())
}

/// Runs the search in the background, keeping a spinner alive until it reports
fn think(searcher: &Searcher, grid: &Grid, color: Color) -> Result<SearchReport> {
    let receiver = spawn_search(searcher.clone(), grid.to_bitboard()?, color);

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("AI is thinking...");
    loop {
        match receiver.recv_timeout(Duration::from_millis(80)) {
            Ok(report) => {
                spinner.finish_and_clear();
                return Ok(report);
            }
            Err(RecvTimeoutError::Timeout) => spinner.tick(),
            Err(RecvTimeoutError::Disconnected) => {
                spinner.finish_and_clear();
                return Err(anyhow!("search worker stopped without reporting a move"));
            }
        }
    }
}

struct GameSummary {
    state: GameState,
    moves: usize,
    nodes: u64,
}

/// Plays the AI against itself after the given opening columns
fn self_play(searcher: &Searcher, opening: (usize, usize)) -> Result<GameSummary> {
    let mut grid = Grid::new();
    grid.play_checked(opening.0 + 1)?;
    grid.play_checked(opening.1 + 1)?;

    let mut summary = GameSummary {
        state: grid.state,
        moves: 0,
        nodes: 0,
    };
    while let GameState::Playing = grid.state {
        let report = searcher.search(&grid.to_bitboard()?, grid.to_move());
        let column = report
            .column
            .ok_or_else(|| anyhow!("no legal move in a running game"))?;
        summary.nodes += report.nodes;
        summary.moves += 1;
        grid.play_checked(column + 1)?;
    }
    summary.state = grid.state;
    Ok(summary)
}

fn bench(searcher: &Searcher) -> Result<()> {
    let openings: Vec<(usize, usize)> = (0..WIDTH)
        .flat_map(|first| (0..WIDTH).map(move |second| (first, second)))
        .collect();

    info!(
        "Playing {} games at depth {}",
        openings.len(),
        searcher.config().depth
    );
    let bar = ProgressBar::new(openings.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{elapsed_precise} [{bar:40}] {pos}/{len} games")
            .progress_chars("=> "),
    );

    let start_time = Instant::now();
    let games = openings
        .par_iter()
        .map(|&opening| {
            let summary = self_play(searcher, opening);
            bar.inc(1);
            summary
        })
        .collect::<Result<Vec<GameSummary>>>()?;
    let time = start_time.elapsed();
    bar.finish_and_clear();

    let count = |wanted: GameState| games.iter().filter(|game| game.state == wanted).count();
    let nodes = games.iter().map(|game| game.nodes).sum::<u64>();
    let moves = games.iter().map(|game| game.moves).sum::<usize>();

    println!(
        "Self-play\nA wins: {}, B wins: {}, Draws: {}",
        count(GameState::Won(Color::A)),
        count(GameState::Won(Color::B)),
        count(GameState::Draw)
    );
    println!(
        "Time: {:.3}s, No. of positions: {}, Mean positions per move: {:.1}",
        time.as_secs_f64(),
        nodes,
        nodes as f64 / moves.max(1) as f64
    );
    Ok(())
}
