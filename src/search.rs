//! An agent to pick moves in Connect 4
//!
//! The agent first looks one move ahead for an immediate win, then for an
//! opponent win that must be blocked, and otherwise runs a fixed-depth
//! minimax search with alpha-beta pruning.

use log::{debug, trace};

use std::sync::mpsc::{channel, Receiver};
use std::time::{Duration, Instant};

use crate::bitboard::{BitBoard, Color};
use crate::evaluation::{EvalWeights, Evaluator};
use crate::{HEIGHT, WIDTH};

/// The default number of plies searched
pub const DEFAULT_DEPTH: usize = 8;

/// The deepest useful search, one ply per tile on the board
pub const MAX_DEPTH: usize = WIDTH * HEIGHT;

/// The value recorded for a root move that hands the opponent an immediate win
///
/// It is worse than any heuristic score but still better than the initial
/// incumbent, so a legal move is returned even when every move loses.
pub const LOSING_MOVE_VALUE: f64 = -f64::MAX;

/// Base score of a completed alignment when terminal scoring is enabled
pub const TERMINAL_SCORE: f64 = 1.0e7;

/// Which color the evaluator scores for during a search
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Perspective {
    /// Score for the searching player, who maximizes at the root
    Engine,
    /// Score for the opponent, the searching player minimizes at the root
    Opponent,
}

/// Search settings
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SearchConfig {
    /// Number of plies searched below the current position
    pub depth: usize,
    /// Disabling pruning gives a plain minimax search over the same tree
    pub pruning: bool,
    pub perspective: Perspective,
    /// Score completed alignments with a large depth-adjusted constant
    /// instead of the heuristic
    pub terminal_scores: bool,
    pub weights: EvalWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            pruning: true,
            perspective: Perspective::Engine,
            terminal_scores: false,
            weights: EvalWeights::default(),
        }
    }
}

impl SearchConfig {
    /// Sets the search depth, clamped to `1..=MAX_DEPTH`
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth.clamp(1, MAX_DEPTH);
        self
    }

    pub fn with_pruning(mut self, pruning: bool) -> Self {
        self.pruning = pruning;
        self
    }

    pub fn with_perspective(mut self, perspective: Perspective) -> Self {
        self.perspective = perspective;
        self
    }

    pub fn with_terminal_scores(mut self, terminal_scores: bool) -> Self {
        self.terminal_scores = terminal_scores;
        self
    }

    pub fn with_weights(mut self, weights: EvalWeights) -> Self {
        self.weights = weights;
        self
    }
}

/// Bounds of the alpha-beta search
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Window {
    pub alpha: f64,
    pub beta: f64,
}

impl Window {
    pub fn full() -> Self {
        Self {
            alpha: f64::NEG_INFINITY,
            beta: f64::INFINITY,
        }
    }
}

/// Counters collected during a single search (for diagnostics only)
#[derive(Clone, Debug, Default)]
pub struct SearchStats {
    pub nodes: u64,
}

/// Time source for search diagnostics
pub trait Clock {
    fn start(&mut self);
    fn elapsed(&self) -> Duration;
}

/// A `Clock` reading the system's monotonic time
pub struct SystemClock {
    started: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn start(&mut self) {
        self.started = Instant::now();
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// How a move was chosen
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Decision {
    /// The move wins on the spot
    ImmediateWin,
    /// The move blocks an opponent win on their next turn
    ForcedBlock,
    /// The move came out of the tree search
    Search,
    /// The board is full
    NoMoves,
}

/// The chosen move along with the diagnostics of the search that found it
#[derive(Clone, Debug)]
pub struct SearchReport {
    pub column: Option<usize>,
    pub decision: Decision,
    /// Value of the chosen move, when the tree search ran
    pub score: Option<f64>,
    /// Value of each root column searched, indexed by column
    pub root_scores: [Option<f64>; WIDTH],
    pub nodes: u64,
    pub elapsed: Duration,
}

impl SearchReport {
    fn new(decision: Decision, column: Option<usize>) -> Self {
        Self {
            column,
            decision,
            score: None,
            root_scores: [None; WIDTH],
            nodes: 0,
            elapsed: Duration::default(),
        }
    }
}

/// A minimax agent for Connect 4 positions
///
/// # Notes
/// Scores are not negamax-relative: every node is scored for one fixed
/// color, chosen by the configured [`Perspective`]. Nodes where that color
/// moves maximize and the others minimize.
#[derive(Clone, Debug, Default)]
pub struct Searcher {
    config: SearchConfig,
    evaluator: Evaluator,
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            evaluator: Evaluator::new(config.weights),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Picks a move for `ai`, timing the search with the system clock
    pub fn search(&self, board: &BitBoard, ai: Color) -> SearchReport {
        self.search_with_clock(board, ai, &mut SystemClock::default())
    }

    /// Picks a move for `ai`, timing the search with `clock`
    pub fn search_with_clock<C: Clock>(
        &self,
        board: &BitBoard,
        ai: Color,
        clock: &mut C,
    ) -> SearchReport {
        clock.start();

        let mut report = if let Some(column) = board.find_killer_move(ai).column {
            trace!("{} wins immediately in column {}", ai, column);
            SearchReport::new(Decision::ImmediateWin, Some(column))
        } else if let Some(column) = board.find_killer_move(ai.opponent()).column {
            trace!("{} must block column {}", ai, column);
            SearchReport::new(Decision::ForcedBlock, Some(column))
        } else {
            let mut stats = SearchStats::default();
            let mut report = self.top_level_search(board, ai, &mut stats);
            report.nodes = stats.nodes;
            report
        };

        report.elapsed = clock.elapsed();
        debug!(
            "{} plays {:?} ({:?}), {} nodes in {:?}",
            ai, report.column, report.decision, report.nodes, report.elapsed
        );
        report
    }

    /// Searches every root move, keeping the first strictly best one
    fn top_level_search(&self, board: &BitBoard, ai: Color, stats: &mut SearchStats) -> SearchReport {
        let eval_color = match self.config.perspective {
            Perspective::Engine => ai,
            Perspective::Opponent => ai.opponent(),
        };
        let maximizing = eval_color == ai;
        let losing_value = if maximizing {
            LOSING_MOVE_VALUE
        } else {
            -LOSING_MOVE_VALUE
        };

        let mut report = SearchReport::new(Decision::NoMoves, None);
        let mut window = Window::full();
        let mut best: Option<(usize, f64)> = None;

        for column in board.open_columns() {
            let next = board.play(column, ai);
            let mut value = self.minimax(
                next,
                ai.opponent(),
                eval_color,
                self.config.depth.saturating_sub(1),
                window,
                stats,
            );
            // keep the move available, but behind anything that doesn't lose at once
            if next.find_killer_move(ai.opponent()).is_found() {
                value = losing_value;
            }
            report.root_scores[column] = Some(value);
            debug!("column {}: {}", column, value);

            let improves = match best {
                None => true,
                Some((_, incumbent)) if maximizing => value > incumbent,
                Some((_, incumbent)) => value < incumbent,
            };
            if improves {
                best = Some((column, value));
            }

            if self.config.pruning {
                if maximizing {
                    window.alpha = window.alpha.max(value);
                } else {
                    window.beta = window.beta.min(value);
                }
            }
        }

        if let Some((column, value)) = best {
            report.decision = Decision::Search;
            report.column = Some(column);
            report.score = Some(value);
        }
        report
    }

    /// Performs game tree search
    ///
    /// Returns the value of `board` for `eval_color` with `to_move` next to play
    fn minimax(
        &self,
        board: BitBoard,
        to_move: Color,
        eval_color: Color,
        depth: usize,
        mut window: Window,
        stats: &mut SearchStats,
    ) -> f64 {
        stats.nodes += 1;

        let winner = board.winner();
        if depth == 0 || winner.is_some() || board.is_full() {
            return self.leaf_value(&board, eval_color, winner, depth);
        }

        if to_move == eval_color {
            let mut best = f64::NEG_INFINITY;
            for column in board.open_columns() {
                let value = self.minimax(
                    board.play(column, to_move),
                    to_move.opponent(),
                    eval_color,
                    depth - 1,
                    window,
                    stats,
                );
                if value > best {
                    best = value;
                }
                if self.config.pruning {
                    // the minimizing player above will not allow this branch
                    if best >= window.beta {
                        break;
                    }
                    window.alpha = window.alpha.max(best);
                }
            }
            best
        } else {
            let mut best = f64::INFINITY;
            for column in board.open_columns() {
                let value = self.minimax(
                    board.play(column, to_move),
                    to_move.opponent(),
                    eval_color,
                    depth - 1,
                    window,
                    stats,
                );
                if value < best {
                    best = value;
                }
                if self.config.pruning {
                    if best <= window.alpha {
                        break;
                    }
                    window.beta = window.beta.min(best);
                }
            }
            best
        }
    }

    fn leaf_value(
        &self,
        board: &BitBoard,
        eval_color: Color,
        winner: Option<Color>,
        depth: usize,
    ) -> f64 {
        if self.config.terminal_scores {
            if let Some(winner) = winner {
                // prefer wins found closer to the root
                let score = TERMINAL_SCORE + depth as f64;
                return if winner == eval_color { score } else { -score };
            }
        }
        self.evaluator.evaluate(board, eval_color)
    }
}

/// Picks a move for `ai` with the default search settings
///
/// Returns `None` only when the board is full.
pub fn choose_move(board: &BitBoard, ai: Color) -> Option<usize> {
    Searcher::default().search(board, ai).column
}

/// Runs a search on the rayon thread pool, delivering the report over a channel
pub fn spawn_search(searcher: Searcher, board: BitBoard, ai: Color) -> Receiver<SearchReport> {
    let (tx, rx) = channel();
    rayon::spawn(move || {
        // the receiver may have been dropped if the host gave up waiting
        let _ = tx.send(searcher.search(&board, ai));
    });
    rx
}
