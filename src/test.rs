#[cfg(test)]
pub mod test {
    use anyhow::Result;
    use std::time::Duration;

    use crate::alignment::*;
    use crate::bitboard::*;
    use crate::error::BoardError;
    use crate::evaluation::*;
    use crate::search::*;

    //   B  B  B  .  .  .  .
    //   A  A  A  .  .  .  .  >> 112233, A to move
    const THREE_IN_A_ROW: &str = "112233";

    // every open column hands player B a win on the next move
    const ALL_MOVES_LOSE: &str = "512514146152321425517542464266767637";

    fn assert_close(left: f64, right: f64) {
        assert!(
            (left - right).abs() < 1e-9,
            "{} is not close to {}",
            left,
            right
        );
    }

    // deterministic xorshift, enough to wander through reachable positions
    fn next_random(state: &mut u64) -> u64 {
        *state ^= *state << 13;
        *state ^= *state >> 7;
        *state ^= *state << 17;
        *state
    }

    struct FixedClock {
        starts: usize,
        elapsed: Duration,
    }

    impl Clock for FixedClock {
        fn start(&mut self) {
            self.starts += 1;
        }

        fn elapsed(&self) -> Duration {
            self.elapsed
        }
    }

    #[test]
    pub fn alignment_tables() {
        let all: Vec<&Grouping> = groupings().collect();
        assert_eq!(all.len(), 69);

        let full_board = (1u64 << 42) - 1;
        for (i, grouping) in all.iter().enumerate() {
            assert_eq!(grouping.mask.count_ones(), 4);
            assert_eq!(grouping.mask & !full_board, 0);
            assert!(all[i + 1..].iter().all(|other| other.mask != grouping.mask));
        }

        assert_eq!(
            HORIZONTAL[0].mask,
            tile(0, 0) | tile(1, 0) | tile(2, 0) | tile(3, 0)
        );
        assert_eq!(VERTICAL[0].mask, 0b1111);
        assert!(VERTICAL.iter().all(|grouping| grouping.is_vertical()));
        // falling diagonals are indexed by their lowest tile
        assert_eq!(
            FALLING_DIAGONAL[0].mask,
            tile(0, 3) | tile(1, 2) | tile(2, 1) | tile(3, 0)
        );
        assert_eq!(FALLING_DIAGONAL[0].row, 0);
        assert_eq!(FALLING_DIAGONAL[2].row, 2);
        assert_eq!(
            RISING_DIAGONAL[0].mask,
            tile(0, 0) | tile(1, 1) | tile(2, 2) | tile(3, 3)
        );
        assert_eq!(FAMILIES[0][0].family, Family::Horizontal);
        assert_eq!(FAMILIES[3][0].family, Family::RisingDiagonal);
    }

    #[test]
    pub fn reachable_boards_stay_disjoint() -> Result<()> {
        let mut state = 0x2545f4914f6cdd1d;
        for _ in 0..200 {
            let mut board = BitBoard::new();
            let mut color = Color::A;
            loop {
                let open: Vec<usize> = board.open_columns().collect();
                if open.is_empty() {
                    break;
                }
                let column = open[(next_random(&mut state) % open.len() as u64) as usize];
                let next = board.apply_move(column, color)?;

                assert_eq!(next.occupancy_a() & next.occupancy_b(), 0);
                assert_eq!(next.disc_count(), board.disc_count() + 1);
                // no existing tile is cleared or overwritten
                assert_eq!(next.occupancy_a() & board.occupancy_a(), board.occupancy_a());
                assert_eq!(next.occupancy_b() & board.occupancy_b(), board.occupancy_b());
                assert_eq!(next.occupancy(color.opponent()), board.occupancy(color.opponent()));
                assert_eq!(next.column_height(column), board.column_height(column) + 1);
                assert!(next.check_victory().is_ok());

                board = next;
                color = color.opponent();
            }
            assert!(board.is_full());
        }
        Ok(())
    }

    #[test]
    pub fn illegal_moves() -> Result<()> {
        let board = BitBoard::from_moves("111111")?;
        assert!(!board.is_column_open(0));
        assert!(board.open_columns().all(|column| column != 0));
        assert_eq!(
            board.apply_move(0, Color::A),
            Err(BoardError::IllegalMove { column: 0 })
        );
        assert_eq!(
            board.apply_move(7, Color::A),
            Err(BoardError::IllegalMove { column: 7 })
        );
        assert_eq!(
            BitBoard::from_moves("1111111"),
            Err(BoardError::IllegalMove { column: 0 })
        );
        Ok(())
    }

    #[test]
    pub fn move_parsing() -> Result<()> {
        let board = BitBoard::from_moves("4453")?;
        assert_eq!(board.cell(3, 0), Some(Color::A));
        assert_eq!(board.cell(3, 1), Some(Color::B));
        assert_eq!(board.cell(4, 0), Some(Color::A));
        assert_eq!(board.cell(2, 0), Some(Color::B));
        assert_eq!(board.cell(2, 1), None);
        assert_eq!(board.next_to_move(), Color::A);

        assert_eq!(
            BitBoard::from_moves("12x"),
            Err(BoardError::ParseMove {
                position: 2,
                found: 'x'
            })
        );
        assert_eq!(
            BitBoard::from_moves("8"),
            Err(BoardError::ParseMove {
                position: 0,
                found: '8'
            })
        );
        Ok(())
    }

    #[test]
    pub fn invalid_board_state() {
        assert_eq!(
            BitBoard::from_masks(0b11, 0b10),
            Err(BoardError::InvalidBoardState { overlap: 0b10 })
        );
        assert_eq!(
            BitBoard::from_masks(1 << 42, 0),
            Err(BoardError::InvalidBoardState { overlap: 1 << 42 })
        );
    }

    #[test]
    pub fn open_column_order() -> Result<()> {
        let columns: Vec<usize> = BitBoard::new().open_columns().collect();
        assert_eq!(columns, MOVE_ORDER.to_vec());
        assert_eq!(columns, vec![3, 2, 4, 5, 1, 6, 0]);

        let board = BitBoard::from_moves("444444")?;
        let columns: Vec<usize> = board.open_columns().collect();
        assert_eq!(columns, vec![2, 4, 5, 1, 6, 0]);
        Ok(())
    }

    #[test]
    pub fn victory_detection() -> Result<()> {
        assert_eq!(BitBoard::new().check_victory()?, None);
        assert_eq!(BitBoard::from_moves("4453")?.check_victory()?, None);

        for grouping in groupings() {
            let board = BitBoard::from_masks(grouping.mask, 0)?;
            assert_eq!(board.check_victory()?, Some(Color::A));
            let board = BitBoard::from_masks(0, grouping.mask)?;
            assert_eq!(board.check_victory()?, Some(Color::B));

            // three out of four is not enough
            let partial = grouping.mask & (grouping.mask - 1);
            let board = BitBoard::from_masks(partial, grouping.mask ^ partial)?;
            assert_eq!(board.check_victory()?, None);
        }
        Ok(())
    }

    #[test]
    pub fn killer_moves() -> Result<()> {
        // A holds the bottom three tiles of the first column
        let board = BitBoard::from_moves("121213")?;
        let killer = board.find_killer_move(Color::A);
        assert_eq!(killer.column, Some(0));
        assert_eq!(killer.color, Color::A);
        assert_eq!(killer.sentinel_column(), 0);

        let killer = board.find_killer_move(Color::B);
        assert!(!killer.is_found());
        assert_eq!(killer.sentinel_column(), -1);

        assert_eq!(BitBoard::new().find_killer_move(Color::A).column, None);
        assert_eq!(
            BitBoard::from_moves(THREE_IN_A_ROW)?.find_killer_move(Color::A).column,
            Some(3)
        );
        Ok(())
    }

    #[test]
    pub fn evaluation_weights() -> Result<()> {
        let evaluator = Evaluator::default();
        assert_close(evaluator.evaluate(&BitBoard::new(), Color::A), 0.0);

        // four horizontal, one vertical, one of each diagonal
        let centre = BitBoard::from_masks(tile(3, 0), 0)?;
        assert_close(evaluator.evaluate(&centre, Color::A), 6.5);
        assert_close(evaluator.evaluate(&centre, Color::B), -6.5);

        let corner = BitBoard::from_masks(tile(0, 0), 0)?;
        assert_close(evaluator.evaluate(&corner, Color::A), 2.5);

        // higher alignments are worth less
        let top = BitBoard::from_masks(tile(0, 5), 0)?;
        assert_close(evaluator.evaluate(&top, Color::A), 0.40625);

        // the opponent's pairs weigh heavier, so the score is asymmetric
        let pair = BitBoard::from_masks(tile(3, 0) | tile(2, 0), 0)?;
        assert_close(evaluator.evaluate(&pair, Color::A), 12.2);
        assert_close(evaluator.evaluate(&pair, Color::B), -15.8);

        let contested = BitBoard::from_masks(tile(2, 0) | tile(3, 0) | tile(4, 0), tile(3, 1))?;
        assert_close(evaluator.evaluate(&contested, Color::A), 21.35);
        assert_close(evaluator.evaluate(&contested, Color::B), -32.15);

        let won = BitBoard::from_masks(HORIZONTAL[0].mask, 0)?;
        assert!(evaluator.evaluate(&won, Color::A) > 100000.0);
        assert!(evaluator.evaluate(&won, Color::B) < -100000.0);
        Ok(())
    }

    #[test]
    pub fn grouping_values() {
        let evaluator = Evaluator::default();
        assert_close(evaluator.grouping_value(&HORIZONTAL[0], 1, false), 1.0);
        assert_close(evaluator.grouping_value(&HORIZONTAL[0], 2, false), 2.4);
        assert_close(evaluator.grouping_value(&HORIZONTAL[0], 3, false), 8.4);
        assert_close(evaluator.grouping_value(&HORIZONTAL[0], 3, true), 12.6);
        assert_close(evaluator.grouping_value(&HORIZONTAL[0], 1, true), 1.0);
        assert_close(evaluator.grouping_value(&HORIZONTAL[0], 4, true), 100000.0);
        // vertical, starting on the second row
        assert_close(evaluator.grouping_value(&VERTICAL[1], 2, false), 0.6);
        // third row of horizontals
        assert_close(evaluator.grouping_value(&HORIZONTAL[8], 1, false), 0.25);
    }

    #[test]
    pub fn empty_board_takes_centre() {
        let report = Searcher::default().search(&BitBoard::new(), Color::A);
        assert_eq!(report.column, Some(3));
        assert_eq!(report.decision, Decision::Search);
        assert!(report.nodes > 0);
        assert_eq!(choose_move(&BitBoard::new(), Color::A), Some(3));

        let searcher = Searcher::new(
            SearchConfig::default()
                .with_depth(5)
                .with_perspective(Perspective::Opponent),
        );
        assert_eq!(searcher.search(&BitBoard::new(), Color::A).column, Some(3));
    }

    #[test]
    pub fn completes_three_in_a_row() -> Result<()> {
        let board = BitBoard::from_moves(THREE_IN_A_ROW)?;
        let report = Searcher::default().search(&board, Color::A);
        assert_eq!(report.column, Some(3));
        assert_eq!(report.decision, Decision::ImmediateWin);
        assert_eq!(report.nodes, 0);
        assert_eq!(report.score, None);
        Ok(())
    }

    #[test]
    pub fn blocks_opponent_win() -> Result<()> {
        // A threatens to complete the bottom row, B to move
        let board = BitBoard::from_moves("17263")?;
        let report = Searcher::default().search(&board, Color::B);
        assert_eq!(report.column, Some(3));
        assert_eq!(report.decision, Decision::ForcedBlock);
        assert_eq!(report.nodes, 0);
        Ok(())
    }

    #[test]
    pub fn every_move_loses() -> Result<()> {
        let board = BitBoard::from_moves(ALL_MOVES_LOSE)?;
        assert_eq!(board.next_to_move(), Color::A);
        assert!(!board.find_killer_move(Color::A).is_found());
        assert!(!board.find_killer_move(Color::B).is_found());

        let open: Vec<usize> = board.open_columns().collect();
        assert_eq!(open, vec![2, 6]);

        let report = Searcher::default().search(&board, Color::A);
        assert_eq!(report.decision, Decision::Search);
        assert_eq!(report.column, Some(2));
        assert!(board.is_column_open(2));
        assert_eq!(report.score, Some(LOSING_MOVE_VALUE));
        for column in 0..crate::WIDTH {
            if open.contains(&column) {
                assert_eq!(report.root_scores[column], Some(LOSING_MOVE_VALUE));
            } else {
                assert_eq!(report.root_scores[column], None);
            }
        }

        // a minimizing root records the mirrored value
        let searcher = Searcher::new(SearchConfig::default().with_perspective(Perspective::Opponent));
        let report = searcher.search(&board, Color::A);
        assert_eq!(report.column, Some(2));
        assert_eq!(report.score, Some(-LOSING_MOVE_VALUE));
        Ok(())
    }

    #[test]
    pub fn pruning_matches_minimax() -> Result<()> {
        for moves in ["", "44", "4455", "3432", "4444333", "42536"].iter() {
            let board = BitBoard::from_moves(moves)?;
            let ai = board.next_to_move();
            for perspective in [Perspective::Engine, Perspective::Opponent].iter() {
                let config = SearchConfig::default()
                    .with_depth(5)
                    .with_perspective(*perspective);
                let pruned = Searcher::new(config).search(&board, ai);
                let exhaustive = Searcher::new(config.with_pruning(false)).search(&board, ai);

                assert_eq!(pruned.column, exhaustive.column, "position {}", moves);
                assert_eq!(pruned.score, exhaustive.score, "position {}", moves);
                assert_eq!(pruned.decision, exhaustive.decision);
                assert!(pruned.nodes <= exhaustive.nodes);
            }
        }
        Ok(())
    }

    #[test]
    pub fn terminal_scores() -> Result<()> {
        // A can set up an unstoppable double threat
        let board = BitBoard::from_moves("4455")?;
        let heuristic = Searcher::new(SearchConfig::default().with_depth(5)).search(&board, Color::A);
        assert_eq!(heuristic.column, Some(2));
        assert!(heuristic.score.unwrap_or_default() < TERMINAL_SCORE);

        let searcher = Searcher::new(
            SearchConfig::default()
                .with_depth(5)
                .with_terminal_scores(true),
        );
        let report = searcher.search(&board, Color::A);
        assert_eq!(report.column, Some(2));
        assert!(report.score.unwrap_or_default() >= TERMINAL_SCORE);
        Ok(())
    }

    #[test]
    pub fn node_counting_and_clock() {
        let searcher = Searcher::new(SearchConfig::default().with_depth(1));
        let mut clock = FixedClock {
            starts: 0,
            elapsed: Duration::from_millis(42),
        };
        let report = searcher.search_with_clock(&BitBoard::new(), Color::A, &mut clock);

        // one node per root child
        assert_eq!(report.nodes, 7);
        assert_eq!(report.column, Some(3));
        assert_eq!(report.score, Some(6.5));
        assert_eq!(report.root_scores[3], Some(6.5));
        assert_eq!(report.root_scores[2], Some(4.5));
        assert_eq!(report.root_scores[0], Some(2.5));
        assert_eq!(report.elapsed, Duration::from_millis(42));
        assert_eq!(clock.starts, 1);
    }

    #[test]
    pub fn depth_is_clamped() {
        assert_eq!(SearchConfig::default().with_depth(0).depth, 1);
        assert_eq!(SearchConfig::default().with_depth(100).depth, MAX_DEPTH);
    }

    #[test]
    pub fn full_board_has_no_move() -> Result<()> {
        let a = BitBoard::column_mask(0)
            | BitBoard::column_mask(1)
            | BitBoard::column_mask(4)
            | BitBoard::column_mask(5);
        let b = BitBoard::column_mask(2) | BitBoard::column_mask(3) | BitBoard::column_mask(6);
        let board = BitBoard::from_masks(a, b)?;
        assert!(board.is_full());
        assert_eq!(board.open_columns().count(), 0);

        let report = Searcher::default().search(&board, Color::A);
        assert_eq!(report.column, None);
        assert_eq!(report.decision, Decision::NoMoves);
        assert_eq!(choose_move(&board, Color::B), None);
        Ok(())
    }

    #[test]
    pub fn background_search() -> Result<()> {
        let board = BitBoard::from_moves("3432")?;
        let searcher = Searcher::new(SearchConfig::default().with_depth(5));
        let expected = searcher.search(&board, Color::A);

        let receiver = spawn_search(searcher, board, Color::A);
        let report = receiver.recv()?;
        assert_eq!(report.column, expected.column);
        assert_eq!(report.column, Some(2));
        assert_eq!(report.score, expected.score);
        assert_eq!(report.nodes, expected.nodes);
        Ok(())
    }
}
