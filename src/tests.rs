#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::board::{Board, BoardError};
    use crate::dispatch::{solve, solve_default, SolveError, SolveReport, Strategy};
    use crate::wire;

    const ALL_STRATEGIES: [Strategy; 3] = [Strategy::PathEnum, Strategy::Heuristic, Strategy::Sat];
    const GENEROUS: Duration = Duration::from_secs(30);

    /// Unwrap a successful report and check the covering invariants: clues
    /// preserved, no cell empty, every color class a single simple path.
    fn assert_solution(input: &Board, report: &SolveReport) -> Board {
        assert!(report.error.is_none(), "unexpected error: {:?}", report.error);
        assert!(!report.timed_out);
        let solved = report.board.clone().expect("expected a completed board");

        let n = input.size();
        assert_eq!(solved.size(), n);
        for row in 0..n {
            for col in 0..n {
                let clue = input.cell(row, col);
                if clue != 0 {
                    assert_eq!(
                        solved.cell(row, col),
                        clue,
                        "clue at ({row}, {col}) was overwritten"
                    );
                }
                assert_ne!(solved.cell(row, col), 0, "cell ({row}, {col}) left empty");
            }
        }
        assert!(
            solved.is_completed_solution(),
            "returned board violates the covering invariants:\n{solved}"
        );
        solved
    }

    fn assert_no_solution(board: &Board, strategy: Strategy) {
        let report = solve_default(board, strategy);
        assert!(report.board.is_none(), "{strategy} found a spurious solution");
        assert!(!report.timed_out);
        assert_eq!(report.error, Some(SolveError::NoSolution));
    }

    #[test]
    fn solve_most_basic() {
        // flow free classic pack level 1; the solution is unique, so all
        // three strategies must agree on it exactly
        let board = wire::decode(
            "R.B.G
..Y.O
.....
.B.G.
.RYO.
",
        )
        .unwrap();

        for strategy in ALL_STRATEGIES {
            let report = solve(&board, strategy, GENEROUS);
            let solved = assert_solution(&board, &report);
            assert_eq!(
                format!("{solved}"),
                "RBBGG
RBYGO
RBYGO
RBYGO
RRYOO
"
            );
        }
    }

    #[test]
    fn solve_two_color_four_by_four() {
        let board = wire::decode("R..B\n....\n.RB.\n....\n").unwrap();
        for strategy in ALL_STRATEGIES {
            let report = solve(&board, strategy, GENEROUS);
            assert_solution(&board, &report);
            // the search strategies report live expansion counters; SAT none
            match strategy {
                Strategy::Sat => assert_eq!(report.node_count, 0),
                _ => assert!(report.node_count > 0),
            }
        }
    }

    #[test]
    fn snake_fills_the_two_by_two() {
        // a single pair of adjacent endpoints must still cover the whole
        // board, which forces the path the long way around
        let board = wire::decode("RR\n..\n").unwrap();
        for strategy in ALL_STRATEGIES {
            let report = solve(&board, strategy, GENEROUS);
            let solved = assert_solution(&board, &report);
            assert_eq!(format!("{solved}"), "RR\nRR\n");
        }
    }

    #[test]
    fn diagonal_cross_is_unsolvable() {
        let board = wire::decode("RB\nBR\n").unwrap();
        for strategy in ALL_STRATEGIES {
            assert_no_solution(&board, strategy);
        }
    }

    #[test]
    fn parity_blocked_board_is_unsolvable() {
        // both pairs sit on the wrong checkerboard parity for any covering
        let board = wire::decode("RB.\nBR.\n...\n").unwrap();
        for strategy in ALL_STRATEGIES {
            assert_no_solution(&board, strategy);
        }
    }

    #[test]
    fn walled_in_endpoint_is_unsolvable() {
        // B's endpoints seal the corner R sits in
        let board = wire::decode("RB..\nB...\n....\n...R\n").unwrap();
        for strategy in ALL_STRATEGIES {
            assert_no_solution(&board, strategy);
        }
    }

    #[test]
    fn board_without_colors_is_unsolvable() {
        let board = wire::decode("..\n..\n").unwrap();
        for strategy in ALL_STRATEGIES {
            assert_no_solution(&board, strategy);
        }
    }

    #[test]
    fn solving_is_idempotent() {
        let board = wire::decode("R..B\n....\n.RB.\n....\n").unwrap();
        for strategy in ALL_STRATEGIES {
            let first = solve(&board, strategy, GENEROUS);
            let solved = assert_solution(&board, &first);

            // feeding the solved board back returns it unchanged, for every
            // strategy, even with no time budget at all
            for again in ALL_STRATEGIES {
                let report = solve(&solved, again, Duration::ZERO);
                assert_eq!(report.board.as_ref(), Some(&solved));
                assert!(!report.timed_out);
            }
        }
    }

    #[test]
    fn ten_by_ten_solves_within_deadline() {
        let board = ten_by_ten();
        for strategy in [Strategy::Heuristic, Strategy::Sat] {
            let report = solve(&board, strategy, GENEROUS);
            assert_solution(&board, &report);
        }
    }

    #[test]
    fn ten_by_ten_under_pressure_never_lies() {
        // with 100ms the enumeration strategy may well run out of time, but
        // whatever comes back must be a timeout or a genuine solution
        let board = ten_by_ten();
        for strategy in ALL_STRATEGIES {
            let report = solve(&board, strategy, Duration::from_millis(100));
            match &report.board {
                Some(_) => {
                    assert_solution(&board, &report);
                }
                None => {
                    assert!(report.timed_out);
                    assert_eq!(report.error, Some(SolveError::Timeout));
                }
            }
        }
    }

    #[test]
    fn pathological_board_under_pressure_never_lies() {
        let board = fourteen_by_fourteen();
        for strategy in ALL_STRATEGIES {
            let report = solve(&board, strategy, Duration::from_millis(50));
            match &report.board {
                Some(_) => {
                    assert_solution(&board, &report);
                }
                None => {
                    assert!(report.timed_out);
                    assert_eq!(report.error, Some(SolveError::Timeout));
                }
            }
        }
    }

    #[test]
    fn exhausted_deadline_times_out_immediately() {
        let board = wire::decode("R..B\n....\n.RB.\n....\n").unwrap();
        for strategy in ALL_STRATEGIES {
            let report = solve(&board, strategy, Duration::ZERO);
            assert!(report.board.is_none());
            assert!(report.timed_out);
            assert_eq!(report.error, Some(SolveError::Timeout));
        }
    }

    #[test]
    fn unpaired_colors_are_rejected() {
        for text in ["R.\n..\n", "RR\nR.\n"] {
            let board = wire::decode(text).unwrap();
            for strategy in ALL_STRATEGIES {
                let report = solve_default(&board, strategy);
                assert!(report.board.is_none());
                assert!(matches!(
                    report.error,
                    Some(SolveError::InvalidBoard { .. })
                ));
            }
        }
    }

    #[test]
    fn malformed_grids_are_rejected() {
        assert!(matches!(
            Board::from_rows(&[vec![0, 0], vec![0]]),
            Err(BoardError::NotSquare { .. })
        ));
        assert_eq!(
            Board::from_rows(&[vec![0]]),
            Err(BoardError::SizeOutOfRange(1))
        );
        assert!(matches!(
            Board::from_rows(&vec![vec![0; 16]; 16]),
            Err(BoardError::SizeOutOfRange(16))
        ));
        assert_eq!(
            Board::from_rows(&[vec![17, 0], vec![0, 17]]),
            Err(BoardError::ColorOutOfRange(17))
        );
    }

    #[test]
    fn strategy_names_round_trip() {
        for strategy in ALL_STRATEGIES {
            assert_eq!(format!("{strategy}").parse::<Strategy>(), Ok(strategy));
        }
        assert!("dfs".parse::<Strategy>().is_err());
    }

    /// Five pairs, each openable into a two-row snake; solvable many ways.
    fn ten_by_ten() -> Board {
        wire::decode(
            "R.........
R.........
B.........
B.........
Y.........
Y.........
G.........
G.........
O.........
O.........
",
        )
        .unwrap()
    }

    /// Seven pairs on fourteen rows, same construction.
    fn fourteen_by_fourteen() -> Board {
        wire::decode(
            "R.............
R.............
B.............
B.............
Y.............
Y.............
G.............
G.............
O.............
O.............
C.............
C.............
M.............
M.............
",
        )
        .unwrap()
    }
}
