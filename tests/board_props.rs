use broadside::{Board, CellState, ScriptedOpponent, ShotResult, GRID_SIZE, NUM_SHIPS};
use proptest::prelude::*;
use rand::{rngs::SmallRng, SeedableRng};

fn random_board(seed: u64) -> Board {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut board = Board::new();
    ScriptedOpponent::new().place_fleet(&mut rng, &mut board).unwrap();
    board
}

fn shot_strategy() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0..GRID_SIZE, 0..GRID_SIZE), 0..120)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sunk_count_is_monotonic_and_bounded(seed in any::<u64>(), shots in shot_strategy()) {
        let mut board = random_board(seed);
        let mut last = 0;
        for (col, row) in shots {
            let _ = board.receive_shot(col, row);
            let sunk = board.sunk_count();
            prop_assert!(sunk >= last);
            prop_assert!(sunk <= NUM_SHIPS);
            last = sunk;
        }
        prop_assert_eq!(board.is_defeated(), last == NUM_SHIPS);
    }

    #[test]
    fn placed_ship_blocks_overlapping_placement(seed in any::<u64>()) {
        let board = random_board(seed);
        for ship in board.ships() {
            let (col, row) = ship.origin();
            prop_assert!(!board.is_valid_placement(2, col, row, ship.orientation()));
            prop_assert!(!board.is_valid_placement(2, col, row, ship.orientation().rotated()));
        }
    }

    #[test]
    fn miss_leaves_ships_untouched(seed in any::<u64>(), col in 0..GRID_SIZE, row in 0..GRID_SIZE) {
        let mut board = random_board(seed);
        prop_assume!(board.cell(col, row).unwrap() == CellState::Empty);
        let ships_before = board.ships().to_vec();
        prop_assert_eq!(board.receive_shot(col, row).unwrap(), ShotResult::Miss);
        prop_assert_eq!(board.ships(), ships_before.as_slice());
        prop_assert_eq!(board.sunk_count(), 0);
    }

    #[test]
    fn repeated_shot_changes_nothing(seed in any::<u64>(), col in 0..GRID_SIZE, row in 0..GRID_SIZE) {
        let mut board = random_board(seed);
        board.receive_shot(col, row).unwrap();
        let after_first = board.clone();
        prop_assert!(board.receive_shot(col, row).is_err());
        prop_assert_eq!(board, after_first);
    }

    #[test]
    fn grid_counts_match_shots(seed in any::<u64>(), shots in shot_strategy()) {
        let mut board = random_board(seed);
        let mut hits = 0;
        let mut misses = 0;
        for (col, row) in shots {
            match board.receive_shot(col, row) {
                Ok(ShotResult::Miss) => misses += 1,
                Ok(_) => hits += 1,
                Err(_) => {}
            }
        }
        let grid = board.grid();
        let cells = grid.iter().flatten();
        prop_assert_eq!(cells.clone().filter(|c| **c == CellState::Hit).count(), hits);
        prop_assert_eq!(cells.filter(|c| **c == CellState::Miss).count(), misses);
    }
}
