use broadside::{
    Board, BoardError, CellState, Orientation, ScriptedOpponent, ShipSpec, ShotMark, ShotResult,
    FLEET, GRID_SIZE, NUM_SHIPS, TOTAL_SHIP_CELLS,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Fleet stacked in the top rows: ship `i` runs horizontally from (0, i).
fn stacked_board() -> Board {
    let mut board = Board::new();
    for (i, def) in FLEET.iter().enumerate() {
        board.place(def.length(), 0, i, Orientation::Horizontal).unwrap();
    }
    board
}

#[test]
fn test_place_in_fleet_order() {
    let mut board = Board::new();
    assert_eq!(board.next_ship(), Some(FLEET[0]));
    assert_eq!(
        board.place(3, 0, 0, Orientation::Horizontal).unwrap_err(),
        BoardError::UnexpectedShipSize { expected: 5, got: 3 }
    );
    board.place(5, 0, 0, Orientation::Horizontal).unwrap();
    assert_eq!(board.next_ship(), Some(FLEET[1]));
    assert_eq!(board.placed_count(), 1);
    assert!(!board.is_ready());
}

#[test]
fn test_place_rejects_out_of_bounds_and_overlap() {
    let mut board = Board::new();
    assert_eq!(
        board.place(5, 6, 0, Orientation::Horizontal).unwrap_err(),
        BoardError::ShipOutOfBounds
    );
    assert_eq!(
        board.place(5, 0, 6, Orientation::Vertical).unwrap_err(),
        BoardError::ShipOutOfBounds
    );
    board.place(5, 0, 0, Orientation::Horizontal).unwrap();
    assert!(!board.is_valid_placement(4, 2, 0, Orientation::Vertical));
    assert_eq!(
        board.place(4, 2, 0, Orientation::Vertical).unwrap_err(),
        BoardError::ShipOverlaps
    );
    // A rejected placement leaves the board unchanged.
    assert_eq!(board.placed_count(), 1);
    assert!(board.is_valid_placement(4, 2, 1, Orientation::Vertical));
}

#[test]
fn test_huge_size_is_not_a_valid_placement() {
    let board = Board::new();
    assert!(!board.is_valid_placement(usize::MAX, 3, 3, Orientation::Horizontal));
    assert!(!board.is_valid_placement(usize::MAX, 3, 3, Orientation::Vertical));
    assert!(!board.is_valid_placement(usize::MAX - 2, 0, 9, Orientation::Vertical));
}

#[test]
fn test_fleet_complete() {
    let mut board = stacked_board();
    assert!(board.is_ready());
    assert_eq!(board.next_ship(), None);
    assert_eq!(
        board.place_next(0, 9, Orientation::Horizontal).unwrap_err(),
        BoardError::FleetComplete
    );
    let ship_cells = board
        .grid()
        .iter()
        .flatten()
        .filter(|c| **c == CellState::ShipPresent)
        .count();
    assert_eq!(ship_cells, TOTAL_SHIP_CELLS);
}

#[test]
fn test_receive_shot_hit_sink_miss() {
    let mut board = stacked_board();
    // Destroyer is the last ship, two cells at (0,4) and (1,4).
    assert_eq!(board.receive_shot(0, 4).unwrap(), ShotResult::Hit);
    assert_eq!(board.cell(0, 4).unwrap(), CellState::Hit);
    assert_eq!(board.sunk_count(), 0);
    assert_eq!(board.receive_shot(1, 4).unwrap(), ShotResult::Sunk);
    assert_eq!(board.sunk_count(), 1);

    assert_eq!(board.receive_shot(9, 9).unwrap(), ShotResult::Miss);
    assert_eq!(board.cell(9, 9).unwrap(), CellState::Miss);
}

#[test]
fn test_repeated_shot_is_rejected() {
    let mut board = stacked_board();
    board.receive_shot(0, 0).unwrap();
    board.receive_shot(5, 5).unwrap();
    let before = board.clone();
    assert_eq!(board.receive_shot(0, 0).unwrap_err(), BoardError::AlreadyFired);
    assert_eq!(board.receive_shot(5, 5).unwrap_err(), BoardError::AlreadyFired);
    assert_eq!(board, before);
}

#[test]
fn test_shot_out_of_bounds() {
    let mut board = stacked_board();
    assert_eq!(
        board.receive_shot(GRID_SIZE, 0).unwrap_err(),
        BoardError::OutOfBounds
    );
    assert_eq!(board.cell(0, GRID_SIZE).unwrap_err(), BoardError::OutOfBounds);
}

#[test]
fn test_defeated_after_every_cell_hit() {
    let mut board = stacked_board();
    let cells: Vec<_> = board.ships().iter().flat_map(|s| s.cells()).collect();
    for (col, row) in cells {
        assert!(!board.is_defeated());
        assert!(board.receive_shot(col, row).unwrap().is_hit());
    }
    assert!(board.is_defeated());
    assert_eq!(board.sunk_count(), NUM_SHIPS);
}

#[test]
fn test_record_shot_tracks_outgoing_fire() {
    let mut board = Board::new();
    assert_eq!(board.shot_at(3, 4).unwrap(), ShotMark::NotFired);
    board.record_shot(3, 4, ShotResult::Hit).unwrap();
    board.record_shot(5, 5, ShotResult::Miss).unwrap();
    assert_eq!(board.shot_at(3, 4).unwrap(), ShotMark::Hit);
    assert_eq!(board.shots_grid()[5][5], ShotMark::Miss);
    assert!(board.has_fired(3, 4).unwrap());
    assert_eq!(board.shots_fired_count(), 2);
    assert_eq!(board.unfired().count_ones(), GRID_SIZE * GRID_SIZE - 2);
    assert_eq!(
        board.record_shot(3, 4, ShotResult::Miss).unwrap_err(),
        BoardError::AlreadyFired
    );
    // Outgoing fire never touches the own grid.
    assert_eq!(board.cell(3, 4).unwrap(), CellState::Empty);
}

#[test]
fn test_mirror_incoming_is_idempotent() {
    let mut board = stacked_board();
    board.mirror_incoming(0, 4, ShotResult::Hit).unwrap();
    board.mirror_incoming(1, 4, ShotResult::Sunk).unwrap();
    board.mirror_incoming(1, 4, ShotResult::Sunk).unwrap();
    board.mirror_incoming(7, 7, ShotResult::Miss).unwrap();
    assert_eq!(board.sunk_count(), 1);
    assert_eq!(board.cell(7, 7).unwrap(), CellState::Miss);
}

#[test]
fn test_from_ships_replays_placement() {
    let board = stacked_board();
    let specs: Vec<ShipSpec> = board.ships().iter().map(ShipSpec::from).collect();
    let rebuilt = Board::from_ships(&specs).unwrap();
    assert_eq!(rebuilt.grid(), board.grid());

    let mut overlapping = specs.clone();
    overlapping[1].row = 0;
    assert_eq!(
        Board::from_ships(&overlapping).unwrap_err(),
        BoardError::ShipOverlaps
    );
}

#[test]
fn test_random_fleet_has_no_overlap() {
    let opponent = ScriptedOpponent::new();
    for seed in 0..20 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut board = Board::new();
        opponent.place_fleet(&mut rng, &mut board).unwrap();
        assert!(board.is_ready());
        let mask_total: usize = board.ships().iter().map(|s| s.mask().count_ones()).sum();
        assert_eq!(mask_total, TOTAL_SHIP_CELLS);
        let ship_cells = board
            .grid()
            .iter()
            .flatten()
            .filter(|c| **c == CellState::ShipPresent)
            .count();
        assert_eq!(ship_cells, TOTAL_SHIP_CELLS);
    }
}
