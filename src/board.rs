//! Per-participant board: ship placement, incoming damage and the owner's
//! outgoing shot record.

use alloc::vec::Vec;
use core::fmt;

use crate::bitboard::BitBoard;
use crate::common::{BoardError, CellState, ShotMark, ShotResult};
use crate::config::{FLEET, GRID_SIZE, NUM_SHIPS};
use crate::ship::{Orientation, Ship, ShipType};

pub(crate) type BB = BitBoard<u128, GRID_SIZE>;

/// A ship as placed on a [`Board`].
pub type FleetShip = Ship<u128, GRID_SIZE>;

/// A requested placement: size, origin (col, row) and orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipSpec {
    pub size: usize,
    pub col: usize,
    pub row: usize,
    pub orientation: Orientation,
}

impl From<&FleetShip> for ShipSpec {
    fn from(ship: &FleetShip) -> Self {
        let (col, row) = ship.origin();
        ShipSpec {
            size: ship.size(),
            col,
            row,
            orientation: ship.orientation(),
        }
    }
}

/// Row-major snapshot of a board, indexed `[row][col]`.
pub type Grid<C> = [[C; GRID_SIZE]; GRID_SIZE];

#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    ships: Vec<FleetShip>,
    ship_map: BB,
    hits: BB,
    misses: BB,
    shots_hit: BB,
    shots_missed: BB,
    sunk: usize,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board (no ships placed, no shots recorded).
    pub fn new() -> Self {
        Board {
            ships: Vec::with_capacity(NUM_SHIPS),
            ship_map: BB::new(),
            hits: BB::new(),
            misses: BB::new(),
            shots_hit: BB::new(),
            shots_missed: BB::new(),
            sunk: 0,
        }
    }

    /// Rebuild a board by replaying `specs` through [`Board::place`] in order.
    pub fn from_ships(specs: &[ShipSpec]) -> Result<Self, BoardError> {
        let mut board = Board::new();
        for spec in specs {
            board.place(spec.size, spec.col, spec.row, spec.orientation)?;
        }
        Ok(board)
    }

    /// The next ship the fleet expects, or `None` once all are placed.
    pub fn next_ship(&self) -> Option<ShipType> {
        FLEET.get(self.ships.len()).copied()
    }

    /// Bounds and collision check for a prospective ship.
    pub fn is_valid_placement(
        &self,
        size: usize,
        col: usize,
        row: usize,
        orientation: Orientation,
    ) -> bool {
        match FleetShip::new(size, orientation, col, row) {
            Ok(ship) => !ship.mask().intersects(&self.ship_map),
            Err(_) => false,
        }
    }

    /// Place the next ship of the fleet. `size` must match [`Board::next_ship`].
    pub fn place(
        &mut self,
        size: usize,
        col: usize,
        row: usize,
        orientation: Orientation,
    ) -> Result<(), BoardError> {
        let expected = self.next_ship().ok_or(BoardError::FleetComplete)?.length();
        if size != expected {
            return Err(BoardError::UnexpectedShipSize {
                expected,
                got: size,
            });
        }
        let ship = FleetShip::new(size, orientation, col, row)?;
        if ship.mask().intersects(&self.ship_map) {
            return Err(BoardError::ShipOverlaps);
        }
        self.ship_map |= ship.mask();
        self.ships.push(ship);
        Ok(())
    }

    /// Place whichever ship is next in the fleet.
    pub fn place_next(
        &mut self,
        col: usize,
        row: usize,
        orientation: Orientation,
    ) -> Result<(), BoardError> {
        let size = self.next_ship().ok_or(BoardError::FleetComplete)?.length();
        self.place(size, col, row, orientation)
    }

    /// Resolve an incoming shot at (`col`, `row`).
    pub fn receive_shot(&mut self, col: usize, row: usize) -> Result<ShotResult, BoardError> {
        if self.hits.get(row, col)? || self.misses.get(row, col)? {
            return Err(BoardError::AlreadyFired);
        }
        if !self.ship_map.get(row, col)? {
            self.misses.set(row, col)?;
            return Ok(ShotResult::Miss);
        }

        let ship = self
            .ships
            .iter_mut()
            .find(|ship| ship.covers(col, row))
            .ok_or(BoardError::UnknownShipHit)?;
        self.hits.set(row, col)?;
        ship.register_hit();
        if ship.is_sunk() {
            self.sunk += 1;
            Ok(ShotResult::Sunk)
        } else {
            Ok(ShotResult::Hit)
        }
    }

    /// Apply damage asserted by a remote arbiter to this local mirror.
    ///
    /// Re-asserting an already marked cell is a no-op.
    pub fn mirror_incoming(
        &mut self,
        col: usize,
        row: usize,
        result: ShotResult,
    ) -> Result<(), BoardError> {
        if self.hits.get(row, col)? || self.misses.get(row, col)? {
            return Ok(());
        }
        if !result.is_hit() {
            return Ok(self.misses.set(row, col)?);
        }
        self.hits.set(row, col)?;
        if let Some(ship) = self.ships.iter_mut().find(|ship| ship.covers(col, row)) {
            ship.register_hit();
        }
        self.sunk = self.ships.iter().filter(|ship| ship.is_sunk()).count();
        Ok(())
    }

    /// Record the result of a shot this board's owner fired at the opponent.
    pub fn record_shot(
        &mut self,
        col: usize,
        row: usize,
        result: ShotResult,
    ) -> Result<(), BoardError> {
        if self.has_fired(col, row)? {
            return Err(BoardError::AlreadyFired);
        }
        if result.is_hit() {
            self.shots_hit.set(row, col)?;
        } else {
            self.shots_missed.set(row, col)?;
        }
        Ok(())
    }

    /// Whether the owner already fired at (`col`, `row`).
    pub fn has_fired(&self, col: usize, row: usize) -> Result<bool, BoardError> {
        Ok(self.shots_hit.get(row, col)? || self.shots_missed.get(row, col)?)
    }

    pub fn shot_at(&self, col: usize, row: usize) -> Result<ShotMark, BoardError> {
        if self.shots_hit.get(row, col)? {
            Ok(ShotMark::Hit)
        } else if self.shots_missed.get(row, col)? {
            Ok(ShotMark::Miss)
        } else {
            Ok(ShotMark::NotFired)
        }
    }

    /// Cells the owner has not fired at yet.
    pub fn unfired(&self) -> BitBoard<u128, GRID_SIZE> {
        !(self.shots_hit | self.shots_missed)
    }

    pub fn shots_fired_count(&self) -> usize {
        self.shots_hit.count_ones() + self.shots_missed.count_ones()
    }

    pub fn cell(&self, col: usize, row: usize) -> Result<CellState, BoardError> {
        if self.hits.get(row, col)? {
            Ok(CellState::Hit)
        } else if self.misses.get(row, col)? {
            Ok(CellState::Miss)
        } else if self.ship_map.get(row, col)? {
            Ok(CellState::ShipPresent)
        } else {
            Ok(CellState::Empty)
        }
    }

    /// Occupancy grid snapshot, `[row][col]`.
    pub fn grid(&self) -> Grid<CellState> {
        let mut grid = [[CellState::Empty; GRID_SIZE]; GRID_SIZE];
        for (row, cells) in grid.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                *cell = self.cell(col, row).unwrap_or(CellState::Empty);
            }
        }
        grid
    }

    /// Outgoing shot record snapshot, `[row][col]`.
    pub fn shots_grid(&self) -> Grid<ShotMark> {
        let mut grid = [[ShotMark::NotFired; GRID_SIZE]; GRID_SIZE];
        for (row, cells) in grid.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                *cell = self.shot_at(col, row).unwrap_or(ShotMark::NotFired);
            }
        }
        grid
    }

    /// Placed ships in placement order.
    pub fn ships(&self) -> &[FleetShip] {
        &self.ships
    }

    pub fn placed_count(&self) -> usize {
        self.ships.len()
    }

    pub fn sunk_count(&self) -> usize {
        self.sunk
    }

    pub fn is_ready(&self) -> bool {
        self.ships.len() == NUM_SHIPS
    }

    pub fn is_defeated(&self) -> bool {
        self.sunk == NUM_SHIPS
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("ships", &self.ships)
            .field("sunk", &self.sunk)
            .field("hits", &self.hits.count_ones())
            .field("misses", &self.misses.count_ones())
            .field("shots_fired", &self.shots_fired_count())
            .finish()
    }
}
