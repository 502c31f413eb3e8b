//! Common types: shot results, cell states and the core error enums.

use crate::bitboard::BitBoardError;

/// Outcome of a shot against a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum ShotResult {
    /// Shot landed on water.
    Miss,
    /// Shot damaged a ship that is still afloat.
    Hit,
    /// Shot took the last segment of a ship.
    Sunk,
}

impl ShotResult {
    /// Hits and sinks both count as landing on a ship.
    pub fn is_hit(self) -> bool {
        !matches!(self, ShotResult::Miss)
    }

    /// Protocol spelling (`"Hit"`, `"Miss"`, `"Sunk"`).
    pub fn as_str(self) -> &'static str {
        match self {
            ShotResult::Miss => "Miss",
            ShotResult::Hit => "Hit",
            ShotResult::Sunk => "Sunk",
        }
    }
}

impl core::fmt::Display for ShotResult {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one cell of a board's occupancy grid (incoming damage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellState {
    Empty,
    ShipPresent,
    Hit,
    Miss,
}

/// State of one cell of the owner's outgoing shot record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShotMark {
    NotFired,
    Hit,
    Miss,
}

/// Errors returned by Board operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Coordinate outside the grid.
    OutOfBounds,
    /// Ship would leave the grid.
    ShipOutOfBounds,
    /// Ship placement overlaps another ship.
    ShipOverlaps,
    /// The whole fleet is already on the board.
    FleetComplete,
    /// Ship size does not match the next ship in the fleet.
    UnexpectedShipSize { expected: usize, got: usize },
    /// The cell has already been shot at.
    AlreadyFired,
    /// A ship cell was hit but no placed ship covers it.
    UnknownShipHit,
    /// Unable to place ship (random placement gave up).
    UnableToPlaceShip,
    /// Submitted grid disagrees with the ship list it came with.
    GridMismatch,
}

impl From<BitBoardError> for BoardError {
    fn from(err: BitBoardError) -> Self {
        match err {
            BitBoardError::IndexOutOfBounds { .. } => BoardError::OutOfBounds,
        }
    }
}

impl core::fmt::Display for BoardError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BoardError::OutOfBounds => write!(f, "Coordinate is outside the board"),
            BoardError::ShipOutOfBounds => write!(f, "Ship placement is out of bounds"),
            BoardError::ShipOverlaps => write!(f, "Ship placement overlaps with another ship"),
            BoardError::FleetComplete => write!(f, "All ships are already placed"),
            BoardError::UnexpectedShipSize { expected, got } => {
                write!(f, "Expected a ship of size {}, got {}", expected, got)
            }
            BoardError::AlreadyFired => write!(f, "A shot was already fired at this position"),
            BoardError::UnknownShipHit => write!(f, "Hit a ship cell not covered by any ship"),
            BoardError::UnableToPlaceShip => write!(f, "Unable to place ship"),
            BoardError::GridMismatch => write!(f, "Grid does not match the submitted ships"),
        }
    }
}
