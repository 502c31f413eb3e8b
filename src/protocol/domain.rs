//! Wire shapes of board data carried inside `PLACEMENT_DONE`.

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::board::{Board, FleetShip, Grid, ShipSpec};
use crate::common::{BoardError, CellState};
use crate::config::GRID_SIZE;
use crate::ship::Orientation;

use super::ProtocolError;

/// One entry of the `ships` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipRecord {
    pub size: usize,
    pub col: usize,
    pub row: usize,
    pub orientation: Orientation,
    #[serde(default)]
    pub hits: usize,
}

impl From<&FleetShip> for ShipRecord {
    fn from(ship: &FleetShip) -> Self {
        let (col, row) = ship.origin();
        ShipRecord {
            size: ship.size(),
            col,
            row,
            orientation: ship.orientation(),
            hits: ship.hits(),
        }
    }
}

impl From<ShipRecord> for ShipSpec {
    fn from(record: ShipRecord) -> Self {
        ShipSpec {
            size: record.size,
            col: record.col,
            row: record.row,
            orientation: record.orientation,
        }
    }
}

/// A grid cell as it travels on the wire: `0` empty, `1` ship, `"H"` hit,
/// `"M"` miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireCell(pub CellState);

impl Serialize for WireCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            CellState::Empty => serializer.serialize_u8(0),
            CellState::ShipPresent => serializer.serialize_u8(1),
            CellState::Hit => serializer.serialize_str("H"),
            CellState::Miss => serializer.serialize_str("M"),
        }
    }
}

impl<'de> Deserialize<'de> for WireCell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CellVisitor;

        impl<'de> Visitor<'de> for CellVisitor {
            type Value = WireCell;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("0, 1, \"H\" or \"M\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<WireCell, E> {
                match v {
                    0 => Ok(WireCell(CellState::Empty)),
                    1 => Ok(WireCell(CellState::ShipPresent)),
                    other => Err(E::invalid_value(de::Unexpected::Unsigned(other), &self)),
                }
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<WireCell, E> {
                u64::try_from(v)
                    .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
                    .and_then(|v| self.visit_u64(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<WireCell, E> {
                match v {
                    "H" => Ok(WireCell(CellState::Hit)),
                    "M" => Ok(WireCell(CellState::Miss)),
                    other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
                }
            }
        }

        deserializer.deserialize_any(CellVisitor)
    }
}

/// Row-major wire grid of `board`.
pub fn encode_grid(board: &Board) -> Vec<Vec<WireCell>> {
    board
        .grid()
        .iter()
        .map(|row| row.iter().copied().map(WireCell).collect())
        .collect()
}

/// Parse a wire grid, checking it is `GRID_SIZE × GRID_SIZE`.
pub fn decode_grid(rows: &[Vec<WireCell>]) -> Result<Grid<CellState>, ProtocolError> {
    if rows.len() != GRID_SIZE || rows.iter().any(|r| r.len() != GRID_SIZE) {
        return Err(ProtocolError::InvalidMessage(format!(
            "grid must be {}x{}",
            GRID_SIZE, GRID_SIZE
        )));
    }
    let mut grid = [[CellState::Empty; GRID_SIZE]; GRID_SIZE];
    for (dst, src) in grid.iter_mut().zip(rows) {
        for (cell, wire) in dst.iter_mut().zip(src) {
            *cell = wire.0;
        }
    }
    Ok(grid)
}

/// Rebuild a fresh board from a submitted fleet and verify the submitted
/// grid matches the occupancy the ships imply.
pub fn board_from_placement(
    ships: &[ShipRecord],
    grid: &[Vec<WireCell>],
) -> Result<Board, PlacementRejected> {
    let specs: Vec<ShipSpec> = ships.iter().copied().map(ShipSpec::from).collect();
    let board = Board::from_ships(&specs).map_err(PlacementRejected::Board)?;
    if !board.is_ready() {
        return Err(PlacementRejected::IncompleteFleet(board.placed_count()));
    }
    let submitted = decode_grid(grid).map_err(|e| PlacementRejected::Grid(e.to_string()))?;
    if submitted != board.grid() {
        return Err(PlacementRejected::Board(BoardError::GridMismatch));
    }
    Ok(board)
}

/// Why a submitted placement was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementRejected {
    #[error("invalid placement: {0}")]
    Board(BoardError),
    #[error("incomplete fleet: {0} ships placed")]
    IncompleteFleet(usize),
    #[error("invalid grid: {0}")]
    Grid(String),
}
