//! Scripted opponent: random placement with retry, random unfired targets.

use rand::Rng;

use crate::board::Board;
use crate::common::BoardError;
use crate::config::GRID_SIZE;
use crate::ship::Orientation;

/// Attempts per ship before giving up on random placement.
const MAX_PLACEMENT_ATTEMPTS: usize = 1_000;

#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptedOpponent;

impl ScriptedOpponent {
    pub fn new() -> Self {
        Self
    }

    /// Place every remaining ship of the fleet at random valid positions.
    pub fn place_fleet<R: Rng + ?Sized>(&self, rng: &mut R, board: &mut Board) -> Result<(), BoardError> {
        while let Some(def) = board.next_ship() {
            let (col, row, orientation) = self.random_placement(rng, board, def.length())?;
            board.place(def.length(), col, row, orientation)?;
        }
        Ok(())
    }

    /// Returns a random non-overlapping (col, row, orientation) for a ship of `size`.
    pub fn random_placement<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        board: &Board,
        size: usize,
    ) -> Result<(usize, usize, Orientation), BoardError> {
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let col = rng.random_range(0..GRID_SIZE);
            let row = rng.random_range(0..GRID_SIZE);
            let orientation = if rng.random() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            if board.is_valid_placement(size, col, row, orientation) {
                return Ok((col, row, orientation));
            }
        }
        Err(BoardError::UnableToPlaceShip)
    }

    /// Pick any cell not yet in `own`'s shot record, as (col, row).
    ///
    /// Returns `None` once every cell has been fired at.
    pub fn choose_target<R: Rng + ?Sized>(&self, rng: &mut R, own: &Board) -> Option<(usize, usize)> {
        let open = own.unfired();
        let remaining = open.count_ones();
        if remaining == 0 {
            return None;
        }
        let pick = rng.random_range(0..remaining);
        open.iter_set_bits().nth(pick).map(|(row, col)| (col, row))
    }
}
