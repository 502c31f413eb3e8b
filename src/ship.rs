//! Ship definitions and footprint logic on top of `BitBoard`.

use core::fmt;
use num_traits::{PrimInt, Unsigned, Zero};

use crate::bitboard::BitBoard;
use crate::common::BoardError;

/// Orientation of a ship on the board. Horizontal ships extend along
/// columns, vertical ships along rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    #[cfg_attr(feature = "std", serde(rename = "H"))]
    Horizontal,
    #[cfg_attr(feature = "std", serde(rename = "V"))]
    Vertical,
}

impl Orientation {
    /// The other orientation.
    pub fn rotated(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }

    /// Cell `(col, row)` at `offset` along this orientation from an origin.
    #[inline]
    pub fn step(self, col: usize, row: usize, offset: usize) -> (usize, usize) {
        match self {
            Orientation::Horizontal => (col + offset, row),
            Orientation::Vertical => (col, row + offset),
        }
    }
}

/// Type of ship: name and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipType {
    name: &'static str,
    length: usize,
}

impl ShipType {
    pub const fn new(name: &'static str, length: usize) -> Self {
        Self { name, length }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

/// A ship placed on an N×N board.
///
/// The footprint is fixed at construction; only the hit count changes
/// afterwards.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Ship<T, const N: usize>
where
    T: PrimInt + Unsigned + Zero,
{
    size: usize,
    orientation: Orientation,
    col: usize,
    row: usize,
    mask: BitBoard<T, N>,
    hits: usize,
}

impl<T, const N: usize> Ship<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    /// Build a ship of `size` cells at origin (`col`, `row`).
    ///
    /// Fails with `ShipOutOfBounds` if any covered cell leaves the board.
    pub fn new(
        size: usize,
        orientation: Orientation,
        col: usize,
        row: usize,
    ) -> Result<Self, BoardError> {
        if size == 0 || col >= N || row >= N {
            return Err(BoardError::ShipOutOfBounds);
        }
        let end = match orientation {
            Orientation::Horizontal => col.checked_add(size),
            Orientation::Vertical => row.checked_add(size),
        }
        .ok_or(BoardError::ShipOutOfBounds)?;
        if end > N {
            return Err(BoardError::ShipOutOfBounds);
        }

        let mut mask = BitBoard::<T, N>::new();
        for i in 0..size {
            let (c, r) = orientation.step(col, row, i);
            mask.set(r, c)?;
        }

        Ok(Ship {
            size,
            orientation,
            col,
            row,
            mask,
            hits: 0,
        })
    }

    /// Whether the footprint covers (`col`, `row`).
    pub fn covers(&self, col: usize, row: usize) -> bool {
        match self.orientation {
            Orientation::Horizontal => row == self.row && (self.col..self.col + self.size).contains(&col),
            Orientation::Vertical => col == self.col && (self.row..self.row + self.size).contains(&row),
        }
    }

    /// Count one more hit. Saturates at `size`.
    pub fn register_hit(&mut self) {
        if self.hits < self.size {
            self.hits += 1;
        }
    }

    pub fn is_sunk(&self) -> bool {
        self.hits == self.size
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Origin of the ship as (col, row).
    pub fn origin(&self) -> (usize, usize) {
        (self.col, self.row)
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Occupancy mask of the ship on the board.
    pub fn mask(&self) -> BitBoard<T, N> {
        self.mask
    }

    /// Covered cells as (col, row), from the origin outwards.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.size).map(move |i| self.orientation.step(self.col, self.row, i))
    }
}

impl<T, const N: usize> fmt::Debug for Ship<T, N>
where
    T: PrimInt + Unsigned + Zero,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ship {{ size: {}, origin: ({}, {}), orientation: {:?}, hits: {} }}",
            self.size, self.col, self.row, self.orientation, self.hits,
        )
    }
}
