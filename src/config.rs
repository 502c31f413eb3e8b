use crate::ship::ShipType;

/// Width and height of every board.
pub const GRID_SIZE: usize = 10;
pub const NUM_SHIPS: usize = 5;

/// The fleet, in placement order. Exactly one ship of each entry is placed.
pub const FLEET: [ShipType; NUM_SHIPS] = [
    ShipType::new("Carrier", 5),
    ShipType::new("Battleship", 4),
    ShipType::new("Cruiser", 3),
    ShipType::new("Submarine", 3),
    ShipType::new("Destroyer", 2),
];

/// Total number of ship segments in the fleet.
pub const TOTAL_SHIP_CELLS: usize = 5 + 4 + 3 + 3 + 2;

/// Port the arbiter listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 65432;

/// Width of the ASCII length header preceding every frame body.
pub const FRAME_HEADER_LEN: usize = 8;

/// Largest frame body accepted or produced. Fits in the 8-digit header.
pub const MAX_FRAME_SIZE: usize = 10_000_000;

/// Frames the arbiter queues for one connection before giving up on it.
pub const OUTBOUND_QUEUE_LEN: usize = 256;
