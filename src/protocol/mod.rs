//! Messages exchanged between peers and the arbiter.
//!
//! Each message is a JSON object whose `"type"` field names the kind. The
//! kind names and field names are the compatibility surface with other
//! implementations and must not change.

use serde::{Deserialize, Serialize};

use crate::common::ShotResult;

pub mod domain;
mod error;
pub mod frame;

pub use domain::{board_from_placement, encode_grid, PlacementRejected, ShipRecord, WireCell};
pub use error::ProtocolError;
pub use frame::{decode_body, encode_frame, parse_header};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Server → client: the name assigned to this participant.
    Greeting { name: String },
    /// Server → client: both participants are bound, place your fleet.
    StartPlacement {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// Server → client: both fleets are ready; `turn` is true for the
    /// participant who fires first.
    StartAttack {
        turn: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    YourTurn,
    OpponentTurn,
    /// Server → attacker: outcome of its own shot.
    ShotResult {
        col: usize,
        row: usize,
        result: ShotResult,
        sunk_count: usize,
    },
    /// Server → defender: a shot landed on its board.
    OpponentShot {
        col: usize,
        row: usize,
        result: ShotResult,
        sunk_count: usize,
    },
    GameOver { winner: String },
    Error { message: String },
    /// Client → server: the finished fleet and its occupancy grid.
    PlacementDone {
        ships: Vec<ShipRecord>,
        grid: Vec<Vec<WireCell>>,
    },
    /// Client → server: fire at (`col`, `row`).
    Shot { col: usize, row: usize },
}

impl Message {
    /// Wire name of the message kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Greeting { .. } => "GREETING",
            Message::StartPlacement { .. } => "START_PLACEMENT",
            Message::StartAttack { .. } => "START_ATTACK",
            Message::YourTurn => "YOUR_TURN",
            Message::OpponentTurn => "OPPONENT_TURN",
            Message::ShotResult { .. } => "SHOT_RESULT",
            Message::OpponentShot { .. } => "OPPONENT_SHOT",
            Message::GameOver { .. } => "GAME_OVER",
            Message::Error { .. } => "ERROR",
            Message::PlacementDone { .. } => "PLACEMENT_DONE",
            Message::Shot { .. } => "SHOT",
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Message::Error {
            message: message.into(),
        }
    }
}
