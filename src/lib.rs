#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod bitboard;
mod board;
mod common;
mod config;
mod opponent;
mod session;
mod ship;

#[cfg(feature = "std")]
pub mod arbiter;
#[cfg(feature = "std")]
pub mod local;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod peer;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod transport;
#[cfg(feature = "std")]
pub mod view;

pub use bitboard::{BitBoard, BitBoardError};
pub use board::*;
pub use common::*;
pub use config::*;
pub use opponent::ScriptedOpponent;
pub use session::*;
pub use ship::*;

#[cfg(feature = "std")]
pub use arbiter::{Arbiter, ArbiterConfig, MatchReport};
#[cfg(feature = "std")]
pub use local::LocalGame;
#[cfg(feature = "std")]
pub use logging::{init_logging, LOG_ENV};
#[cfg(feature = "std")]
pub use peer::{run_bot, BotReport, PeerEvent, PeerState, PeerUpdate, RemotePeer};
#[cfg(feature = "std")]
pub use protocol::{Message, ProtocolError};
#[cfg(feature = "std")]
pub use transport::{TcpTransport, Transport};
