//! Single-player match against the scripted opponent, no network involved.

use log::debug;
use rand::Rng;

use crate::board::Board;
use crate::common::BoardError;
use crate::opponent::ScriptedOpponent;
use crate::session::{Phase, Seat, Session, SessionError, ShotOutcome};
use crate::ship::Orientation;

/// Seat of the human player; the scripted opponent always sits in the other.
pub const HUMAN: Seat = Seat::First;
pub const COMPUTER: Seat = Seat::Second;

/// The human's shot plus every shot the opponent answered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub shot: ShotOutcome,
    pub replies: Vec<ShotOutcome>,
}

pub struct LocalGame<R> {
    session: Session,
    opponent: ScriptedOpponent,
    rng: R,
}

impl<R: Rng> LocalGame<R> {
    /// Bind both seats and place the opponent's fleet.
    pub fn new(rng: R) -> Result<Self, SessionError> {
        let mut session = Session::new();
        session.bind("You")?;
        session.bind("Computer")?;
        let mut game = Self {
            session,
            opponent: ScriptedOpponent::new(),
            rng,
        };
        game.place_randomly(COMPUTER)?;
        Ok(game)
    }

    fn place_randomly(&mut self, seat: Seat) -> Result<bool, SessionError> {
        let mut started = false;
        loop {
            let board = self.session.board(seat).ok_or(SessionError::SeatEmpty(seat))?;
            let Some(def) = board.next_ship() else {
                return Ok(started);
            };
            let (col, row, orientation) =
                self.opponent
                    .random_placement(&mut self.rng, board, def.length())?;
            started = self.session.place(seat, def.length(), col, row, orientation)?;
        }
    }

    /// Place the human's next ship. Returns `true` once the attack phase
    /// has opened.
    pub fn place(&mut self, col: usize, row: usize, orientation: Orientation) -> Result<bool, SessionError> {
        let board = self.session.board(HUMAN).ok_or(SessionError::SeatEmpty(HUMAN))?;
        let size = board
            .next_ship()
            .ok_or(SessionError::Board(BoardError::FleetComplete))?
            .length();
        self.session.place(HUMAN, size, col, row, orientation)
    }

    /// Place the human's remaining ships at random.
    pub fn auto_place(&mut self) -> Result<bool, SessionError> {
        self.place_randomly(HUMAN)
    }

    /// Fire for the human, then let the opponent play out its turn if the
    /// shot missed.
    pub fn fire(&mut self, col: usize, row: usize) -> Result<Exchange, SessionError> {
        let shot = self.session.fire(HUMAN, col, row)?;
        let mut replies = Vec::new();
        while self.session.turn() == Some(COMPUTER) {
            let own = self.session.board(COMPUTER).ok_or(SessionError::SeatEmpty(COMPUTER))?;
            let Some((col, row)) = self.opponent.choose_target(&mut self.rng, own) else {
                break;
            };
            let reply = self.session.fire(COMPUTER, col, row)?;
            debug!("opponent fired at ({},{}): {}", col, row, reply.result);
            replies.push(reply);
        }
        Ok(Exchange { shot, replies })
    }

    /// Pick a target for the human the way the opponent would.
    pub fn suggest_target(&mut self) -> Option<(usize, usize)> {
        let own = self.session.board(HUMAN)?;
        self.opponent.choose_target(&mut self.rng, own)
    }

    pub fn human_board(&self) -> Option<&Board> {
        self.session.board(HUMAN)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_over(&self) -> bool {
        self.session.phase() == Phase::GameOver
    }
}
