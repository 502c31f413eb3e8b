//! Match phase and turn ownership across the two boards of a session.
//!
//! ```text
//! Waiting --(second bind)--> Placement --(both ready)--> Attack --(defeat)--> GameOver
//! ```
//!
//! A `Session` is single-use: there is no pause, resign or rematch. Build a
//! new one for the next match.

use alloc::string::String;

use crate::board::Board;
use crate::common::{BoardError, ShotResult};
use crate::ship::Orientation;

/// Identifies one of the two participants of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seat {
    /// Bound first; opens the attack phase.
    First,
    Second,
}

impl Seat {
    pub const ALL: [Seat; 2] = [Seat::First, Seat::Second];

    pub fn other(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    Waiting,
    Placement,
    Attack,
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Operation not legal in the current phase.
    WrongPhase { expected: Phase, actual: Phase },
    /// Shot from a participant who does not own the turn.
    NotYourTurn,
    /// Both seats are already bound.
    SessionFull,
    /// The seat has no participant bound to it.
    SeatEmpty(Seat),
    /// The board rejected the operation.
    Board(BoardError),
}

impl From<BoardError> for SessionError {
    fn from(err: BoardError) -> Self {
        SessionError::Board(err)
    }
}

impl core::fmt::Display for SessionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SessionError::WrongPhase { expected, actual } => {
                write!(f, "Game is in {:?} phase, not {:?}", actual, expected)
            }
            SessionError::NotYourTurn => write!(f, "Not your turn"),
            SessionError::SessionFull => write!(f, "Session already has two participants"),
            SessionError::SeatEmpty(seat) => write!(f, "No participant in seat {:?}", seat),
            SessionError::Board(e) => write!(f, "{}", e),
        }
    }
}

/// Everything a resolved shot changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotOutcome {
    pub attacker: Seat,
    pub col: usize,
    pub row: usize,
    pub result: ShotResult,
    /// Ships sunk on the defender's board after this shot.
    pub sunk_count: usize,
    /// Turn owner after the shot; `None` once the game is over.
    pub next_turn: Option<Seat>,
    /// Set when this shot ended the game.
    pub winner: Option<Seat>,
}

impl ShotOutcome {
    pub fn defender(&self) -> Seat {
        self.attacker.other()
    }

    /// True if the shot passed the turn to the defender.
    pub fn turn_flipped(&self) -> bool {
        self.next_turn == Some(self.defender())
    }
}

#[derive(Debug, Clone)]
struct Participant {
    name: String,
    board: Board,
}

#[derive(Debug, Clone)]
pub struct Session {
    seats: [Option<Participant>; 2],
    phase: Phase,
    turn: Option<Seat>,
    winner: Option<Seat>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            seats: [None, None],
            phase: Phase::Waiting,
            turn: None,
            winner: None,
        }
    }

    /// Bind a participant to the first free seat. The second bind opens
    /// the placement phase.
    pub fn bind(&mut self, name: impl Into<String>) -> Result<Seat, SessionError> {
        self.expect_phase(Phase::Waiting)
            .map_err(|_| SessionError::SessionFull)?;
        let seat = self.free_seat().ok_or(SessionError::SessionFull)?;
        self.seats[seat.index()] = Some(Participant {
            name: name.into(),
            board: Board::new(),
        });
        if self.seats.iter().all(Option::is_some) {
            self.phase = Phase::Placement;
        }
        Ok(seat)
    }

    /// Release a seat before the match has started.
    pub fn leave(&mut self, seat: Seat) -> Result<(), SessionError> {
        self.expect_phase(Phase::Waiting)?;
        self.seats[seat.index()]
            .take()
            .map(|_| ())
            .ok_or(SessionError::SeatEmpty(seat))
    }

    /// Place the seat's next ship. Returns `true` if this opened the attack
    /// phase.
    pub fn place(
        &mut self,
        seat: Seat,
        size: usize,
        col: usize,
        row: usize,
        orientation: Orientation,
    ) -> Result<bool, SessionError> {
        self.expect_phase(Phase::Placement)?;
        self.participant_mut(seat)?
            .board
            .place(size, col, row, orientation)?;
        Ok(self.try_start_attack())
    }

    /// Replace the seat's board wholesale. Returns `true` if this opened the
    /// attack phase.
    pub fn install_board(&mut self, seat: Seat, board: Board) -> Result<bool, SessionError> {
        self.expect_phase(Phase::Placement)?;
        self.participant_mut(seat)?.board = board;
        Ok(self.try_start_attack())
    }

    fn try_start_attack(&mut self) -> bool {
        let both_ready = self
            .seats
            .iter()
            .all(|p| p.as_ref().is_some_and(|p| p.board.is_ready()));
        if both_ready {
            self.phase = Phase::Attack;
            self.turn = Some(Seat::First);
        }
        both_ready
    }

    /// Fire from `attacker` at the opponent's board.
    ///
    /// A hit or sink keeps the turn with the attacker, a miss passes it on.
    /// Defeating the defender ends the game regardless.
    pub fn fire(&mut self, attacker: Seat, col: usize, row: usize) -> Result<ShotOutcome, SessionError> {
        self.expect_phase(Phase::Attack)?;
        if self.turn != Some(attacker) {
            return Err(SessionError::NotYourTurn);
        }
        let defender = attacker.other();

        let attacker_board = self.board(attacker).ok_or(SessionError::SeatEmpty(attacker))?;
        if attacker_board.has_fired(col, row)? {
            return Err(BoardError::AlreadyFired.into());
        }

        let defender_board = &mut self.participant_mut(defender)?.board;
        let result = defender_board.receive_shot(col, row)?;
        let sunk_count = defender_board.sunk_count();
        let defeated = defender_board.is_defeated();

        self.participant_mut(attacker)?
            .board
            .record_shot(col, row, result)?;

        if defeated {
            self.phase = Phase::GameOver;
            self.turn = None;
            self.winner = Some(attacker);
        } else if result == ShotResult::Miss {
            self.turn = Some(defender);
        }

        Ok(ShotOutcome {
            attacker,
            col,
            row,
            result,
            sunk_count,
            next_turn: self.turn,
            winner: self.winner,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current turn owner; only set during the attack phase.
    pub fn turn(&self) -> Option<Seat> {
        self.turn
    }

    pub fn winner(&self) -> Option<Seat> {
        self.winner
    }

    /// The seat the next [`Session::bind`] would fill.
    pub fn free_seat(&self) -> Option<Seat> {
        if self.phase != Phase::Waiting {
            return None;
        }
        Seat::ALL.into_iter().find(|seat| !self.is_bound(*seat))
    }

    pub fn is_bound(&self, seat: Seat) -> bool {
        self.seats[seat.index()].is_some()
    }

    pub fn name(&self, seat: Seat) -> Option<&str> {
        self.seats[seat.index()].as_ref().map(|p| p.name.as_str())
    }

    pub fn board(&self, seat: Seat) -> Option<&Board> {
        self.seats[seat.index()].as_ref().map(|p| &p.board)
    }

    fn participant_mut(&mut self, seat: Seat) -> Result<&mut Participant, SessionError> {
        self.seats[seat.index()]
            .as_mut()
            .ok_or(SessionError::SeatEmpty(seat))
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), SessionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SessionError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }
}
