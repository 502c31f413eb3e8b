//! Client side of a networked match.
//!
//! [`RemotePeer`] owns the connection: a spawned receive loop turns frames
//! into [`PeerEvent`]s, and the owner drains them in arrival order. The
//! local view of the match lives in [`PeerState`], which only changes
//! through [`PeerState::apply`] and [`PeerState::apply_event`].

use log::{debug, info, warn};
use rand::Rng;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::ToSocketAddrs;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;

use crate::board::Board;
use crate::common::{BoardError, ShotResult};
use crate::config::NUM_SHIPS;
use crate::opponent::ScriptedOpponent;
use crate::protocol::{encode_grid, Message, ProtocolError, ShipRecord};
use crate::session::Phase;
use crate::ship::Orientation;
use crate::transport::{FrameWriter, TcpTransport};

/// Something the receive loop observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    Message(Message),
    /// The connection is gone; no further events follow.
    ConnectionLost(String),
}

pub struct RemotePeer {
    events: UnboundedReceiver<PeerEvent>,
    writer: FrameWriter<OwnedWriteHalf>,
    receiver: JoinHandle<()>,
}

impl RemotePeer {
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, ProtocolError> {
        let transport = TcpTransport::connect(addr).await?;
        Ok(Self::new(transport))
    }

    pub fn new(transport: TcpTransport) -> Self {
        let (mut reader, writer) = transport.into_split();
        let (tx, events) = mpsc::unbounded_channel();
        let receiver = tokio::spawn(async move {
            loop {
                match reader.recv().await {
                    Ok(msg) => {
                        if tx.send(PeerEvent::Message(msg)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        debug!("receive loop stopped: {}", e);
                        let _ = tx.send(PeerEvent::ConnectionLost(e.to_string()));
                        break;
                    }
                }
            }
        });
        Self {
            events,
            writer,
            receiver,
        }
    }

    /// Next event from the arbiter, or `None` once the loop has stopped and
    /// every event was drained.
    pub async fn next_event(&mut self) -> Option<PeerEvent> {
        self.events.recv().await
    }

    pub async fn send(&mut self, msg: &Message) -> Result<(), ProtocolError> {
        debug!("sending {}", msg.kind());
        self.writer.send(msg).await
    }

    /// Send the finished fleet of `board` as PLACEMENT_DONE.
    pub async fn submit_placement(&mut self, board: &Board) -> Result<(), ProtocolError> {
        if !board.is_ready() {
            return Err(ProtocolError::InvalidMessage(format!(
                "fleet incomplete: {} of {} ships placed",
                board.placed_count(),
                NUM_SHIPS
            )));
        }
        let msg = Message::PlacementDone {
            ships: board.ships().iter().map(ShipRecord::from).collect(),
            grid: encode_grid(board),
        };
        self.send(&msg).await
    }

    /// Fire at (`col`, `row`). The arbiter decides whether the shot is legal.
    pub async fn fire(&mut self, col: usize, row: usize) -> Result<(), ProtocolError> {
        self.send(&Message::Shot { col, row }).await
    }

    /// Close the write direction and stop the receive loop.
    pub async fn close(mut self) {
        let _ = self.writer.shutdown().await;
        self.receiver.abort();
    }
}

impl Drop for RemotePeer {
    fn drop(&mut self) {
        self.receiver.abort();
    }
}

/// What a single applied message changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerUpdate {
    Named(String),
    PlacementOpened,
    AttackOpened { my_turn: bool },
    TurnChanged { my_turn: bool },
    /// Result of our own shot.
    ShotResolved {
        col: usize,
        row: usize,
        result: ShotResult,
        sunk_count: usize,
    },
    /// A shot landed on our board.
    ShotReceived {
        col: usize,
        row: usize,
        result: ShotResult,
        sunk_count: usize,
    },
    GameOver { winner: String, won: bool },
    Rejected(String),
    ConnectionLost(String),
    /// A message only a client should send; nothing changed.
    Ignored(&'static str),
}

/// Local mirror of one participant's view of the match.
#[derive(Debug, Clone)]
pub struct PeerState {
    name: Option<String>,
    phase: Phase,
    my_turn: bool,
    board: Board,
    placement_sent: bool,
    opponent_sunk: usize,
    winner: Option<String>,
    last_error: Option<String>,
    connection_lost: bool,
}

impl Default for PeerState {
    fn default() -> Self {
        Self::new()
    }
}

impl PeerState {
    pub fn new() -> Self {
        Self {
            name: None,
            phase: Phase::Waiting,
            my_turn: false,
            board: Board::new(),
            placement_sent: false,
            opponent_sunk: 0,
            winner: None,
            last_error: None,
            connection_lost: false,
        }
    }

    pub fn apply_event(&mut self, event: PeerEvent) -> PeerUpdate {
        match event {
            PeerEvent::Message(msg) => self.apply(&msg),
            PeerEvent::ConnectionLost(reason) => {
                self.connection_lost = true;
                self.my_turn = false;
                PeerUpdate::ConnectionLost(reason)
            }
        }
    }

    pub fn apply(&mut self, msg: &Message) -> PeerUpdate {
        match msg {
            Message::Greeting { name } => {
                self.name = Some(name.clone());
                PeerUpdate::Named(name.clone())
            }
            Message::StartPlacement { .. } => {
                self.phase = Phase::Placement;
                PeerUpdate::PlacementOpened
            }
            Message::StartAttack { turn, .. } => {
                self.phase = Phase::Attack;
                self.my_turn = *turn;
                PeerUpdate::AttackOpened { my_turn: *turn }
            }
            Message::YourTurn => {
                self.my_turn = true;
                PeerUpdate::TurnChanged { my_turn: true }
            }
            Message::OpponentTurn => {
                self.my_turn = false;
                PeerUpdate::TurnChanged { my_turn: false }
            }
            &Message::ShotResult {
                col,
                row,
                result,
                sunk_count,
            } => {
                if let Err(e) = self.board.record_shot(col, row, result) {
                    warn!("shot result for ({},{}) not recorded: {}", col, row, e);
                }
                self.my_turn = result.is_hit();
                self.opponent_sunk = sunk_count;
                PeerUpdate::ShotResolved {
                    col,
                    row,
                    result,
                    sunk_count,
                }
            }
            &Message::OpponentShot {
                col,
                row,
                result,
                sunk_count,
            } => {
                if let Err(e) = self.board.mirror_incoming(col, row, result) {
                    warn!("incoming shot at ({},{}) not mirrored: {}", col, row, e);
                }
                PeerUpdate::ShotReceived {
                    col,
                    row,
                    result,
                    sunk_count,
                }
            }
            Message::GameOver { winner } => {
                self.phase = Phase::GameOver;
                self.my_turn = false;
                self.winner = Some(winner.clone());
                PeerUpdate::GameOver {
                    winner: winner.clone(),
                    won: self.name.as_deref() == Some(winner.as_str()),
                }
            }
            Message::Error { message } => {
                self.last_error = Some(message.clone());
                PeerUpdate::Rejected(message.clone())
            }
            other @ (Message::PlacementDone { .. } | Message::Shot { .. }) => {
                warn!("ignoring client-only message {}", other.kind());
                PeerUpdate::Ignored(other.kind())
            }
        }
    }

    /// Place the next ship of the fleet on the local board.
    pub fn place(&mut self, col: usize, row: usize, orientation: Orientation) -> Result<(), BoardError> {
        if self.placement_sent {
            return Err(BoardError::FleetComplete);
        }
        self.board.place_next(col, row, orientation)
    }

    /// Place every remaining ship at random.
    pub fn place_remaining<R: Rng + ?Sized>(
        &mut self,
        opponent: &ScriptedOpponent,
        rng: &mut R,
    ) -> Result<(), BoardError> {
        if self.placement_sent {
            return Err(BoardError::FleetComplete);
        }
        opponent.place_fleet(rng, &mut self.board)
    }

    /// True once the fleet is complete and not yet sent.
    pub fn ready_to_submit(&self) -> bool {
        self.board.is_ready() && !self.placement_sent
    }

    pub fn mark_submitted(&mut self) {
        self.placement_sent = true;
    }

    /// True if a shot now would be legal as far as this mirror knows.
    pub fn can_fire(&self) -> bool {
        self.phase == Phase::Attack
            && self.my_turn
            && !self.connection_lost
            && self.opponent_sunk < NUM_SHIPS
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn my_turn(&self) -> bool {
        self.my_turn
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn placement_sent(&self) -> bool {
        self.placement_sent
    }

    /// Opponent ships sunk, as last reported by the arbiter.
    pub fn opponent_sunk(&self) -> usize {
        self.opponent_sunk
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn connection_lost(&self) -> bool {
        self.connection_lost
    }
}

/// Final state of a bot-driven peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotReport {
    pub name: String,
    pub winner: String,
    pub won: bool,
    pub shots_fired: usize,
}

/// Play a whole match with the scripted opponent: random fleet, random
/// unfired targets whenever the turn is ours.
pub async fn run_bot<R: Rng + ?Sized>(
    peer: &mut RemotePeer,
    opponent: &ScriptedOpponent,
    rng: &mut R,
) -> anyhow::Result<BotReport> {
    let mut state = PeerState::new();
    // Set between sending a shot and hearing back about the turn.
    let mut awaiting = false;

    while let Some(event) = peer.next_event().await {
        match state.apply_event(event) {
            PeerUpdate::Named(name) => info!("joined as {}", name),
            PeerUpdate::PlacementOpened => {
                state
                    .place_remaining(opponent, rng)
                    .map_err(|e| anyhow::anyhow!(e))?;
                peer.submit_placement(state.board()).await?;
                state.mark_submitted();
            }
            PeerUpdate::AttackOpened { .. } | PeerUpdate::TurnChanged { .. } => awaiting = false,
            PeerUpdate::ShotResolved { .. } => awaiting = false,
            PeerUpdate::Rejected(message) => {
                warn!("arbiter rejected a request: {}", message);
                awaiting = false;
            }
            PeerUpdate::GameOver { winner, won } => {
                let report = BotReport {
                    name: state.name().unwrap_or_default().to_string(),
                    winner,
                    won,
                    shots_fired: state.board().shots_fired_count(),
                };
                return Ok(report);
            }
            PeerUpdate::ConnectionLost(reason) => {
                anyhow::bail!("connection lost before the game ended: {}", reason)
            }
            PeerUpdate::ShotReceived { .. } | PeerUpdate::Ignored(_) => {}
        }

        if state.can_fire() && !awaiting {
            let (col, row) = opponent
                .choose_target(rng, state.board())
                .ok_or_else(|| anyhow::anyhow!("no unfired cells left"))?;
            peer.fire(col, row).await?;
            awaiting = true;
        }
    }
    anyhow::bail!("connection closed before the game ended")
}
