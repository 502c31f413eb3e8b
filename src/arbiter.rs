//! Server side: binds two connections into a [`Session`] and routes their
//! messages.
//!
//! Each connection gets a reader task and a writer task. Readers forward
//! decoded frames into one channel drained by the match loop, which is the
//! only code that touches the `Session`. That makes every turn check and
//! flip atomic with respect to the other connection.

use std::net::SocketAddr;

use log::{debug, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender, UnboundedSender};
use tokio::task::JoinHandle;

use crate::config::{DEFAULT_PORT, OUTBOUND_QUEUE_LEN};
use crate::protocol::{board_from_placement, Message, ProtocolError, ShipRecord, WireCell};
use crate::session::{Phase, Seat, Session, SessionError, ShotOutcome};
use crate::transport::TcpTransport;

const NOT_YOUR_TURN: &str = "Not your turn or game not in Attack phase.";

/// Runtime settings of the arbiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArbiterConfig {
    /// Address to listen on.
    pub bind: String,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            bind: format!("0.0.0.0:{}", DEFAULT_PORT),
        }
    }
}

/// How a match ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchReport {
    /// A board was defeated.
    Finished { winner: String },
    /// A participant disconnected after the match had started.
    Abandoned { left: String },
}

pub struct Arbiter {
    listener: TcpListener,
}

impl Arbiter {
    pub async fn bind(config: &ArbiterConfig) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(&config.bind).await?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve matches back to back. Stops after `limit` matches if given.
    pub async fn run(&self, limit: Option<usize>) -> anyhow::Result<()> {
        info!("arbiter listening on {}", self.local_addr()?);
        let mut played = 0usize;
        while limit.map_or(true, |limit| played < limit) {
            match self.serve_match().await? {
                MatchReport::Finished { winner } => info!("match over, {} wins", winner),
                MatchReport::Abandoned { left } => info!("match abandoned, {} disconnected", left),
            }
            played += 1;
        }
        Ok(())
    }

    /// Run one match from the first accepted connection until it ends.
    ///
    /// Connections are only accepted while a seat is free; further clients
    /// wait in the listen backlog until the next match.
    pub async fn serve_match(&self) -> anyhow::Result<MatchReport> {
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let mut room = Room::new(events_tx);

        loop {
            let seat_open = room.session.free_seat().is_some();
            tokio::select! {
                accepted = self.listener.accept(), if seat_open => {
                    match accepted {
                        Ok((stream, addr)) => room.admit(stream, addr),
                        Err(e) => warn!("accept failed: {}", e),
                    }
                }
                Some(event) = events_rx.recv() => {
                    if let Some(report) = room.handle(event) {
                        room.close().await;
                        return Ok(report);
                    }
                }
            }
        }
    }
}

/// Something that happened on one connection.
#[derive(Debug)]
struct Inbound {
    conn: u64,
    seat: Seat,
    event: ConnEvent,
}

#[derive(Debug)]
enum ConnEvent {
    Frame(Message),
    Closed(Option<ProtocolError>),
}

/// Arbiter-side handle on one connected participant.
struct Link {
    conn: u64,
    name: String,
    outbound: Sender<Message>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

/// The session of one match plus the connections bound to it.
struct Room {
    session: Session,
    links: [Option<Link>; 2],
    events: UnboundedSender<Inbound>,
    next_conn: u64,
}

impl Room {
    fn new(events: UnboundedSender<Inbound>) -> Self {
        Self {
            session: Session::new(),
            links: [None, None],
            events,
            next_conn: 0,
        }
    }

    fn admit(&mut self, stream: TcpStream, addr: SocketAddr) {
        let Some(seat) = self.session.free_seat() else {
            return;
        };
        let name = format!("Player {}", seat.index() + 1);
        if let Err(e) = self.session.bind(name.clone()) {
            warn!("could not bind {}: {}", addr, e);
            return;
        }
        info!("{} connected from {}", name, addr);

        let conn = self.next_conn;
        self.next_conn += 1;
        let (mut reader, mut writer) = TcpTransport::new(stream).into_split();
        let (outbound, mut outbound_rx): (_, Receiver<Message>) = mpsc::channel(OUTBOUND_QUEUE_LEN);

        let events = self.events.clone();
        let reader = tokio::spawn(async move {
            loop {
                match reader.recv().await {
                    Ok(msg) => {
                        if events.send(Inbound { conn, seat, event: ConnEvent::Frame(msg) }).is_err() {
                            break;
                        }
                    }
                    Err(ProtocolError::ConnectionClosed) => {
                        let _ = events.send(Inbound { conn, seat, event: ConnEvent::Closed(None) });
                        break;
                    }
                    Err(e) => {
                        let _ = events.send(Inbound { conn, seat, event: ConnEvent::Closed(Some(e)) });
                        break;
                    }
                }
            }
        });

        let events = self.events.clone();
        let writer = tokio::spawn(async move {
            while let Some(msg) = outbound_rx.recv().await {
                if let Err(e) = writer.send(&msg).await {
                    let _ = events.send(Inbound { conn, seat, event: ConnEvent::Closed(Some(e)) });
                    return;
                }
            }
            let _ = writer.shutdown().await;
        });

        self.links[seat.index()] = Some(Link {
            conn,
            name: name.clone(),
            outbound,
            reader,
            writer,
        });

        self.send(seat, Message::Greeting { name });
        if self.session.phase() == Phase::Placement {
            info!("both players connected, starting placement phase");
            self.broadcast(Message::StartPlacement {
                message: Some("Both players connected. Place your ships!".into()),
            });
        }
    }

    /// Apply one connection event. Returns a report once the match is over.
    fn handle(&mut self, inbound: Inbound) -> Option<MatchReport> {
        let Inbound { conn, seat, event } = inbound;
        let current = self.links[seat.index()].as_ref().map(|link| link.conn);
        if current != Some(conn) {
            debug!("dropping event from stale connection {}", conn);
            return None;
        }

        match event {
            ConnEvent::Closed(reason) => {
                let name = self.name(seat);
                match reason {
                    Some(e) => info!("{} disconnected: {}", name, e),
                    None => info!("{} disconnected", name),
                }
                if self.session.phase() == Phase::Waiting {
                    let _ = self.session.leave(seat);
                    if let Some(link) = self.links[seat.index()].take() {
                        link.reader.abort();
                    }
                    None
                } else {
                    Some(MatchReport::Abandoned { left: name })
                }
            }
            ConnEvent::Frame(msg) => self.dispatch(seat, msg),
        }
    }

    fn dispatch(&mut self, seat: Seat, msg: Message) -> Option<MatchReport> {
        debug!("{} sent {}", self.name(seat), msg.kind());
        match msg {
            Message::PlacementDone { ships, grid } => {
                self.on_placement(seat, &ships, &grid);
                None
            }
            Message::Shot { col, row } => self.on_shot(seat, col, row),
            other => {
                self.send(seat, Message::error(format!("Unexpected message {}", other.kind())));
                None
            }
        }
    }

    fn on_placement(&mut self, seat: Seat, ships: &[ShipRecord], grid: &[Vec<WireCell>]) {
        if self.session.phase() != Phase::Placement {
            self.send(seat, Message::error("Game not in Placement phase."));
            return;
        }
        let board = match board_from_placement(ships, grid) {
            Ok(board) => board,
            Err(e) => {
                warn!("{} submitted a rejected placement: {}", self.name(seat), e);
                self.send(seat, Message::error(e.to_string()));
                return;
            }
        };
        match self.session.install_board(seat, board) {
            Ok(true) => {
                info!("all players ready, starting attack phase");
                self.send(
                    Seat::First,
                    Message::StartAttack {
                        turn: true,
                        message: Some("Your turn! Fire a shot.".into()),
                    },
                );
                self.send(
                    Seat::Second,
                    Message::StartAttack {
                        turn: false,
                        message: Some("Opponent's turn.".into()),
                    },
                );
            }
            Ok(false) => info!("{} has finished placement", self.name(seat)),
            Err(e) => self.send(seat, Message::error(e.to_string())),
        }
    }

    fn on_shot(&mut self, seat: Seat, col: usize, row: usize) -> Option<MatchReport> {
        let outcome = match self.session.fire(seat, col, row) {
            Ok(outcome) => outcome,
            Err(SessionError::WrongPhase { .. } | SessionError::NotYourTurn) => {
                self.send(seat, Message::error(NOT_YOUR_TURN));
                return None;
            }
            Err(e) => {
                self.send(seat, Message::error(e.to_string()));
                return None;
            }
        };
        info!(
            "{} fired at ({},{}). Result: {}",
            self.name(seat),
            col,
            row,
            outcome.result
        );
        self.announce(&outcome)
    }

    fn announce(&mut self, outcome: &ShotOutcome) -> Option<MatchReport> {
        let ShotOutcome {
            attacker,
            col,
            row,
            result,
            sunk_count,
            ..
        } = *outcome;
        self.send(attacker, Message::ShotResult { col, row, result, sunk_count });
        self.send(outcome.defender(), Message::OpponentShot { col, row, result, sunk_count });

        if let Some(winner) = outcome.winner {
            let winner = self.name(winner);
            info!("game over, {} wins", winner);
            self.broadcast(Message::GameOver { winner: winner.clone() });
            return Some(MatchReport::Finished { winner });
        }
        if outcome.turn_flipped() {
            self.send(outcome.defender(), Message::YourTurn);
            self.send(attacker, Message::OpponentTurn);
            debug!("turn switched to {}", self.name(outcome.defender()));
        }
        None
    }

    fn name(&self, seat: Seat) -> String {
        self.links[seat.index()]
            .as_ref()
            .map(|link| link.name.clone())
            .unwrap_or_else(|| format!("{:?}", seat))
    }

    /// Queue a frame for `seat`. A peer that lets its queue fill up is
    /// cut off: the writer stops and a close event goes through the usual
    /// teardown path.
    fn send(&self, seat: Seat, msg: Message) {
        let Some(link) = &self.links[seat.index()] else {
            return;
        };
        match link.outbound.try_send(msg) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                if !link.writer.is_finished() {
                    warn!("{} is not reading, dropping the connection", link.name);
                    link.writer.abort();
                    let _ = self.events.send(Inbound {
                        conn: link.conn,
                        seat,
                        event: ConnEvent::Closed(Some(ProtocolError::Backlogged(OUTBOUND_QUEUE_LEN))),
                    });
                }
            }
            // The writer is gone; its close event follows.
            Err(TrySendError::Closed(_)) => {}
        }
    }

    fn broadcast(&self, msg: Message) {
        for seat in Seat::ALL {
            self.send(seat, msg.clone());
        }
    }

    /// Flush pending outbound frames and drop both connections.
    async fn close(&mut self) {
        for link in self.links.iter_mut().filter_map(Option::take) {
            let Link {
                outbound,
                reader,
                writer,
                ..
            } = link;
            drop(outbound);
            let _ = writer.await;
            reader.abort();
        }
    }
}
