use broadside::{
    run_bot, Arbiter, ArbiterConfig, BoardError, CellState, MatchReport, Message, Orientation,
    PeerEvent, PeerState, PeerUpdate, Phase, RemotePeer, ScriptedOpponent, ShotMark, ShotResult,
    TcpTransport, Transport, NUM_SHIPS,
};
use rand::{rngs::SmallRng, SeedableRng};
use tokio::net::TcpListener;
use tokio::time::{timeout, Duration};

fn placed_state() -> PeerState {
    let mut state = PeerState::new();
    state.apply(&Message::StartPlacement { message: None });
    let mut rng = SmallRng::seed_from_u64(7);
    state.place_remaining(&ScriptedOpponent::new(), &mut rng).unwrap();
    state
}

#[test]
fn test_greeting_and_phases() {
    let mut state = PeerState::new();
    assert_eq!(state.phase(), Phase::Waiting);
    assert_eq!(
        state.apply(&Message::Greeting { name: "Player 2".into() }),
        PeerUpdate::Named("Player 2".into())
    );
    assert_eq!(state.name(), Some("Player 2"));
    assert_eq!(
        state.apply(&Message::StartPlacement { message: None }),
        PeerUpdate::PlacementOpened
    );
    assert_eq!(state.phase(), Phase::Placement);
    assert_eq!(
        state.apply(&Message::StartAttack { turn: false, message: None }),
        PeerUpdate::AttackOpened { my_turn: false }
    );
    assert_eq!(state.phase(), Phase::Attack);
    assert!(!state.can_fire());
    state.apply(&Message::YourTurn);
    assert!(state.can_fire());
    state.apply(&Message::OpponentTurn);
    assert!(!state.my_turn());
}

#[test]
fn test_local_placement_is_validated() {
    let mut state = PeerState::new();
    state.place(0, 0, Orientation::Horizontal).unwrap();
    assert_eq!(
        state.place(0, 0, Orientation::Vertical).unwrap_err(),
        BoardError::ShipOverlaps
    );
    assert_eq!(
        state.place(8, 1, Orientation::Horizontal).unwrap_err(),
        BoardError::ShipOutOfBounds
    );
    assert!(!state.ready_to_submit());

    let mut state = placed_state();
    assert!(state.ready_to_submit());
    state.mark_submitted();
    assert!(!state.ready_to_submit());
    assert_eq!(
        state.place(0, 9, Orientation::Horizontal).unwrap_err(),
        BoardError::FleetComplete
    );
}

#[test]
fn test_shot_results_update_the_mirror() {
    let mut state = placed_state();
    state.apply(&Message::StartAttack { turn: true, message: None });

    let update = state.apply(&Message::ShotResult {
        col: 2,
        row: 3,
        result: ShotResult::Hit,
        sunk_count: 0,
    });
    assert!(matches!(update, PeerUpdate::ShotResolved { result: ShotResult::Hit, .. }));
    assert_eq!(state.board().shot_at(2, 3).unwrap(), ShotMark::Hit);
    assert!(state.my_turn());

    state.apply(&Message::ShotResult {
        col: 4,
        row: 4,
        result: ShotResult::Miss,
        sunk_count: 0,
    });
    assert_eq!(state.board().shot_at(4, 4).unwrap(), ShotMark::Miss);
    assert!(!state.my_turn());
    assert_eq!(state.board().shots_fired_count(), 2);
}

#[test]
fn test_incoming_shots_mark_own_board() {
    let mut state = placed_state();
    let (col, row) = state.board().ships()[0].origin();
    state.apply(&Message::OpponentShot { col, row, result: ShotResult::Hit, sunk_count: 0 });
    assert_eq!(state.board().cell(col, row).unwrap(), CellState::Hit);

    let empty = (0..10)
        .flat_map(|r| (0..10).map(move |c| (c, r)))
        .find(|&(c, r)| state.board().cell(c, r).unwrap() == CellState::Empty)
        .unwrap();
    state.apply(&Message::OpponentShot {
        col: empty.0,
        row: empty.1,
        result: ShotResult::Miss,
        sunk_count: 0,
    });
    assert_eq!(state.board().cell(empty.0, empty.1).unwrap(), CellState::Miss);
}

#[test]
fn test_no_fire_after_last_sink() {
    let mut state = placed_state();
    state.apply(&Message::StartAttack { turn: true, message: None });
    state.apply(&Message::ShotResult {
        col: 0,
        row: 0,
        result: ShotResult::Sunk,
        sunk_count: NUM_SHIPS,
    });
    assert!(state.my_turn());
    assert!(!state.can_fire());
}

#[test]
fn test_game_over_error_and_loss() {
    let mut state = PeerState::new();
    state.apply(&Message::Greeting { name: "Player 1".into() });
    assert_eq!(
        state.apply(&Message::error("Not your turn")),
        PeerUpdate::Rejected("Not your turn".into())
    );
    assert_eq!(state.last_error(), Some("Not your turn"));

    assert_eq!(
        state.apply(&Message::GameOver { winner: "Player 1".into() }),
        PeerUpdate::GameOver { winner: "Player 1".into(), won: true }
    );
    assert_eq!(state.phase(), Phase::GameOver);
    assert_eq!(state.winner(), Some("Player 1"));

    assert_eq!(
        state.apply(&Message::Shot { col: 1, row: 1 }),
        PeerUpdate::Ignored("SHOT")
    );
    let update = state.apply_event(PeerEvent::ConnectionLost("gone".into()));
    assert_eq!(update, PeerUpdate::ConnectionLost("gone".into()));
    assert!(state.connection_lost());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bots_finish_a_match() -> anyhow::Result<()> {
    let arbiter = Arbiter::bind(&ArbiterConfig {
        bind: "127.0.0.1:0".into(),
    })
    .await?;
    let addr = arbiter.local_addr()?;
    let server = tokio::spawn(async move { arbiter.serve_match().await });

    let mut p1 = RemotePeer::connect(addr).await?;
    let mut p2 = RemotePeer::connect(addr).await?;
    let opponent = ScriptedOpponent::new();

    let f1 = async {
        let mut rng = SmallRng::seed_from_u64(1);
        run_bot(&mut p1, &opponent, &mut rng).await
    };
    let f2 = async {
        let mut rng = SmallRng::seed_from_u64(2);
        run_bot(&mut p2, &opponent, &mut rng).await
    };
    let (r1, r2) = timeout(Duration::from_secs(30), async { tokio::try_join!(f1, f2) }).await??;

    assert_eq!(r1.name, "Player 1");
    assert_eq!(r2.name, "Player 2");
    assert_eq!(r1.winner, r2.winner);
    assert!(r1.won ^ r2.won);
    let winner = if r1.won { &r1 } else { &r2 };
    assert!(winner.shots_fired >= 17);

    let report = server.await??;
    assert_eq!(report, MatchReport::Finished { winner: winner.name.clone() });
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_peer_reports_lost_connection() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut transport = TcpTransport::new(stream);
        transport
            .send(&Message::Greeting { name: "Player 1".into() })
            .await
            .unwrap();
    });

    let mut peer = RemotePeer::connect(addr).await?;
    server.await?;
    assert_eq!(
        peer.next_event().await,
        Some(PeerEvent::Message(Message::Greeting { name: "Player 1".into() }))
    );
    assert!(matches!(peer.next_event().await, Some(PeerEvent::ConnectionLost(_))));
    assert_eq!(peer.next_event().await, None);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bot_fires_again_after_error_reply() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await?;
        let mut transport = TcpTransport::new(stream);
        transport.send(&Message::Greeting { name: "Player 1".into() }).await?;
        transport.send(&Message::StartPlacement { message: None }).await?;
        let placement = transport.recv().await?;
        assert_eq!(placement.kind(), "PLACEMENT_DONE");
        transport
            .send(&Message::StartAttack { turn: true, message: None })
            .await?;

        let first = transport.recv().await?;
        assert!(matches!(first, Message::Shot { .. }));
        transport.send(&Message::error("Not your turn")).await?;

        let second = timeout(Duration::from_secs(5), transport.recv()).await??;
        assert!(matches!(second, Message::Shot { .. }));
        transport.send(&Message::GameOver { winner: "Player 2".into() }).await?;
        anyhow::Ok(())
    });

    let mut peer = RemotePeer::connect(addr).await?;
    let mut rng = SmallRng::seed_from_u64(11);
    let report = timeout(
        Duration::from_secs(10),
        run_bot(&mut peer, &ScriptedOpponent::new(), &mut rng),
    )
    .await??;
    assert_eq!(report.name, "Player 1");
    assert!(!report.won);
    server.await??;
    Ok(())
}
