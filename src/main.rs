#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use broadside::{
    init_logging, run_bot,
    view::{coord_to_string, render_board, render_player_view, Command, HELP},
    Arbiter, ArbiterConfig, Board, LocalGame, PeerState, PeerUpdate, Phase, RemotePeer,
    ScriptedOpponent, ShotOutcome, DEFAULT_PORT,
};

#[cfg(feature = "std")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "std")]
use log::LevelFilter;
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;
#[cfg(feature = "std")]
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
#[cfg(feature = "std")]
enum PlayerType {
    Human,
    Bot,
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Run the arbiter and pair up incoming players.
    Serve {
        #[arg(long, default_value_t = format!("0.0.0.0:{}", DEFAULT_PORT))]
        bind: String,
        #[arg(long, help = "Stop after this many matches (default: run forever)")]
        matches: Option<usize>,
    },
    /// Join a match hosted by an arbiter.
    Connect {
        #[arg(long, default_value_t = format!("127.0.0.1:{}", DEFAULT_PORT))]
        connect: String,
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        player: PlayerType,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Play against the computer on this machine.
    Local {
        #[arg(long, value_enum, default_value_t = PlayerType::Human)]
        player: PlayerType,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
}

#[cfg(feature = "std")]
fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => {
            println!("Using fixed seed: {} (game will be reproducible)", s);
            SmallRng::seed_from_u64(s)
        }
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LevelFilter::Info);
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind, matches } => {
            let arbiter = Arbiter::bind(&ArbiterConfig { bind }).await?;
            arbiter.run(matches).await?;
        }
        Commands::Connect {
            connect,
            player,
            seed,
        } => {
            println!("Connecting to {}...", connect);
            let mut peer = RemotePeer::connect(&connect).await?;
            let mut rng = make_rng(seed);
            match player {
                PlayerType::Bot => {
                    let report = run_bot(&mut peer, &ScriptedOpponent::new(), &mut rng).await?;
                    println!(
                        "Game over: {} wins ({} shots fired by {})",
                        report.winner, report.shots_fired, report.name
                    );
                }
                PlayerType::Human => run_human_remote(&mut peer, &mut rng).await?,
            }
            peer.close().await;
        }
        Commands::Local { player, seed } => {
            let rng = make_rng(seed);
            let game = LocalGame::new(rng).map_err(|e| anyhow::anyhow!(e))?;
            match player {
                PlayerType::Human => run_human_local(game).await?,
                PlayerType::Bot => run_bot_local(game)?,
            }
        }
    }
    Ok(())
}

#[cfg(feature = "std")]
fn describe_replies(replies: &[ShotOutcome]) {
    for reply in replies {
        println!(
            "Opponent fired at {}: {}",
            coord_to_string(reply.col, reply.row),
            reply.result
        );
    }
}

#[cfg(feature = "std")]
async fn run_human_local(mut game: LocalGame<SmallRng>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", HELP);
    show_board(&game, false);

    while !game.is_over() {
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let cmd = match Command::parse(&line) {
            Ok(cmd) => cmd,
            Err(e) => {
                println!("✗ {}", e);
                continue;
            }
        };
        match cmd {
            Command::Place {
                col,
                row,
                orientation,
            } => match game.place(col, row, orientation) {
                Ok(started) => {
                    show_board(&game, false);
                    if started {
                        println!("All ships placed. Your turn! Fire a shot.");
                    }
                }
                Err(e) => println!("✗ {}", e),
            },
            Command::Auto => match game.auto_place() {
                Ok(_) => {
                    show_board(&game, false);
                    println!("All ships placed. Your turn! Fire a shot.");
                }
                Err(e) => println!("✗ {}", e),
            },
            Command::Fire { col, row } => match game.fire(col, row) {
                Ok(exchange) => {
                    println!(
                        "You fired at {}: {}",
                        coord_to_string(col, row),
                        exchange.shot.result
                    );
                    describe_replies(&exchange.replies);
                }
                Err(e) => println!("✗ {}", e),
            },
            Command::Show => show_board(&game, true),
            Command::Help => println!("{}", HELP),
            Command::Quit => return Ok(()),
        }
    }
    announce_local_winner(&game);
    Ok(())
}

#[cfg(feature = "std")]
fn prompt_next_ship(board: &Board) {
    if let Some(def) = board.next_ship() {
        println!("Next ship: {} (length {})", def.name(), def.length());
    }
}

#[cfg(feature = "std")]
fn show_board<R: rand::Rng>(game: &LocalGame<R>, with_shots: bool) {
    if let Some(board) = game.human_board() {
        if with_shots {
            println!("{}", render_player_view(board));
        } else {
            println!("{}", render_board(board));
            prompt_next_ship(board);
        }
    }
}

#[cfg(feature = "std")]
fn run_bot_local(mut game: LocalGame<SmallRng>) -> anyhow::Result<()> {
    game.auto_place().map_err(|e| anyhow::anyhow!(e))?;
    while !game.is_over() {
        let (col, row) = game
            .suggest_target()
            .ok_or_else(|| anyhow::anyhow!("no unfired cells left"))?;
        let exchange = game.fire(col, row).map_err(|e| anyhow::anyhow!(e))?;
        println!("You fired at {}: {}", coord_to_string(col, row), exchange.shot.result);
        describe_replies(&exchange.replies);
    }
    announce_local_winner(&game);
    Ok(())
}

#[cfg(feature = "std")]
fn announce_local_winner<R: rand::Rng>(game: &LocalGame<R>) {
    let session = game.session();
    if let Some(name) = session.winner().and_then(|seat| session.name(seat)) {
        println!("Game over! Winner: {}", name);
    }
}

/// Drive a networked match from stdin. Network events and typed lines both
/// land in this one loop, which is the only place `PeerState` changes.
#[cfg(feature = "std")]
async fn run_human_remote(peer: &mut RemotePeer, rng: &mut SmallRng) -> anyhow::Result<()> {
    let mut state = PeerState::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            event = peer.next_event() => {
                let Some(event) = event else {
                    println!("Connection closed.");
                    return Ok(());
                };
                match state.apply_event(event) {
                    PeerUpdate::Named(name) => println!("Connected as {}. Waiting for an opponent...", name),
                    PeerUpdate::PlacementOpened => {
                        println!("Both players connected. Place your ships!\n{}", HELP);
                        println!("{}", render_board(state.board()));
                        prompt_next_ship(state.board());
                    }
                    PeerUpdate::AttackOpened { my_turn } | PeerUpdate::TurnChanged { my_turn } => {
                        println!("{}", if my_turn { "Your turn! Fire a shot." } else { "Opponent's turn." });
                    }
                    PeerUpdate::ShotResolved { col, row, result, .. } => {
                        println!("You fired at {}: {}", coord_to_string(col, row), result);
                    }
                    PeerUpdate::ShotReceived { col, row, result, .. } => {
                        println!("Opponent fired at {}: {}", coord_to_string(col, row), result);
                    }
                    PeerUpdate::GameOver { winner, won } => {
                        println!("Game over! Winner: {}{}", winner, if won { " (you)" } else { "" });
                        return Ok(());
                    }
                    PeerUpdate::Rejected(message) => println!("✗ {}", message),
                    PeerUpdate::ConnectionLost(reason) => {
                        println!("Connection lost: {}", reason);
                        return Ok(());
                    }
                    PeerUpdate::Ignored(_) => {}
                }
            }
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    input_open = false;
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match Command::parse(&line) {
                    Ok(Command::Quit) => return Ok(()),
                    Ok(cmd) => handle_remote_command(peer, &mut state, rng, cmd).await?,
                    Err(e) => println!("✗ {}", e),
                }
            }
        }
    }
}

#[cfg(feature = "std")]
async fn handle_remote_command(
    peer: &mut RemotePeer,
    state: &mut PeerState,
    rng: &mut SmallRng,
    cmd: Command,
) -> anyhow::Result<()> {
    match cmd {
        Command::Place {
            col,
            row,
            orientation,
        } => {
            if state.phase() != Phase::Placement {
                println!("✗ Placement has not started.");
                return Ok(());
            }
            if let Err(e) = state.place(col, row, orientation) {
                println!("✗ {}", e);
                return Ok(());
            }
            println!("{}", render_board(state.board()));
            prompt_next_ship(state.board());
        }
        Command::Auto => {
            if state.phase() != Phase::Placement {
                println!("✗ Placement has not started.");
                return Ok(());
            }
            if let Err(e) = state.place_remaining(&ScriptedOpponent::new(), rng) {
                println!("✗ {}", e);
                return Ok(());
            }
            println!("{}", render_board(state.board()));
        }
        Command::Fire { col, row } => {
            if !state.can_fire() {
                println!("✗ Not your turn.");
            } else if state.board().has_fired(col, row).unwrap_or(false) {
                println!("✗ You already fired at {}.", coord_to_string(col, row));
            } else {
                peer.fire(col, row).await?;
            }
            return Ok(());
        }
        Command::Show => {
            println!("{}", render_player_view(state.board()));
            return Ok(());
        }
        Command::Help => {
            println!("{}", HELP);
            return Ok(());
        }
        Command::Quit => return Ok(()),
    }

    if state.ready_to_submit() {
        peer.submit_placement(state.board()).await?;
        state.mark_submitted();
        println!("Fleet submitted. Waiting for the opponent...");
    }
    Ok(())
}
