use broadside::{run_bot, Arbiter, ArbiterConfig, MatchReport, RemotePeer, ScriptedOpponent};
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;

/// Bot against bot through a loopback arbiter; prints a JSON summary.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <seed1> <seed2>", args[0]);
        std::process::exit(1);
    }
    let seed1: u64 = args[1].parse()?;
    let seed2: u64 = args[2].parse()?;

    let arbiter = Arbiter::bind(&ArbiterConfig {
        bind: "127.0.0.1:0".into(),
    })
    .await?;
    let addr = arbiter.local_addr()?;
    let server = tokio::spawn(async move { arbiter.serve_match().await });

    // Connect in order so the first seed always sits in the first seat.
    let mut peer1 = RemotePeer::connect(addr).await?;
    let mut peer2 = RemotePeer::connect(addr).await?;

    let f1 = async move {
        let mut rng = SmallRng::seed_from_u64(seed1);
        run_bot(&mut peer1, &ScriptedOpponent::new(), &mut rng).await
    };
    let f2 = async move {
        let mut rng = SmallRng::seed_from_u64(seed2);
        run_bot(&mut peer2, &ScriptedOpponent::new(), &mut rng).await
    };

    let (res1, res2) = tokio::try_join!(f1, f2)?;
    let report = server.await??;

    let winner = match report {
        MatchReport::Finished { winner } => Some(winner),
        MatchReport::Abandoned { .. } => None,
    };

    let result = json!({
        "player1": {"name": res1.name, "won": res1.won, "shots": res1.shots_fired},
        "player2": {"name": res2.name, "won": res2.won, "shots": res2.shots_fired},
        "winner": winner,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
