use broadside::{Phase, ScriptedOpponent, Seat, Session, ShotResult, GRID_SIZE};
use proptest::prelude::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};

fn random_session(rng: &mut SmallRng) -> Session {
    let opponent = ScriptedOpponent::new();
    let mut session = Session::new();
    session.bind("A").unwrap();
    session.bind("B").unwrap();
    for seat in Seat::ALL {
        while let Some(def) = session.board(seat).unwrap().next_ship() {
            let board = session.board(seat).unwrap();
            let (col, row, o) = opponent.random_placement(rng, board, def.length()).unwrap();
            session.place(seat, def.length(), col, row, o).unwrap();
        }
    }
    session
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn turn_flips_only_on_miss(seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut session = random_session(&mut rng);
        prop_assert_eq!(session.phase(), Phase::Attack);

        while session.phase() == Phase::Attack {
            let attacker = session.turn().unwrap();
            let col = rng.random_range(0..GRID_SIZE);
            let row = rng.random_range(0..GRID_SIZE);
            let Ok(outcome) = session.fire(attacker, col, row) else {
                // Repeated cell: rejected, turn unchanged.
                prop_assert_eq!(session.turn(), Some(attacker));
                continue;
            };
            if outcome.winner.is_some() {
                prop_assert_eq!(outcome.result, ShotResult::Sunk);
                prop_assert_eq!(session.phase(), Phase::GameOver);
                prop_assert_eq!(session.winner(), Some(attacker));
            } else if outcome.result == ShotResult::Miss {
                prop_assert_eq!(session.turn(), Some(attacker.other()));
            } else {
                prop_assert_eq!(session.turn(), Some(attacker));
            }
        }
        let winner = session.winner().unwrap();
        prop_assert!(session.board(winner.other()).unwrap().is_defeated());
        prop_assert!(!session.board(winner).unwrap().is_defeated());
    }
}
