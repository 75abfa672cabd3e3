//! Moves on one game are serialized; different games run independently.

use std::sync::Barrier;
use std::thread;
use tictactoe_game::{DeployGame, GameErrorKind, Identity, Ledger, Player, PublicKey};

fn deploy(ledger: &Ledger, one: &Identity, two: &Identity) -> tictactoe_game::GameHandle {
    let key = PublicKey::from_bytes([0; 32]);
    *ledger
        .create_game(one, DeployGame::new(one.clone(), two.clone(), key, key))
        .unwrap()
        .handle()
}

#[test]
fn test_racing_moves_on_one_game_admit_exactly_one() {
    let ledger = Ledger::new();
    let alice = Identity::new("alice");
    let bob = Identity::new("bob");
    let handle = deploy(&ledger, &alice, &bob);
    let barrier = Barrier::new(9);

    let results: Vec<_> = thread::scope(|s| {
        let workers: Vec<_> = (0..9u64)
            .map(|pos| {
                let (ledger, alice, barrier) = (&ledger, &alice, &barrier);
                s.spawn(move || {
                    barrier.wait();
                    ledger.submit_direct_move(handle, alice, pos)
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(accepted, 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(*err.kind(), GameErrorKind::NotYourTurn(alice.clone()));
    }

    let state = ledger.get_state(handle).unwrap();
    assert_eq!(state.board().count(Player::One), 1);
    assert_eq!(*state.turn(), Player::Two);
}

#[test]
fn test_parallel_games_and_deployments_do_not_interfere() {
    let ledger = Ledger::new();

    thread::scope(|s| {
        for worker in 0..8 {
            let ledger = &ledger;
            s.spawn(move || {
                let one = Identity::new(format!("one-{worker}"));
                let two = Identity::new(format!("two-{worker}"));
                let handle = deploy(ledger, &one, &two);
                for (i, pos) in [0u64, 1, 3, 2, 6].into_iter().enumerate() {
                    let caller = if i % 2 == 0 { &one } else { &two };
                    ledger.submit_direct_move(handle, caller, pos).unwrap();
                }
                let state = ledger.get_state(handle).unwrap();
                assert_eq!(state.board().encode(), "122100100");
                assert_eq!(*state.winner(), Some(one));
            });
        }
    });

    assert_eq!(ledger.total_games(), 8);
}
