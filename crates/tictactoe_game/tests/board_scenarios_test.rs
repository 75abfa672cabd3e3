//! End-to-end game scenarios through the ledger using direct moves.

use tictactoe_game::{
    DeployGame, GameErrorKind, GameHandle, GameState, GameStatus, Identity, Ledger, Player,
    PublicKey,
};

fn alice() -> Identity {
    Identity::new("alice")
}

fn bob() -> Identity {
    Identity::new("bob")
}

fn new_game(ledger: &Ledger) -> GameHandle {
    let key = PublicKey::from_bytes([0; 32]);
    *ledger
        .create_game(&alice(), DeployGame::new(alice(), bob(), key, key))
        .unwrap()
        .handle()
}

/// Plays `moves` with whichever player holds the turn.
fn play(ledger: &Ledger, handle: GameHandle, moves: &[u64]) -> GameState {
    let mut state = ledger.get_state(handle).unwrap();
    for &pos in moves {
        let caller = state.identity_of(*state.turn()).clone();
        state = ledger.submit_direct_move(handle, &caller, pos).unwrap();
    }
    state
}

#[test]
fn test_first_move() {
    let ledger = Ledger::new();
    let handle = new_game(&ledger);

    let state = play(&ledger, handle, &[0]);
    assert_eq!(state.board().encode(), "100000000");
    assert_eq!(*state.turn(), Player::Two);
    assert_eq!(*state.status(), GameStatus::InProgress);
    assert_eq!(*state.winner(), None);
}

#[test]
fn test_player_one_wins_left_column() {
    let ledger = Ledger::new();
    let handle = new_game(&ledger);

    let state = play(&ledger, handle, &[0, 1, 3, 2, 6]);
    assert_eq!(state.board().encode(), "122100100");
    assert_eq!(*state.status(), GameStatus::HasWinner);
    assert_eq!(state.status().code(), 1);
    assert_eq!(*state.turn(), Player::One);
    assert_eq!(*state.winner(), Some(alice()));
}

#[test]
fn test_draw() {
    let ledger = Ledger::new();
    let handle = new_game(&ledger);

    let state = play(&ledger, handle, &[0, 1, 2, 3, 5, 4, 6, 8, 7]);
    assert_eq!(state.board().encode(), "121221112");
    assert_eq!(*state.status(), GameStatus::Draw);
    assert_eq!(state.status().code(), 2);
    assert_eq!(*state.turn(), Player::One);
    assert_eq!(*state.winner(), None);
}

#[test]
fn test_player_two_can_win() {
    let ledger = Ledger::new();
    let handle = new_game(&ledger);

    let state = play(&ledger, handle, &[0, 4, 1, 2, 8, 6]);
    assert_eq!(*state.status(), GameStatus::HasWinner);
    assert_eq!(*state.winner(), Some(bob()));
    assert_eq!(*state.turn(), Player::Two);
}

#[test]
fn test_finished_game_rejects_every_move_without_change() {
    let ledger = Ledger::new();
    let handle = new_game(&ledger);
    let finished = play(&ledger, handle, &[0, 1, 3, 2, 6]);

    for caller in [alice(), bob(), Identity::new("mallory")] {
        for pos in [4, 8, 0, 42] {
            let err = ledger.submit_direct_move(handle, &caller, pos).unwrap_err();
            assert_eq!(*err.kind(), GameErrorKind::GameFinished);
            assert_eq!(err.code(), 1004);
        }
    }
    assert_eq!(ledger.get_state(handle).unwrap(), finished);
}

#[test]
fn test_drawn_game_rejects_every_move_without_change() {
    let ledger = Ledger::new();
    let handle = new_game(&ledger);
    let drawn = play(&ledger, handle, &[0, 1, 2, 3, 5, 4, 6, 8, 7]);
    assert_eq!(*drawn.status(), GameStatus::Draw);

    for caller in [alice(), bob()] {
        for pos in [0, 4, 8, 9] {
            let err = ledger.submit_direct_move(handle, &caller, pos).unwrap_err();
            assert_eq!(*err.kind(), GameErrorKind::GameFinished);
        }
    }
    assert_eq!(ledger.get_state(handle).unwrap(), drawn);
}

#[test]
fn test_occupied_square_is_illegal() {
    let ledger = Ledger::new();
    let handle = new_game(&ledger);
    let before = play(&ledger, handle, &[4]);

    let err = ledger.submit_direct_move(handle, &bob(), 4).unwrap_err();
    assert!(err.kind().is_illegal_move());
    assert_eq!(ledger.get_state(handle).unwrap(), before);
}

#[test]
fn test_out_of_bounds_is_illegal() {
    let ledger = Ledger::new();
    let handle = new_game(&ledger);

    let err = ledger.submit_direct_move(handle, &alice(), 9).unwrap_err();
    assert_eq!(*err.kind(), GameErrorKind::OutOfBounds(9));
    assert_eq!(ledger.get_state(handle).unwrap().board().encode(), "000000000");
}

#[test]
fn test_wrong_caller_rejected() {
    let ledger = Ledger::new();
    let handle = new_game(&ledger);

    let err = ledger.submit_direct_move(handle, &bob(), 0).unwrap_err();
    assert_eq!(*err.kind(), GameErrorKind::NotYourTurn(bob()));

    let err = ledger
        .submit_direct_move(handle, &Identity::new("mallory"), 0)
        .unwrap_err();
    assert_eq!(*err.kind(), GameErrorKind::Unauthorized(Identity::new("mallory")));
}

#[test]
fn test_turn_alternates_and_cells_are_write_once() {
    let ledger = Ledger::new();
    let handle = new_game(&ledger);

    let mut previous = ledger.get_state(handle).unwrap();
    let mut expected_turn = Player::One;
    for pos in [4, 0, 8, 2, 1, 7] {
        assert_eq!(*previous.turn(), expected_turn);
        let caller = previous.identity_of(expected_turn).clone();
        let next = ledger.submit_direct_move(handle, &caller, pos).unwrap();

        let old = previous.board().encode();
        let new = next.board().encode();
        let changed: Vec<_> = old
            .chars()
            .zip(new.chars())
            .filter(|(a, b)| a != b)
            .collect();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].0, '0');

        if *next.status() == GameStatus::InProgress {
            expected_turn = expected_turn.opponent();
        }
        previous = next;
    }
}

#[test]
fn test_shared_identity_plays_both_seats() {
    let ledger = Ledger::new();
    let me = Identity::new("deployer");
    let key = PublicKey::from_bytes([0; 32]);
    let handle = *ledger
        .create_game(&me, DeployGame::new(me.clone(), me.clone(), key, key))
        .unwrap()
        .handle();

    let mut state = ledger.get_state(handle).unwrap();
    for pos in [0, 1, 3, 2, 6] {
        state = ledger.submit_direct_move(handle, &me, pos).unwrap();
    }
    assert_eq!(state.board().encode(), "122100100");
    assert_eq!(*state.winner(), Some(me));
}
