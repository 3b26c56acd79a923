#![cfg(test)]

//! Tests for the Number Guess contract.

use crate::{derive_target, player1_wins, Error, NumberGuessContract, NumberGuessContractClient};
use game_session::{
    handshake::START_FN, AccountSignature, Phase, SessionInvite, StakeAuthorization,
};
use soroban_sdk::testutils::{Address as _, Ledger as _, MockAuth, MockAuthInvoke};
use soroban_sdk::{
    contract, contractimpl, contracttype, vec, Address, BytesN, Env, IntoVal, Symbol, Val, Vec,
};

// ============================================================================
// Mock GameHub
// ============================================================================

#[contracttype]
#[derive(Clone)]
pub enum HubKey {
    Started,
    Ended,
    LastResult,
}

#[contract]
pub struct MockGameHub;

#[contractimpl]
impl MockGameHub {
    pub fn start_game(
        env: Env,
        _game_id: Address,
        _session_id: u32,
        _player1: Address,
        _player2: Address,
        _player1_points: i128,
        _player2_points: i128,
    ) {
        bump(&env, HubKey::Started);
    }

    pub fn end_game(env: Env, _session_id: u32, player1_won: bool) {
        bump(&env, HubKey::Ended);
        env.storage().instance().set(&HubKey::LastResult, &player1_won);
    }

    pub fn started(env: Env) -> u32 {
        env.storage().instance().get(&HubKey::Started).unwrap_or(0)
    }

    pub fn ended(env: Env) -> u32 {
        env.storage().instance().get(&HubKey::Ended).unwrap_or(0)
    }

    pub fn last_result(env: Env) -> Option<bool> {
        env.storage().instance().get(&HubKey::LastResult)
    }
}

fn bump(env: &Env, key: HubKey) {
    let count: u32 = env.storage().instance().get(&key).unwrap_or(0);
    env.storage().instance().set(&key, &(count + 1));
}

mod failing_hub {
    use soroban_sdk::{contract, contractimpl, Address, Env};

    #[contract]
    pub struct FailingGameHub;

    #[contractimpl]
    impl FailingGameHub {
        pub fn start_game(
            _env: Env,
            _game_id: Address,
            _session_id: u32,
            _player1: Address,
            _player2: Address,
            _player1_points: i128,
            _player2_points: i128,
        ) {
            panic!("escrow unavailable");
        }

        pub fn end_game(_env: Env, _session_id: u32, _player1_won: bool) {
            panic!("escrow unavailable");
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn setup_test() -> (
    Env,
    NumberGuessContractClient<'static>,
    MockGameHubClient<'static>,
    Address,
    Address,
) {
    let env = Env::default();
    env.mock_all_auths();

    env.ledger().set(soroban_sdk::testutils::LedgerInfo {
        timestamp: 1_441_065_600,
        protocol_version: 25,
        sequence_number: 100,
        network_id: Default::default(),
        base_reserve: 10,
        min_temp_entry_ttl: u32::MAX / 2,
        min_persistent_entry_ttl: u32::MAX / 2,
        max_entry_ttl: u32::MAX / 2,
    });

    let hub_addr = env.register(MockGameHub, ());
    let game_hub = MockGameHubClient::new(&env, &hub_addr);
    let admin = Address::generate(&env);
    let contract_id = env.register(NumberGuessContract, (&admin, &hub_addr));
    let client = NumberGuessContractClient::new(&env, &contract_id);

    let player1 = Address::generate(&env);
    let player2 = Address::generate(&env);

    (env, client, game_hub, player1, player2)
}

fn assert_guess_error<T: core::fmt::Debug, E: core::fmt::Debug>(
    result: &Result<Result<T, E>, Result<Error, soroban_sdk::InvokeError>>,
    expected: Error,
) {
    match result {
        Err(Ok(actual)) => {
            assert_eq!(
                *actual, expected,
                "Expected {:?} but got {:?}",
                expected, actual
            );
        }
        other => panic!("Expected Err(Ok({:?})), got {:?}", expected, other),
    }
}

// ============================================================================
// Resolution rule
// ============================================================================

#[test]
fn test_exact_match_beats_distant_guess() {
    // target 7: distance 0 vs distance 4
    assert!(player1_wins(7, 7, 3, false));
    assert!(!player1_wins(7, 3, 7, true));
}

#[test]
fn test_equal_distance_goes_to_first_guesser() {
    // target 5: 4 and 6 are both one away
    assert!(player1_wins(5, 4, 6, true));
    assert!(!player1_wins(5, 4, 6, false));
    assert!(!player1_wins(5, 6, 6, false));
}

// ============================================================================
// Game flow
// ============================================================================

#[test]
fn test_complete_game() {
    let (env, client, hub, p1, p2) = setup_test();
    let session = 1u32;

    client.start_game(&session, &p1, &p2, &100_0000000, &100_0000000);
    client.make_guess(&session, &p1, &7);
    client.make_guess(&session, &p2, &3);

    let expected_target = env.as_contract(&client.address, || derive_target(&env, session, 7, 3));
    assert!((1..=10).contains(&expected_target));

    let winner = client.reveal_winner(&session);
    let p1_won = player1_wins(expected_target, 7, 3, true);
    assert_eq!(winner, if p1_won { p1.clone() } else { p2.clone() });

    let game = client.get_game(&session);
    assert_eq!(game.phase, Phase::Finished);
    assert_eq!(game.target, Some(expected_target));
    assert_eq!(game.winner, Some(winner.clone()));
    assert_eq!(game.first_guesser, Some(p1));
    assert_eq!(hub.ended(), 1);
    assert_eq!(hub.last_result(), Some(p1_won));

    // Reading twice gives the same winner.
    assert_eq!(client.get_game(&session).winner, Some(winner));
}

#[test]
fn test_exact_guess_wins_in_play() {
    let (env, client, hub, p1, p2) = setup_test();

    // Targets are fixed per session id; find one that lands on 7.
    let session = (100..400u32)
        .find(|s| env.as_contract(&client.address, || derive_target(&env, *s, 7, 3)) == 7)
        .expect("no session with target 7 in range");

    client.start_game(&session, &p1, &p2, &10, &10);
    // Player 2 guesses first, so only the distance decides.
    client.make_guess(&session, &p2, &3);
    client.make_guess(&session, &p1, &7);

    assert_eq!(client.reveal_winner(&session), p1);
    let game = client.get_game(&session);
    assert_eq!(game.target, Some(7));
    assert_eq!(game.winner, Some(p1));
    assert_eq!(hub.last_result(), Some(true));
}

#[test]
fn test_identical_guesses_go_to_first_guesser() {
    let (_env, client, hub, p1, p2) = setup_test();
    let session = 2u32;

    client.start_game(&session, &p1, &p2, &10, &10);
    client.make_guess(&session, &p2, &5);
    client.make_guess(&session, &p1, &5);

    assert_eq!(client.reveal_winner(&session), p2);
    assert_eq!(hub.last_result(), Some(false));
}

#[test]
fn test_reveal_requires_both_guesses() {
    let (_env, client, hub, p1, p2) = setup_test();
    let session = 3u32;

    client.start_game(&session, &p1, &p2, &10, &10);
    assert_guess_error(&client.try_reveal_winner(&session), Error::GuessesPending);

    client.make_guess(&session, &p1, &2);
    assert_guess_error(&client.try_reveal_winner(&session), Error::GuessesPending);
    assert_eq!(client.get_game(&session).phase, Phase::Active);
    assert_eq!(hub.ended(), 0);
}

#[test]
fn test_single_resolution() {
    let (_env, client, hub, p1, p2) = setup_test();
    let session = 4u32;

    client.start_game(&session, &p1, &p2, &10, &10);
    client.make_guess(&session, &p1, &1);
    client.make_guess(&session, &p2, &10);
    let winner = client.reveal_winner(&session);

    assert_guess_error(&client.try_reveal_winner(&session), Error::GameAlreadyEnded);
    assert_guess_error(
        &client.try_make_guess(&session, &p1, &4),
        Error::GameAlreadyEnded,
    );
    assert_eq!(hub.ended(), 1);
    assert_eq!(client.get_game(&session).winner, Some(winner));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_guess_out_of_range() {
    let (_env, client, _hub, p1, p2) = setup_test();
    let session = 10u32;

    client.start_game(&session, &p1, &p2, &10, &10);
    assert_guess_error(&client.try_make_guess(&session, &p1, &0), Error::InvalidGuess);
    assert_guess_error(&client.try_make_guess(&session, &p1, &11), Error::InvalidGuess);
    assert_eq!(client.get_game(&session).player1_guess, None);
}

#[test]
fn test_double_guess_rejected() {
    let (_env, client, _hub, p1, p2) = setup_test();
    let session = 11u32;

    client.start_game(&session, &p1, &p2, &10, &10);
    client.make_guess(&session, &p1, &6);

    assert_guess_error(&client.try_make_guess(&session, &p1, &8), Error::AlreadyActed);
    assert_eq!(client.get_game(&session).player1_guess, Some(6));
}

#[test]
fn test_outsider_rejected() {
    let (env, client, _hub, p1, p2) = setup_test();
    let session = 12u32;

    client.start_game(&session, &p1, &p2, &10, &10);
    let outsider = Address::generate(&env);
    assert_guess_error(&client.try_make_guess(&session, &outsider, &5), Error::NotPlayer);
}

#[test]
fn test_unknown_session() {
    let (_env, client, _hub, p1, _p2) = setup_test();

    assert_guess_error(&client.try_make_guess(&99, &p1, &5), Error::GameNotFound);
    assert_guess_error(&client.try_reveal_winner(&99), Error::GameNotFound);
}

#[test]
fn test_self_play_rejected() {
    let (_env, client, hub, p1, _p2) = setup_test();

    assert_guess_error(&client.try_start_game(&20, &p1, &p1, &10, &10), Error::SelfPlay);
    assert_eq!(hub.started(), 0);
}

#[test]
fn test_failed_settlement_keeps_game_open() {
    let (env, client, hub, p1, p2) = setup_test();
    let session = 21u32;

    client.start_game(&session, &p1, &p2, &10, &10);
    client.make_guess(&session, &p1, &3);
    client.make_guess(&session, &p2, &9);

    let failing = env.register(failing_hub::FailingGameHub, ());
    client.set_hub(&failing);
    assert!(client.try_reveal_winner(&session).is_err());

    let game = client.get_game(&session);
    assert_eq!(game.phase, Phase::Active);
    assert_eq!(game.winner, None);
    assert_eq!(game.target, None);

    // The whole call can be retried once the hub is back.
    client.set_hub(&hub.address);
    client.reveal_winner(&session);
    assert_eq!(client.get_game(&session).phase, Phase::Finished);
    assert_eq!(hub.ended(), 1);
}

#[test]
fn test_player2_authorization_not_reusable_with_other_opponent() {
    let (env, client, hub, p1, p2) = setup_test();
    let session = 77u32;
    let stranger = Address::generate(&env);

    let p2_args: Vec<Val> = (session, p1.clone(), p2.clone(), 100_i128, 100_i128).into_val(&env);
    let stranger_args: Vec<Val> = (session, 0_i128).into_val(&env);
    env.mock_auths(&[
        MockAuth {
            address: &stranger,
            invoke: &MockAuthInvoke {
                contract: &client.address,
                fn_name: START_FN,
                args: stranger_args,
                sub_invokes: &[],
            },
        },
        MockAuth {
            address: &p2,
            invoke: &MockAuthInvoke {
                contract: &client.address,
                fn_name: START_FN,
                args: p2_args,
                sub_invokes: &[],
            },
        },
    ]);

    assert!(client
        .try_start_game(&session, &stranger, &p2, &0, &100)
        .is_err());
    assert_eq!(hub.started(), 0);
    assert_guess_error(&client.try_get_game(&session), Error::GameNotFound);
}

// ============================================================================
// Handshake
// ============================================================================

#[test]
fn test_invite_replay_rejected() {
    let (env, client, hub, p1, p2) = setup_test();
    let session = 40u32;

    let invite = SessionInvite {
        authorization: StakeAuthorization {
            contract: client.address.clone(),
            function: Symbol::new(&env, START_FN),
            session_id: session,
            player: p1.clone(),
            points: 75,
            nonce: 1,
            expiration_ledger: 1_000,
        },
        signature: vec![
            &env,
            AccountSignature {
                public_key: BytesN::from_array(&env, &[2u8; 32]),
                signature: BytesN::from_array(&env, &[1u8; 64]),
            },
        ],
    };
    let blob = client.encode_invite(&invite);

    let request = client.accept_invite(&blob, &p2, &80);
    client.start_game(
        &request.session_id,
        &request.player1,
        &request.player2,
        &request.player1_points,
        &request.player2_points,
    );
    assert_eq!(client.get_game(&session).player1_points, 75);

    let p3 = Address::generate(&env);
    assert_guess_error(&client.try_accept_invite(&blob, &p3, &80), Error::SessionExists);
    assert_guess_error(
        &client.try_start_game(&session, &p1, &p3, &75, &80),
        Error::SessionExists,
    );
    assert_eq!(hub.started(), 1);
}
