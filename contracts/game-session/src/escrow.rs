//! Bridge to the Game Hub, which escrows both wagers for a session.
//!
//! Each game calls [`lock_wagers`] exactly once when a session becomes
//! active and [`settle`] exactly once when it finishes. A failing hub call
//! aborts the whole invocation, so nothing written before it survives.

use soroban_sdk::{contractclient, Address, Env};

use crate::{config, SessionError, StartRequest};

#[contractclient(name = "GameHubClient")]
pub trait GameHub {
    fn start_game(
        env: Env,
        game_id: Address,
        session_id: u32,
        player1: Address,
        player2: Address,
        player1_points: i128,
        player2_points: i128,
    );

    fn end_game(env: Env, session_id: u32, player1_won: bool);
}

pub fn lock_wagers(env: &Env, request: &StartRequest) -> Result<(), SessionError> {
    let hub = GameHubClient::new(env, &config::hub(env)?);
    hub.start_game(
        &env.current_contract_address(),
        &request.session_id,
        &request.player1,
        &request.player2,
        &request.player1_points,
        &request.player2_points,
    );
    Ok(())
}

pub fn settle(env: &Env, session_id: u32, player1_won: bool) -> Result<(), SessionError> {
    let hub = GameHubClient::new(env, &config::hub(env)?);
    hub.end_game(&session_id, &player1_won);
    Ok(())
}
