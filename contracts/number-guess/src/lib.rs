#![no_std]

//! # Number Guess
//!
//! Both players guess a number between 1 and 10. Once both guesses are in,
//! `reveal_winner` derives the target and whoever is closest wins.
//!
//! Guesses are submitted in either order, once each. The target is derived
//! only after both are stored, from the session id and both guesses, so no
//! guess can be chosen against a known target.
//!
//! Equal distance goes to whoever guessed first.

use game_session::{
    config, escrow, handshake, randomness, storage, InviteSummary, Phase, SessionError,
    SessionInvite, StartRequest,
};
use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, log, Address, Bytes,
    BytesN, Env,
};

// ============================================================================
// Errors
// ============================================================================

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    GameNotFound        = 1,
    NotPlayer           = 2,
    NotYourTurn         = 3,
    WrongPhase          = 4,
    GameAlreadyEnded    = 5,
    AlreadyActed        = 6,
    SelfPlay            = 7,
    SessionExists       = 8,
    InvalidWager        = 9,
    MalformedInvite     = 10,
    InviteExpired       = 11,
    InviteScopeMismatch = 12,
    CounterOverflow     = 13,
    NotInitialized      = 14,
    InvalidGuess        = 20,
    GuessesPending      = 21,
}

impl From<SessionError> for Error {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::WrongPhase => Error::WrongPhase,
            SessionError::GameAlreadyEnded => Error::GameAlreadyEnded,
            SessionError::SelfPlay => Error::SelfPlay,
            SessionError::SessionExists => Error::SessionExists,
            SessionError::InvalidWager => Error::InvalidWager,
            SessionError::MalformedInvite => Error::MalformedInvite,
            SessionError::InviteExpired => Error::InviteExpired,
            SessionError::InviteScopeMismatch => Error::InviteScopeMismatch,
            SessionError::NotInitialized => Error::NotInitialized,
        }
    }
}

// ============================================================================
// Data Types
// ============================================================================

pub const MIN_GUESS: u32 = 1;
pub const MAX_GUESS: u32 = 10;

const GUESS_TAG: &[u8] = b"guess";

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Game {
    pub player1: Address,
    pub player2: Address,
    pub player1_points: i128,
    pub player2_points: i128,
    pub phase: Phase,
    pub player1_guess: Option<u32>,
    pub player2_guess: Option<u32>,
    /// Whoever submitted first; breaks equal-distance ties.
    pub first_guesser: Option<Address>,
    pub target: Option<u32>,
    pub winner: Option<Address>,
}

#[contractevent]
pub struct GuessSubmitted {
    pub session_id: u32,
    pub player: Address,
}

#[contractevent]
pub struct TargetRevealed {
    pub session_id: u32,
    pub target: u32,
    pub winner: Address,
}

fn distance(a: u32, b: u32) -> u32 {
    a.abs_diff(b)
}

/// Closest guess wins. On equal distance the first guesser wins.
pub fn player1_wins(target: u32, guess1: u32, guess2: u32, player1_first: bool) -> bool {
    let d1 = distance(guess1, target);
    let d2 = distance(guess2, target);
    if d1 == d2 {
        player1_first
    } else {
        d1 < d2
    }
}

/// Target in `MIN_GUESS..=MAX_GUESS` for a session with both guesses in.
fn derive_target(env: &Env, session_id: u32, guess1: u32, guess2: u32) -> u32 {
    let mut tag = [0u8; 7];
    tag[..5].copy_from_slice(GUESS_TAG);
    tag[5] = guess1 as u8;
    tag[6] = guess2 as u8;
    let seed = randomness::derive_seed(env, session_id, 0, &tag);
    randomness::draw(env, &seed, MIN_GUESS as u64..=MAX_GUESS as u64)
}

// ============================================================================
// Contract
// ============================================================================

#[contract]
pub struct NumberGuessContract;

#[contractimpl]
impl NumberGuessContract {
    pub fn __constructor(env: Env, admin: Address, game_hub: Address) {
        config::init(&env, &admin, &game_hub);
    }

    /// Start a session and lock both wagers in the Game Hub.
    pub fn start_game(
        env: Env,
        session_id: u32,
        player1: Address,
        player2: Address,
        player1_points: i128,
        player2_points: i128,
    ) -> Result<(), Error> {
        storage::ensure_unused(&env, session_id)?;

        let request = StartRequest {
            session_id,
            player1,
            player2,
            player1_points,
            player2_points,
        };
        handshake::authorize_start(&env, &request)?;
        escrow::lock_wagers(&env, &request)?;

        let game = Game {
            player1: request.player1,
            player2: request.player2,
            player1_points,
            player2_points,
            phase: Phase::Active,
            player1_guess: None,
            player2_guess: None,
            first_guesser: None,
            target: None,
            winner: None,
        };
        storage::save_session(&env, session_id, &game);
        Ok(())
    }

    /// Submit a guess in `1..=10`. Each player guesses exactly once.
    pub fn make_guess(env: Env, session_id: u32, player: Address, guess: u32) -> Result<(), Error> {
        player.require_auth();

        if !(MIN_GUESS..=MAX_GUESS).contains(&guess) {
            return Err(Error::InvalidGuess);
        }

        let mut game: Game =
            storage::load_session(&env, session_id).ok_or(Error::GameNotFound)?;
        game.phase.ensure_active()?;

        if player == game.player1 {
            if game.player1_guess.is_some() {
                return Err(Error::AlreadyActed);
            }
            game.player1_guess = Some(guess);
        } else if player == game.player2 {
            if game.player2_guess.is_some() {
                return Err(Error::AlreadyActed);
            }
            game.player2_guess = Some(guess);
        } else {
            return Err(Error::NotPlayer);
        }

        if game.first_guesser.is_none() {
            game.first_guesser = Some(player.clone());
        }

        GuessSubmitted { session_id, player }.publish(&env);

        storage::save_session(&env, session_id, &game);
        Ok(())
    }

    /// Derive the target, settle the session and report to the Game Hub.
    pub fn reveal_winner(env: Env, session_id: u32) -> Result<Address, Error> {
        let mut game: Game =
            storage::load_session(&env, session_id).ok_or(Error::GameNotFound)?;
        game.phase.ensure_active()?;

        let guess1 = game.player1_guess.ok_or(Error::GuessesPending)?;
        let guess2 = game.player2_guess.ok_or(Error::GuessesPending)?;

        let target = derive_target(&env, session_id, guess1, guess2);
        let player1_first = game.first_guesser.as_ref() == Some(&game.player1);
        let player1_won = player1_wins(target, guess1, guess2, player1_first);

        let winner = if player1_won {
            game.player1.clone()
        } else {
            game.player2.clone()
        };
        log!(&env, "number guess resolved", session_id, target);

        game.target = Some(target);
        game.winner = Some(winner.clone());
        game.phase = Phase::Finished;

        escrow::settle(&env, session_id, player1_won)?;
        TargetRevealed {
            session_id,
            target,
            winner: winner.clone(),
        }
        .publish(&env);

        storage::save_session(&env, session_id, &game);
        Ok(winner)
    }

    pub fn get_game(env: Env, session_id: u32) -> Result<Game, Error> {
        storage::load_session(&env, session_id).ok_or(Error::GameNotFound)
    }

    // ------------------------------------------------------------ handshake

    pub fn encode_invite(env: Env, invite: SessionInvite) -> Bytes {
        handshake::export_invite(&env, &invite)
    }

    pub fn parse_invite(env: Env, invite: Bytes, player2: Address) -> Result<InviteSummary, Error> {
        let invite = handshake::import_invite(&env, &invite, &player2)?;
        storage::ensure_unused(&env, invite.authorization.session_id)?;
        Ok(invite.summary())
    }

    pub fn accept_invite(
        env: Env,
        invite: Bytes,
        player2: Address,
        player2_points: i128,
    ) -> Result<StartRequest, Error> {
        let invite = handshake::import_invite(&env, &invite, &player2)?;
        storage::ensure_unused(&env, invite.authorization.session_id)?;
        Ok(handshake::complete_invite(&invite, &player2, player2_points)?)
    }

    // ============================================================ Admin fns

    pub fn get_admin(env: Env) -> Result<Address, Error> {
        Ok(config::admin(&env)?)
    }

    pub fn set_admin(env: Env, new_admin: Address) -> Result<(), Error> {
        Ok(config::set_admin(&env, &new_admin)?)
    }

    pub fn get_hub(env: Env) -> Result<Address, Error> {
        Ok(config::hub(&env)?)
    }

    pub fn set_hub(env: Env, new_hub: Address) -> Result<(), Error> {
        Ok(config::set_hub(&env, &new_hub)?)
    }

    pub fn upgrade(env: Env, new_wasm_hash: BytesN<32>) -> Result<(), Error> {
        Ok(config::upgrade(&env, new_wasm_hash)?)
    }
}

#[cfg(test)]
mod test;
