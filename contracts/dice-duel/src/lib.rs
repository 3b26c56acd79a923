#![no_std]

//! # Dice Duel
//!
//! Two players each roll two dice; the higher total takes both wagers.
//!
//! Dice are never supplied by the players. Each roll is drawn from a seed
//! derived from the session id and the roller's seat, so simulation and
//! submission agree and neither player can pick a result.
//!
//! ## Flow
//! 1. `start_game` – both stakes authorized, Game Hub locks the wagers
//! 2. `roll` – player 1, then player 2
//! 3. the second roll resolves the duel and reports to the Game Hub
//!
//! A tie goes to player 1. This is a fixed house rule, not a fairness claim.

use game_session::{
    config, escrow, handshake, randomness, storage, InviteSummary, Phase, SessionError,
    SessionInvite, StartRequest,
};
use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, Address, Bytes, BytesN,
    Env,
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

const DICE_TAG: &[u8] = b"dice";

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Roll {
    pub die1: u32,
    pub die2: u32,
}

impl Roll {
    pub fn total(&self) -> u32 {
        self.die1 + self.die2
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Game {
    pub player1: Address,
    pub player2: Address,
    pub player1_points: i128,
    pub player2_points: i128,
    pub phase: Phase,
    /// Seat expected to roll next: 0 = player 1, 1 = player 2.
    pub current_turn: u32,
    pub player1_roll: Option<Roll>,
    pub player2_roll: Option<Roll>,
    pub winner: Option<Address>,
}

impl Game {
    fn seat_of(&self, player: &Address) -> Option<u32> {
        if *player == self.player1 {
            Some(0)
        } else if *player == self.player2 {
            Some(1)
        } else {
            None
        }
    }

    fn roll_of(&self, seat: u32) -> &Option<Roll> {
        if seat == 0 {
            &self.player1_roll
        } else {
            &self.player2_roll
        }
    }
}

#[contractevent]
pub struct DiceRolled {
    pub session_id: u32,
    pub player: Address,
    pub die1: u32,
    pub die2: u32,
}

#[contractevent]
pub struct DuelFinished {
    pub session_id: u32,
    pub winner: Address,
}

/// Higher total wins; a tie goes to player 1.
pub fn player1_wins(player1_total: u32, player2_total: u32) -> bool {
    player1_total >= player2_total
}

// ============================================================================
// Contract
// ============================================================================

#[contract]
pub struct DiceDuelContract;

#[contractimpl]
impl DiceDuelContract {
    pub fn __constructor(env: Env, admin: Address, game_hub: Address) {
        config::init(&env, &admin, &game_hub);
    }

    /// Start a duel and lock both wagers in the Game Hub.
    ///
    /// Each player authorizes exactly `(session_id, own_points)`.
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
            current_turn: 0,
            player1_roll: None,
            player2_roll: None,
            winner: None,
        };
        storage::save_session(&env, session_id, &game);
        Ok(())
    }

    /// Roll two dice for `player`. The second roll settles the duel.
    pub fn roll(env: Env, session_id: u32, player: Address) -> Result<Roll, Error> {
        player.require_auth();

        let mut game: Game =
            storage::load_session(&env, session_id).ok_or(Error::GameNotFound)?;
        game.phase.ensure_active()?;

        let seat = game.seat_of(&player).ok_or(Error::NotPlayer)?;
        if game.roll_of(seat).is_some() {
            return Err(Error::AlreadyActed);
        }
        if seat != game.current_turn {
            return Err(Error::NotYourTurn);
        }

        let seed = randomness::derive_seed(&env, session_id, seat, DICE_TAG);
        let (die1, die2) = randomness::draw_pair(&env, &seed, 1..=6);
        let roll = Roll { die1, die2 };

        if seat == 0 {
            game.player1_roll = Some(roll.clone());
            game.current_turn = 1;
        } else {
            game.player2_roll = Some(roll.clone());
        }

        DiceRolled {
            session_id,
            player,
            die1,
            die2,
        }
        .publish(&env);

        let totals = match (&game.player1_roll, &game.player2_roll) {
            (Some(r1), Some(r2)) => Some((r1.total(), r2.total())),
            _ => None,
        };
        if let Some((total1, total2)) = totals {
            let player1_won = player1_wins(total1, total2);
            let winner = if player1_won {
                game.player1.clone()
            } else {
                game.player2.clone()
            };
            game.winner = Some(winner.clone());
            game.phase = Phase::Finished;

            escrow::settle(&env, session_id, player1_won)?;
            DuelFinished { session_id, winner }.publish(&env);
        }

        storage::save_session(&env, session_id, &game);
        Ok(roll)
    }

    pub fn get_game(env: Env, session_id: u32) -> Result<Game, Error> {
        storage::load_session(&env, session_id).ok_or(Error::GameNotFound)
    }

    // ------------------------------------------------------------ handshake

    /// Serialize Player 1's signed invite for out-of-band transport.
    pub fn encode_invite(env: Env, invite: SessionInvite) -> Bytes {
        handshake::export_invite(&env, &invite)
    }

    /// Decode an invite for `player2` and show what Player 1 committed to.
    pub fn parse_invite(env: Env, invite: Bytes, player2: Address) -> Result<InviteSummary, Error> {
        let invite = handshake::import_invite(&env, &invite, &player2)?;
        storage::ensure_unused(&env, invite.authorization.session_id)?;
        Ok(invite.summary())
    }

    /// Arguments Player 2 submits to `start_game` to complete the invite.
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
