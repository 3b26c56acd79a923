#![no_std]

//! # Twenty-One
//!
//! Two-player twenty-one against each other, no dealer. Each player starts
//! with two cards; player 1 hits or sticks until they stick, then player 2
//! does the same.
//!
//! * A hit that takes a hand over 21 loses on the spot.
//! * Once both have stuck the higher total wins.
//! * An exact tie redeals fresh hands, at most `MAX_REDEALS` times; a tie
//!   after the last redeal goes to player 1.
//!
//! Cards are ranks 1-13 drawn from `sha256(session_id || cards_drawn || "card")`.
//! Aces count 11 or 1, court cards count 10. The draw counter never resets,
//! so a redeal never repeats earlier cards' seeds.

use game_session::{
    config, escrow, handshake, randomness, storage, InviteSummary, Phase, SessionError,
    SessionInvite, StartRequest,
};
use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, Address, Bytes, BytesN,
    Env, Vec,
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

pub const BUST_LIMIT: u32 = 21;

/// Redeals allowed on tied hands before the tie goes to player 1.
pub const MAX_REDEALS: u32 = 3;

const CARD_TAG: &[u8] = b"card";

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Game {
    pub player1: Address,
    pub player2: Address,
    pub player1_points: i128,
    pub player2_points: i128,
    pub phase: Phase,
    /// Seat expected to act: 0 = player 1, 1 = player 2.
    pub current_turn: u32,
    pub player1_hand: Vec<u32>,
    pub player2_hand: Vec<u32>,
    pub player1_stuck: bool,
    pub player2_stuck: bool,
    pub redeals: u32,
    pub cards_drawn: u32,
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

    fn hand(&self, seat: u32) -> &Vec<u32> {
        if seat == 0 {
            &self.player1_hand
        } else {
            &self.player2_hand
        }
    }

    fn is_stuck(&self, seat: u32) -> bool {
        if seat == 0 {
            self.player1_stuck
        } else {
            self.player2_stuck
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RoundOutcome {
    Player1,
    Player2,
    Redeal,
}

#[contractevent]
pub struct CardDrawn {
    pub session_id: u32,
    pub player: Address,
    pub rank: u32,
    pub total: u32,
}

#[contractevent]
pub struct HandsRedealt {
    pub session_id: u32,
    pub redeals: u32,
}

#[contractevent]
pub struct TableClosed {
    pub session_id: u32,
    pub winner: Address,
}

/// Face value of a rank, counting an ace as 11.
pub fn card_value(rank: u32) -> u32 {
    match rank {
        1 => 11,
        11..=13 => 10,
        r => r,
    }
}

/// Best total for a hand: aces drop from 11 to 1 while the hand is over 21.
pub fn hand_total(hand: &Vec<u32>) -> u32 {
    let mut total = 0u32;
    let mut soft_aces = 0u32;
    for rank in hand.iter() {
        total += card_value(rank);
        if rank == 1 {
            soft_aces += 1;
        }
    }
    while total > BUST_LIMIT && soft_aces > 0 {
        total -= 10;
        soft_aces -= 1;
    }
    total
}

/// Compare two standing hands.
pub fn round_outcome(player1_total: u32, player2_total: u32, redeals: u32) -> RoundOutcome {
    if player1_total > player2_total {
        RoundOutcome::Player1
    } else if player2_total > player1_total {
        RoundOutcome::Player2
    } else if redeals < MAX_REDEALS {
        RoundOutcome::Redeal
    } else {
        RoundOutcome::Player1
    }
}

fn draw_card(env: &Env, session_id: u32, game: &mut Game) -> Result<u32, Error> {
    let seed = randomness::derive_seed(env, session_id, game.cards_drawn, CARD_TAG);
    let rank = randomness::draw(env, &seed, 1..=13);
    game.cards_drawn = game
        .cards_drawn
        .checked_add(1)
        .ok_or(Error::CounterOverflow)?;
    Ok(rank)
}

/// Fresh two-card hands, dealt alternately starting with player 1.
fn deal(env: &Env, session_id: u32, game: &mut Game) -> Result<(), Error> {
    game.player1_hand = Vec::new(env);
    game.player2_hand = Vec::new(env);
    for _ in 0..2 {
        let card = draw_card(env, session_id, game)?;
        game.player1_hand.push_back(card);
        let card = draw_card(env, session_id, game)?;
        game.player2_hand.push_back(card);
    }
    game.player1_stuck = false;
    game.player2_stuck = false;
    game.current_turn = 0;
    Ok(())
}

fn finish(env: &Env, session_id: u32, game: &mut Game, player1_won: bool) -> Result<(), Error> {
    let winner = if player1_won {
        game.player1.clone()
    } else {
        game.player2.clone()
    };
    game.winner = Some(winner.clone());
    game.phase = Phase::Finished;

    escrow::settle(env, session_id, player1_won)?;
    TableClosed { session_id, winner }.publish(env);
    Ok(())
}

// ============================================================================
// Contract
// ============================================================================

#[contract]
pub struct TwentyOneContract;

#[contractimpl]
impl TwentyOneContract {
    pub fn __constructor(env: Env, admin: Address, game_hub: Address) {
        config::init(&env, &admin, &game_hub);
    }

    /// Start a table, lock both wagers and deal two cards to each player.
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

        let mut game = Game {
            player1: request.player1,
            player2: request.player2,
            player1_points,
            player2_points,
            phase: Phase::Active,
            current_turn: 0,
            player1_hand: Vec::new(&env),
            player2_hand: Vec::new(&env),
            player1_stuck: false,
            player2_stuck: false,
            redeals: 0,
            cards_drawn: 0,
            winner: None,
        };
        deal(&env, session_id, &mut game)?;

        storage::save_session(&env, session_id, &game);
        Ok(())
    }

    /// Draw one card. Returns the new hand total; over 21 ends the game.
    pub fn hit(env: Env, session_id: u32, player: Address) -> Result<u32, Error> {
        player.require_auth();

        let mut game: Game =
            storage::load_session(&env, session_id).ok_or(Error::GameNotFound)?;
        game.phase.ensure_active()?;

        let seat = game.seat_of(&player).ok_or(Error::NotPlayer)?;
        if game.is_stuck(seat) {
            return Err(Error::AlreadyActed);
        }
        if seat != game.current_turn {
            return Err(Error::NotYourTurn);
        }

        let rank = draw_card(&env, session_id, &mut game)?;
        if seat == 0 {
            game.player1_hand.push_back(rank);
        } else {
            game.player2_hand.push_back(rank);
        }
        let total = hand_total(game.hand(seat));

        CardDrawn {
            session_id,
            player,
            rank,
            total,
        }
        .publish(&env);

        if total > BUST_LIMIT {
            // The opponent wins without acting further.
            finish(&env, session_id, &mut game, seat == 1)?;
        }

        storage::save_session(&env, session_id, &game);
        Ok(total)
    }

    /// Stand on the current hand. Player 2 sticking settles the round.
    pub fn stick(env: Env, session_id: u32, player: Address) -> Result<(), Error> {
        player.require_auth();

        let mut game: Game =
            storage::load_session(&env, session_id).ok_or(Error::GameNotFound)?;
        game.phase.ensure_active()?;

        let seat = game.seat_of(&player).ok_or(Error::NotPlayer)?;
        if game.is_stuck(seat) {
            return Err(Error::AlreadyActed);
        }
        if seat != game.current_turn {
            return Err(Error::NotYourTurn);
        }

        if seat == 0 {
            game.player1_stuck = true;
            game.current_turn = 1;
        } else {
            game.player2_stuck = true;
            let total1 = hand_total(&game.player1_hand);
            let total2 = hand_total(&game.player2_hand);

            match round_outcome(total1, total2, game.redeals) {
                RoundOutcome::Player1 => finish(&env, session_id, &mut game, true)?,
                RoundOutcome::Player2 => finish(&env, session_id, &mut game, false)?,
                RoundOutcome::Redeal => {
                    game.redeals = game
                        .redeals
                        .checked_add(1)
                        .ok_or(Error::CounterOverflow)?;
                    deal(&env, session_id, &mut game)?;
                    HandsRedealt {
                        session_id,
                        redeals: game.redeals,
                    }
                    .publish(&env);
                }
            }
        }

        storage::save_session(&env, session_id, &game);
        Ok(())
    }

    pub fn get_game(env: Env, session_id: u32) -> Result<Game, Error> {
        storage::load_session(&env, session_id).ok_or(Error::GameNotFound)
    }

    /// Current best total of `player`'s hand.
    pub fn hand_value(env: Env, session_id: u32, player: Address) -> Result<u32, Error> {
        let game: Game = storage::load_session(&env, session_id).ok_or(Error::GameNotFound)?;
        let seat = game.seat_of(&player).ok_or(Error::NotPlayer)?;
        Ok(hand_total(game.hand(seat)))
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
