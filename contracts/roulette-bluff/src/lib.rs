#![no_std]

//! # Roulette Bluff
//!
//! Two or three players take turns pulling the trigger of a six-chamber
//! revolver. The host fixes the bullet's chamber up front with a hash
//! commitment; the contract checks every shot against that commitment.
//!
//! ## Commitment
//! `sha256(salt || chamber)`, see [`game_session::commitment`]. At load time
//! the commitment must open to exactly one chamber in `0..6` under the
//! supplied salt, otherwise the load fails. The salt is kept in the session
//! so each shot can be checked on-chain: the chamber is fixed and tamper
//! evident, not hidden from anyone reading contract storage.
//!
//! ## Game Phases
//! 1. **Lobby** – 2-3 players `join`, each with their stake
//! 2. **Active** – the host (first player) `load_revolver`s, the Game Hub
//!    locks the first two stakes; alive players `fire` in turn order
//! 3. **Finished** – last player standing wins
//!
//! After an elimination with two or more survivors the cylinder is
//! reloaded: the new chamber is `sha256(session_id || shots_fired) mod 6`,
//! committed under the same salt, and the chamber pointer returns to 0.
//! `shots_fired` is never reset.

use game_session::{
    config, escrow,
    randomness::{self, NUM_CHAMBERS},
    storage, Commitment, Phase, SessionError, Sha256Commitment, StartRequest,
};
use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, log, Address, BytesN, Env,
    Vec,
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
    LobbyFull           = 20,
    AlreadyJoined       = 21,
    NotEnoughPlayers    = 22,
    NotHost             = 23,
    PlayerEliminated    = 24,
    InvalidChamber      = 25,
    MalformedCommitment = 26,
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
// Constants
// ============================================================================

pub const MIN_PLAYERS: u32 = 2;
pub const MAX_PLAYERS: u32 = 3;

// ============================================================================
// Data Types
// ============================================================================

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Shooter {
    pub address: Address,
    pub is_alive: bool,
    pub points: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Game {
    /// Join order is turn order; index 0 is the host.
    pub players: Vec<Shooter>,
    pub phase: Phase,
    pub current_turn: u32,
    /// Next chamber to fire, 0..6.
    pub current_chamber: u32,
    pub bullet_commitment: Option<BytesN<32>>,
    pub salt: Option<BytesN<32>>,
    pub shots_fired: u32,
    pub reloads: u32,
    pub eliminated: Vec<Address>,
    pub winner: Option<Address>,
}

impl Game {
    fn new(env: &Env) -> Self {
        Game {
            players: Vec::new(env),
            phase: Phase::Lobby,
            current_turn: 0,
            current_chamber: 0,
            bullet_commitment: None,
            salt: None,
            shots_fired: 0,
            reloads: 0,
            eliminated: Vec::new(env),
            winner: None,
        }
    }

    fn seat_of(&self, player: &Address) -> Option<(u32, Shooter)> {
        let mut seat = 0u32;
        for shooter in self.players.iter() {
            if shooter.address == *player {
                return Some((seat, shooter));
            }
            seat += 1;
        }
        None
    }

    fn count_alive(&self) -> u32 {
        self.players.iter().filter(|p| p.is_alive).count() as u32
    }

    fn last_alive(&self) -> Option<Address> {
        self.players
            .iter()
            .find(|p| p.is_alive)
            .map(|p| p.address)
    }

    /// Pass the turn to the next alive player after `current_turn`.
    fn advance_turn(&mut self) {
        let n = self.players.len();
        if n == 0 {
            return;
        }
        let mut next = (self.current_turn + 1) % n;
        for _ in 0..n {
            if let Some(p) = self.players.get(next) {
                if p.is_alive {
                    self.current_turn = next;
                    return;
                }
            }
            next = (next + 1) % n;
        }
    }
}

#[contractevent]
pub struct PlayerJoined {
    pub session_id: u32,
    pub player: Address,
    pub player_count: u32,
}

#[contractevent]
pub struct RevolverLoaded {
    pub session_id: u32,
    pub commitment: BytesN<32>,
}

#[contractevent]
pub struct ShotFired {
    pub session_id: u32,
    pub player: Address,
    pub chamber: u32,
    pub hit: bool,
}

#[contractevent]
pub struct CylinderReloaded {
    pub session_id: u32,
    pub commitment: BytesN<32>,
}

#[contractevent]
pub struct LastOneStanding {
    pub session_id: u32,
    pub winner: Address,
}

/// Chambers in `0..6` that `commitment` opens to under `salt`.
fn opening_chambers(env: &Env, salt: &BytesN<32>, commitment: &BytesN<32>) -> u32 {
    (0..NUM_CHAMBERS as u8)
        .filter(|chamber| Sha256Commitment::verify(env, salt, *chamber, commitment))
        .count() as u32
}

fn chamber_byte(chamber: u32) -> Result<u8, Error> {
    if chamber >= NUM_CHAMBERS {
        return Err(Error::InvalidChamber);
    }
    u8::try_from(chamber).map_err(|_| Error::InvalidChamber)
}

// ============================================================================
// Contract
// ============================================================================

#[contract]
pub struct RouletteBluffContract;

#[contractimpl]
impl RouletteBluffContract {
    pub fn __constructor(env: Env, admin: Address, game_hub: Address) {
        config::init(&env, &admin, &game_hub);
    }

    /// Join the lobby for `session_id` with a stake. The first player to
    /// join opens the lobby and becomes the host.
    ///
    /// Returns the number of players now in the lobby.
    pub fn join(env: Env, session_id: u32, player: Address, points: i128) -> Result<u32, Error> {
        player.require_auth();

        if points < 0 {
            return Err(Error::InvalidWager);
        }

        let mut game: Game =
            storage::load_session(&env, session_id).unwrap_or_else(|| Game::new(&env));

        match game.phase {
            Phase::Lobby => {}
            Phase::Active => return Err(Error::WrongPhase),
            Phase::Finished => return Err(Error::GameAlreadyEnded),
        }
        if game.players.len() >= MAX_PLAYERS {
            return Err(Error::LobbyFull);
        }
        if game.seat_of(&player).is_some() {
            return Err(Error::AlreadyJoined);
        }

        game.players.push_back(Shooter {
            address: player.clone(),
            is_alive: true,
            points,
        });
        let player_count = game.players.len();

        PlayerJoined {
            session_id,
            player,
            player_count,
        }
        .publish(&env);

        storage::save_session(&env, session_id, &game);
        Ok(player_count)
    }

    /// Host commits the bullet chamber and starts the game.
    ///
    /// `bullet_commitment` must be `sha256(salt || chamber)` for exactly one
    /// chamber in `0..6`. Registers the first two players with the Game Hub.
    pub fn load_revolver(
        env: Env,
        session_id: u32,
        host: Address,
        bullet_commitment: BytesN<32>,
        salt: BytesN<32>,
    ) -> Result<(), Error> {
        host.require_auth();

        let mut game: Game =
            storage::load_session(&env, session_id).ok_or(Error::GameNotFound)?;

        match game.phase {
            Phase::Lobby => {}
            Phase::Active => return Err(Error::WrongPhase),
            Phase::Finished => return Err(Error::GameAlreadyEnded),
        }

        let (seat, _) = game.seat_of(&host).ok_or(Error::NotPlayer)?;
        if seat != 0 {
            return Err(Error::NotHost);
        }
        if game.players.len() < MIN_PLAYERS {
            return Err(Error::NotEnoughPlayers);
        }
        if opening_chambers(&env, &salt, &bullet_commitment) != 1 {
            return Err(Error::MalformedCommitment);
        }

        // Game Hub sessions are two-player: the first two stakes are escrowed.
        let p1 = game.players.get(0).ok_or(Error::NotEnoughPlayers)?;
        let p2 = game.players.get(1).ok_or(Error::NotEnoughPlayers)?;
        escrow::lock_wagers(
            &env,
            &StartRequest {
                session_id,
                player1: p1.address,
                player2: p2.address,
                player1_points: p1.points,
                player2_points: p2.points,
            },
        )?;

        game.bullet_commitment = Some(bullet_commitment.clone());
        game.salt = Some(salt);
        game.phase = Phase::Active;
        game.current_turn = 0;
        game.current_chamber = 0;

        RevolverLoaded {
            session_id,
            commitment: bullet_commitment,
        }
        .publish(&env);

        storage::save_session(&env, session_id, &game);
        Ok(())
    }

    /// Pull the trigger on the current chamber.
    ///
    /// Returns `true` if the shooter was hit and eliminated. When one player
    /// is left the Game Hub is settled with `player1_won = (winner == host)`:
    /// the hub only escrows the first two seats, so a win by the third seat
    /// pays the second seat's side of the escrow.
    pub fn fire(env: Env, session_id: u32, player: Address) -> Result<bool, Error> {
        player.require_auth();

        let mut game: Game =
            storage::load_session(&env, session_id).ok_or(Error::GameNotFound)?;
        game.phase.ensure_active()?;

        let (seat, mut shooter) = game.seat_of(&player).ok_or(Error::NotPlayer)?;
        if !shooter.is_alive {
            return Err(Error::PlayerEliminated);
        }
        if seat != game.current_turn {
            return Err(Error::NotYourTurn);
        }

        let (commitment, salt) = match (&game.bullet_commitment, &game.salt) {
            (Some(c), Some(s)) => (c.clone(), s.clone()),
            _ => return Err(Error::WrongPhase),
        };

        let chamber = game.current_chamber;
        let is_hit = Sha256Commitment::verify(&env, &salt, chamber_byte(chamber)?, &commitment);
        game.shots_fired = game
            .shots_fired
            .checked_add(1)
            .ok_or(Error::CounterOverflow)?;

        ShotFired {
            session_id,
            player: player.clone(),
            chamber,
            hit: is_hit,
        }
        .publish(&env);

        if is_hit {
            shooter.is_alive = false;
            game.players.set(seat, shooter);
            game.eliminated.push_back(player);

            if game.count_alive() == 1 {
                let winner = game.last_alive().ok_or(Error::NotEnoughPlayers)?;
                let host = game.players.get(0).ok_or(Error::NotEnoughPlayers)?;
                game.phase = Phase::Finished;
                game.winner = Some(winner.clone());

                escrow::settle(&env, session_id, winner == host.address)?;
                LastOneStanding { session_id, winner }.publish(&env);
            } else {
                let seed = randomness::derive_seed(&env, session_id, game.shots_fired, &[]);
                let next_chamber = randomness::chamber_from_seed(&seed);
                let reloaded = Sha256Commitment::commit(&env, &salt, chamber_byte(next_chamber)?);
                log!(&env, "cylinder reloaded", session_id, game.shots_fired);

                game.bullet_commitment = Some(reloaded.clone());
                game.current_chamber = 0;
                game.reloads = game.reloads.checked_add(1).ok_or(Error::CounterOverflow)?;
                game.advance_turn();

                CylinderReloaded {
                    session_id,
                    commitment: reloaded,
                }
                .publish(&env);
            }
        } else {
            game.current_chamber += 1;
            game.advance_turn();
        }

        storage::save_session(&env, session_id, &game);
        Ok(is_hit)
    }

    // ============================================================ Queries

    pub fn get_game(env: Env, session_id: u32) -> Result<Game, Error> {
        storage::load_session(&env, session_id).ok_or(Error::GameNotFound)
    }

    pub fn who_is_alive(env: Env, session_id: u32) -> Result<Vec<Address>, Error> {
        let game: Game = storage::load_session(&env, session_id).ok_or(Error::GameNotFound)?;

        let mut alive = Vec::new(&env);
        for p in game.players.iter() {
            if p.is_alive {
                alive.push_back(p.address);
            }
        }
        Ok(alive)
    }

    /// `sha256(salt || position)`, for preparing a commitment off-chain.
    pub fn compute_bullet_hash(
        env: Env,
        salt: BytesN<32>,
        position: u32,
    ) -> Result<BytesN<32>, Error> {
        Ok(Sha256Commitment::commit(&env, &salt, chamber_byte(position)?))
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
