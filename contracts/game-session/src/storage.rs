//! Temporary session store keyed by session id.
//!
//! Sessions live in temporary storage: a game that is never finished simply
//! expires and reads back as not found.

use core::fmt::Debug;

use soroban_sdk::{contracttype, Env, IntoVal, TryFromVal, Val};

use crate::SessionError;

/// ~30 days at 5s per ledger.
pub const SESSION_TTL_LEDGERS: u32 = 518_400;

const INSTANCE_BUMP_THRESHOLD: u32 = 17_280;
const INSTANCE_TTL_LEDGERS: u32 = 518_400;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Game(u32),
    GameHubAddress,
    Admin,
}

/// Three-phase lifecycle shared by every game.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    Lobby,
    Active,
    Finished,
}

impl Phase {
    /// Gate for per-turn actions.
    pub fn ensure_active(self) -> Result<(), SessionError> {
        match self {
            Phase::Active => Ok(()),
            Phase::Lobby => Err(SessionError::WrongPhase),
            Phase::Finished => Err(SessionError::GameAlreadyEnded),
        }
    }
}

pub fn load_session<T>(env: &Env, session_id: u32) -> Option<T>
where
    T: TryFromVal<Env, Val>,
    T::Error: Debug,
{
    env.storage().temporary().get(&DataKey::Game(session_id))
}

pub fn save_session<T>(env: &Env, session_id: u32, game: &T)
where
    T: IntoVal<Env, Val>,
{
    let key = DataKey::Game(session_id);
    env.storage().temporary().set(&key, game);
    env.storage()
        .temporary()
        .extend_ttl(&key, SESSION_TTL_LEDGERS, SESSION_TTL_LEDGERS);
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_BUMP_THRESHOLD, INSTANCE_TTL_LEDGERS);
}

/// Reject a session id that already has a record, whatever its phase.
pub fn ensure_unused(env: &Env, session_id: u32) -> Result<(), SessionError> {
    if env.storage().temporary().has(&DataKey::Game(session_id)) {
        return Err(SessionError::SessionExists);
    }
    Ok(())
}
