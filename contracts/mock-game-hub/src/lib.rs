#![no_std]

//! Development stand-in for the Game Hub escrow.
//!
//! Exposes the interface the game contracts call (`start_game`, `end_game`)
//! and records each session so lifecycle mistakes surface during
//! development: a session id can be started once and ended once.
//! Points are recorded but not moved.

use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, Address, Env,
};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    SessionExists   = 1,
    SessionNotFound = 2,
    AlreadyEnded    = 3,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HubSession {
    pub game_id: Address,
    pub player1: Address,
    pub player2: Address,
    pub player1_points: i128,
    pub player2_points: i128,
    pub player1_won: Option<bool>,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Session(u32),
}

const SESSION_TTL_LEDGERS: u32 = 518_400;

#[contractevent]
pub struct GameStarted {
    pub session_id: u32,
    pub game_id: Address,
    pub player1: Address,
    pub player2: Address,
    pub player1_points: i128,
    pub player2_points: i128,
}

#[contractevent]
pub struct GameEnded {
    pub session_id: u32,
    pub player1_won: bool,
}

#[contract]
pub struct MockGameHub;

#[contractimpl]
impl MockGameHub {
    /// Start a game session
    ///
    /// # Arguments
    /// * `game_id` - Address of the game contract calling this method
    /// * `session_id` - Unique identifier for this game session
    /// * `player1` - Address of first player
    /// * `player2` - Address of second player
    /// * `player1_points` - Points locked for player 1
    /// * `player2_points` - Points locked for player 2
    pub fn start_game(
        env: Env,
        game_id: Address,
        session_id: u32,
        player1: Address,
        player2: Address,
        player1_points: i128,
        player2_points: i128,
    ) -> Result<(), Error> {
        // Trusts the calling game, not the players.
        game_id.require_auth();

        let key = DataKey::Session(session_id);
        if env.storage().temporary().has(&key) {
            return Err(Error::SessionExists);
        }

        let session = HubSession {
            game_id: game_id.clone(),
            player1: player1.clone(),
            player2: player2.clone(),
            player1_points,
            player2_points,
            player1_won: None,
        };
        env.storage().temporary().set(&key, &session);
        env.storage()
            .temporary()
            .extend_ttl(&key, SESSION_TTL_LEDGERS, SESSION_TTL_LEDGERS);

        GameStarted {
            session_id,
            game_id,
            player1,
            player2,
            player1_points,
            player2_points,
        }
        .publish(&env);
        env.storage().instance().extend_ttl(17_280, 518_400);
        Ok(())
    }

    /// End a game session and declare winner
    ///
    /// # Arguments
    /// * `session_id` - The game session being ended
    /// * `player1_won` - True if player1 won, false if player2 won
    pub fn end_game(env: Env, session_id: u32, player1_won: bool) -> Result<(), Error> {
        let key = DataKey::Session(session_id);
        let mut session: HubSession = env
            .storage()
            .temporary()
            .get(&key)
            .ok_or(Error::SessionNotFound)?;

        session.game_id.require_auth();
        if session.player1_won.is_some() {
            return Err(Error::AlreadyEnded);
        }

        session.player1_won = Some(player1_won);
        env.storage().temporary().set(&key, &session);

        GameEnded {
            session_id,
            player1_won,
        }
        .publish(&env);
        Ok(())
    }

    pub fn get_session(env: Env, session_id: u32) -> Result<HubSession, Error> {
        env.storage()
            .temporary()
            .get(&DataKey::Session(session_id))
            .ok_or(Error::SessionNotFound)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use soroban_sdk::testutils::Address as _;

    fn setup() -> (Env, MockGameHubClient<'static>) {
        let env = Env::default();
        env.mock_all_auths();
        let contract_id = env.register(MockGameHub, ());
        let client = MockGameHubClient::new(&env, &contract_id);
        (env, client)
    }

    #[test]
    fn test_start_and_end_game() {
        let (env, client) = setup();
        let game_id = Address::generate(&env);
        let player1 = Address::generate(&env);
        let player2 = Address::generate(&env);

        client.start_game(&game_id, &1, &player1, &player2, &1000, &1000);
        assert_eq!(client.get_session(&1).player1_won, None);

        client.end_game(&1, &true);
        let session = client.get_session(&1);
        assert_eq!(session.player1_won, Some(true));
        assert_eq!(session.game_id, game_id);
    }

    #[test]
    fn test_session_lifecycle_enforced() {
        let (env, client) = setup();
        let game_id = Address::generate(&env);
        let player1 = Address::generate(&env);
        let player2 = Address::generate(&env);

        assert_eq!(
            client.try_end_game(&5, &false),
            Err(Ok(Error::SessionNotFound))
        );

        client.start_game(&game_id, &5, &player1, &player2, &10, &20);
        assert_eq!(
            client.try_start_game(&game_id, &5, &player1, &player2, &10, &20),
            Err(Ok(Error::SessionExists))
        );

        client.end_game(&5, &false);
        assert_eq!(client.try_end_game(&5, &true), Err(Ok(Error::AlreadyEnded)));
        assert_eq!(client.get_session(&5).player1_won, Some(false));
    }
}
