//! Admin and Game Hub addresses held in instance storage.

use soroban_sdk::{Address, BytesN, Env};

use crate::{DataKey, SessionError};

pub fn init(env: &Env, admin: &Address, game_hub: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
    env.storage()
        .instance()
        .set(&DataKey::GameHubAddress, game_hub);
}

pub fn admin(env: &Env) -> Result<Address, SessionError> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(SessionError::NotInitialized)
}

pub fn hub(env: &Env) -> Result<Address, SessionError> {
    env.storage()
        .instance()
        .get(&DataKey::GameHubAddress)
        .ok_or(SessionError::NotInitialized)
}

pub fn set_admin(env: &Env, new_admin: &Address) -> Result<(), SessionError> {
    admin(env)?.require_auth();
    env.storage().instance().set(&DataKey::Admin, new_admin);
    Ok(())
}

pub fn set_hub(env: &Env, new_hub: &Address) -> Result<(), SessionError> {
    admin(env)?.require_auth();
    env.storage()
        .instance()
        .set(&DataKey::GameHubAddress, new_hub);
    Ok(())
}

pub fn upgrade(env: &Env, new_wasm_hash: BytesN<32>) -> Result<(), SessionError> {
    admin(env)?.require_auth();
    env.deployer().update_current_contract_wasm(new_wasm_hash);
    Ok(())
}
