//! Deterministic pseudo-randomness derived from chain-visible inputs.
//!
//! Seeds are `sha256(session_id || counter || tag)`. Anyone who can read the
//! session before acting can predict the next outcome; games accept this in
//! exchange for identical results between simulation and submission.

use core::ops::RangeInclusive;

use soroban_sdk::{Bytes, BytesN, Env};

/// Number of chambers in the roulette cylinder.
pub const NUM_CHAMBERS: u32 = 6;

pub fn derive_seed(env: &Env, session_id: u32, counter: u32, tag: &[u8]) -> BytesN<32> {
    let mut preimage = Bytes::from_array(env, &session_id.to_be_bytes());
    preimage.append(&Bytes::from_array(env, &counter.to_be_bytes()));
    preimage.append(&Bytes::from_slice(env, tag));
    env.crypto().sha256(&preimage).into()
}

/// Reseed the contract PRNG with `seed` and draw one value from `range`.
pub fn draw(env: &Env, seed: &BytesN<32>, range: RangeInclusive<u64>) -> u32 {
    env.prng().seed(seed.clone().into());
    env.prng().gen_range::<u64>(range) as u32
}

/// Two successive draws from the same seed, e.g. a pair of dice.
pub fn draw_pair(env: &Env, seed: &BytesN<32>, range: RangeInclusive<u64>) -> (u32, u32) {
    env.prng().seed(seed.clone().into());
    let first = env.prng().gen_range::<u64>(range.clone()) as u32;
    let second = env.prng().gen_range::<u64>(range) as u32;
    (first, second)
}

/// Chamber index taken from the first byte of a derived seed.
pub fn chamber_from_seed(seed: &BytesN<32>) -> u32 {
    (seed.to_array()[0] as u32) % NUM_CHAMBERS
}
