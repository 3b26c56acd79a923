//! Hash commitments used to fix a hidden value before play starts.
//!
//! This is a plain preimage-resistant hash commitment: binding, and only as
//! hiding as the entropy of the secret. It is not a zero-knowledge proof.
//! Games depend on the [`Commitment`] trait so a proof-system backend can
//! replace [`Sha256Commitment`] without touching the state machines.

use soroban_sdk::{Bytes, BytesN, Env};

pub trait Commitment {
    /// Digest binding `value` under `secret`.
    fn commit(env: &Env, secret: &BytesN<32>, value: u8) -> BytesN<32>;

    /// Recompute the digest and compare every byte, without exiting early on
    /// the first mismatch.
    fn verify(env: &Env, secret: &BytesN<32>, value: u8, digest: &BytesN<32>) -> bool {
        let expected = Self::commit(env, secret, value).to_array();
        let actual = digest.to_array();
        let mut diff = 0u8;
        for (a, b) in expected.iter().zip(actual.iter()) {
            diff |= a ^ b;
        }
        diff == 0
    }
}

/// `sha256(secret || value)` with the value encoded as a single byte.
pub struct Sha256Commitment;

impl Commitment for Sha256Commitment {
    fn commit(env: &Env, secret: &BytesN<32>, value: u8) -> BytesN<32> {
        let mut preimage = Bytes::from_array(env, &secret.to_array());
        preimage.push_back(value);
        env.crypto().sha256(&preimage).into()
    }
}
