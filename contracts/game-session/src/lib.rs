#![no_std]

//! # Game Session
//!
//! Shared plumbing for the wagering game contracts: the hash commitment,
//! deterministic randomness, the temporary session store, the Game Hub
//! escrow bridge and the two-party funding handshake.
//!
//! Every game contract owns its own session type and error enum; the helpers
//! here return [`SessionError`], which each contract maps into its own codes.

pub mod commitment;
pub mod config;
pub mod error;
pub mod escrow;
pub mod handshake;
pub mod randomness;
pub mod storage;

pub use commitment::{Commitment, Sha256Commitment};
pub use error::SessionError;
pub use escrow::GameHubClient;
pub use handshake::{
    AccountSignature, InviteSummary, SessionInvite, StakeAuthorization, StartRequest,
};
pub use storage::{DataKey, Phase};
