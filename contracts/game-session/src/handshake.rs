//! Two-party funding handshake.
//!
//! Player 1 signs an authorization scoped to their own part of the
//! `start_game` call (session id and stake) before Player 2 is known, and
//! exports it as a [`SessionInvite`] blob. Player 2 imports the blob, checks
//! what it commits to, completes the call with their own address and stake
//! and submits it with both authorizations attached.
//!
//! Nothing extracted from an invite is trusted on-chain: [`authorize_start`]
//! re-checks self-play and wagers and asks the host to enforce each player's
//! authorization against the exact arguments of the call being executed.

use soroban_sdk::{
    contracttype,
    xdr::{FromXdr, ToXdr},
    vec, Address, Bytes, BytesN, Env, IntoVal, Symbol, Val, Vec,
};

use crate::SessionError;

/// Name of the contract function an invite authorizes.
pub const START_FN: &str = "start_game";

/// The scope Player 1 signs: one contract, one function, one set of arguments.
///
/// Together with [`SessionInvite::signature`] this carries every field of
/// the host's address credential, so Player 2's client can rebuild the
/// signed authorization entry verbatim.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakeAuthorization {
    pub contract: Address,
    pub function: Symbol,
    pub session_id: u32,
    pub player: Address,
    pub points: i128,
    /// Credential nonce; the host consumes it on first use.
    pub nonce: i64,
    /// Credential `signature_expiration_ledger`, enforced by the host.
    pub expiration_ledger: u32,
}

/// One `{public_key, signature}` entry of a Stellar account credential.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountSignature {
    pub public_key: BytesN<32>,
    pub signature: BytesN<64>,
}

/// Portable artifact handed from Player 1 to Player 2 out of band.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionInvite {
    pub authorization: StakeAuthorization,
    /// Credential signature value over the authorization entry.
    pub signature: Vec<AccountSignature>,
}

/// What Player 2 is shown before committing to anything.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InviteSummary {
    pub session_id: u32,
    pub player1: Address,
    pub player1_points: i128,
    pub expiration_ledger: u32,
}

/// Exact arguments of a `start_game` call.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StartRequest {
    pub session_id: u32,
    pub player1: Address,
    pub player2: Address,
    pub player1_points: i128,
    pub player2_points: i128,
}

impl SessionInvite {
    pub fn summary(&self) -> InviteSummary {
        InviteSummary {
            session_id: self.authorization.session_id,
            player1: self.authorization.player.clone(),
            player1_points: self.authorization.points,
            expiration_ledger: self.authorization.expiration_ledger,
        }
    }
}

impl StakeAuthorization {
    /// Arguments this authorization was signed over.
    pub fn scope(&self, env: &Env) -> Vec<Val> {
        vec![env, self.session_id.into_val(env), self.points.into_val(env)]
    }
}

/// Arguments Player 1's authorization must cover: their part of the call.
pub fn player1_scope(env: &Env, request: &StartRequest) -> Vec<Val> {
    vec![
        env,
        request.session_id.into_val(env),
        request.player1_points.into_val(env),
    ]
}

/// Arguments Player 2's authorization must cover: the whole call.
pub fn player2_scope(env: &Env, request: &StartRequest) -> Vec<Val> {
    vec![
        env,
        request.session_id.into_val(env),
        request.player1.into_val(env),
        request.player2.into_val(env),
        request.player1_points.into_val(env),
        request.player2_points.into_val(env),
    ]
}

pub fn export_invite(env: &Env, invite: &SessionInvite) -> Bytes {
    invite.clone().to_xdr(env)
}

/// Decode and validate an invite on behalf of `player2`.
///
/// Fails before anything is signed; a partially decoded invite is never
/// returned. Well-formed XDR of the wrong shape yields `MalformedInvite`,
/// but bytes that are not XDR at all abort the call inside the host decoder
/// and never reach this function's error path.
///
/// `expiration_ledger` must lie in the window the host accepts for a
/// signature expiration: not before the current ledger and not past
/// `max_live_until_ledger`.
pub fn import_invite(
    env: &Env,
    blob: &Bytes,
    player2: &Address,
) -> Result<SessionInvite, SessionError> {
    let invite =
        SessionInvite::from_xdr(env, blob).map_err(|_| SessionError::MalformedInvite)?;
    let auth = &invite.authorization;

    if invite.signature.is_empty() {
        return Err(SessionError::MalformedInvite);
    }
    if auth.contract != env.current_contract_address()
        || auth.function != Symbol::new(env, START_FN)
    {
        return Err(SessionError::InviteScopeMismatch);
    }
    if auth.expiration_ledger < env.ledger().sequence() {
        return Err(SessionError::InviteExpired);
    }
    if auth.expiration_ledger > env.ledger().max_live_until_ledger() {
        return Err(SessionError::MalformedInvite);
    }
    if auth.points < 0 {
        return Err(SessionError::InvalidWager);
    }
    if auth.player == *player2 {
        return Err(SessionError::SelfPlay);
    }

    Ok(invite)
}

/// Splice Player 2's identity and stake into the call Player 1 authorized.
pub fn complete_invite(
    invite: &SessionInvite,
    player2: &Address,
    player2_points: i128,
) -> Result<StartRequest, SessionError> {
    if invite.authorization.player == *player2 {
        return Err(SessionError::SelfPlay);
    }
    if player2_points < 0 {
        return Err(SessionError::InvalidWager);
    }
    Ok(StartRequest {
        session_id: invite.authorization.session_id,
        player1: invite.authorization.player.clone(),
        player2: player2.clone(),
        player1_points: invite.authorization.points,
        player2_points,
    })
}

/// Authoritative on-chain check for a session start.
///
/// Player 1 signed before Player 2 was known, so their authorization covers
/// `(session_id, player1_points)`. Player 2 signs knowing every argument and
/// is bound to the whole call. An authorization issued for other arguments
/// is not honoured.
pub fn authorize_start(env: &Env, request: &StartRequest) -> Result<(), SessionError> {
    if request.player1 == request.player2 {
        return Err(SessionError::SelfPlay);
    }
    if request.player1_points < 0 || request.player2_points < 0 {
        return Err(SessionError::InvalidWager);
    }

    request
        .player1
        .require_auth_for_args(player1_scope(env, request));
    request
        .player2
        .require_auth_for_args(player2_scope(env, request));
    Ok(())
}
