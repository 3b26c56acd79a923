/// Failures raised by the shared session helpers.
///
/// Not a `contracterror` itself: each game contract converts these into its
/// own `Error` enum, keeping the shared codes (4-14) identical everywhere.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SessionError {
    WrongPhase,
    GameAlreadyEnded,
    SelfPlay,
    SessionExists,
    InvalidWager,
    MalformedInvite,
    InviteExpired,
    InviteScopeMismatch,
    NotInitialized,
}
