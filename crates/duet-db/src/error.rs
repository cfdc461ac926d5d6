/// Outcomes of pair creation and joining that callers show to the user.
#[derive(Debug, thiserror::Error)]
pub enum PairingError {
    #[error("Join code not found.")]
    NotFound,

    #[error("That pair is already full.")]
    AlreadyFull,

    #[error("You can't join a pair you created.")]
    OwnPair,

    /// Lost the conditional update to a concurrent joiner.
    #[error("Could not join pair. Try again.")]
    JoinRace,

    #[error("Could not create a pair after {0} attempts. Try again.")]
    CodeExhausted(usize),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
