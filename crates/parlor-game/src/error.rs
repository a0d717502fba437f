//! Error types for the game layer.

/// Errors that can occur starting, running or persisting a game.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("game has not started")]
    NotStarted,

    #[error("game has already started")]
    AlreadyStarted,

    #[error("game is over")]
    Over,

    /// Too few (or too many) players for this mode.
    #[error("{mode} needs {min}..={max} players, got {actual}")]
    PlayerCount {
        mode: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },

    /// The actor is a player, just not the current one.
    #[error("it is {expected}'s turn, not {actual}'s")]
    NotYourTurn { expected: String, actual: String },

    /// The actor isn't seated in this game at all.
    #[error("{0} is not a player in this game")]
    NotAPlayer(String),

    #[error("no card at index {0}")]
    InvalidCardIndex(usize),

    /// Hinting yourself, or someone who isn't playing.
    #[error("cannot hint {0}")]
    InvalidHintTarget(String),

    /// The action payload doesn't decode for this mode, or carries an
    /// out-of-range value.
    #[error("invalid action: {0}")]
    InvalidAction(String),

    #[error(transparent)]
    Store(#[from] parlor_store::StoreError),
}
