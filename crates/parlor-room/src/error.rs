//! Error types for the room layer.

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist (or was deleted since it was read).
    #[error("room {0} not found")]
    NotFound(String),

    /// The room is at `max_players`.
    #[error("room {0} is full")]
    RoomFull(String),

    /// The room has a password and the one given doesn't match.
    #[error("wrong password for room {0}")]
    WrongPassword(String),

    /// A host-only operation was attempted by someone else.
    #[error("session {0} is not the host")]
    NotHost(String),

    /// The session is not a member of the room.
    #[error("session {0} is not in room {1}")]
    NotInRoom(String, String),

    /// A player limit below 2, below the current member count, or above
    /// what the room's game mode can seat.
    #[error("max players {requested} is invalid with {members} members")]
    InvalidMaxPlayers { requested: usize, members: usize },

    /// Membership is frozen while a game is running.
    #[error("room {0} has a game in progress")]
    GameInProgress(String),

    #[error(transparent)]
    Store(#[from] parlor_store::StoreError),
}
