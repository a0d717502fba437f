//! Unified error type for the Parlor server.

use parlor_game::GameError;
use parlor_protocol::{ErrorCode, ProtocolError, UnsupportedMode};
use parlor_room::RoomError;
use parlor_session::SessionError;
use parlor_store::StoreError;
use parlor_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// Handlers return this; the dispatcher turns it into a client-facing
/// [`ErrorCode`] with [`ParlorError::code`]. The `#[from]` attribute on
/// each variant lets `?` convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ParlorError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Mode(#[from] UnsupportedMode),

    /// A request refused for a reason with no richer error behind it.
    #[error("rejected: {}", .0.as_str())]
    Rejected(ErrorCode),

    /// Bad or missing configuration.
    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ParlorError {
    /// The code the client sees for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Protocol(e) => match e {
                ProtocolError::Decode(_) => ErrorCode::InvalidMessage,
                ProtocolError::InvalidPayload(_) | ProtocolError::InvalidField { .. } => {
                    ErrorCode::InvalidPayload
                }
                ProtocolError::Encode(_) => ErrorCode::InternalError,
            },
            Self::Room(e) => match e {
                RoomError::NotFound(_) => ErrorCode::RoomNotFound,
                RoomError::RoomFull(_) => ErrorCode::RoomFull,
                RoomError::WrongPassword(_) => ErrorCode::WrongPassword,
                RoomError::NotHost(_) => ErrorCode::NotHost,
                RoomError::NotInRoom(..) => ErrorCode::NotInRoom,
                RoomError::InvalidMaxPlayers { .. } => ErrorCode::InvalidMaxPlayers,
                RoomError::GameInProgress(_) => ErrorCode::GameAlreadyStarted,
                RoomError::Store(_) => ErrorCode::InternalError,
            },
            Self::Game(e) => match e {
                GameError::NotStarted => ErrorCode::GameNotStarted,
                GameError::AlreadyStarted => ErrorCode::GameAlreadyStarted,
                GameError::Over => ErrorCode::GameOver,
                GameError::PlayerCount { actual, max, .. } if actual > max => {
                    ErrorCode::InvalidMaxPlayers
                }
                GameError::PlayerCount { .. } => ErrorCode::NotEnoughPlayers,
                GameError::NotYourTurn { .. } => ErrorCode::NotYourTurn,
                GameError::NotAPlayer(_) => ErrorCode::NotInRoom,
                GameError::InvalidCardIndex(_) => ErrorCode::InvalidCardIndex,
                GameError::InvalidHintTarget(_) => ErrorCode::InvalidHintTarget,
                GameError::InvalidAction(_) => ErrorCode::InvalidPayload,
                GameError::Store(_) => ErrorCode::InternalError,
            },
            Self::Mode(_) => ErrorCode::UnsupportedGameMode,
            Self::Rejected(code) => *code,
            Self::Transport(_)
            | Self::Store(_)
            | Self::Session(_)
            | Self::Config(_)
            | Self::Io(_) => ErrorCode::InternalError,
        }
    }

    /// Whether this is our fault rather than the client's.
    pub fn is_internal(&self) -> bool {
        self.code() == ErrorCode::InternalError
    }
}
