//! Stable error codes surfaced to clients.
//!
//! Internal errors never travel to the client verbatim. Every failure is
//! reduced to one of these codes; the code carries its own numeric status
//! and human-readable message from the table below.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A stable, machine-readable failure reason.
///
/// Serialized as `SCREAMING_SNAKE_CASE` (`"ROOM_FULL"`), which is what
/// clients switch on. Adding variants is fine; renaming one breaks clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // -- Validation --
    InvalidMessage,
    InvalidPayload,
    UnknownEvent,
    NotIdentified,

    // -- Room / session state --
    RoomNotFound,
    RoomFull,
    WrongPassword,
    NotHost,
    AlreadyInRoom,
    NotInRoom,
    InvalidMaxPlayers,

    // -- Game --
    GameAlreadyStarted,
    GameNotStarted,
    GameOver,
    NotEnoughPlayers,
    NotYourTurn,
    InvalidCardIndex,
    InvalidHintTarget,
    UnsupportedGameMode,

    // -- Infrastructure --
    InternalError,
}

impl ErrorCode {
    /// The numeric, HTTP-style status that accompanies this code.
    pub fn status(self) -> u16 {
        match self {
            Self::InvalidMessage
            | Self::InvalidPayload
            | Self::InvalidMaxPlayers
            | Self::InvalidCardIndex
            | Self::InvalidHintTarget
            | Self::UnsupportedGameMode => 400,
            Self::NotIdentified => 401,
            Self::WrongPassword | Self::NotHost => 403,
            Self::UnknownEvent | Self::RoomNotFound => 404,
            Self::RoomFull
            | Self::AlreadyInRoom
            | Self::NotInRoom
            | Self::GameAlreadyStarted
            | Self::GameNotStarted
            | Self::GameOver
            | Self::NotEnoughPlayers
            | Self::NotYourTurn => 409,
            Self::InternalError => 500,
        }
    }

    /// The message shown to players for this code.
    pub fn message(self) -> &'static str {
        match self {
            Self::InvalidMessage => "The message could not be understood.",
            Self::InvalidPayload => "The request is missing fields or has invalid values.",
            Self::UnknownEvent => "This action is not supported.",
            Self::NotIdentified => "Identify yourself before doing that.",
            Self::RoomNotFound => "That room does not exist.",
            Self::RoomFull => "That room is full.",
            Self::WrongPassword => "The room password is incorrect.",
            Self::NotHost => "Only the host can do that.",
            Self::AlreadyInRoom => "You are already in a room.",
            Self::NotInRoom => "You are not in that room.",
            Self::InvalidMaxPlayers => "The player limit cannot go below the current member count.",
            Self::GameAlreadyStarted => "The game has already started.",
            Self::GameNotStarted => "The game has not started.",
            Self::GameOver => "The game is over.",
            Self::NotEnoughPlayers => "At least two players are needed to start.",
            Self::NotYourTurn => "It is not your turn.",
            Self::InvalidCardIndex => "There is no card at that position.",
            Self::InvalidHintTarget => "That player cannot receive this hint.",
            Self::UnsupportedGameMode => "That game mode is not supported.",
            Self::InternalError => "Something went wrong on the server.",
        }
    }

    /// The wire spelling, e.g. `"ROOM_FULL"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidMessage => "INVALID_MESSAGE",
            Self::InvalidPayload => "INVALID_PAYLOAD",
            Self::UnknownEvent => "UNKNOWN_EVENT",
            Self::NotIdentified => "NOT_IDENTIFIED",
            Self::RoomNotFound => "ROOM_NOT_FOUND",
            Self::RoomFull => "ROOM_FULL",
            Self::WrongPassword => "WRONG_PASSWORD",
            Self::NotHost => "NOT_HOST",
            Self::AlreadyInRoom => "ALREADY_IN_ROOM",
            Self::NotInRoom => "NOT_IN_ROOM",
            Self::InvalidMaxPlayers => "INVALID_MAX_PLAYERS",
            Self::GameAlreadyStarted => "GAME_ALREADY_STARTED",
            Self::GameNotStarted => "GAME_NOT_STARTED",
            Self::GameOver => "GAME_OVER",
            Self::NotEnoughPlayers => "NOT_ENOUGH_PLAYERS",
            Self::NotYourTurn => "NOT_YOUR_TURN",
            Self::InvalidCardIndex => "INVALID_CARD_INDEX",
            Self::InvalidHintTarget => "INVALID_HINT_TARGET",
            Self::UnsupportedGameMode => "UNSUPPORTED_GAME_MODE",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
