//! Typed `data` shapes for each client event.
//!
//! Handlers receive one of these, never a raw map. Decoding happens in
//! [`Event::payload`](crate::Event::payload) before the handler runs, so a
//! malformed request is rejected with `INVALID_PAYLOAD` at the boundary.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::UserStatus;

/// For events that carry nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Empty {}

/// `user.identify`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identify {
    /// A session id from an earlier connection, to resume it.
    #[serde(default)]
    pub session_id: Option<String>,
    /// The resume token handed out with that session. Required to resume.
    #[serde(default)]
    pub resume_token: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// `user.update`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateUser {
    pub name: String,
}

/// `user.status`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetStatus {
    pub status: UserStatus,
}

/// `room.create`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoom {
    pub name: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub max_players: Option<usize>,
    /// Game mode tag, e.g. `"hanabi"`. Defaults to the server default.
    #[serde(default)]
    pub mode: Option<String>,
}

/// `room.join`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoom {
    pub room_id: String,
    #[serde(default)]
    pub password: Option<String>,
}

/// Events that act on "my room" but accept an explicit id:
/// `room.leave`, `game.start`, `game.end`, `game.sync`, `game.info`,
/// `game.action`. Everything except `roomId` is the mode's action,
/// decoded by the game itself (`{"action": "play_card", "cardIndex": 2}`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameActionRequest {
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(flatten)]
    pub action: Map<String, Value>,
}

/// `chat.send`'s room hint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRef {
    #[serde(default)]
    pub room_id: Option<String>,
}

/// `room.update` — any subset of the editable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoom {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    /// `Some("")` removes the password.
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub max_players: Option<usize>,
}

/// `room.kick`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KickPlayer {
    pub user_id: String,
}

/// `room.ready`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetReady {
    pub ready: bool,
}

/// `chat.send`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SendChat {
    pub message: String,
}

/// `chat.history`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistory {
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}
