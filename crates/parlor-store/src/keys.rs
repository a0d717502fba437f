//! Canonical key layout. Every process must agree on these.

use std::time::Duration;

/// Prefix of room records; `keys(ROOM_PREFIX)` lists every room.
pub const ROOM_PREFIX: &str = "room:";

/// The single pub/sub channel carrying fanout envelopes.
pub const BROADCAST_CHANNEL: &str = "broadcast:room";

/// How long persisted game state outlives its last write.
pub const GAME_STATE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// `session:<id>` — one session record, with TTL.
pub fn session(session_id: &str) -> String {
    format!("session:{session_id}")
}

/// `room_sessions:<roomId>` — set of session ids currently in the room.
pub fn room_sessions(room_id: &str) -> String {
    format!("room_sessions:{room_id}")
}

/// `room:<roomId>` — one room record.
pub fn room(room_id: &str) -> String {
    format!("{ROOM_PREFIX}{room_id}")
}

/// `game:<mode>:state:<roomId>` — persisted engine state.
pub fn game_state(mode: &str, room_id: &str) -> String {
    format!("game:{mode}:state:{room_id}")
}

/// `chat:room:<roomId>` — capped chat history, newest first.
pub fn chat(room_id: &str) -> String {
    format!("chat:room:{room_id}")
}
