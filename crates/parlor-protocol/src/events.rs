//! The event catalog: every `type` string that appears on the wire.

// Client → server.
pub const USER_IDENTIFY: &str = "user.identify";
pub const USER_UPDATE: &str = "user.update";
pub const USER_DISCONNECT: &str = "user.disconnect";
pub const USER_STATUS: &str = "user.status";

pub const ROOM_CREATE: &str = "room.create";
pub const ROOM_JOIN: &str = "room.join";
pub const ROOM_LEAVE: &str = "room.leave";
pub const ROOM_LIST: &str = "room.list";
pub const ROOM_UPDATE: &str = "room.update";
pub const ROOM_KICK: &str = "room.kick";
pub const ROOM_READY: &str = "room.ready";

pub const GAME_START: &str = "game.start";
pub const GAME_END: &str = "game.end";
pub const GAME_ACTION: &str = "game.action";
pub const GAME_SYNC: &str = "game.sync";
pub const GAME_INFO: &str = "game.info";

pub const CHAT_SEND: &str = "chat.send";
pub const CHAT_HISTORY: &str = "chat.history";

pub const SYSTEM_PING: &str = "system.ping";

// Server → client.
pub const PONG: &str = "pong";
pub const ERROR: &str = "error";
pub const ROOM_UPDATED: &str = "room.updated";
pub const ROOM_KICKED: &str = "room.kicked";
pub const USER_UPDATED: &str = "user.updated";
pub const GAME_STATE: &str = "game.state";
pub const GAME_OVER: &str = "game.over";
pub const GAME_ENDED: &str = "game.ended";
pub const CHAT_MESSAGE: &str = "chat.message";
