//! The service layer: what handlers call into.
//!
//! [`Services`] is built once at startup and shared by every connection
//! task. Each submodule adds the operations of one area as an `impl`
//! block. Services validate, mutate state under the room's lock, and
//! publish room-wide notifications through the [`Broadcaster`]; the direct
//! reply to the caller is the handler's job.

mod chat;
mod game;
mod room;
mod user;

pub use chat::ChatEntry;
pub use user::{OwnSession, SessionView};

use std::sync::Arc;

use parlor_game::{GameManager, GameStateStore};
use parlor_protocol::{ErrorCode, ProtocolError};
use parlor_room::{RoomLocks, RoomStore};
use parlor_session::{LocalSockets, Session, SessionStore};
use parlor_store::StateStore;
use rand::Rng;
use serde::Serialize;
use serde_json::Value;

use crate::{Broadcaster, ParlorError, ServerConfig};

pub struct Services {
    pub(crate) config: ServerConfig,
    pub(crate) store: Arc<dyn StateStore>,
    pub(crate) sessions: SessionStore,
    pub(crate) rooms: RoomStore,
    pub(crate) locks: RoomLocks,
    pub(crate) games: GameManager,
    pub(crate) game_states: GameStateStore,
    pub(crate) broadcaster: Broadcaster,
}

impl Services {
    pub fn new(store: Arc<dyn StateStore>, config: ServerConfig) -> Self {
        let sessions = SessionStore::new(
            Arc::clone(&store),
            Arc::new(LocalSockets::new()),
            config.session_ttl,
        );
        Self {
            rooms: RoomStore::new(Arc::clone(&store)),
            game_states: GameStateStore::new(Arc::clone(&store)),
            broadcaster: Broadcaster::new(Arc::clone(&store), sessions.clone()),
            locks: RoomLocks::new(),
            games: GameManager::new(),
            sessions,
            store,
            config,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn rooms(&self) -> &RoomStore {
        &self.rooms
    }

    pub fn games(&self) -> &GameManager {
        &self.games
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// The caller's session. A missing (expired) record means the caller
    /// has to identify again.
    pub(crate) async fn session(&self, session_id: &str) -> Result<Session, ParlorError> {
        self.sessions
            .get(session_id)
            .await?
            .ok_or(ParlorError::Rejected(ErrorCode::NotIdentified))
    }
}

/// The room a request acts on: the explicit id if given, else the
/// caller's room. Either way the caller must be in it.
pub(crate) fn target_room(session: &Session, explicit: Option<&str>) -> Result<String, ParlorError> {
    match (explicit, session.room_id.as_deref()) {
        (Some(wanted), Some(current)) if wanted == current => Ok(current.to_owned()),
        (None, Some(current)) => Ok(current.to_owned()),
        _ => Err(ParlorError::Rejected(ErrorCode::NotInRoom)),
    }
}

/// A random 16-character hex id for a new room.
pub(crate) fn new_room_id() -> String {
    let bytes: [u8; 8] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Serializes a reply or push body.
pub(crate) fn to_data<T: Serialize + ?Sized>(value: &T) -> Result<Value, ParlorError> {
    serde_json::to_value(value)
        .map_err(ProtocolError::Encode)
        .map_err(ParlorError::from)
}

/// Trims `raw` and checks it's a usable display name.
pub(crate) fn clean_name(field: &'static str, raw: &str) -> Result<String, ParlorError> {
    const MAX_NAME_CHARS: usize = 32;
    let name = raw.trim();
    if name.is_empty() {
        return Err(ProtocolError::invalid_field(field, "must not be empty").into());
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(ProtocolError::invalid_field(
            field,
            format!("must be at most {MAX_NAME_CHARS} characters"),
        )
        .into());
    }
    Ok(name.to_owned())
}


#[cfg(test)]
mod tests {
    use super::*;

    fn session(room: Option<&str>) -> Session {
        Session::new("s1", "ada", room.map(str::to_owned), "127.0.0.1", None, false)
    }

    #[test]
    fn test_target_room_defaults_to_current() {
        assert_eq!(target_room(&session(Some("r1")), None).unwrap(), "r1");
        assert_eq!(target_room(&session(Some("r1")), Some("r1")).unwrap(), "r1");
    }

    #[test]
    fn test_target_room_rejects_foreign_or_missing() {
        let err = target_room(&session(Some("r1")), Some("r2")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotInRoom);
        let err = target_room(&session(None), None).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotInRoom);
    }

    #[test]
    fn test_new_room_id_is_hex() {
        let id = new_room_id();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, new_room_id());
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("name", "  ada ").unwrap(), "ada");
        assert!(clean_name("name", "   ").is_err());
        assert!(clean_name("name", &"x".repeat(33)).is_err());
    }
}
