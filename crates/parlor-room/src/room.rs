//! The room record and its public view.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use parlor_protocol::GameMode;
use serde::{Deserialize, Serialize};

use crate::password::verify_password;

/// Smallest allowed `max_players`.
pub const MIN_PLAYERS: usize = 2;

/// A named, capacity-bounded group of sessions.
///
/// Invariants kept by [`RoomStore`](crate::RoomStore):
/// - `players` has no duplicates and `players.len() <= max_players`
/// - `host_id` is in `players`
/// - `max_players >= 2`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    pub host_id: String,
    /// Member session ids in join order. The first one inherits the host
    /// role when the host leaves.
    pub players: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub mode: GameMode,
    pub max_players: usize,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started: bool,
    #[serde(default)]
    pub ready: BTreeMap<String, bool>,
}

impl Room {
    pub fn is_member(&self, session_id: &str) -> bool {
        self.players.iter().any(|p| p == session_id)
    }

    pub fn is_host(&self, session_id: &str) -> bool {
        self.host_id == session_id
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players
    }

    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Whether `password` opens this room. Rooms without a password accept
    /// anything.
    pub fn accepts_password(&self, password: Option<&str>) -> bool {
        match &self.password_hash {
            None => true,
            Some(hash) => verify_password(&self.id, password.unwrap_or_default(), hash),
        }
    }

    /// Flips the started flag. Ready flags reset either way.
    pub fn set_started(&mut self, started: bool) {
        self.started = started;
        self.ready.clear();
    }

    /// What clients get to see: everything but the password hash.
    pub fn view(&self) -> RoomView {
        RoomView {
            id: self.id.clone(),
            name: self.name.clone(),
            host_id: self.host_id.clone(),
            players: self.players.clone(),
            has_password: self.has_password(),
            mode: self.mode,
            max_players: self.max_players,
            created_at: self.created_at,
            started: self.started,
            ready: self.ready.clone(),
        }
    }
}

/// A room as sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub id: String,
    pub name: String,
    pub host_id: String,
    pub players: Vec<String>,
    pub has_password: bool,
    pub mode: GameMode,
    pub max_players: usize,
    pub created_at: DateTime<Utc>,
    pub started: bool,
    pub ready: BTreeMap<String, bool>,
}

/// The editable subset of a room. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomUpdate {
    pub name: Option<String>,
    pub mode: Option<GameMode>,
    /// `Some("")` removes the password.
    pub password: Option<String>,
    pub max_players: Option<usize>,
}
