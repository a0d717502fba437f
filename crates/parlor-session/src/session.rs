//! The session record.

use chrono::{DateTime, Utc};
use parlor_protocol::UserStatus;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::SocketHandle;

/// One connected client, as every process sees it.
///
/// Everything except `socket` is persisted. `socket` is filled in by
/// [`SessionStore`](crate::SessionStore) on read, and only in the process
/// that holds the connection; everywhere else it's `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub name: String,

    /// The room this session is in, if any. When set, the room's member
    /// list contains this session's id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,

    #[serde(default)]
    pub is_host: bool,

    pub connected_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,

    /// Peer address as the transport saw it.
    pub ip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    #[serde(default)]
    pub status: UserStatus,

    /// Secret that lets a later connection take this session over. The
    /// id is public (room member lists carry it); this never leaves the
    /// owner's `user.identify` reply.
    #[serde(default)]
    pub resume_token: String,

    #[serde(skip)]
    pub socket: Option<SocketHandle>,
}

impl Session {
    /// Builds a session record. Nothing is stored until it's saved.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        room_id: Option<String>,
        ip: impl Into<String>,
        user_agent: Option<String>,
        is_host: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            room_id,
            is_host,
            connected_at: now,
            last_active: now,
            ip: ip.into(),
            user_agent,
            status: UserStatus::Online,
            resume_token: generate_session_id(),
            socket: None,
        }
    }

    /// Whether this process can write to the session's socket.
    pub fn is_local(&self) -> bool {
        self.socket.is_some()
    }

    /// Whether `token` is this session's resume token.
    pub fn resumable_with(&self, token: &str) -> bool {
        !self.resume_token.is_empty() && self.resume_token == token
    }

    /// Replaces the resume token, invalidating the old one.
    pub fn rotate_resume_token(&mut self) {
        self.resume_token = generate_session_id();
    }

    /// Records activity now.
    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }
}

/// Generates a random 32-character hex session id (128 bits).
pub fn generate_session_id() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_online_and_roomless() {
        let s = Session::new("s1", "ada", None, "127.0.0.1", None, false);
        assert_eq!(s.status, UserStatus::Online);
        assert!(s.room_id.is_none());
        assert!(!s.is_local());
        assert_eq!(s.connected_at, s.last_active);
    }

    #[test]
    fn test_generate_session_id_is_hex_and_unique() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_resume_token_is_secret_and_rotates() {
        let mut s = Session::new("s1", "ada", None, "127.0.0.1", None, false);
        let token = s.resume_token.clone();
        assert_ne!(token, s.id);
        assert!(s.resumable_with(&token));
        assert!(!s.resumable_with("s1"));
        assert!(!s.resumable_with(""));

        s.rotate_resume_token();
        assert!(!s.resumable_with(&token));
        assert!(s.resumable_with(&s.resume_token.clone()));
    }

    #[test]
    fn test_record_without_token_is_not_resumable() {
        let mut json = serde_json::to_value(Session::new("s1", "ada", None, "1.2.3.4", None, false)).unwrap();
        json.as_object_mut().unwrap().remove("resumeToken");
        let back: Session = serde_json::from_value(json).unwrap();
        assert!(!back.resumable_with(""));
    }

    #[test]
    fn test_serialized_session_omits_socket() {
        let (handle, _rx) = SocketHandle::channel();
        let mut s = Session::new("s1", "ada", Some("r1".into()), "10.0.0.1", Some("ua".into()), true);
        s.socket = Some(handle);

        let json = serde_json::to_value(&s).unwrap();
        assert!(json.get("socket").is_none());
        assert_eq!(json["roomId"], "r1");
        assert_eq!(json["isHost"], true);

        let back: Session = serde_json::from_value(json).unwrap();
        assert!(back.socket.is_none());
        assert_eq!(back.id, s.id);
        assert_eq!(back.room_id, s.room_id);
        assert_eq!(back.connected_at, s.connected_at);
        assert_eq!(back.user_agent, s.user_agent);
    }
}
