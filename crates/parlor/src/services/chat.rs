//! Room chat, kept as a capped list per room.

use chrono::{DateTime, Utc};
use parlor_protocol::payloads::ChatHistory;
use parlor_protocol::{ProtocolError, Response, events};
use parlor_store::{StateStore, StoreError, keys};
use serde::{Deserialize, Serialize};

use super::{Services, target_room, to_data};
use crate::ParlorError;

const MAX_MESSAGE_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEntry {
    pub session_id: String,
    pub name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Services {
    pub(crate) async fn send_chat(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<ChatEntry, ParlorError> {
        let session = self.session(session_id).await?;
        let room_id = target_room(&session, None)?;

        let message = message.trim();
        if message.is_empty() {
            return Err(ProtocolError::invalid_field("message", "must not be empty").into());
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(ProtocolError::invalid_field(
                "message",
                format!("must be at most {MAX_MESSAGE_CHARS} characters"),
            )
            .into());
        }

        let entry = ChatEntry {
            session_id: session.id,
            name: session.name,
            message: message.to_owned(),
            timestamp: Utc::now(),
        };
        let raw = serde_json::to_string(&entry).map_err(StoreError::Serialize)?;
        self.store
            .list_push_capped(&keys::chat(&room_id), &raw, self.config.chat_history_len)
            .await?;

        self.broadcaster
            .broadcast_to_room(&room_id, Response::ok(events::CHAT_MESSAGE, to_data(&entry)?))
            .await;
        Ok(entry)
    }

    /// Up to `limit` recent messages of the caller's room, oldest first.
    pub(crate) async fn chat_history(
        &self,
        session_id: &str,
        req: ChatHistory,
    ) -> Result<(String, Vec<ChatEntry>), ParlorError> {
        let session = self.session(session_id).await?;
        let room_id = target_room(&session, req.room_id.as_deref())?;
        let cap = self.config.chat_history_len;
        let limit = req.limit.unwrap_or(cap).min(cap);

        let key = keys::chat(&room_id);
        let raw = self.store.list_range(&key, limit).await?;
        let mut entries: Vec<ChatEntry> = raw
            .iter()
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(%key, error = %e, "skipping corrupt chat entry");
                    None
                }
            })
            .collect();
        entries.reverse();
        Ok((room_id, entries))
    }
}
