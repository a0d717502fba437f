//! Session records in the shared store.

use std::sync::Arc;
use std::time::Duration;

use parlor_store::{StateStore, StoreError, get_json, keys, set_json};

use crate::{LocalSockets, Session, SessionError};

/// How long a session survives without any inbound message.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// CRUD over `session:<id>` plus the `room_sessions:<roomId>` index.
///
/// Reads attach this process's live socket, if it has one, so callers can
/// tell local sessions apart without a second lookup.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn StateStore>,
    sockets: Arc<LocalSockets>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(store: Arc<dyn StateStore>, sockets: Arc<LocalSockets>, ttl: Duration) -> Self {
        Self { store, sockets, ttl }
    }

    /// The sockets held by this process.
    pub fn sockets(&self) -> &Arc<LocalSockets> {
        &self.sockets
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Builds a session record. Nothing is stored until [`save`](Self::save).
    pub fn create(
        &self,
        id: &str,
        name: &str,
        room_id: Option<String>,
        ip: &str,
        user_agent: Option<String>,
        is_host: bool,
    ) -> Session {
        Session::new(id, name, room_id, ip, user_agent, is_host)
    }

    /// Writes the record with a fresh TTL and indexes it under its room.
    ///
    /// Moving a session between rooms also needs
    /// [`remove_from_room_index`](Self::remove_from_room_index) for the old
    /// room; that half is the caller's.
    pub async fn save(&self, session: &Session) -> Result<(), SessionError> {
        set_json(
            self.store.as_ref(),
            &keys::session(&session.id),
            session,
            Some(self.ttl),
        )
        .await?;
        if let Some(room_id) = &session.room_id {
            self.store
                .set_add(&keys::room_sessions(room_id), &session.id)
                .await?;
        }
        Ok(())
    }

    /// Reads a session. Missing or expired is `Ok(None)`.
    pub async fn get(&self, id: &str) -> Result<Option<Session>, SessionError> {
        let session: Option<Session> = get_json(self.store.as_ref(), &keys::session(id)).await?;
        Ok(session.map(|s| self.attach(s)))
    }

    /// Refreshes the TTL and last-activity time. Returns `false` if the
    /// record is already gone.
    pub async fn touch(&self, id: &str) -> Result<bool, SessionError> {
        let Some(mut session) = self.get(id).await? else {
            return Ok(false);
        };
        session.touch();
        self.save(&session).await?;
        Ok(true)
    }

    /// Removes the record and its room-index entry.
    pub async fn delete(&self, id: &str) -> Result<(), SessionError> {
        let room_id = match self.get(id).await {
            Ok(session) => session.and_then(|s| s.room_id),
            Err(SessionError::Store(StoreError::Corrupt { .. })) => None,
            Err(e) => return Err(e),
        };
        self.store.del(&keys::session(id)).await?;
        if let Some(room_id) = room_id {
            self.remove_from_room_index(&room_id, id).await?;
        }
        tracing::debug!(session_id = %id, "session deleted");
        Ok(())
    }

    pub async fn remove_from_room_index(
        &self,
        room_id: &str,
        session_id: &str,
    ) -> Result<(), SessionError> {
        self.store
            .set_remove(&keys::room_sessions(room_id), session_id)
            .await?;
        Ok(())
    }

    /// Every live session indexed under `room_id`.
    ///
    /// Index entries whose record has expired are skipped and pruned. A
    /// failed prune is only logged; the next listing tries again.
    pub async fn list_by_room(&self, room_id: &str) -> Result<Vec<Session>, SessionError> {
        let index = keys::room_sessions(room_id);
        let ids = self.store.set_members(&index).await?;

        let mut sessions = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get(&id).await {
                Ok(Some(session)) => sessions.push(session),
                Ok(None) => {
                    tracing::debug!(%room_id, session_id = %id, "pruning expired session from room index");
                    if let Err(e) = self.store.set_remove(&index, &id).await {
                        tracing::warn!(%room_id, session_id = %id, error = %e, "room index prune failed");
                    }
                }
                Err(SessionError::Store(StoreError::Corrupt { key, source })) => {
                    tracing::warn!(%key, error = %source, "skipping corrupt session record");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(sessions)
    }

    fn attach(&self, mut session: Session) -> Session {
        session.socket = self.sockets.get(&session.id);
        session
    }
}
