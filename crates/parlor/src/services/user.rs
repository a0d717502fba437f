//! Identity and presence: identify (and resume), rename, status,
//! disconnect.

use chrono::{DateTime, Utc};
use parlor_protocol::payloads::Identify;
use parlor_protocol::{ErrorCode, Response, UserStatus, events};
use parlor_session::{Session, SocketHandle};
use serde::Serialize;

use super::{Services, clean_name, to_data};
use crate::ParlorError;

/// What a client may see of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    pub is_host: bool,
    pub status: UserStatus,
    pub connected_at: DateTime<Utc>,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id.clone(),
            name: session.name.clone(),
            room_id: session.room_id.clone(),
            is_host: session.is_host,
            status: session.status,
            connected_at: session.connected_at,
        }
    }
}

/// The `user.identify` reply: the public view plus the secret needed to
/// resume this session from a later connection. Only the owner sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnSession {
    #[serde(flatten)]
    pub view: SessionView,
    pub resume_token: String,
}

impl From<&Session> for OwnSession {
    fn from(session: &Session) -> Self {
        Self {
            view: SessionView::from(session),
            resume_token: session.resume_token.clone(),
        }
    }
}

impl Services {
    /// Names the caller, or moves the connection onto an earlier session.
    ///
    /// When `session_id` names a live session other than the caller's and
    /// `resume_token` matches it, `socket` is rebound to it and the
    /// caller's provisional session is discarded. The resumed session gets
    /// a new token. The returned session is the one the connection now
    /// speaks for.
    pub(crate) async fn identify(
        &self,
        current_id: &str,
        socket: &SocketHandle,
        req: Identify,
    ) -> Result<Session, ParlorError> {
        let name = req.name.as_deref().map(|n| clean_name("name", n)).transpose()?;
        let mut current = self.session(current_id).await?;

        if let Some(resume_id) = req.session_id.as_deref().filter(|id| *id != current_id) {
            let token = req.resume_token.as_deref().unwrap_or_default();
            match self.sessions.get(resume_id).await? {
                Some(resumed) if !resumed.resumable_with(token) => {
                    tracing::warn!(session_id = %resume_id, provisional = %current_id, "resume refused: bad token");
                }
                Some(mut resumed) => {
                    if current.room_id.is_some() {
                        return Err(ParlorError::Rejected(ErrorCode::AlreadyInRoom));
                    }
                    let sockets = self.sessions.sockets();
                    sockets.unbind(current_id, socket);
                    self.sessions.delete(current_id).await?;
                    sockets.bind(resume_id, socket.clone());

                    if let Some(name) = name {
                        resumed.name = name;
                    }
                    resumed.ip = current.ip;
                    resumed.user_agent = current.user_agent;
                    resumed.status = UserStatus::Online;
                    resumed.rotate_resume_token();
                    resumed.touch();
                    self.sessions.save(&resumed).await?;
                    tracing::info!(session_id = %resume_id, provisional = %current_id, "session resumed");
                    return Ok(resumed);
                }
                None => {
                    tracing::debug!(session_id = %resume_id, "resume target gone, keeping fresh session");
                }
            }
        }

        if let Some(name) = name {
            current.name = name;
        }
        current.touch();
        self.sessions.save(&current).await?;
        tracing::debug!(session_id = %current.id, name = %current.name, "session identified");
        Ok(current)
    }

    pub(crate) async fn rename_user(
        &self,
        session_id: &str,
        name: &str,
    ) -> Result<Session, ParlorError> {
        let mut session = self.session(session_id).await?;
        session.name = clean_name("name", name)?;
        self.sessions.save(&session).await?;
        self.announce_user(&session).await;
        Ok(session)
    }

    pub(crate) async fn set_status(
        &self,
        session_id: &str,
        status: UserStatus,
    ) -> Result<Session, ParlorError> {
        let mut session = self.session(session_id).await?;
        if session.status != status {
            session.status = status;
            self.sessions.save(&session).await?;
            self.announce_user(&session).await;
        }
        Ok(session)
    }

    /// Cleanup for a connection that's going away: leave the room, drop
    /// the socket binding, delete the session.
    ///
    /// Does nothing if `socket` no longer owns `session_id` (the session
    /// was resumed elsewhere), so running it twice is harmless.
    pub(crate) async fn disconnect(
        &self,
        session_id: &str,
        socket: &SocketHandle,
    ) -> Result<(), ParlorError> {
        if !self.sessions.sockets().unbind(session_id, socket) {
            return Ok(());
        }
        let Some(session) = self.sessions.get(session_id).await? else {
            return Ok(());
        };
        if let Some(room_id) = &session.room_id {
            self.depart(room_id, session_id, None).await?;
        }
        self.sessions.delete(session_id).await?;
        tracing::info!(%session_id, "session closed");
        Ok(())
    }

    /// Pushes `user.updated` to the session's room, if it has one.
    async fn announce_user(&self, session: &Session) {
        let Some(room_id) = &session.room_id else {
            return;
        };
        match to_data(&SessionView::from(session)) {
            Ok(data) => {
                self.broadcaster
                    .broadcast_to_room(room_id, Response::ok(events::USER_UPDATED, data))
                    .await;
            }
            Err(e) => tracing::error!(session_id = %session.id, error = %e, "failed to encode session view"),
        }
    }
}
