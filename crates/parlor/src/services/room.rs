//! Room lifecycle: create, join, leave, kick, update, ready, list.

use parlor_protocol::payloads::{CreateRoom, JoinRoom, KickPlayer, SetReady, UpdateRoom};
use parlor_protocol::{ErrorCode, GameMode, Response, events};
use parlor_room::{Departure, Room, RoomError, RoomUpdate, RoomView};
use serde_json::json;

use super::{Services, clean_name, new_room_id, target_room, to_data};
use crate::ParlorError;

/// Seats in a room created without `maxPlayers`.
pub(crate) const DEFAULT_MAX_PLAYERS: usize = 5;

impl Services {
    pub(crate) async fn create_room(
        &self,
        session_id: &str,
        req: CreateRoom,
    ) -> Result<RoomView, ParlorError> {
        let mut session = self.session(session_id).await?;
        if session.room_id.is_some() {
            return Err(ParlorError::Rejected(ErrorCode::AlreadyInRoom));
        }
        let name = clean_name("name", &req.name)?;
        let mode = match req.mode.as_deref() {
            Some(mode) => mode.parse()?,
            None => GameMode::default(),
        };

        let room = self
            .rooms
            .create(
                &new_room_id(),
                &session.id,
                &name,
                req.password.as_deref(),
                req.max_players.unwrap_or(DEFAULT_MAX_PLAYERS),
                mode,
            )
            .await?;

        session.room_id = Some(room.id.clone());
        session.is_host = true;
        self.sessions.save(&session).await?;

        self.announce_room(&room).await;
        Ok(room.view())
    }

    pub(crate) async fn join_room(
        &self,
        session_id: &str,
        req: JoinRoom,
    ) -> Result<RoomView, ParlorError> {
        let mut session = self.session(session_id).await?;
        match session.room_id.as_deref() {
            Some(current) if current != req.room_id => {
                return Err(ParlorError::Rejected(ErrorCode::AlreadyInRoom));
            }
            _ => {}
        }

        let guard = self.locks.lock(&req.room_id).await;
        let mut room = self.rooms.require(&req.room_id).await?;
        if !room.started && !self.prune_expired(&mut room, &session.id).await? {
            drop(guard);
            self.locks.forget(&req.room_id);
            return Err(RoomError::NotFound(req.room_id).into());
        }
        self.rooms
            .join(&mut room, &session.id, req.password.as_deref())
            .await?;

        session.room_id = Some(room.id.clone());
        session.is_host = room.is_host(&session.id);
        self.sessions.save(&session).await?;
        drop(guard);

        self.announce_room(&room).await;
        Ok(room.view())
    }

    /// Takes the caller out of their room. Returns the room id.
    pub(crate) async fn leave_room(
        &self,
        session_id: &str,
        room_id: Option<&str>,
    ) -> Result<String, ParlorError> {
        let session = self.session(session_id).await?;
        let room_id = target_room(&session, room_id)?;
        self.depart(&room_id, &session.id, None).await?;
        Ok(room_id)
    }

    pub(crate) async fn kick_player(
        &self,
        session_id: &str,
        req: KickPlayer,
    ) -> Result<String, ParlorError> {
        let session = self.session(session_id).await?;
        let room_id = target_room(&session, None)?;
        self.depart(&room_id, &req.user_id, Some(&session.id)).await?;

        self.broadcaster
            .send_to_player(
                &req.user_id,
                Response::ok(events::ROOM_KICKED, json!({ "roomId": room_id, "by": session.id }))
                    .in_room(room_id.as_str()),
            )
            .await;
        Ok(room_id)
    }

    pub(crate) async fn update_room(
        &self,
        session_id: &str,
        req: UpdateRoom,
    ) -> Result<RoomView, ParlorError> {
        let session = self.session(session_id).await?;
        let room_id = target_room(&session, None)?;
        let update = RoomUpdate {
            name: req.name.as_deref().map(|n| clean_name("name", n)).transpose()?,
            mode: req.mode.as_deref().map(str::parse::<GameMode>).transpose()?,
            password: req.password,
            max_players: req.max_players,
        };

        let guard = self.locks.lock(&room_id).await;
        let mut room = self.rooms.require(&room_id).await?;
        if !room.is_host(&session.id) {
            return Err(RoomError::NotHost(session.id).into());
        }
        if room.started && update.mode.is_some_and(|m| m != room.mode) {
            return Err(ParlorError::Rejected(ErrorCode::GameAlreadyStarted));
        }
        let changed = self.rooms.update(&mut room, update).await?;
        drop(guard);

        if changed {
            self.announce_room(&room).await;
        }
        Ok(room.view())
    }

    pub(crate) async fn set_ready(
        &self,
        session_id: &str,
        req: SetReady,
    ) -> Result<RoomView, ParlorError> {
        let session = self.session(session_id).await?;
        let room_id = target_room(&session, None)?;

        let guard = self.locks.lock(&room_id).await;
        let mut room = self.rooms.require(&room_id).await?;
        let changed = self.rooms.set_ready(&mut room, &session.id, req.ready).await?;
        drop(guard);

        if changed {
            self.announce_room(&room).await;
        }
        Ok(room.view())
    }

    /// Every room, oldest first.
    pub(crate) async fn list_rooms(&self) -> Result<Vec<RoomView>, ParlorError> {
        let mut rooms = self.rooms.list().await?;
        rooms.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(rooms.iter().map(Room::view).collect())
    }

    /// Removes `member` from `room_id`, by their own choice (`by` is
    /// `None`) or kicked by the host. Handles host promotion, room
    /// deletion and ending a running game.
    pub(crate) async fn depart(
        &self,
        room_id: &str,
        member: &str,
        by: Option<&str>,
    ) -> Result<(), ParlorError> {
        let guard = self.locks.lock(room_id).await;
        let Some(mut room) = self.rooms.get(room_id).await? else {
            if by.is_some() {
                return Err(RoomError::NotFound(room_id.to_owned()).into());
            }
            // The room went away under us; just fix up the session.
            self.detach_session(member, room_id).await?;
            return Ok(());
        };
        let was_started = room.started;

        let departure = match by {
            Some(host) => self.rooms.kick(&mut room, host, member).await?,
            None => match self.rooms.leave(&mut room, member).await {
                Ok(departure) => departure,
                Err(RoomError::NotInRoom(..)) => {
                    tracing::warn!(%room_id, session_id = %member, "session pointed at a room it wasn't in");
                    self.detach_session(member, room_id).await?;
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            },
        };
        self.detach_session(member, room_id).await?;

        match departure {
            Departure::Deleted => {
                self.games.remove_engine(room_id);
                drop(guard);
                self.locks.forget(room_id);
            }
            Departure::Remaining { new_host } => {
                if let Some(host) = new_host {
                    self.mark_host(&host).await?;
                }
                if was_started {
                    self.abort_game(&mut room, "player_left").await?;
                }
                drop(guard);
                self.announce_room(&room).await;
            }
        }
        Ok(())
    }

    /// Drops members whose session record expired without a disconnect
    /// ever running for them. Returns `false` if that emptied the room,
    /// which is then deleted. Call with the room's lock held.
    async fn prune_expired(&self, room: &mut Room, caller: &str) -> Result<bool, ParlorError> {
        let mut expired = Vec::new();
        for member in room.players.iter().filter(|m| *m != caller) {
            if self.sessions.get(member).await?.is_none() {
                expired.push(member.clone());
            }
        }

        for member in expired {
            let departure = self.rooms.leave(room, &member).await?;
            self.sessions.remove_from_room_index(&room.id, &member).await?;
            tracing::info!(room_id = %room.id, session_id = %member, "expired member pruned");
            match departure {
                Departure::Deleted => {
                    self.games.remove_engine(&room.id);
                    return Ok(false);
                }
                Departure::Remaining { new_host: Some(host) } => self.mark_host(&host).await?,
                Departure::Remaining { new_host: None } => {}
            }
        }
        Ok(true)
    }

    /// Clears `session_id`'s room, if it still points at `room_id`.
    async fn detach_session(&self, session_id: &str, room_id: &str) -> Result<(), ParlorError> {
        if let Some(mut session) = self.sessions.get(session_id).await? {
            if session.room_id.as_deref() == Some(room_id) {
                session.room_id = None;
                session.is_host = false;
                self.sessions.save(&session).await?;
            }
        }
        self.sessions.remove_from_room_index(room_id, session_id).await?;
        Ok(())
    }

    async fn mark_host(&self, session_id: &str) -> Result<(), ParlorError> {
        if let Some(mut session) = self.sessions.get(session_id).await? {
            session.is_host = true;
            self.sessions.save(&session).await?;
        }
        Ok(())
    }

    /// Pushes `room.updated` with the room's public view to its members.
    pub(crate) async fn announce_room(&self, room: &Room) {
        match to_data(&room.view()) {
            Ok(data) => {
                self.broadcaster
                    .broadcast_to_room(&room.id, Response::ok(events::ROOM_UPDATED, data))
                    .await;
            }
            Err(e) => tracing::error!(room_id = %room.id, error = %e, "failed to encode room view"),
        }
    }
}
