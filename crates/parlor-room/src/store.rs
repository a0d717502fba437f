//! Room records in the shared store.
//!
//! Every mutation here is read-modify-write: callers load a [`Room`], hand
//! it in by `&mut`, and the store persists the result. Run mutations of one
//! room under its [`RoomLocks`](crate::RoomLocks) guard.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use parlor_protocol::GameMode;
use parlor_store::{StateStore, StoreError, get_json, keys, set_json};

use crate::password::hash_password;
use crate::room::MIN_PLAYERS;
use crate::{Room, RoomError, RoomUpdate};

/// What's left after someone leaves or is kicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Departure {
    /// The room lives on. `new_host` is set when the host role moved.
    Remaining { new_host: Option<String> },
    /// The last member left; the room and everything hanging off it is gone.
    Deleted,
}

#[derive(Clone)]
pub struct RoomStore {
    store: Arc<dyn StateStore>,
}

impl RoomStore {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Creates and persists a room with `host_id` as its only member.
    ///
    /// An empty password means no password. `max_players` is clamped
    /// between 2 and what `mode` can seat.
    pub async fn create(
        &self,
        id: &str,
        host_id: &str,
        name: &str,
        password: Option<&str>,
        max_players: usize,
        mode: GameMode,
    ) -> Result<Room, RoomError> {
        let room = Room {
            id: id.to_owned(),
            name: name.to_owned(),
            host_id: host_id.to_owned(),
            players: vec![host_id.to_owned()],
            password_hash: password
                .filter(|p| !p.is_empty())
                .map(|p| hash_password(id, p)),
            mode,
            max_players: max_players.clamp(MIN_PLAYERS, mode.max_players()),
            created_at: Utc::now(),
            started: false,
            ready: BTreeMap::new(),
        };
        self.save(&room).await?;
        tracing::info!(room_id = %id, %host_id, max_players = room.max_players, "room created");
        Ok(room)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Room>, RoomError> {
        Ok(get_json(self.store.as_ref(), &keys::room(id)).await?)
    }

    /// Like [`get`](Self::get), but a missing room is an error.
    pub async fn require(&self, id: &str) -> Result<Room, RoomError> {
        self.get(id)
            .await?
            .ok_or_else(|| RoomError::NotFound(id.to_owned()))
    }

    pub async fn save(&self, room: &Room) -> Result<(), RoomError> {
        set_json(self.store.as_ref(), &keys::room(&room.id), room, None).await?;
        Ok(())
    }

    /// Adds `user_id` to the room.
    ///
    /// Already being a member is success with no write. Returns whether
    /// the user is a member afterwards, which is always `true` on `Ok`.
    pub async fn join(
        &self,
        room: &mut Room,
        user_id: &str,
        password: Option<&str>,
    ) -> Result<bool, RoomError> {
        if room.is_member(user_id) {
            return Ok(true);
        }
        if room.started {
            return Err(RoomError::GameInProgress(room.id.clone()));
        }
        if room.is_full() {
            return Err(RoomError::RoomFull(room.id.clone()));
        }
        if !room.accepts_password(password) {
            return Err(RoomError::WrongPassword(room.id.clone()));
        }
        room.players.push(user_id.to_owned());
        self.save(room).await?;
        tracing::info!(room_id = %room.id, %user_id, members = room.players.len(), "joined room");
        Ok(true)
    }

    /// Removes `user_id`, promoting a new host or deleting the room as
    /// needed.
    pub async fn leave(&self, room: &mut Room, user_id: &str) -> Result<Departure, RoomError> {
        let Some(pos) = room.players.iter().position(|p| p == user_id) else {
            return Err(RoomError::NotInRoom(user_id.to_owned(), room.id.clone()));
        };
        room.players.remove(pos);
        room.ready.remove(user_id);

        if room.players.is_empty() {
            self.delete(&room.id, room.mode).await?;
            tracing::info!(room_id = %room.id, "last member left, room deleted");
            return Ok(Departure::Deleted);
        }

        let mut new_host = None;
        if room.host_id == user_id {
            room.host_id = room.players[0].clone();
            new_host = Some(room.host_id.clone());
            tracing::info!(room_id = %room.id, host_id = %room.host_id, "host promoted");
        }
        self.save(room).await?;
        Ok(Departure::Remaining { new_host })
    }

    /// Host-only removal of another member.
    pub async fn kick(
        &self,
        room: &mut Room,
        by: &str,
        target: &str,
    ) -> Result<Departure, RoomError> {
        if !room.is_host(by) {
            return Err(RoomError::NotHost(by.to_owned()));
        }
        let departure = self.leave(room, target).await?;
        tracing::info!(room_id = %room.id, kicked = %target, "member kicked");
        Ok(departure)
    }

    /// Applies a partial update and saves it. Returns `false` (and skips
    /// the write) when nothing actually changed.
    pub async fn update(&self, room: &mut Room, update: RoomUpdate) -> Result<bool, RoomError> {
        if update.max_players.is_some() || update.mode.is_some() {
            let mode = update.mode.unwrap_or(room.mode);
            let max = update.max_players.unwrap_or(room.max_players);
            if max < MIN_PLAYERS || max < room.players.len() || max > mode.max_players() {
                return Err(RoomError::InvalidMaxPlayers {
                    requested: max,
                    members: room.players.len(),
                });
            }
        }

        let mut changed = false;
        if let Some(name) = update.name.filter(|n| *n != room.name) {
            room.name = name;
            changed = true;
        }
        if let Some(mode) = update.mode.filter(|m| *m != room.mode) {
            room.mode = mode;
            changed = true;
        }
        if let Some(password) = update.password {
            let hash = (!password.is_empty()).then(|| hash_password(&room.id, &password));
            if hash != room.password_hash {
                room.password_hash = hash;
                changed = true;
            }
        }
        if let Some(max) = update.max_players.filter(|m| *m != room.max_players) {
            room.max_players = max;
            changed = true;
        }

        if changed {
            self.save(room).await?;
        }
        Ok(changed)
    }

    /// Sets `user_id`'s ready flag. Returns whether it changed.
    pub async fn set_ready(
        &self,
        room: &mut Room,
        user_id: &str,
        ready: bool,
    ) -> Result<bool, RoomError> {
        if !room.is_member(user_id) {
            return Err(RoomError::NotInRoom(user_id.to_owned(), room.id.clone()));
        }
        let previous = room.ready.insert(user_id.to_owned(), ready);
        if previous == Some(ready) {
            return Ok(false);
        }
        self.save(room).await?;
        Ok(true)
    }

    /// Every room. Records that vanish or fail to parse mid-scan are skipped.
    pub async fn list(&self) -> Result<Vec<Room>, RoomError> {
        let keys = self.store.keys(keys::ROOM_PREFIX).await?;
        let mut rooms = Vec::with_capacity(keys.len());
        for key in keys {
            match get_json::<Room>(self.store.as_ref(), &key).await {
                Ok(Some(room)) => rooms.push(room),
                Ok(None) => {}
                Err(StoreError::Corrupt { key, source }) => {
                    tracing::warn!(%key, error = %source, "skipping corrupt room record");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(rooms)
    }

    /// Removes a room and everything keyed by its id.
    pub async fn delete(&self, room_id: &str, mode: GameMode) -> Result<(), RoomError> {
        self.store.del(&keys::room(room_id)).await?;
        self.store.del(&keys::room_sessions(room_id)).await?;
        self.store
            .del(&keys::game_state(mode.as_str(), room_id))
            .await?;
        self.store.del(&keys::chat(room_id)).await?;
        Ok(())
    }
}
