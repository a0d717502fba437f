//! Game lifecycle: start, act, sync, info, end.

use parlor_game::{GameInfo, LiveGame, SharedGame};
use parlor_protocol::{ErrorCode, ProtocolError, Response, events};
use parlor_room::{MIN_PLAYERS, Room, RoomError};
use serde_json::{Map, Value, json};

use super::{Services, target_room, to_data};
use crate::ParlorError;

impl Services {
    /// Deals a new game for the caller's room and pushes every player
    /// their view. Host only.
    pub(crate) async fn start_game(
        &self,
        session_id: &str,
        room_id: Option<&str>,
    ) -> Result<GameInfo, ParlorError> {
        let session = self.session(session_id).await?;
        let room_id = target_room(&session, room_id)?;

        let _guard = self.locks.lock(&room_id).await;
        let mut room = self.rooms.require(&room_id).await?;
        if !room.is_host(&session.id) {
            return Err(RoomError::NotHost(session.id).into());
        }
        if room.started {
            return Err(ParlorError::Rejected(ErrorCode::GameAlreadyStarted));
        }
        if room.players.len() < MIN_PLAYERS {
            return Err(ParlorError::Rejected(ErrorCode::NotEnoughPlayers));
        }

        let mut game = LiveGame::new(room.mode, room.players.clone());
        game.start_game()?;
        self.game_states.save(&room.id, &game).await?;
        room.set_started(true);
        self.rooms.save(&room).await?;

        let info = game.info();
        let shared = self.games.add_engine(&room.id, game);
        tracing::info!(%room_id, mode = %room.mode, players = room.players.len(), "game started");

        self.announce_room(&room).await;
        shared.lock().await.publish_views(&room.id, &self.broadcaster).await;
        Ok(info)
    }

    /// Applies one player action, persists the result and pushes fresh
    /// views. Finishes the game when the action ends it.
    pub(crate) async fn game_action(
        &self,
        session_id: &str,
        room_id: Option<&str>,
        action: Map<String, Value>,
    ) -> Result<GameInfo, ParlorError> {
        let session = self.session(session_id).await?;
        let room_id = target_room(&session, room_id)?;

        let _guard = self.locks.lock(&room_id).await;
        let mut room = self.rooms.require(&room_id).await?;
        let shared = self.running_game(&mut room).await?;

        let mut game = shared.lock().await;
        let action = game.decode_action(Value::Object(action))?;
        game.handle_event(&session.id, action)?;
        self.game_states.save(&room.id, &game).await?;
        game.publish_views(&room.id, &self.broadcaster).await;

        let info = game.info();
        tracing::debug!(%room_id, session_id = %session.id, score = info.score, "game action applied");
        if game.is_game_over() {
            drop(game);
            self.finish_game(&mut room, &info).await?;
        }
        Ok(info)
    }

    /// The caller's own view of the running game.
    pub(crate) async fn game_sync(
        &self,
        session_id: &str,
        room_id: Option<&str>,
    ) -> Result<Value, ParlorError> {
        let session = self.session(session_id).await?;
        let room_id = target_room(&session, room_id)?;

        let _guard = self.locks.lock(&room_id).await;
        let mut room = self.rooms.require(&room_id).await?;
        let shared = self.running_game(&mut room).await?;
        let game = shared.lock().await;
        game.view_for(&session.id)
            .map_err(ProtocolError::Encode)?
            .ok_or(ParlorError::Rejected(ErrorCode::NotInRoom))
    }

    /// Public facts about the room's game; a room without one reports
    /// `started: false`.
    pub(crate) async fn game_info(
        &self,
        session_id: &str,
        room_id: Option<&str>,
    ) -> Result<GameInfo, ParlorError> {
        let session = self.session(session_id).await?;
        let room_id = target_room(&session, room_id)?;
        let room = self.rooms.require(&room_id).await?;

        if room.started {
            if let Some(shared) = self
                .games
                .get_or_restore(&room.id, room.mode, &self.game_states)
                .await?
            {
                return Ok(shared.lock().await.info());
            }
        }
        Ok(GameInfo {
            mode: room.mode,
            players: room.players.clone(),
            started: false,
            over: false,
            score: 0,
            current_player: None,
            over_reason: None,
            table: Value::Null,
        })
    }

    /// Host-initiated end of a running game.
    pub(crate) async fn end_game(
        &self,
        session_id: &str,
        room_id: Option<&str>,
    ) -> Result<String, ParlorError> {
        let session = self.session(session_id).await?;
        let room_id = target_room(&session, room_id)?;

        let guard = self.locks.lock(&room_id).await;
        let mut room = self.rooms.require(&room_id).await?;
        if !room.is_host(&session.id) {
            return Err(RoomError::NotHost(session.id).into());
        }
        if !room.started {
            return Err(ParlorError::Rejected(ErrorCode::GameNotStarted));
        }
        self.abort_game(&mut room, "ended_by_host").await?;
        drop(guard);

        self.announce_room(&room).await;
        Ok(room_id)
    }

    /// The room's engine, restored from the store if this process hasn't
    /// seen it. A room flagged as started whose state has expired is
    /// reset.
    async fn running_game(&self, room: &mut Room) -> Result<SharedGame, ParlorError> {
        if !room.started {
            return Err(ParlorError::Rejected(ErrorCode::GameNotStarted));
        }
        match self
            .games
            .get_or_restore(&room.id, room.mode, &self.game_states)
            .await?
        {
            Some(game) => Ok(game),
            None => {
                tracing::warn!(room_id = %room.id, "room marked started but game state is gone; resetting");
                room.set_started(false);
                self.rooms.save(room).await?;
                Err(ParlorError::Rejected(ErrorCode::GameNotStarted))
            }
        }
    }

    /// Tears down a game that reached its end by the rules.
    async fn finish_game(&self, room: &mut Room, info: &GameInfo) -> Result<(), ParlorError> {
        self.teardown(room).await?;
        tracing::info!(room_id = %room.id, score = info.score, reason = ?info.over_reason, "game over");

        self.broadcaster
            .broadcast_to_room(
                &room.id,
                Response::ok(
                    events::GAME_OVER,
                    json!({
                        "score": info.score,
                        "reason": info.over_reason,
                        "info": to_data(info)?,
                    }),
                ),
            )
            .await;
        self.announce_room(room).await;
        Ok(())
    }

    /// Tears down a game that didn't finish: the host ended it or a
    /// player left. The caller announces the room afterwards.
    pub(crate) async fn abort_game(&self, room: &mut Room, reason: &str) -> Result<(), ParlorError> {
        self.teardown(room).await?;
        tracing::info!(room_id = %room.id, %reason, "game ended early");

        self.broadcaster
            .broadcast_to_room(
                &room.id,
                Response::ok(events::GAME_ENDED, json!({ "reason": reason })),
            )
            .await;
        Ok(())
    }

    async fn teardown(&self, room: &mut Room) -> Result<(), ParlorError> {
        self.games.remove_engine(&room.id);
        self.game_states.delete(&room.id, room.mode).await?;
        room.set_started(false);
        self.rooms.save(room).await?;
        Ok(())
    }
}
