//! Game state in the shared store, at `game:<mode>:state:<roomId>`.

use std::sync::Arc;

use parlor_protocol::GameMode;
use parlor_store::{StateStore, StoreError, keys};

use crate::{GameError, LiveGame};

#[derive(Clone)]
pub struct GameStateStore {
    store: Arc<dyn StateStore>,
}

impl GameStateStore {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self { store }
    }

    /// Writes the game's state with a fresh 24-hour TTL.
    pub async fn save(&self, room_id: &str, game: &LiveGame) -> Result<(), GameError> {
        let raw = game.snapshot().map_err(StoreError::Serialize)?;
        let key = keys::game_state(game.mode().as_str(), room_id);
        self.store.set(&key, &raw, Some(keys::GAME_STATE_TTL)).await?;
        Ok(())
    }

    pub async fn load(&self, room_id: &str, mode: GameMode) -> Result<Option<LiveGame>, GameError> {
        match self.load_raw(room_id, mode).await? {
            Some(raw) => Ok(Some(self.decode(room_id, mode, &raw)?)),
            None => Ok(None),
        }
    }

    /// The persisted snapshot as stored, without decoding it.
    pub async fn load_raw(&self, room_id: &str, mode: GameMode) -> Result<Option<String>, GameError> {
        let key = keys::game_state(mode.as_str(), room_id);
        Ok(self.store.get(&key).await?)
    }

    /// Rebuilds a game from a snapshot read with [`load_raw`](Self::load_raw).
    pub fn decode(&self, room_id: &str, mode: GameMode, raw: &str) -> Result<LiveGame, GameError> {
        LiveGame::restore(mode, raw).map_err(|source| {
            StoreError::Corrupt {
                key: keys::game_state(mode.as_str(), room_id),
                source,
            }
            .into()
        })
    }

    pub async fn delete(&self, room_id: &str, mode: GameMode) -> Result<(), GameError> {
        self.store
            .del(&keys::game_state(mode.as_str(), room_id))
            .await?;
        Ok(())
    }
}
