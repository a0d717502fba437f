//! Per-process cache of running games.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use parlor_protocol::GameMode;
use parlor_store::StoreError;
use tokio::sync::Mutex;

use crate::{GameError, GameStateStore, LiveGame};

/// A running game, shared between the handlers acting on its room.
pub type SharedGame = Arc<Mutex<LiveGame>>;

/// Room id → live engine, for games this process has touched.
///
/// This is a cache. The persisted state is authoritative: every
/// [`get_or_restore`](Self::get_or_restore) checks the cached engine
/// against it and reloads when another process has moved the game on, or
/// when this process has never seen the game.
#[derive(Default)]
pub struct GameManager {
    games: RwLock<HashMap<String, SharedGame>>,
}

impl GameManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `game` for `room_id`, replacing any previous one.
    pub fn add_engine(&self, room_id: &str, game: LiveGame) -> SharedGame {
        let shared = Arc::new(Mutex::new(game));
        self.games
            .write()
            .insert(room_id.to_owned(), Arc::clone(&shared));
        shared
    }

    pub fn get_engine(&self, room_id: &str) -> Option<SharedGame> {
        self.games.read().get(room_id).cloned()
    }

    pub fn remove_engine(&self, room_id: &str) -> Option<SharedGame> {
        self.games.write().remove(room_id)
    }

    /// The engine for `room_id`, in step with the persisted state.
    ///
    /// A cached engine whose snapshot differs from the stored one is
    /// rebuilt in place; a missing one is loaded and cached. `Ok(None)`
    /// if nothing is persisted, in which case any cached engine is
    /// dropped too.
    pub async fn get_or_restore(
        &self,
        room_id: &str,
        mode: GameMode,
        states: &GameStateStore,
    ) -> Result<Option<SharedGame>, GameError> {
        let Some(raw) = states.load_raw(room_id, mode).await? else {
            if self.remove_engine(room_id).is_some() {
                tracing::debug!(%room_id, "dropped cached game with no persisted state");
            }
            return Ok(None);
        };

        if let Some(shared) = self.get_engine(room_id) {
            let mut game = shared.lock().await;
            let current = game.snapshot().map_err(StoreError::Serialize)?;
            if current != raw {
                *game = states.decode(room_id, mode, &raw)?;
                tracing::debug!(%room_id, "cached game was behind the store, reloaded");
            }
            drop(game);
            return Ok(Some(shared));
        }

        let game = states.decode(room_id, mode, &raw)?;
        tracing::info!(%room_id, %mode, "restored game from store");

        // Another task may have restored it while we were loading.
        let mut games = self.games.write();
        let shared = games
            .entry(room_id.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(game)));
        Ok(Some(Arc::clone(shared)))
    }

    pub fn len(&self) -> usize {
        self.games.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.read().is_empty()
    }
}
