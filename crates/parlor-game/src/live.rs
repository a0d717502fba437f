//! `LiveGame` — one running engine of whichever mode the room plays.
//!
//! The room layer only ever holds a `LiveGame`. Adding a mode means adding
//! a variant here and an arm to each match; nothing above this file
//! changes.

use parlor_protocol::GameMode;
use serde_json::Value;

use crate::hanabi::{HanabiAction, HanabiEngine, HanabiState};
use crate::{GameEngine, GameError, GameInfo, GameOutlet};

/// A decoded `game.action` for a specific mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameAction {
    Hanabi(HanabiAction),
}

pub enum LiveGame {
    Hanabi(HanabiEngine),
}

impl LiveGame {
    /// A fresh, undealt game for `players`.
    pub fn new(mode: GameMode, players: Vec<String>) -> Self {
        match mode {
            GameMode::Hanabi => Self::Hanabi(HanabiEngine::new(players)),
        }
    }

    /// Rebuilds a game from its persisted state.
    pub fn restore(mode: GameMode, raw: &str) -> Result<Self, serde_json::Error> {
        match mode {
            GameMode::Hanabi => {
                let state: HanabiState = serde_json::from_str(raw)?;
                Ok(Self::Hanabi(HanabiEngine::restore(state)))
            }
        }
    }

    /// The persisted form of the game.
    pub fn snapshot(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::Hanabi(e) => serde_json::to_string(e.state()),
        }
    }

    pub fn mode(&self) -> GameMode {
        match self {
            Self::Hanabi(e) => e.mode(),
        }
    }

    pub fn players(&self) -> &[String] {
        match self {
            Self::Hanabi(e) => e.players(),
        }
    }

    pub fn start_game(&mut self) -> Result<(), GameError> {
        match self {
            Self::Hanabi(e) => e.start_game(),
        }
    }

    /// Decodes a `game.action` payload for this game's mode.
    pub fn decode_action(&self, data: Value) -> Result<GameAction, GameError> {
        match self {
            Self::Hanabi(_) => serde_json::from_value::<HanabiAction>(data)
                .map(GameAction::Hanabi)
                .map_err(|e| GameError::InvalidAction(e.to_string())),
        }
    }

    pub fn handle_event(&mut self, actor: &str, action: GameAction) -> Result<(), GameError> {
        match (self, action) {
            (Self::Hanabi(e), GameAction::Hanabi(a)) => e.handle_event(actor, a),
        }
    }

    pub fn is_game_over(&self) -> bool {
        match self {
            Self::Hanabi(e) => e.is_game_over(),
        }
    }

    /// `viewer`'s projection as JSON, or `None` if they aren't seated.
    pub fn view_for(&self, viewer: &str) -> Result<Option<Value>, serde_json::Error> {
        match self {
            Self::Hanabi(e) => e.view_for(viewer).map(serde_json::to_value).transpose(),
        }
    }

    pub fn info(&self) -> GameInfo {
        match self {
            Self::Hanabi(e) => e.info(),
        }
    }

    pub async fn publish_views(&self, room_id: &str, outlet: &dyn GameOutlet) {
        match self {
            Self::Hanabi(e) => e.publish_views(room_id, outlet).await,
        }
    }
}
