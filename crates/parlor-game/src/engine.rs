//! The `GameEngine` trait — what every game mode implements.
//!
//! Room and session code never look inside a game. They start it, feed it
//! actions, ask whether it's over and ask it to publish itself; everything
//! else is the engine's business.

use async_trait::async_trait;
use parlor_protocol::{GameMode, Response, events};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::GameError;

/// Where an engine sends its output.
///
/// The engine never sees sockets, processes or the pub/sub channel. It
/// gets one of these and says "this player" or "this room"; the
/// implementation works out where that is. Delivery failures are the
/// outlet's to log and swallow.
#[async_trait]
pub trait GameOutlet: Send + Sync {
    async fn send_to_player(&self, session_id: &str, message: Response);

    async fn broadcast_to_room(&self, room_id: &str, message: Response);
}

/// Public facts about a game: safe to show anyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    pub mode: GameMode,
    pub players: Vec<String>,
    pub started: bool,
    pub over: bool,
    pub score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_player: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub over_reason: Option<String>,
    /// Mode-specific public counters (tokens, pile sizes, ...).
    #[serde(default)]
    pub table: serde_json::Value,
}

/// A turn-based game mode.
///
/// Each associated type defines the shape of the game's data:
/// - `State` — everything needed to resume the game; this is what gets
///   persisted after every action
/// - `Action` — what a player can do, decoded from `game.action` payloads
/// - `View` — what one player is allowed to see
///
/// Engines are plain state machines: every method except
/// [`publish_views`](Self::publish_views) is synchronous and does no I/O.
#[async_trait]
pub trait GameEngine: Send + Sync {
    type State: Serialize + DeserializeOwned + Send + Sync;
    type Action: DeserializeOwned + Send;
    type View: Serialize + Send;

    fn mode(&self) -> GameMode;

    /// Seated players in turn order.
    fn players(&self) -> &[String];

    /// Deals and arms the game. Fails if already started or the player
    /// count doesn't suit the mode.
    fn start_game(&mut self) -> Result<(), GameError>;

    /// Applies one action from `actor`. On error the state is unchanged.
    fn handle_event(&mut self, actor: &str, action: Self::Action) -> Result<(), GameError>;

    fn is_game_over(&self) -> bool;

    fn state(&self) -> &Self::State;

    /// What `viewer` may see, or `None` if they aren't seated.
    fn view_for(&self, viewer: &str) -> Option<Self::View>;

    fn info(&self) -> GameInfo;

    /// Sends every seated player their own view as `game.state`.
    async fn publish_views(&self, room_id: &str, outlet: &dyn GameOutlet) {
        for player in self.players() {
            let Some(view) = self.view_for(player) else {
                continue;
            };
            match serde_json::to_value(&view) {
                Ok(data) => {
                    let msg = Response::ok(events::GAME_STATE, data).in_room(room_id);
                    outlet.send_to_player(player, msg).await;
                }
                Err(e) => {
                    tracing::error!(%room_id, %player, error = %e, "player view failed to serialize");
                }
            }
        }
    }
}
