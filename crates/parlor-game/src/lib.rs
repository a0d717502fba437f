//! Games for Parlor.
//!
//! # Key types
//!
//! - [`GameEngine`] — the capability set every game mode implements
//! - [`GameOutlet`] — how an engine reaches players, without knowing how
//! - [`LiveGame`] — a running engine of any supported mode
//! - [`GameManager`] — per-process cache of live games
//! - [`GameStateStore`] — the authoritative, persisted game state
//! - [`hanabi`] — the Hanabi engine
//!
//! Engines are synchronous state machines. The caller persists the state
//! and publishes views after each successful action.

mod engine;
mod error;
pub mod hanabi;
mod live;
mod manager;
mod persist;

pub use engine::{GameEngine, GameInfo, GameOutlet};
pub use error::GameError;
pub use live::{GameAction, LiveGame};
pub use manager::{GameManager, SharedGame};
pub use persist::GameStateStore;
