//! # Parlor
//!
//! Multiplayer room and game server for web clients.
//!
//! Clients connect over WebSocket and exchange JSON events: identify,
//! create and join rooms, chat, and play a turn-based game. All shared
//! state (sessions, rooms, chat, game state) lives in a [`StateStore`],
//! so several server processes can front the same rooms; room-wide
//! notifications travel over the store's pub/sub channel and each process
//! delivers them to the sockets it holds.
//!
//! ```text
//! socket ─▶ connection task ─▶ Dispatcher ─▶ handler ─▶ Services
//!   ▲                                                     │
//!   └──────── Broadcaster listener ◀── pub/sub ◀──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parlor::prelude::*;
//!
//! # async fn run() -> Result<(), ParlorError> {
//! let server = ParlorServer::builder()
//!     .config(ServerConfig::from_env()?)
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```
//!
//! [`StateStore`]: parlor_store::StateStore

mod broadcast;
mod config;
mod connection;
mod dispatcher;
mod error;
mod handlers;
pub mod health;
mod server;
mod services;

pub use broadcast::Broadcaster;
pub use config::{DEFAULT_CHAT_HISTORY_LEN, ServerConfig, StoreUrl};
pub use connection::GUEST_NAME;
pub use dispatcher::{Dispatcher, RequestContext};
pub use error::ParlorError;
pub use server::{ParlorServer, ParlorServerBuilder};
pub use services::{ChatEntry, OwnSession, Services, SessionView};

pub mod prelude {
    pub use crate::{ParlorError, ParlorServer, ServerConfig, StoreUrl};
    pub use parlor_protocol::{ErrorCode, Event, GameMode, Response, events};
    pub use parlor_store::{MemoryStore, RedisStore, StateStore};
}
