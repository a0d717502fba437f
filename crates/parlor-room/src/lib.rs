//! Rooms for Parlor.
//!
//! A room is a named, capacity-bounded group of sessions with a host, an
//! optional password and a game mode. Room records live in the shared
//! store, so any process can read or change any room.
//!
//! # Key types
//!
//! - [`Room`] — the persisted record; [`RoomView`] is what clients see
//! - [`RoomStore`] — create, join, leave, kick, update, list
//! - [`RoomLocks`] — per-room async mutexes for this process
//!
//! Nothing here talks to sockets. Callers broadcast the outcome.

mod error;
mod locks;
mod password;
mod room;
mod store;

pub use error::RoomError;
pub use locks::RoomLocks;
pub use password::{hash_password, verify_password};
pub use room::{MIN_PLAYERS, Room, RoomUpdate, RoomView};
pub use store::{Departure, RoomStore};
