//! Session identity for Parlor.
//!
//! A session is the server's record of one connected client: who they
//! are, which room they're in, and when they were last heard from. The
//! record lives in the shared store so every server process sees the same
//! sessions; only the live socket stays local to the process that accepted
//! the connection.
//!
//! # How it fits in the stack
//!
//! ```text
//! Room / Game services (above)  ← look up who's in a room, who's the host
//!     ↕
//! Session Layer (this crate)    ← session records + local socket registry
//!     ↕
//! Store (below)                 ← session:<id>, room_sessions:<roomId>
//! ```
//!
//! A session record expires on its own if nothing refreshes it, so a crash
//! never leaves a permanent ghost. Readers must treat "not found" as
//! "disconnected", not as a failure.

mod error;
mod session;
mod socket;
mod store;

pub use error::SessionError;
pub use session::{Session, generate_session_id};
pub use socket::{LocalSockets, SocketHandle};
pub use store::{DEFAULT_SESSION_TTL, SessionStore};
