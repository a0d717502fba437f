//! Wire protocol for Parlor.
//!
//! This crate defines the "language" that clients and servers speak:
//!
//! - **Types** ([`Event`], [`Response`]) — the JSON objects that travel on
//!   the socket in each direction.
//! - **Event names** ([`events`]) — the catalog of `type` strings.
//! - **Payloads** ([`payloads`]) — typed shapes of each event's `data` map,
//!   validated before a handler ever sees them.
//! - **Error codes** ([`ErrorCode`]) — the stable, machine-readable failure
//!   vocabulary surfaced to clients.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how messages become text.
//!
//! ```text
//! Transport (frames) → Protocol (Event / Response) → Dispatcher (handlers)
//! ```

mod codec;
mod codes;
mod error;
pub mod events;
mod mode;
pub mod payloads;
mod types;

pub use codec::Codec;
pub use codec::JsonCodec;
pub use codes::ErrorCode;
pub use error::ProtocolError;
pub use mode::{GameMode, UnsupportedMode};
pub use types::{Event, Response, UserStatus};
