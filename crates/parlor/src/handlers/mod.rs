//! The five handler tables.
//!
//! Each module exposes `routes()` for the [`Dispatcher`](crate::Dispatcher)
//! and one unit struct per event. Handlers stay thin: unpack the payload,
//! call the service, shape the reply.

pub(crate) mod chat;
pub(crate) mod game;
pub(crate) mod room;
pub(crate) mod system;
pub(crate) mod user;
