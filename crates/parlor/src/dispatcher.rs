//! Event routing: `type` string → handler.
//!
//! The table is data: five category modules under
//! [`handlers`](crate::handlers) each contribute a list of routes, merged
//! once at startup. Every handler has a typed payload, decoded before it
//! runs, and produces exactly one direct reply.
//!
//! ```text
//! Event ──▶ Dispatcher ──lookup──▶ ErasedHandler::call
//!                                    ├─ decode payload (INVALID_PAYLOAD on failure)
//!                                    └─ Handler::handle ──▶ Reply | ParlorError
//!                                                             └─▶ Response
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parlor_protocol::{Codec, Event, JsonCodec, Response};
use parlor_session::SocketHandle;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::handlers;
use crate::services::{Services, to_data};
use crate::ParlorError;

// ---------------------------------------------------------------------------
// RequestContext
// ---------------------------------------------------------------------------

/// One connection's view of the server, handed to every handler it
/// dispatches.
///
/// Owned by the connection task; handlers for one connection never run
/// concurrently.
pub struct RequestContext {
    pub(crate) services: Arc<Services>,
    /// The session this connection speaks for. `user.identify` may move
    /// it to a resumed session.
    pub(crate) session_id: String,
    pub(crate) socket: SocketHandle,
    /// Set by `user.disconnect`; the connection closes after replying.
    pub(crate) closing: bool,
}

impl RequestContext {
    pub(crate) fn new(services: Arc<Services>, session_id: String, socket: SocketHandle) -> Self {
        Self {
            services,
            session_id,
            socket,
            closing: false,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Writes a message straight to this connection's socket.
    pub(crate) fn reply(&self, response: &Response) {
        let text = match JsonCodec.encode(response) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(session_id = %self.session_id, error = %e, "failed to encode reply");
                return;
            }
        };
        if let Err(e) = self.socket.send(&self.session_id, text) {
            tracing::debug!(error = %e, "reply dropped");
        }
    }
}

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// A handler's successful result, before it becomes a [`Response`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Reply {
    /// Overrides the echoed request type (`system.ping` answers `pong`).
    event_type: Option<&'static str>,
    room_id: Option<String>,
    data: Value,
}

impl Reply {
    pub(crate) fn data<T: Serialize + ?Sized>(value: &T) -> Result<Self, ParlorError> {
        Ok(Self {
            event_type: None,
            room_id: None,
            data: to_data(value)?,
        })
    }

    pub(crate) fn empty() -> Self {
        Self {
            event_type: None,
            room_id: None,
            data: json!({}),
        }
    }

    pub(crate) fn typed(mut self, event_type: &'static str) -> Self {
        self.event_type = Some(event_type);
        self
    }

    pub(crate) fn in_room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    fn into_response(self, request_type: &str) -> Response {
        let response = Response::ok(self.event_type.unwrap_or(request_type), self.data);
        match self.room_id {
            Some(room_id) => response.in_room(room_id),
            None => response,
        }
    }
}

// ---------------------------------------------------------------------------
// Handler traits
// ---------------------------------------------------------------------------

/// One event type's behavior.
#[async_trait]
pub(crate) trait Handler: Send + Sync + 'static {
    /// The shape of the event's `data`.
    type Payload: DeserializeOwned + Send;

    async fn handle(
        &self,
        ctx: &mut RequestContext,
        payload: Self::Payload,
    ) -> Result<Reply, ParlorError>;
}

/// A [`Handler`] with its payload type erased, so different handlers fit
/// in one table.
#[async_trait]
pub(crate) trait ErasedHandler: Send + Sync {
    async fn call(&self, ctx: &mut RequestContext, event: &Event) -> Result<Reply, ParlorError>;
}

#[async_trait]
impl<H: Handler> ErasedHandler for H {
    async fn call(&self, ctx: &mut RequestContext, event: &Event) -> Result<Reply, ParlorError> {
        let payload = event.payload::<H::Payload>()?;
        self.handle(ctx, payload).await
    }
}

/// A table entry.
pub(crate) type Route = (&'static str, Arc<dyn ErasedHandler>);

pub(crate) fn route<H: Handler>(event_type: &'static str, handler: H) -> Route {
    (event_type, Arc::new(handler))
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub struct Dispatcher {
    routes: HashMap<&'static str, Arc<dyn ErasedHandler>>,
    fallback: Arc<dyn ErasedHandler>,
}

impl Dispatcher {
    /// The full table: room, user, game, chat and system events.
    pub fn new() -> Self {
        let tables = [
            handlers::room::routes(),
            handlers::user::routes(),
            handlers::game::routes(),
            handlers::chat::routes(),
            handlers::system::routes(),
        ];
        let mut routes = HashMap::new();
        for (event_type, handler) in tables.into_iter().flatten() {
            if routes.insert(event_type, handler).is_some() {
                tracing::warn!(%event_type, "duplicate route; last one wins");
            }
        }
        Self {
            routes,
            fallback: Arc::new(handlers::system::UnknownEvent),
        }
    }

    /// Whether an event type has a handler.
    pub fn handles(&self, event_type: &str) -> bool {
        self.routes.contains_key(event_type)
    }

    /// Every routed event type, sorted.
    pub fn event_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.routes.keys().copied().collect();
        types.sort_unstable();
        types
    }

    /// Runs the event's handler and builds the one direct reply.
    pub async fn dispatch(&self, ctx: &mut RequestContext, event: Event) -> Response {
        let handler = self
            .routes
            .get(event.event_type.as_str())
            .unwrap_or(&self.fallback);

        match handler.call(ctx, &event).await {
            Ok(reply) => reply.into_response(&event.event_type),
            Err(e) => {
                let code = e.code();
                if e.is_internal() {
                    tracing::error!(
                        session_id = %ctx.session_id,
                        event = %event.event_type,
                        error = %e,
                        "handler failed"
                    );
                } else {
                    tracing::debug!(
                        session_id = %ctx.session_id,
                        event = %event.event_type,
                        error = %e,
                        "request rejected"
                    );
                }
                let response = Response::error(&event.event_type, code);
                match event.room_id {
                    Some(room_id) => response.in_room(room_id),
                    None => response,
                }
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
