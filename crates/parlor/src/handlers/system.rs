//! `system.*` events and the unknown-event fallback.

use async_trait::async_trait;
use chrono::Utc;
use parlor_protocol::payloads::Empty;
use parlor_protocol::{ErrorCode, events};
use serde_json::json;

use crate::ParlorError;
use crate::dispatcher::{Handler, Reply, RequestContext, Route, route};

pub(crate) fn routes() -> Vec<Route> {
    vec![route(events::SYSTEM_PING, Ping)]
}

pub(crate) struct Ping;

#[async_trait]
impl Handler for Ping {
    type Payload = Empty;

    async fn handle(&self, _ctx: &mut RequestContext, _: Empty) -> Result<Reply, ParlorError> {
        Ok(Reply::data(&json!({ "timestamp": Utc::now() }))?.typed(events::PONG))
    }
}

/// Answers any event type nobody routes.
pub(crate) struct UnknownEvent;

#[async_trait]
impl Handler for UnknownEvent {
    type Payload = Empty;

    async fn handle(&self, _ctx: &mut RequestContext, _: Empty) -> Result<Reply, ParlorError> {
        Err(ParlorError::Rejected(ErrorCode::UnknownEvent))
    }
}
