//! `chat.*` events.

use async_trait::async_trait;
use parlor_protocol::events;
use parlor_protocol::payloads::{ChatHistory, SendChat};
use serde_json::json;

use crate::ParlorError;
use crate::dispatcher::{Handler, Reply, RequestContext, Route, route};

pub(crate) fn routes() -> Vec<Route> {
    vec![
        route(events::CHAT_SEND, SendMessage),
        route(events::CHAT_HISTORY, History),
    ]
}

pub(crate) struct SendMessage;

#[async_trait]
impl Handler for SendMessage {
    type Payload = SendChat;

    async fn handle(&self, ctx: &mut RequestContext, p: SendChat) -> Result<Reply, ParlorError> {
        let entry = ctx.services.send_chat(&ctx.session_id, &p.message).await?;
        Reply::data(&entry)
    }
}

pub(crate) struct History;

#[async_trait]
impl Handler for History {
    type Payload = ChatHistory;

    async fn handle(&self, ctx: &mut RequestContext, p: ChatHistory) -> Result<Reply, ParlorError> {
        let (room_id, messages) = ctx.services.chat_history(&ctx.session_id, p).await?;
        Ok(Reply::data(&json!({ "messages": messages }))?.in_room(room_id))
    }
}
