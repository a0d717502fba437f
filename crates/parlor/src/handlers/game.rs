//! `game.*` events.

use async_trait::async_trait;
use parlor_protocol::events;
use parlor_protocol::payloads::{GameActionRequest, RoomRef};
use serde_json::json;

use crate::ParlorError;
use crate::dispatcher::{Handler, Reply, RequestContext, Route, route};

pub(crate) fn routes() -> Vec<Route> {
    vec![
        route(events::GAME_START, Start),
        route(events::GAME_END, End),
        route(events::GAME_ACTION, Action),
        route(events::GAME_SYNC, SyncView),
        route(events::GAME_INFO, Info),
    ]
}

pub(crate) struct Start;

#[async_trait]
impl Handler for Start {
    type Payload = RoomRef;

    async fn handle(&self, ctx: &mut RequestContext, p: RoomRef) -> Result<Reply, ParlorError> {
        let info = ctx
            .services
            .start_game(&ctx.session_id, p.room_id.as_deref())
            .await?;
        Reply::data(&info)
    }
}

pub(crate) struct End;

#[async_trait]
impl Handler for End {
    type Payload = RoomRef;

    async fn handle(&self, ctx: &mut RequestContext, p: RoomRef) -> Result<Reply, ParlorError> {
        let room_id = ctx
            .services
            .end_game(&ctx.session_id, p.room_id.as_deref())
            .await?;
        Ok(Reply::data(&json!({ "roomId": room_id }))?.in_room(room_id))
    }
}

/// The acting player's reply carries public game facts; everyone's
/// private view arrives as `game.state`.
pub(crate) struct Action;

#[async_trait]
impl Handler for Action {
    type Payload = GameActionRequest;

    async fn handle(
        &self,
        ctx: &mut RequestContext,
        p: GameActionRequest,
    ) -> Result<Reply, ParlorError> {
        let info = ctx
            .services
            .game_action(&ctx.session_id, p.room_id.as_deref(), p.action)
            .await?;
        Reply::data(&info)
    }
}

pub(crate) struct SyncView;

#[async_trait]
impl Handler for SyncView {
    type Payload = RoomRef;

    async fn handle(&self, ctx: &mut RequestContext, p: RoomRef) -> Result<Reply, ParlorError> {
        let view = ctx
            .services
            .game_sync(&ctx.session_id, p.room_id.as_deref())
            .await?;
        Reply::data(&view)
    }
}

pub(crate) struct Info;

#[async_trait]
impl Handler for Info {
    type Payload = RoomRef;

    async fn handle(&self, ctx: &mut RequestContext, p: RoomRef) -> Result<Reply, ParlorError> {
        let info = ctx
            .services
            .game_info(&ctx.session_id, p.room_id.as_deref())
            .await?;
        Reply::data(&info)
    }
}
