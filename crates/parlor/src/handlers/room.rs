//! `room.*` events.

use async_trait::async_trait;
use parlor_protocol::events;
use parlor_protocol::payloads::{
    CreateRoom, Empty, JoinRoom, KickPlayer, RoomRef, SetReady, UpdateRoom,
};
use serde_json::json;

use crate::ParlorError;
use crate::dispatcher::{Handler, Reply, RequestContext, Route, route};

pub(crate) fn routes() -> Vec<Route> {
    vec![
        route(events::ROOM_CREATE, Create),
        route(events::ROOM_JOIN, Join),
        route(events::ROOM_LEAVE, Leave),
        route(events::ROOM_LIST, List),
        route(events::ROOM_UPDATE, Update),
        route(events::ROOM_KICK, Kick),
        route(events::ROOM_READY, Ready),
    ]
}

pub(crate) struct Create;

#[async_trait]
impl Handler for Create {
    type Payload = CreateRoom;

    async fn handle(&self, ctx: &mut RequestContext, p: CreateRoom) -> Result<Reply, ParlorError> {
        let room = ctx.services.create_room(&ctx.session_id, p).await?;
        Ok(Reply::data(&room)?.in_room(room.id))
    }
}

pub(crate) struct Join;

#[async_trait]
impl Handler for Join {
    type Payload = JoinRoom;

    async fn handle(&self, ctx: &mut RequestContext, p: JoinRoom) -> Result<Reply, ParlorError> {
        let room = ctx.services.join_room(&ctx.session_id, p).await?;
        Ok(Reply::data(&room)?.in_room(room.id))
    }
}

pub(crate) struct Leave;

#[async_trait]
impl Handler for Leave {
    type Payload = RoomRef;

    async fn handle(&self, ctx: &mut RequestContext, p: RoomRef) -> Result<Reply, ParlorError> {
        let room_id = ctx
            .services
            .leave_room(&ctx.session_id, p.room_id.as_deref())
            .await?;
        Ok(Reply::data(&json!({ "roomId": room_id }))?.in_room(room_id))
    }
}

/// Needs no identity: anyone connected may browse.
pub(crate) struct List;

#[async_trait]
impl Handler for List {
    type Payload = Empty;

    async fn handle(&self, ctx: &mut RequestContext, _: Empty) -> Result<Reply, ParlorError> {
        let rooms = ctx.services.list_rooms().await?;
        Reply::data(&json!({ "rooms": rooms }))
    }
}

pub(crate) struct Update;

#[async_trait]
impl Handler for Update {
    type Payload = UpdateRoom;

    async fn handle(&self, ctx: &mut RequestContext, p: UpdateRoom) -> Result<Reply, ParlorError> {
        let room = ctx.services.update_room(&ctx.session_id, p).await?;
        Ok(Reply::data(&room)?.in_room(room.id))
    }
}

pub(crate) struct Kick;

#[async_trait]
impl Handler for Kick {
    type Payload = KickPlayer;

    async fn handle(&self, ctx: &mut RequestContext, p: KickPlayer) -> Result<Reply, ParlorError> {
        let user_id = p.user_id.clone();
        let room_id = ctx.services.kick_player(&ctx.session_id, p).await?;
        Ok(Reply::data(&json!({ "userId": user_id }))?.in_room(room_id))
    }
}

pub(crate) struct Ready;

#[async_trait]
impl Handler for Ready {
    type Payload = SetReady;

    async fn handle(&self, ctx: &mut RequestContext, p: SetReady) -> Result<Reply, ParlorError> {
        let room = ctx.services.set_ready(&ctx.session_id, p).await?;
        Ok(Reply::data(&room)?.in_room(room.id))
    }
}
