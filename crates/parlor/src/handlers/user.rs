//! `user.*` events.

use async_trait::async_trait;
use parlor_protocol::events;
use parlor_protocol::payloads::{Empty, Identify, SetStatus, UpdateUser};

use crate::ParlorError;
use crate::dispatcher::{Handler, Reply, RequestContext, Route, route};
use crate::services::{OwnSession, SessionView};

pub(crate) fn routes() -> Vec<Route> {
    vec![
        route(events::USER_IDENTIFY, IdentifyUser),
        route(events::USER_UPDATE, Update),
        route(events::USER_DISCONNECT, Disconnect),
        route(events::USER_STATUS, Status),
    ]
}

/// Names the connection, or resumes an earlier session on it. The reply
/// carries the session id and resume token to resume with next time.
pub(crate) struct IdentifyUser;

#[async_trait]
impl Handler for IdentifyUser {
    type Payload = Identify;

    async fn handle(&self, ctx: &mut RequestContext, p: Identify) -> Result<Reply, ParlorError> {
        let session = ctx
            .services
            .identify(&ctx.session_id, &ctx.socket, p)
            .await?;
        ctx.session_id = session.id.clone();
        Reply::data(&OwnSession::from(&session))
    }
}

pub(crate) struct Update;

#[async_trait]
impl Handler for Update {
    type Payload = UpdateUser;

    async fn handle(&self, ctx: &mut RequestContext, p: UpdateUser) -> Result<Reply, ParlorError> {
        let session = ctx.services.rename_user(&ctx.session_id, &p.name).await?;
        Reply::data(&SessionView::from(&session))
    }
}

pub(crate) struct Status;

#[async_trait]
impl Handler for Status {
    type Payload = SetStatus;

    async fn handle(&self, ctx: &mut RequestContext, p: SetStatus) -> Result<Reply, ParlorError> {
        let session = ctx.services.set_status(&ctx.session_id, p.status).await?;
        Reply::data(&SessionView::from(&session))
    }
}

/// Runs disconnect cleanup now; the connection closes after the reply.
pub(crate) struct Disconnect;

#[async_trait]
impl Handler for Disconnect {
    type Payload = Empty;

    async fn handle(&self, ctx: &mut RequestContext, _: Empty) -> Result<Reply, ParlorError> {
        ctx.services.disconnect(&ctx.session_id, &ctx.socket).await?;
        ctx.closing = true;
        Ok(Reply::empty())
    }
}
