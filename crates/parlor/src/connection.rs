//! Per-connection task: session setup, read loop, cleanup.
//!
//! Each accepted connection gets its own Tokio task running
//! [`handle_connection`]. The flow is:
//!   1. Create a provisional session and bind the socket to it
//!   2. Spawn the writer, which drains the socket's channel to the wire
//!   3. Loop: receive frames → refresh the session → dispatch → reply
//!   4. On close or error, run disconnect cleanup

use std::sync::Arc;
use std::time::Duration;

use parlor_protocol::{Codec, ErrorCode, Event, JsonCodec, Response, events};
use parlor_session::{SocketHandle, generate_session_id};
use parlor_transport::{Connection, WebSocketConnection};

use crate::dispatcher::RequestContext;
use crate::{Dispatcher, ParlorError, Services};

/// Name of a session that hasn't identified yet.
pub const GUEST_NAME: &str = "guest";

/// How long the writer gets to flush queued replies after the read loop
/// ends.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    services: Arc<Services>,
    dispatcher: Arc<Dispatcher>,
) -> Result<(), ParlorError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    let client = conn.client_info().clone();

    // --- Step 1: Provisional session ---
    let session_id = generate_session_id();
    let session = services.sessions.create(
        &session_id,
        GUEST_NAME,
        None,
        &client.addr.ip().to_string(),
        client.user_agent.clone(),
        false,
    );
    services.sessions.save(&session).await?;
    let (socket, mut outbound) = SocketHandle::channel();
    services.sessions.sockets().bind(&session_id, socket.clone());
    tracing::info!(%conn_id, %session_id, addr = %client.addr, "session opened");

    // --- Step 2: Writer ---
    let writer = {
        let conn = Arc::clone(&conn);
        tokio::spawn(async move {
            while let Some(text) = outbound.recv().await {
                if let Err(e) = conn.send(&text).await {
                    tracing::debug!(%conn_id, error = %e, "write failed, stopping writer");
                    break;
                }
            }
        })
    };

    // --- Step 3: Read loop ---
    let mut ctx = RequestContext::new(services, session_id, socket);
    let codec = JsonCodec;
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, session_id = %ctx.session_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, session_id = %ctx.session_id, error = %e, "recv error");
                break;
            }
        };

        refresh_session(&ctx, &client).await;

        let event: Event = match codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(session_id = %ctx.session_id, error = %e, "failed to decode event");
                ctx.reply(&Response::error(events::ERROR, ErrorCode::InvalidMessage));
                continue;
            }
        };
        tracing::debug!(session_id = %ctx.session_id, event = %event.event_type, "event received");

        let response = dispatcher.dispatch(&mut ctx, event).await;
        ctx.reply(&response);
        if ctx.closing {
            break;
        }
    }

    // --- Step 4: Cleanup ---
    if let Err(e) = ctx.services.disconnect(&ctx.session_id, &ctx.socket).await {
        tracing::error!(session_id = %ctx.session_id, error = %e, "disconnect cleanup failed");
    }
    drop(ctx);
    if tokio::time::timeout(FLUSH_TIMEOUT, writer).await.is_err() {
        tracing::debug!(%conn_id, "writer did not finish flushing");
    }
    if let Err(e) = conn.close().await {
        tracing::debug!(%conn_id, error = %e, "close failed");
    }
    Ok(())
}

/// Extends the session's TTL. A session that expired while the socket
/// stayed open is re-registered under the same id as a fresh guest.
async fn refresh_session(ctx: &RequestContext, client: &parlor_transport::ClientInfo) {
    let sessions = &ctx.services.sessions;
    match sessions.touch(&ctx.session_id).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!(session_id = %ctx.session_id, "session expired on an open socket, re-registering");
            let session = sessions.create(
                &ctx.session_id,
                GUEST_NAME,
                None,
                &client.addr.ip().to_string(),
                client.user_agent.clone(),
                false,
            );
            if let Err(e) = sessions.save(&session).await {
                tracing::error!(session_id = %ctx.session_id, error = %e, "failed to re-register session");
            }
            sessions.sockets().bind(&ctx.session_id, ctx.socket.clone());
        }
        Err(e) => {
            tracing::error!(session_id = %ctx.session_id, error = %e, "failed to refresh session");
        }
    }
}
