//! Room and player fan-out over the store's pub/sub channel.
//!
//! Every process publishes to the one `broadcast:room` channel and every
//! process listens to it. A listener delivers only to sockets it holds
//! itself; whatever it can't deliver, some other process (or nobody) will.
//!
//! ```text
//! service ──publish──▶ broadcast:room ──▶ listener (process A) ──▶ local sockets
//!                                    └──▶ listener (process B) ──▶ local sockets
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parlor_game::GameOutlet;
use parlor_protocol::{Codec, JsonCodec, Response};
use parlor_session::SessionStore;
use parlor_store::{StateStore, Subscription, keys};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::ParlorError;

const RESUBSCRIBE_MIN_DELAY: Duration = Duration::from_millis(100);
const RESUBSCRIBE_MAX_DELAY: Duration = Duration::from_secs(5);

/// What travels on the channel: a message and who it's for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    room_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    data: Response,
}

/// Publishes messages for rooms and players, and runs this process's
/// delivery listener.
///
/// Cheap to clone; clones share the store and the socket registry.
#[derive(Clone)]
pub struct Broadcaster {
    store: Arc<dyn StateStore>,
    sessions: SessionStore,
    codec: JsonCodec,
}

impl Broadcaster {
    pub fn new(store: Arc<dyn StateStore>, sessions: SessionStore) -> Self {
        Self {
            store,
            sessions,
            codec: JsonCodec,
        }
    }

    /// Sends `message` to every member of `room_id`, wherever they're
    /// connected.
    pub async fn broadcast_to_room(&self, room_id: &str, message: Response) {
        let message = if message.room_id.is_some() {
            message
        } else {
            message.in_room(room_id)
        };
        self.publish(Envelope {
            room_id: Some(room_id.to_owned()),
            session_id: None,
            data: message,
        })
        .await;
    }

    /// Sends `message` to one session, wherever it's connected.
    pub async fn send_to_player(&self, session_id: &str, message: Response) {
        self.publish(Envelope {
            room_id: None,
            session_id: Some(session_id.to_owned()),
            data: message,
        })
        .await;
    }

    async fn publish(&self, envelope: Envelope) {
        let raw = match self.codec.encode(&envelope) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode broadcast");
                return;
            }
        };
        if let Err(e) = self.store.publish(keys::BROADCAST_CHANNEL, &raw).await {
            tracing::error!(
                error = %e,
                event = %envelope.data.event_type,
                "failed to publish broadcast"
            );
        }
    }

    /// Subscribes to the channel and spawns this process's listener.
    ///
    /// The subscription is live when this returns, so nothing published
    /// afterwards is missed. If the store drops the subscription later,
    /// the listener resubscribes with backoff; messages published in the
    /// gap are lost. Call once per process.
    pub async fn listen(&self) -> Result<JoinHandle<()>, ParlorError> {
        let subscription = self.store.subscribe(keys::BROADCAST_CHANNEL).await?;
        let this = self.clone();
        Ok(tokio::spawn(async move {
            tracing::info!(channel = keys::BROADCAST_CHANNEL, "broadcast listener started");
            let mut subscription = subscription;
            loop {
                while let Some(raw) = subscription.recv().await {
                    this.deliver(&raw).await;
                }
                tracing::warn!(channel = keys::BROADCAST_CHANNEL, "broadcast subscription lost, resubscribing");
                subscription = this.resubscribe().await;
            }
        }))
    }

    /// Retries the subscription until the store accepts it.
    async fn resubscribe(&self) -> Subscription {
        let mut delay = RESUBSCRIBE_MIN_DELAY;
        loop {
            tokio::time::sleep(delay).await;
            match self.store.subscribe(keys::BROADCAST_CHANNEL).await {
                Ok(subscription) => {
                    tracing::info!(channel = keys::BROADCAST_CHANNEL, "broadcast listener resubscribed");
                    return subscription;
                }
                Err(e) => {
                    tracing::error!(error = %e, retry_in = ?delay, "broadcast resubscribe failed");
                    delay = (delay * 2).min(RESUBSCRIBE_MAX_DELAY);
                }
            }
        }
    }

    /// Writes one published message to the matching local sockets.
    async fn deliver(&self, raw: &str) {
        let envelope: Envelope = match self.codec.decode(raw.as_bytes()) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(error = %e, "dropping malformed broadcast");
                return;
            }
        };
        let text = match self.codec.encode(&envelope.data) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode broadcast payload");
                return;
            }
        };

        if let Some(session_id) = &envelope.session_id {
            if let Some(socket) = self.sessions.sockets().get(session_id) {
                if let Err(e) = socket.send(session_id, text.clone()) {
                    tracing::debug!(%session_id, error = %e, "direct delivery failed");
                }
            }
        }

        if let Some(room_id) = &envelope.room_id {
            let members = match self.sessions.list_by_room(room_id).await {
                Ok(members) => members,
                Err(e) => {
                    tracing::error!(%room_id, error = %e, "failed to resolve room members");
                    return;
                }
            };
            for session in members {
                let Some(socket) = &session.socket else {
                    continue;
                };
                // One dead socket doesn't stop the others.
                if let Err(e) = socket.send(&session.id, text.clone()) {
                    tracing::debug!(%room_id, session_id = %session.id, error = %e, "room delivery failed");
                }
            }
        }
    }
}

#[async_trait]
impl GameOutlet for Broadcaster {
    async fn send_to_player(&self, session_id: &str, message: Response) {
        Broadcaster::send_to_player(self, session_id, message).await;
    }

    async fn broadcast_to_room(&self, room_id: &str, message: Response) {
        Broadcaster::broadcast_to_room(self, room_id, message).await;
    }
}
