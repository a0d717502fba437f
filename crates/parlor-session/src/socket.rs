//! Live sockets held by this process.

use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::SessionError;

/// Write side of one connection.
///
/// Cloning is cheap; every clone feeds the same per-connection writer
/// task, which owns the actual socket. Sends never block.
#[derive(Debug, Clone)]
pub struct SocketHandle {
    tx: mpsc::UnboundedSender<String>,
}

impl SocketHandle {
    /// Creates a handle plus the receiver its writer task should drain.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queues a text frame for the client.
    ///
    /// # Errors
    /// [`SessionError::SocketClosed`] once the writer task has stopped.
    pub fn send(&self, session_id: &str, text: String) -> Result<(), SessionError> {
        self.tx
            .send(text)
            .map_err(|_| SessionError::SocketClosed(session_id.to_owned()))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Whether both handles feed the same connection.
    pub fn same_socket(&self, other: &SocketHandle) -> bool {
        self.tx.same_channel(&other.tx)
    }
}

/// Session id → socket, for connections accepted by this process.
///
/// This is the only per-process session state. A session id missing here
/// belongs to another process (or to nobody).
#[derive(Debug, Default)]
pub struct LocalSockets {
    sockets: DashMap<String, SocketHandle>,
}

impl LocalSockets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `session_id` to a socket, replacing any earlier binding.
    pub fn bind(&self, session_id: &str, socket: SocketHandle) {
        self.sockets.insert(session_id.to_owned(), socket);
    }

    /// Removes the binding only if it still points at `socket`.
    ///
    /// A resumed session may already be rebound to a newer connection; the
    /// old connection's cleanup must not unbind that one.
    pub fn unbind(&self, session_id: &str, socket: &SocketHandle) -> bool {
        self.sockets
            .remove_if(session_id, |_, bound| bound.same_socket(socket))
            .is_some()
    }

    pub fn get(&self, session_id: &str) -> Option<SocketHandle> {
        self.sockets.get(session_id).map(|s| s.clone())
    }

    pub fn len(&self) -> usize {
        self.sockets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sockets.is_empty()
    }
}
