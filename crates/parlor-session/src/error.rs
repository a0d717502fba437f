//! Error types for the session layer.

/// Errors that can occur during session management.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The shared store failed. The session may or may not have been saved.
    #[error(transparent)]
    Store(#[from] parlor_store::StoreError),

    /// The connection's writer is gone; the client has disconnected.
    #[error("socket for session {0} is closed")]
    SocketClosed(String),
}
