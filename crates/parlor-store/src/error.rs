//! Error types for the store layer.

/// Errors that can occur talking to the shared store.
///
/// All of these are infrastructure failures: they fail the request that
/// hit them, get logged in full, and reach the client only as a generic
/// internal error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend refused or failed the command (connection lost, ...).
    #[error("store backend error: {0}")]
    Backend(#[from] redis::RedisError),

    /// A stored record didn't parse as the expected type.
    #[error("corrupt record at `{key}`: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value couldn't be serialized for storage.
    #[error("serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The key exists but holds a different kind of value (string vs set
    /// vs list).
    #[error("key `{0}` holds a different kind of value")]
    WrongType(String),
}
