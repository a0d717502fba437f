//! Error types for the protocol layer.
//!
//! Each crate in Parlor defines its own error enum. A `ProtocolError` means
//! the problem is in the shape of a message, not in networking or in room
//! and game rules.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into text).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The frame is not a well-formed message envelope.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The envelope parsed, but its `data` does not match the shape the
    /// event requires (missing field, wrong type, ...).
    #[error("invalid payload: {0}")]
    InvalidPayload(serde_json::Error),

    /// A field parsed but holds a value outside what the event accepts.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },
}

impl ProtocolError {
    /// Shorthand for [`ProtocolError::InvalidField`].
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
