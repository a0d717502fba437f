//! Core protocol types for Parlor's wire format.
//!
//! Every frame on the socket is a JSON object. Clients send an [`Event`];
//! the server answers each event with exactly one [`Response`] and pushes
//! further `Response`s (room updates, game views, chat) as things change.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ErrorCode, ProtocolError};

// ---------------------------------------------------------------------------
// Event — client → server
// ---------------------------------------------------------------------------

/// A single inbound message.
///
/// ```json
/// { "type": "room.join", "roomId": "r-1", "data": { "password": "pw" } }
/// ```
///
/// `roomId` and `name` are optional top-level hints. Handlers never read
/// them directly; [`Event::payload`] folds them into the typed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event name from the [`events`](crate::events) catalog.
    #[serde(rename = "type")]
    pub event_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Event-specific fields. Missing means empty.
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Event {
    /// Creates an event with no hints and an empty payload.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            room_id: None,
            name: None,
            data: Map::new(),
        }
    }

    /// Sets the `roomId` hint.
    pub fn with_room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    /// Replaces the payload with the fields of a JSON object.
    ///
    /// Non-object values leave the payload empty.
    pub fn with_data(mut self, data: Value) -> Self {
        if let Value::Object(map) = data {
            self.data = map;
        }
        self
    }

    /// Decodes `data` into the handler's payload type.
    ///
    /// The top-level `roomId` and `name` hints are copied into the payload
    /// when `data` doesn't already carry those keys, so a handler that
    /// needs a room id finds it in either place.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidPayload`] when the fields don't match.
    pub fn payload<P: DeserializeOwned>(&self) -> Result<P, ProtocolError> {
        let mut data = self.data.clone();
        if let Some(room_id) = &self.room_id {
            data.entry("roomId")
                .or_insert_with(|| Value::String(room_id.clone()));
        }
        if let Some(name) = &self.name {
            data.entry("name")
                .or_insert_with(|| Value::String(name.clone()));
        }
        serde_json::from_value(Value::Object(data))
            .map_err(ProtocolError::InvalidPayload)
    }
}

// ---------------------------------------------------------------------------
// Response — server → client
// ---------------------------------------------------------------------------

/// A server message: a direct result, an error, or a push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(rename = "type")]
    pub event_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,

    pub success: bool,

    /// Human-readable summary.
    #[serde(default)]
    pub message: String,

    /// HTTP-style status: 200 on success, [`ErrorCode::status`] otherwise.
    pub code: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,

    #[serde(default)]
    pub data: Value,
}

impl Response {
    /// A successful result or push.
    pub fn ok(event_type: impl Into<String>, data: Value) -> Self {
        Self {
            event_type: event_type.into(),
            room_id: None,
            success: true,
            message: "ok".to_owned(),
            code: 200,
            error_code: None,
            data,
        }
    }

    /// A failure, with status and message taken from the code table.
    pub fn error(event_type: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            event_type: event_type.into(),
            room_id: None,
            success: false,
            message: code.message().to_owned(),
            code: code.status(),
            error_code: Some(code),
            data: Value::Null,
        }
    }

    /// Tags the message with the room it concerns.
    pub fn in_room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    /// Overrides the human-readable message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

// ---------------------------------------------------------------------------
// UserStatus
// ---------------------------------------------------------------------------

/// Self-reported presence of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Online,
    Away,
    Busy,
}
