//! The wire envelope exchanged over a websocket connection

use crate::core::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ========================// Payload //======================== //

/// The typed payload of an envelope, dispatched on the `type` field.
///
/// The payload body stays opaque JSON; new variants extend the protocol
/// without touching the envelope shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Payload {
    Chat(Value),
    Presence(Value),
    System(Value),
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Chat(_) => "chat",
            Payload::Presence(_) => "presence",
            Payload::System(_) => "system",
        }
    }
}

// ========================// Envelope //======================== //

/// A room message as it appears on the wire:
/// `{type, data, room_id, user_id, timestamp}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(flatten)]
    pub payload: Payload,
    pub room_id: String,
    pub user_id: i64,
    pub timestamp: DateTime<Utc>,
}

impl Envelope {
    /// Create a new envelope stamped with the current time
    pub fn new(payload: Payload, room_id: &str, user_id: i64) -> Self {
        Self {
            payload,
            room_id: room_id.to_owned(),
            user_id,
            timestamp: Utc::now(),
        }
    }

    pub fn encode(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(|_| Error::SerializeMessage)
    }

    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Enforce the per-connection invariants before a broadcast: an
    /// envelope claiming another room is dropped, and `user_id` is
    /// always the sender's authenticated identity.
    pub fn into_sanitized(self, room_id: &str, user_id: i64) -> Option<Self> {
        if self.room_id != room_id {
            return None;
        }
        Some(Self { user_id, ..self })
    }
}

// ========================// tests //======================== //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_chat_envelope() {
        let text = r#"{
            "type": "chat",
            "data": "hi",
            "room_id": "r1",
            "user_id": 7,
            "timestamp": "2024-05-01T12:00:00Z"
        }"#;

        let envelope = Envelope::decode(text).unwrap();
        assert_eq!(envelope.payload, Payload::Chat(json!("hi")));
        assert_eq!(envelope.room_id, "r1");
        assert_eq!(envelope.user_id, 7);
        assert_eq!(envelope.timestamp.to_rfc3339(), "2024-05-01T12:00:00+00:00");
    }

    #[test]
    fn encode_then_decode() {
        let envelope = Envelope::new(Payload::Presence(json!({"status": "join"})), "r2", 42);

        let text = envelope.encode().unwrap();
        let decoded = Envelope::decode(&text).unwrap();

        assert_eq!(decoded.payload, envelope.payload);
        assert_eq!(decoded.room_id, envelope.room_id);
        assert_eq!(decoded.user_id, envelope.user_id);
        assert_eq!(decoded.timestamp, envelope.timestamp);
    }

    #[test]
    fn decode_rejects_malformed_input() {
        assert!(Envelope::decode("not json").is_err());
        // unknown type tag
        assert!(Envelope::decode(
            r#"{"type":"task","data":1,"room_id":"r1","user_id":1,"timestamp":"2024-05-01T12:00:00Z"}"#
        )
        .is_err());
        // missing timestamp
        assert!(Envelope::decode(r#"{"type":"chat","data":"hi","room_id":"r1","user_id":1}"#).is_err());
        // missing data
        assert!(
            Envelope::decode(r#"{"type":"chat","room_id":"r1","user_id":1,"timestamp":"2024-05-01T12:00:00Z"}"#)
                .is_err()
        );
    }

    #[test]
    fn sanitize_drops_wrong_room() {
        let envelope = Envelope::new(Payload::Chat(json!("hi")), "r2", 1);
        assert!(envelope.into_sanitized("r1", 1).is_none());
    }

    #[test]
    fn sanitize_overwrites_claimed_identity() {
        // the sender claims to be user 99
        let envelope = Envelope::new(Payload::Chat(json!("hi")), "r1", 99);

        let sanitized = envelope.into_sanitized("r1", 7).unwrap();
        assert_eq!(sanitized.user_id, 7);
        assert_eq!(sanitized.room_id, "r1");
        assert_eq!(sanitized.payload, Payload::Chat(json!("hi")));
    }
}
