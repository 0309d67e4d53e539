//! Protocol Messages
//!
//! Wire format for room events pushed over WebSocket. Every broadcast
//! carries one envelope: an integer type tag plus an opaque byte message
//! (base64 on the wire, matching the existing clients).

use serde::{Deserialize, Serialize};

/// Marker substring that makes the receive loop echo a frame back to its
/// sender. Kept for legacy client test tooling, not a feature to extend.
pub const ECHO_MARKER: &str = "echo:";

/// Event type tags recognized by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum EventType {
    /// Free-form chat or system message.
    Message = 0,
    /// The room's game has been started.
    StartGame = 1,
    /// A card was played.
    Card = 2,
    /// A raise was called.
    Raise = 3,
    /// A response to a raise.
    Response = 4,
}

impl From<EventType> for u8 {
    fn from(kind: EventType) -> u8 {
        kind as u8
    }
}

impl TryFrom<u8> for EventType {
    type Error = String;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(EventType::Message),
            1 => Ok(EventType::StartGame),
            2 => Ok(EventType::Card),
            3 => Ok(EventType::Raise),
            4 => Ok(EventType::Response),
            other => Err(format!("unknown event type tag: {other}")),
        }
    }
}

/// The broadcast envelope written to every connection in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Type tag telling clients how to interpret `message`.
    #[serde(rename = "type")]
    pub kind: EventType,
    /// Opaque payload bytes; base64-encoded in JSON.
    #[serde(with = "base64_bytes")]
    pub message: Vec<u8>,
}

impl Event {
    /// Build an envelope from a tag and payload bytes.
    pub fn new(kind: EventType, message: Vec<u8>) -> Self {
        Self { kind, message }
    }
}

/// Payload for [`EventType::Card`] events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardEvent {
    /// Card code, e.g. `"AS"`.
    pub card: String,
}

/// Check whether raw frame bytes contain the echo marker.
pub fn contains_echo_marker(bytes: &[u8]) -> bool {
    bytes
        .windows(ECHO_MARKER.len())
        .any(|window| window == ECHO_MARKER.as_bytes())
}

/// Serde adapter encoding byte vectors as base64 strings.
pub mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as a base64 string.
    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    /// Deserialize a base64 string into bytes.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
