//! Identifiers and the top-level envelope that wraps every wire message.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::{Message, Method, ProtocolError};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Newtype over `u64` so a `RoomId` can never be passed where a player is
/// expected. `#[serde(transparent)]` keeps it a plain number on the wire,
/// which is also what lets it be a JSON map key in game snapshots.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a room.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ProtocolVersion
// ---------------------------------------------------------------------------

/// Protocol revision carried in every envelope. Only `V1` exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolVersion {
    #[default]
    V1,
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// One message on the wire, as the rest of the server sees it.
///
/// ```text
/// {"id": 7, "version": "V1", "method": "PLAY_CARD",
///  "payload": {"cardIndex": 2, "chosenColor": null}, "timestamp": 1700000000000}
/// ```
///
/// The `method` and `payload` keys are folded into one typed [`Message`],
/// so a method can never be paired with the wrong payload shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Sender-assigned message id. Each side keeps its own counter.
    pub id: u64,
    pub version: ProtocolVersion,
    /// Milliseconds since the Unix epoch when the message was created.
    pub timestamp: u64,
    pub message: Message,
}

impl Envelope {
    /// Wraps a message, stamping it with the current time.
    pub fn new(id: u64, message: Message) -> Self {
        Self {
            id,
            version: ProtocolVersion::V1,
            timestamp: now_millis(),
            message,
        }
    }

    pub fn method(&self) -> Method {
        self.message.method()
    }

    /// Flattens into the untyped wire shape.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if the payload can't be turned
    /// into JSON.
    pub fn to_wire(&self) -> Result<WireEnvelope, ProtocolError> {
        Ok(WireEnvelope {
            id: self.id,
            version: self.version,
            method: self.method().as_str().to_string(),
            payload: self.message.to_payload()?,
            timestamp: self.timestamp,
        })
    }

    /// Resolves the method string and decodes the payload for it.
    ///
    /// # Errors
    /// [`ProtocolError::UnsupportedMethod`] for an unknown method string,
    /// [`ProtocolError::InvalidPayload`] when the payload doesn't fit it.
    pub fn from_wire(wire: WireEnvelope) -> Result<Self, ProtocolError> {
        let method: Method = wire.method.parse()?;
        let message = Message::from_parts(method, wire.payload)?;
        Ok(Self {
            id: wire.id,
            version: wire.version,
            timestamp: wire.timestamp,
            message,
        })
    }
}

/// The envelope exactly as it appears in JSON, before the payload has
/// been matched to its method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEnvelope {
    #[serde(default)]
    pub id: u64,
    #[serde(default, alias = "protocolVersion")]
    pub version: ProtocolVersion,
    pub method: String,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default)]
    pub timestamp: u64,
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// =========================================================================
// Tests
// =========================================================================
