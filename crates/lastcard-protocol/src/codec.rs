//! Codec trait and the JSON implementation.
//!
//! A codec converts between Rust types and raw bytes. The generic
//! `encode`/`decode` pair works for any serde type; the envelope helpers
//! layer the two-step method/payload mapping on top, so callers get
//! [`ProtocolError::UnsupportedMethod`] and
//! [`ProtocolError::InvalidPayload`] instead of one opaque decode error.

use serde::{de::DeserializeOwned, Serialize};

use crate::{Envelope, ProtocolError, WireEnvelope};

/// A codec that can encode Rust types to bytes and decode bytes back.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Encodes a full envelope, method and payload included.
    fn encode_envelope(&self, envelope: &Envelope) -> Result<Vec<u8>, ProtocolError> {
        self.encode(&envelope.to_wire()?)
    }

    /// Decodes one envelope, resolving its method and payload.
    fn decode_envelope(&self, data: &[u8]) -> Result<Envelope, ProtocolError> {
        let wire: WireEnvelope = self.decode(data)?;
        Envelope::from_wire(wire)
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`). One envelope per line;
/// `serde_json` never emits raw newlines, so an encoded envelope is
/// always safe to frame as a single line.
///
/// ```rust
/// use lastcard_protocol::{Codec, Envelope, JsonCodec, Message};
///
/// let codec = JsonCodec;
/// let envelope = Envelope::new(1, Message::Ping);
///
/// let bytes = codec.encode_envelope(&envelope).unwrap();
/// let decoded = codec.decode_envelope(&bytes).unwrap();
/// assert_eq!(envelope, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
